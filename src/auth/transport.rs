use std::future::Future;
use std::time::Duration;

use http::header::ACCEPT;
use http::{HeaderMap, StatusCode};
use reqwest::Client;
use tracing::debug;

use crate::auth::credentials::Credentials;
use crate::error::AuthError;
use crate::observability::metrics::get_metrics;
use crate::utils::constants::SIGN_IN_PATH;

/// Raw outcome of one sign-in request, whatever its status.
#[derive(Debug, Clone)]
pub struct SignInResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl SignInResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<String>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }
}

/// One sign-in round-trip. Implementations make no retry decisions and
/// only fail when the endpoint could not be reached.
pub trait SignIn {
    fn sign_in(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<SignInResponse, AuthError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    url: String,
    accept: String,
}

impl HttpTransport {
    pub fn new(auth_endpoint: &str, accept: &str, timeout: Duration) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(AuthError::transport)?;

        Ok(Self::with_client(client, auth_endpoint, accept))
    }

    pub fn with_client(client: Client, auth_endpoint: &str, accept: &str) -> Self {
        Self {
            client,
            url: sign_in_url(auth_endpoint),
            accept: accept.to_owned(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl SignIn for HttpTransport {
    async fn sign_in(&self, credentials: &Credentials) -> Result<SignInResponse, AuthError> {
        debug!(url = %self.url, "sending sign-in request");
        let response = self
            .client
            .post(&self.url)
            .header(ACCEPT, &self.accept)
            .json(credentials)
            .send()
            .await
            .map_err(AuthError::transport)?;

        let status = response.status();
        get_metrics()
            .await
            .sign_in_requests
            .with_label_values(&[status_class(status)])
            .inc();

        let headers = response.headers().clone();
        let body = response.text().await.map_err(AuthError::transport)?;
        debug!(status = %status, "sign-in response received");
        Ok(SignInResponse::new(status, headers, body))
    }
}

fn sign_in_url(auth_endpoint: &str) -> String {
    format!("{}{}", auth_endpoint.trim_end_matches('/'), SIGN_IN_PATH)
}

fn status_class(status: StatusCode) -> &'static str {
    match status.as_u16() {
        200..=299 => "2xx",
        409 => "409",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}
