// tests/common/mod.rs
pub use axum::Router;
pub use tokio::task::JoinHandle;

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use tokio::time::{sleep, Instant};

use crate::auth::credentials::Credentials;
use crate::auth::transport::{SignIn, SignInResponse};
use crate::error::AuthError;

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn make_headers(map: &[(&str, &str)]) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (k, v) in map.iter() {
        let key = HeaderName::from_str(k).unwrap();
        let value = HeaderValue::from_str(v).unwrap();
        headers.insert(key, value);
    }
    headers
}

/// 200 response carrying a complete token set.
pub fn ok_response(access_token: &str, expiry: &str) -> SignInResponse {
    SignInResponse::new(
        StatusCode::OK,
        make_headers(&[
            ("access-token", access_token),
            ("client", "cli"),
            ("expiry", expiry),
            ("uid", "ops@example.com"),
        ]),
        "{}",
    )
}

pub fn conflict() -> SignInResponse {
    status_response(StatusCode::CONFLICT, "")
}

pub fn status_response(status: StatusCode, body: &str) -> SignInResponse {
    SignInResponse::new(status, HeaderMap::new(), body)
}

#[derive(Default)]
struct Script {
    responses: Mutex<VecDeque<Result<SignInResponse, AuthError>>>,
    calls: AtomicUsize,
    call_times: Mutex<Vec<Instant>>,
    latency: Duration,
}

/// Transport that replays canned responses in order and records when it was called.
/// Running out of responses yields a transport error.
#[derive(Clone)]
pub struct ScriptedTransport(Arc<Script>);

impl ScriptedTransport {
    pub fn new(responses: Vec<Result<SignInResponse, AuthError>>) -> Self {
        Self::with_latency(responses, Duration::ZERO)
    }

    pub fn with_latency(responses: Vec<Result<SignInResponse, AuthError>>, latency: Duration) -> Self {
        Self(Arc::new(Script {
            responses: Mutex::new(responses.into()),
            latency,
            ..Default::default()
        }))
    }

    pub fn calls(&self) -> usize {
        self.0.calls.load(Ordering::SeqCst)
    }

    /// Time elapsed between consecutive calls.
    pub fn gaps(&self) -> Vec<Duration> {
        let times = self.0.call_times.lock().unwrap();
        times.windows(2).map(|w| w[1] - w[0]).collect()
    }
}

impl SignIn for ScriptedTransport {
    async fn sign_in(&self, _credentials: &Credentials) -> Result<SignInResponse, AuthError> {
        self.0.calls.fetch_add(1, Ordering::SeqCst);
        self.0.call_times.lock().unwrap().push(Instant::now());
        if !self.0.latency.is_zero() {
            sleep(self.0.latency).await;
        }
        let next = self.0.responses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(AuthError::transport("script exhausted")))
    }
}
