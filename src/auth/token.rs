use http::header::{InvalidHeaderValue, ACCEPT, AUTHORIZATION};
use http::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;

use crate::error::AuthError;
use crate::utils::constants::{
    HEADER_ACCESS_TOKEN, HEADER_CLIENT, HEADER_EXPIRY, HEADER_TOKEN_TYPE, HEADER_UID,
    OUTGOING_ACCEPT, TOKEN_TYPE_BEARER,
};

/// Token set returned by a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawToken {
    pub access_token: String,
    pub client: String,
    /// epoch seconds as sent by the endpoint, not validated here
    pub expiry: String,
    pub uid: String,
    pub token_type: String,
}

impl RawToken {
    /// Strict parse of the sign-in response headers.
    ///
    /// `HeaderMap` lookups are case-insensitive, so `Access-Token` and
    /// `access-token` both match. Absent, empty or non-ASCII values are
    /// reported as missing.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AuthError> {
        let mut missing = Vec::new();
        let mut field = |name: &'static str| match header_value(headers, name) {
            Some(value) => value,
            None => {
                missing.push(name);
                String::new()
            }
        };

        let access_token = field(HEADER_ACCESS_TOKEN);
        let client = field(HEADER_CLIENT);
        let expiry = field(HEADER_EXPIRY);
        let uid = field(HEADER_UID);

        if !missing.is_empty() {
            return Err(AuthError::Extraction {
                missing,
                headers: headers.clone(),
            });
        }

        Ok(Self {
            access_token,
            client,
            expiry,
            uid,
            token_type: TOKEN_TYPE_BEARER.to_owned(),
        })
    }
}

fn header_value(headers: &HeaderMap, key: &str) -> Option<String> {
    headers
        .get(key)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

/// Headers attached to every authenticated request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthHeaders {
    #[serde(rename = "Accept")]
    pub accept: String,
    #[serde(rename = "Authorization")]
    pub authorization: String,
    #[serde(rename = "access-token")]
    pub access_token: String,
    #[serde(rename = "token-type")]
    pub token_type: String,
    pub client: String,
    pub expiry: String,
    pub uid: String,
}

impl From<&RawToken> for AuthHeaders {
    fn from(token: &RawToken) -> Self {
        Self {
            accept: OUTGOING_ACCEPT.to_owned(),
            authorization: format!("{} {}", TOKEN_TYPE_BEARER, token.access_token),
            access_token: token.access_token.clone(),
            token_type: TOKEN_TYPE_BEARER.to_owned(),
            client: token.client.clone(),
            expiry: token.expiry.clone(),
            uid: token.uid.clone(),
        }
    }
}

impl AuthHeaders {
    /// Build a header map ready for `reqwest::RequestBuilder::headers`.
    pub fn to_header_map(&self) -> Result<HeaderMap, InvalidHeaderValue> {
        let mut headers = HeaderMap::with_capacity(7);
        headers.insert(ACCEPT, HeaderValue::from_str(&self.accept)?);
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&self.authorization)?);

        let pass_through = [
            (HEADER_ACCESS_TOKEN, &self.access_token),
            (HEADER_TOKEN_TYPE, &self.token_type),
            (HEADER_CLIENT, &self.client),
            (HEADER_EXPIRY, &self.expiry),
            (HEADER_UID, &self.uid),
        ];
        for (name, value) in pass_through {
            headers.insert(HeaderName::from_static(name), HeaderValue::from_str(value)?);
        }
        Ok(headers)
    }
}
