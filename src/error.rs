use http::{HeaderMap, StatusCode};
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by the sign-in flow.
///
/// `Transport`, `Failure` and `Extraction` are produced by a single
/// authentication round-trip; `Fetch` is what `TokenManager::get_token`
/// returns once the retry controller has given up.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("sign-in request failed: {0}")]
    Transport(#[source] BoxError),

    #[error("sign-in failed with status {status}: {body}")]
    Failure { status: StatusCode, body: String },

    #[error("sign-in succeeded but required headers are missing: {}", .missing.join(", "))]
    Extraction {
        missing: Vec<&'static str>,
        headers: HeaderMap,
    },

    #[error("failed to retrieve api token after {attempts} attempt(s): {source}")]
    Fetch {
        attempts: u32,
        #[source]
        source: Box<AuthError>,
    },
}

/// Maximum length for response bodies carried in errors
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl AuthError {
    pub fn transport<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        AuthError::Transport(err.into())
    }

    pub fn failure(status: StatusCode, body: &str) -> Self {
        AuthError::Failure {
            status,
            body: truncate_body(body),
        }
    }

    /// HTTP status reported by the endpoint, if the failure carries one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            AuthError::Failure { status, .. } => Some(*status),
            AuthError::Fetch { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Retrying cannot change the outcome: bad credentials or a response
    /// that breaks the header contract.
    pub fn is_terminal(&self) -> bool {
        match self {
            AuthError::Failure { status, .. } => {
                *status == StatusCode::UNAUTHORIZED || *status == StatusCode::FORBIDDEN
            }
            AuthError::Extraction { .. } => true,
            AuthError::Transport(_) => false,
            AuthError::Fetch { source, .. } => source.is_terminal(),
        }
    }

    /// Short label used for metrics and structured logs.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::Transport(_) => "transport",
            AuthError::Failure { .. } => "status",
            AuthError::Extraction { .. } => "extraction",
            AuthError::Fetch { .. } => "fetch",
        }
    }
}

fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_owned();
    }
    let mut end = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
}
