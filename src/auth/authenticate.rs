use std::time::Duration;

use http::StatusCode;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::auth::credentials::Credentials;
use crate::auth::token::RawToken;
use crate::auth::transport::{SignIn, SignInResponse};
use crate::error::AuthError;

/// One authentication round-trip.
///
/// A 409 (an active session already exists) gets a single retry after
/// `conflict_delay`. Every other non-2xx status, or a second non-2xx after
/// the conflict retry, is returned as `AuthError::Failure`.
pub async fn authenticate<T: SignIn>(
    transport: &T,
    credentials: &Credentials,
    conflict_delay: Duration,
) -> Result<RawToken, AuthError> {
    info!("performing api authentication");
    let response = transport.sign_in(credentials).await?;

    if response.status.is_success() {
        info!("authentication request successful");
        return RawToken::from_headers(&response.headers).inspect_err(log_extraction_failure);
    }

    let response = if response.status == StatusCode::CONFLICT {
        warn!(
            delay_ms = conflict_delay.as_millis() as u64,
            "authentication returned 409 conflict, waiting before retry"
        );
        sleep(conflict_delay).await;

        let retry_response = transport.sign_in(credentials).await?;
        if retry_response.status.is_success() {
            info!("retry authentication request successful");
            return RawToken::from_headers(&retry_response.headers)
                .inspect_err(log_extraction_failure);
        }
        retry_response
    } else {
        response
    };

    Err(failure(response))
}

fn failure(response: SignInResponse) -> AuthError {
    error!(
        status = %response.status,
        body = %response.body,
        "authentication failed"
    );
    AuthError::failure(response.status, &response.body)
}

fn log_extraction_failure(err: &AuthError) {
    if let AuthError::Extraction { missing, headers } = err {
        let names: Vec<&str> = headers.keys().map(|name| name.as_str()).collect();
        error!(?missing, received = ?names, "required sign-in headers missing");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use http::StatusCode;
    use tokio::time::Instant;

    use super::authenticate;
    use crate::auth::credentials::Credentials;
    use crate::error::AuthError;
    use crate::tests::common::{conflict, ok_response, status_response, ScriptedTransport};

    const CONFLICT_DELAY: Duration = Duration::from_millis(5000);

    fn creds() -> Credentials {
        Credentials::new("ops@example.com", "secret")
    }

    #[tokio::test(start_paused = true)]
    async fn success_needs_one_call() {
        let transport = ScriptedTransport::new(vec![Ok(ok_response("tok", "1700000000"))]);

        let token = authenticate(&transport, &creds(), CONFLICT_DELAY).await.unwrap();

        assert_eq!(token.access_token, "tok");
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn conflict_then_success_uses_second_response() {
        let transport = ScriptedTransport::new(vec![
            Ok(conflict()),
            Ok(ok_response("second", "1700000000")),
        ]);
        let start = Instant::now();

        let token = authenticate(&transport, &creds(), CONFLICT_DELAY).await.unwrap();

        assert_eq!(token.access_token, "second");
        assert_eq!(transport.calls(), 2);
        let gaps = transport.gaps();
        assert_eq!(gaps, vec![CONFLICT_DELAY]);
        assert!(start.elapsed() >= CONFLICT_DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn conflict_twice_fails_with_last_status() {
        let transport = ScriptedTransport::new(vec![Ok(conflict()), Ok(conflict())]);

        let err = authenticate(&transport, &creds(), CONFLICT_DELAY).await.unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::CONFLICT));
        assert!(!err.is_terminal());
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn conflict_then_unauthorized_is_terminal() {
        let transport = ScriptedTransport::new(vec![
            Ok(conflict()),
            Ok(status_response(StatusCode::UNAUTHORIZED, "bad credentials")),
        ]);

        let err = authenticate(&transport, &creds(), CONFLICT_DELAY).await.unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert!(err.is_terminal());
    }

    #[tokio::test(start_paused = true)]
    async fn other_failures_are_not_retried_here() {
        let transport = ScriptedTransport::new(vec![Ok(status_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "maintenance",
        ))]);

        let err = authenticate(&transport, &creds(), CONFLICT_DELAY).await.unwrap_err();

        match err {
            AuthError::Failure { status, body } => {
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(body, "maintenance");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn transport_error_on_conflict_retry_propagates() {
        let transport = ScriptedTransport::new(vec![
            Ok(conflict()),
            Err(AuthError::transport("connection reset")),
        ]);

        let err = authenticate(&transport, &creds(), CONFLICT_DELAY).await.unwrap_err();

        assert!(matches!(err, AuthError::Transport(_)));
    }
}
