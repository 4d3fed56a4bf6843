use std::fmt::Display;
use std::future::Future;

use tokio::time::{sleep, Duration};
use tracing::{error, warn};

use crate::error::AuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry(Duration),
    Fail,
}

/// Decides what happens after attempt number `attempt` (1-based) failed with `error`.
pub trait RetryPolicy<E> {
    fn decide(&self, attempt: u32, error: &E) -> RetryDecision;
}

/// Operation failed for good, after `attempts` tries.
#[derive(Debug)]
pub struct RetryError<E> {
    pub attempts: u32,
    pub error: E,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrySettings {
    /// total attempts, including the first one
    pub attempts: u32,
    pub base_delay_ms: u64,
    pub factor: u32,
    /// invariant: >= base_delay_ms
    pub max_delay_ms: u64,
}

impl RetrySettings {
    /// Wait before the retry that follows failed attempt `attempt`:
    /// `base * factor^(attempt - 1)`, capped at `max_delay_ms`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let multiplier = u64::from(self.factor).saturating_pow(attempt.saturating_sub(1));
        let delay = self
            .base_delay_ms
            .saturating_mul(multiplier)
            .min(self.max_delay_ms);
        Duration::from_millis(delay)
    }
}

impl RetryPolicy<AuthError> for RetrySettings {
    fn decide(&self, attempt: u32, error: &AuthError) -> RetryDecision {
        if error.is_terminal() || attempt >= self.attempts {
            RetryDecision::Fail
        } else {
            RetryDecision::Retry(self.delay(attempt))
        }
    }
}

/// Run `operation` until it succeeds or `policy` gives up.
/// The closure receives the 1-based attempt number.
pub async fn run_with_retry<P, F, Fut, T, E>(policy: &P, mut operation: F) -> Result<T, RetryError<E>>
where
    P: RetryPolicy<E>,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) => match policy.decide(attempt, &e) {
                RetryDecision::Retry(delay) => {
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "attempt {attempt} failed: {e}"
                    );
                    sleep(delay).await;
                }
                RetryDecision::Fail => {
                    error!(attempt, "giving up after attempt {attempt}: {e}");
                    return Err(RetryError { attempts: attempt, error: e });
                }
            },
        }
    }
}
