use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::auth::authenticate::authenticate;
use crate::auth::credentials::Credentials;
use crate::auth::token::{AuthHeaders, RawToken};
use crate::auth::transport::{HttpTransport, SignIn};
use crate::cache::token_cache::{CacheEntry, TokenCache};
use crate::config::settings::SettingsConfig;
use crate::config::service::ServiceConfig;
use crate::error::AuthError;
use crate::helpers::time::{expiry_or_default, get_instant, now_i64};
use crate::observability::metrics::get_metrics;
use crate::resilience::retry::{run_with_retry, RetryError, RetrySettings};
use crate::utils::constants::*;

static SUCCESS_MSG: &str = "success";
static ERROR_MSG: &str = "error";

/// Tunables of the refresh path, resolved from `SettingsConfig`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerSettings {
    pub safety_margin_seconds: u64,
    pub default_ttl_seconds: u64,
    pub conflict_retry_delay: Duration,
    pub retry: RetrySettings,
}

impl Default for ManagerSettings {
    fn default() -> Self {
        Self {
            safety_margin_seconds: DEFAULT_SAFETY_MARGIN_SECS,
            default_ttl_seconds: DEFAULT_TOKEN_TTL_SECS,
            conflict_retry_delay: Duration::from_millis(DEFAULT_CONFLICT_RETRY_DELAY_MS),
            retry: RetrySettings {
                attempts: DEFAULT_RETRY_ATTEMPTS,
                base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
                factor: DEFAULT_RETRY_FACTOR,
                max_delay_ms: DEFAULT_RETRY_MAX_DELAY_MS,
            },
        }
    }
}

impl From<&SettingsConfig> for ManagerSettings {
    fn from(settings: &SettingsConfig) -> Self {
        let retry = settings.retry.as_ref();
        Self {
            safety_margin_seconds: settings.safety_margin_seconds.unwrap_or(DEFAULT_SAFETY_MARGIN_SECS),
            default_ttl_seconds: settings.default_ttl_seconds.unwrap_or(DEFAULT_TOKEN_TTL_SECS),
            conflict_retry_delay: Duration::from_millis(
                settings.conflict_retry_delay_ms.unwrap_or(DEFAULT_CONFLICT_RETRY_DELAY_MS),
            ),
            retry: RetrySettings {
                attempts: retry.and_then(|r| r.attempts).unwrap_or(DEFAULT_RETRY_ATTEMPTS),
                base_delay_ms: retry.and_then(|r| r.base_delay_ms).unwrap_or(DEFAULT_RETRY_BASE_DELAY_MS),
                factor: retry.and_then(|r| r.factor).unwrap_or(DEFAULT_RETRY_FACTOR),
                max_delay_ms: retry.and_then(|r| r.max_delay_ms).unwrap_or(DEFAULT_RETRY_MAX_DELAY_MS),
            },
        }
    }
}

/// Owns the sign-in token for one identity.
///
/// `get_token` serves the cached headers while they are outside the safety
/// margin and otherwise renews them. Renewal runs under `refresh_lock`, so
/// concurrent callers on an empty or stale cache share a single sign-in:
/// whoever queued behind a successful refresh finds the new entry when the
/// lock is released.
pub struct TokenManager<T = HttpTransport> {
    transport: T,
    credentials: Credentials,
    settings: ManagerSettings,
    cache: TokenCache,
    refresh_lock: Mutex<()>,
}

impl TokenManager<HttpTransport> {
    /// Build a manager talking HTTP to `auth.endpoint`. Missing credentials are
    /// passed through as empty strings and rejected by the endpoint.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, AuthError> {
        let settings = &config.settings;
        let transport = HttpTransport::new(
            config.auth.endpoint.as_deref().unwrap_or_default(),
            settings.sign_in_accept(),
            settings.request_timeout(),
        )?;
        Ok(Self::new(
            transport,
            config.auth.credentials(),
            ManagerSettings::from(settings),
        ))
    }
}

impl<T> TokenManager<T>
where
    T: SignIn + Send + Sync,
{
    pub fn new(transport: T, credentials: Credentials, settings: ManagerSettings) -> Self {
        Self {
            transport,
            credentials,
            settings,
            cache: TokenCache::new(),
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn settings(&self) -> &ManagerSettings {
        &self.settings
    }

    /// Current cache entry, fresh or not.
    pub async fn cached(&self) -> Option<CacheEntry> {
        self.cache.entry().await
    }

    /// Headers for an authenticated request, renewed when needed.
    pub async fn get_token(&self) -> Result<AuthHeaders, AuthError> {
        let metrics = get_metrics().await;
        let margin = self.settings.safety_margin_seconds;

        if let Some(headers) = self.cache.get_fresh(now_i64(), margin).await {
            debug!("returning valid cached token");
            metrics.cache_hits.inc();
            return Ok(headers);
        }

        let _guard = self.refresh_lock.lock().await;

        // refreshed by the caller we queued behind
        if let Some(headers) = self.cache.get_fresh(now_i64(), margin).await {
            debug!("token refreshed while waiting, returning it");
            metrics.cache_hits.inc();
            return Ok(headers);
        }

        metrics.cache_misses.inc();
        info!("cached token invalid or expired, fetching new token");
        self.refresh().await
    }

    async fn refresh(&self) -> Result<AuthHeaders, AuthError> {
        let metrics = get_metrics().await;
        let start = get_instant();

        let result = run_with_retry(&self.settings.retry, |attempt| {
            debug!(attempt, max_attempts = self.settings.retry.attempts, "authentication attempt");
            authenticate(&self.transport, &self.credentials, self.settings.conflict_retry_delay)
        })
        .await;

        match result {
            Ok(token) => {
                metrics.refresh_duration.with_label_values(&[SUCCESS_MSG]).observe(start.elapsed().as_secs_f64());
                Ok(self.store(&token).await)
            }
            Err(RetryError { attempts, error }) => {
                metrics.refresh_duration.with_label_values(&[ERROR_MSG]).observe(start.elapsed().as_secs_f64());
                metrics.refresh_failures.with_label_values(&[error.reason()]).inc();
                error!(
                    attempts,
                    terminal = error.is_terminal(),
                    "failed to retrieve api token: {error}"
                );
                Err(AuthError::Fetch {
                    attempts,
                    source: Box::new(error),
                })
            }
        }
    }

    async fn store(&self, token: &RawToken) -> AuthHeaders {
        let metrics = get_metrics().await;
        let headers = AuthHeaders::from(token);

        let (expires_at, fallback) =
            expiry_or_default(&token.expiry, now_i64(), self.settings.default_ttl_seconds);
        if fallback {
            warn!(
                expiry = %token.expiry,
                default_ttl_seconds = self.settings.default_ttl_seconds,
                "could not parse token expiry, using default ttl"
            );
            metrics.expiry_fallbacks.inc();
        }

        self.cache.set(CacheEntry::new(headers.clone(), expires_at)).await;
        metrics.token_expiry_unix.set(expires_at);
        info!(expires_at, "new token retrieved and cached");
        headers
    }
}
