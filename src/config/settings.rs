use std::time::Duration;

use serde::Deserialize;

use crate::utils::constants::{DEFAULT_HTTP_TIMEOUT_MS, DEFAULT_SIGN_IN_ACCEPT};

/// ================================
/// Global service-wide settings
/// ================================
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct SettingsConfig {
    /// renew this many seconds before the token expires
    pub safety_margin_seconds: Option<u64>,
    /// validity assumed when the `expiry` header cannot be parsed
    pub default_ttl_seconds: Option<u64>,
    /// fixed wait before the single retry that follows a 409
    pub conflict_retry_delay_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
    /// media type sent in the sign-in `Accept` header
    pub sign_in_accept: Option<String>,
    pub retry: Option<RetryConfig>,
    pub logging: Option<LoggingConfig>,
}

impl SettingsConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.unwrap_or(DEFAULT_HTTP_TIMEOUT_MS))
    }

    pub fn sign_in_accept(&self) -> &str {
        self.sign_in_accept.as_deref().unwrap_or(DEFAULT_SIGN_IN_ACCEPT)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// total attempts, the first one included
    pub attempts: Option<u32>,
    /// will be multiplied by `factor` on every attempt until max_delay_ms
    pub base_delay_ms: Option<u64>,
    pub factor: Option<u32>,
    /// invariant: >= base_delay_ms
    pub max_delay_ms: Option<u64>,
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    #[serde(default)]
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new("info".to_owned(), LogFormat::Compact)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Compact,
}
