//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - auth block must be complete: endpoint (http/https), email, password
//! - retry / logging invariants

use secrecy::ExposeSecret;
use tracing::{error, info};

use crate::config::service::{AuthConfig, ServiceConfig};
use crate::config::settings::{RetryConfig, SettingsConfig};
use crate::observability::metrics::get_metrics;

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub async fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_auth(&cfg.auth, &mut errors);
    validate_settings(&cfg.settings, &mut errors);

    if errors.is_empty() {
        info!("config valid");
        Ok(())
    } else {
        error!("configuration validation errors ({}):", errors.len());
        for e in &errors {
            error!(" - {}", e);
        }
        get_metrics().await.config_validation_errors.inc_by(errors.len() as u64);
        Err(errors)
    }
}

/// AUTH VALIDATION
fn validate_auth(auth: &AuthConfig, errors: &mut Vec<String>) {
    match auth.endpoint.as_deref().map(str::trim) {
        None | Some("") => errors.push(
            "auth.endpoint must be set (--auth-endpoint or AUTH_API_ENDPOINT)".to_string(),
        ),
        Some(endpoint) => {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                errors.push(format!(
                    "auth.endpoint '{}' must start with http:// or https://",
                    endpoint
                ));
            }
        }
    }

    if auth.email.as_deref().map_or(true, |v| v.trim().is_empty()) {
        errors.push("auth.email must be set (--auth-email or AUTH_EMAIL)".to_string());
    }
    if auth.password.as_ref().map_or(true, |p| p.expose_secret().is_empty()) {
        errors.push("auth.password must be set (--auth-password or AUTH_PASSWORD)".to_string());
    }
}

/// SETTINGS VALIDATION
fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    // retry invariants
    if let Some(retry) = &settings.retry {
        validate_retry("settings.retry", retry, errors);
    }

    // safety margin sane bounds
    if let Some(s) = settings.safety_margin_seconds {
        if s > 60 * 60 * 24 * 365 {
            errors.push(format!(
                "settings.safety_margin_seconds ({}) is unreasonably large",
                s
            ));
        }
    }

    if settings.default_ttl_seconds == Some(0) {
        errors.push("settings.default_ttl_seconds must be > 0".to_string());
    }
    if settings.request_timeout_ms == Some(0) {
        errors.push("settings.request_timeout_ms must be > 0".to_string());
    }
    if let Some(accept) = &settings.sign_in_accept {
        if accept.trim().is_empty() {
            errors.push("settings.sign_in_accept must not be empty".to_string());
        }
    }

    // logging level
    if let Some(logging) = &settings.logging {
        let valid = ["trace", "debug", "info", "warn", "error"];
        if !valid.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' invalid; allowed: {:?}",
                logging.level, valid
            ));
        }
    }
}

fn validate_retry(path: &str, retry: &RetryConfig, errors: &mut Vec<String>) {
    if let Some(attempts) = retry.attempts {
        if attempts == 0 {
            errors.push(format!("{}.attempts must be > 0", path));
        }
    }
    if let Some(factor) = retry.factor {
        if factor == 0 {
            errors.push(format!("{}.factor must be >= 1", path));
        }
    }
    if let (Some(base), Some(max)) = (retry.base_delay_ms, retry.max_delay_ms) {
        if max < base {
            errors.push(format!(
                "{}.max_delay_ms ({}) must be >= base_delay_ms ({})",
                path, max, base
            ));
        }
    }
}
