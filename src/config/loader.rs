use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::{debug, error};

use crate::config::service::ServiceConfig;
use crate::config::settings::LoggingConfig;

/// Load config from a YAML file, expanding `${VAR}` and `${VAR:default}`
pub async fn file_to_config(path: &Path) -> Result<ServiceConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("cannot read config file '{}'", path.display()))?;

    let expanded = expand_env_vars(&content)?;
    parse_config(&expanded).await
}

/// Optional config file; without one every setting takes its default.
pub async fn load(path: Option<&Path>) -> Result<ServiceConfig> {
    match path {
        Some(path) => file_to_config(path).await,
        None => {
            debug!("no config file given, using defaults");
            Ok(apply_defaults(ServiceConfig::default()))
        }
    }
}

pub async fn parse_config(content: &str) -> Result<ServiceConfig> {
    let service_config: ServiceConfig = serde_yaml::from_str(content)
        .inspect_err(|e| error!("parse config error: {}", e))
        .context("invalid config format")?;

    Ok(apply_defaults(service_config))
}

fn apply_defaults(mut service_config: ServiceConfig) -> ServiceConfig {
    if service_config.settings.logging.is_none() {
        service_config.settings.logging = Some(LoggingConfig::default());
    }
    service_config
}

fn expand_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}")?;
    let expanded = re.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var).unwrap_or_else(|_| default.to_string())
    });
    Ok(expanded.to_string())
}
