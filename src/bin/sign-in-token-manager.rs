use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use secrecy::SecretString;
use sign_in_token_manager::config::loader;
use sign_in_token_manager::config::service::AuthConfig;
use sign_in_token_manager::config::validator::validate_service_config;
use sign_in_token_manager::observability::metrics::get_metrics;
use sign_in_token_manager::utils::logging::{self, LogLevel};
use sign_in_token_manager::TokenManager;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// optional YAML file with `auth` and `settings` blocks
    #[arg(short, long, env = "CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, env = "AUTH_API_ENDPOINT")]
    auth_endpoint: Option<String>,
    #[arg(long, env = "AUTH_EMAIL")]
    auth_email: Option<String>,
    #[arg(long, env = "AUTH_PASSWORD", hide_env_values = true)]
    auth_password: Option<String>,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    /// print prometheus metrics to stderr after fetching the token
    #[arg(long)]
    print_metrics: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Make preparations
    //
    // read .env, then args (env backed)
    // -------------------------------

    let _ = dotenvy::dotenv();
    let args = Args::parse();

    // -------------------------------
    // 2. Load YAML config, command line wins
    // -------------------------------

    let mut service_config = loader::load(args.config.as_deref()).await?;
    service_config.auth = service_config.auth.merge(AuthConfig {
        endpoint: args.auth_endpoint,
        email: args.auth_email,
        password: args.auth_password.map(SecretString::new),
    });
    logging::run(&service_config, args.log_level);

    validate_service_config(&service_config)
        .await
        .map_err(|errors| anyhow!("config is not valid:\n{}", errors.join("\n")))?;

    // -------------------------------
    // 3. Build token manager and fetch
    // -------------------------------

    let manager = TokenManager::from_config(&service_config)?;
    info!("requesting token");
    let headers = manager.get_token().await?;

    println!(
        "{}",
        serde_json::to_string_pretty(&headers).context("cannot serialize auth headers")?
    );

    if args.print_metrics {
        eprintln!("{}", get_metrics().await.gather_text()?);
    }

    Ok(())
}
