use anyhow::{Context, Result};
use careerhub::cli::{run, Cli};
use careerhub::{ApiError, ClientConfig};
use clap::Parser;
use std::fs::OpenOptions;
use tracing::{error, info};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ClientConfig::load()?;

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true) // Clear file on startup
        .open(&config.log_path)
        .with_context(|| format!("Failed to open log file {}", config.log_path.display()))?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("API: {}", config.api_base_url);
    info!("Session file: {}", config.session_path.display());

    if let Err(e) = run(cli, &config).await {
        error!("Command failed: {:#}", e);
        match e.downcast_ref::<ApiError>() {
            Some(api_error) => eprintln!("❌ {}", api_error.user_message()),
            None => eprintln!("❌ {:#}", e),
        }
        std::process::exit(1);
    }

    Ok(())
}
