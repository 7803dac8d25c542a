//! PR Check Bot
//!
//! Serves the GitHub App webhook endpoint. Configuration comes from flags,
//! the environment, or a `.env` file in the working directory.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pr_check_bot::{build_router, AppState, Args, Pipeline};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("pr_check_bot={},tower_http=info", args.log_level))
    });
    if args.log_json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let listen = args.listen;
    let config = args.into_config().context("Invalid configuration")?;

    info!(
        app_id = %config.app_id,
        api_url = %config.api_url,
        timeout_secs = config.request_timeout.as_secs(),
        "Starting pr-check-bot"
    );

    let pipeline = Pipeline::from_config(&config).context("Failed to initialize pipeline")?;
    let app = build_router(AppState::new(pipeline));

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("Failed to bind {}", listen))?;
    info!("pr-check-bot listening on {}", listen);

    axum::serve(listener, app).await?;
    Ok(())
}
