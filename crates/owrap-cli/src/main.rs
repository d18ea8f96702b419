//! `owrap` entry point - the composition root.
//!
//! Loads `.env`, initialises logging, parses settings, binds the listener
//! and serves until Ctrl-C.

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use owrap_cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before anything reads them
    dotenvy::dotenv().ok();

    // Initialize logging
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let settings = Cli::parse()
        .into_settings()
        .context("Invalid configuration")?;

    let listener = TcpListener::bind(settings.listen_addr())
        .await
        .with_context(|| format!("Failed to bind {}", settings.listen_addr()))?;

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received");
                shutdown.cancel();
            }
            Err(e) => warn!("Failed to listen for shutdown signal: {e}"),
        }
    });

    owrap_proxy::serve(listener, &settings, cancel).await
}
