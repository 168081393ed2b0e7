//! gavel-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints and opens
//! the auction house.

use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use gavel_gateway::app_state::AppState;
use gavel_gateway::build_app;
use gavel_gateway::config::{GatewayConfig, LogFormat};
use gavel_gateway::domain::Catalog;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = GatewayConfig::from_env().context("loading configuration")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(addr = %config.listen_addr, "starting gavel-gateway");

    // Build services
    let catalog = Catalog::default();
    tracing::info!(lots = catalog.len(), "lot catalog loaded");
    let state = AppState::new(&config, catalog);

    if config.auction_autostart {
        state.auction.launch().await;
    }

    let app = build_app(
        state.clone(),
        Duration::from_secs(config.request_timeout_secs),
    );

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving http")?;

    state.auction.shutdown().await;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
