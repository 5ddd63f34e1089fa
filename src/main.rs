//! quizsync server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use quizsync::api::build_app;
use quizsync::app_state::AppState;
use quizsync::config::ServerConfig;
use quizsync::registry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    // Load configuration
    let config = ServerConfig::from_env().context("invalid configuration")?;
    tracing::info!(
        addr = %config.listen_addr,
        interval_ms = u64::try_from(config.schedule.interval().as_millis()).unwrap_or(u64::MAX),
        epoch = %config.schedule.epoch(),
        "starting quizsync"
    );

    // Build registry and application state
    let registry = registry::connect(&config.backend)
        .await
        .context("room registry unavailable")?;
    tracing::info!(backend = registry.backend_name(), "room registry ready");
    let app = build_app(AppState::new(registry, &config));

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
