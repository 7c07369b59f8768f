//! Backorder Proxy - app proxy endpoint for storefront backorder requests.
//!
//! This binary provides a thin web server that:
//! - Receives app proxy requests from the storefront platform
//! - Verifies the signed query string
//! - Relays verified payloads to the downstream backorder function

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use backorder::web::shutdown_signal;
use backorder::{router, AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is normal in deployed environments
    dotenvy::dotenv().ok();

    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("backorder_proxy_starting");

    // Load configuration
    let config = Config::from_env();
    info!(
        port = config.port,
        signature_verification_configured = config.shared_secret.is_some(),
        downstream_configured = config.downstream_endpoint.is_some(),
        request_timeout_ms = config.request_timeout_ms,
        "config_loaded"
    );

    let port = config.port;
    let app = router(AppState::new(config));

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "backorder_proxy_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("backorder_proxy_shutdown_complete");

    Ok(())
}
