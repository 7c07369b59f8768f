//! Web server module for the app proxy endpoints.
//!
//! Routes:
//! - `GET /health`: process health
//! - `GET /backorder`: proxy path liveness probe
//! - `POST /backorder`: verify, validate and relay a backorder request

pub mod handlers;
pub mod security;
pub mod shutdown;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

pub use handlers::{
    backorder_probe, backorder_submit, health, AppState, HealthResponse, ProxyResponse,
    PROXY_PROBE_TEXT,
};
pub use security::add_security_headers;
pub use shutdown::{shutdown_signal, wait_for_shutdown, ShutdownSignal};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .route("/backorder", get(backorder_probe).post(backorder_submit))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    add_security_headers(router)
}
