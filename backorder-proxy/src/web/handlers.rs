//! Backorder endpoint handlers.
//!
//! `POST /backorder` is the only handler with real work:
//! 1. Verify the app proxy signature on the query string
//! 2. Check the payload names a variant
//! 3. Relay the original body downstream and report the outcome

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::forward::{parse_payload, variant_id, ForwardError, Forwarder};
use crate::verify::{QueryParams, SignatureVerifier, Verification};
use crate::Config;

/// Text returned by `GET /backorder` for the platform's liveness probe.
pub const PROXY_PROBE_TEXT: &str = "Backorder proxy OK. Use POST /backorder.";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub verifier: Arc<SignatureVerifier>,
    pub forwarder: Forwarder,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let verifier = SignatureVerifier::new(config.shared_secret.clone());
        let forwarder = Forwarder::new(
            config.downstream_endpoint.clone(),
            std::time::Duration::from_millis(config.request_timeout_ms),
        );
        Self::with_forwarder(config, verifier, forwarder)
    }

    pub fn with_forwarder(config: Config, verifier: SignatureVerifier, forwarder: Forwarder) -> Self {
        Self {
            config: Arc::new(config),
            verifier: Arc::new(verifier),
            forwarder,
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub ok: bool,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

/// Liveness probe for the proxied path.
pub async fn backorder_probe() -> &'static str {
    PROXY_PROBE_TEXT
}

// =============================================================================
// Backorder Submission
// =============================================================================

/// Response body for `POST /backorder`.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ProxyResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Downstream status code, on relay failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Downstream response text, on relay failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl ProxyResponse {
    pub fn ok() -> Self {
        Self {
            ok: true,
            error: None,
            status: None,
            body: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(message.into()),
            status: None,
            body: None,
        }
    }
}

/// Backorder submission endpoint.
pub async fn backorder_submit(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> (StatusCode, Json<ProxyResponse>) {
    let params = QueryParams::parse(query.as_deref().unwrap_or_default());

    info!(
        shop = params.first("shop").unwrap_or_default(),
        param_count = params.len(),
        body_length = body.len(),
        "backorder_request_received"
    );

    if let Verification::Rejected(reason) = state.verifier.verify(&params) {
        return (
            StatusCode::FORBIDDEN,
            Json(ProxyResponse::error(reason.as_str())),
        );
    }

    if !state.forwarder.is_configured() {
        error!("downstream_endpoint_not_configured");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ProxyResponse::error(ForwardError::MissingEndpoint.to_string())),
        );
    }

    let payload = match parse_payload(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "backorder_invalid_json");
            return (
                StatusCode::BAD_REQUEST,
                Json(ProxyResponse::error("invalid JSON body")),
            );
        }
    };

    let Some(variant) = variant_id(&payload) else {
        warn!("backorder_missing_variant_id");
        return (
            StatusCode::BAD_REQUEST,
            Json(ProxyResponse::error("variantId is required")),
        );
    };

    info!(variant_id = %variant, "backorder_forwarding");

    // The parsed payload is for validation only; the body goes out as received
    match state.forwarder.forward(body.clone()).await {
        Ok(()) => {
            info!(variant_id = %variant, "backorder_forwarded");
            (StatusCode::OK, Json(ProxyResponse::ok()))
        }
        Err(ForwardError::Downstream { status, body }) => (
            StatusCode::BAD_GATEWAY,
            Json(ProxyResponse {
                ok: false,
                error: Some("Azure Function call failed".to_string()),
                status: Some(status.as_u16()),
                body: Some(body),
            }),
        ),
        Err(e) => {
            error!(error = %e, "backorder_forward_error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ProxyResponse::error(e.to_string())),
            )
        }
    }
}
