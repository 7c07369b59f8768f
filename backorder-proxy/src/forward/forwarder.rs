//! HTTP client for the downstream backorder function.

use std::time::Duration;

use bytes::Bytes;
use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use thiserror::Error;
use tracing::{error, info};

/// Errors from relaying a payload downstream.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// No downstream endpoint is configured.
    #[error("Missing AZURE_ENDPOINT env var")]
    MissingEndpoint,

    /// The request never produced a response (connect, timeout, body read).
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// The downstream answered with a non-success status.
    #[error("downstream returned {status}")]
    Downstream { status: StatusCode, body: String },
}

/// Forwards payloads to one downstream endpoint.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: Client,
    endpoint: Option<String>,
    timeout: Duration,
}

impl Forwarder {
    pub fn new(endpoint: Option<String>, timeout: Duration) -> Self {
        Self::with_client(Client::new(), endpoint, timeout)
    }

    pub fn with_client(client: Client, endpoint: Option<String>, timeout: Duration) -> Self {
        Self {
            client,
            endpoint,
            timeout,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    /// POST the request body as received, labelled JSON, and wait for a 2xx.
    pub async fn forward(&self, body: Bytes) -> Result<(), ForwardError> {
        let endpoint = self.endpoint.as_deref().ok_or(ForwardError::MissingEndpoint)?;

        info!(
            body_length = body.len(),
            timeout_seconds = self.timeout.as_secs_f64(),
            "downstream_forward_starting"
        );

        let response = self
            .client
            .post(endpoint)
            .timeout(self.timeout)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    error!(
                        timeout_seconds = self.timeout.as_secs_f64(),
                        error = %e,
                        "downstream_forward_timeout"
                    );
                } else {
                    error!(error = %e, "downstream_forward_request_error");
                }
                ForwardError::Transport(e)
            })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(
                status_code = status.as_u16(),
                body_length = body.len(),
                "downstream_forward_failed"
            );
            return Err(ForwardError::Downstream { status, body });
        }

        info!(status_code = status.as_u16(), "downstream_forward_complete");

        Ok(())
    }
}
