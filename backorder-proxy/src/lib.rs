//! Backorder proxy - signature-verifying relay for storefront app proxy requests.
//!
//! The storefront platform forwards `/apps/backorder` requests to this service
//! with a signed query string. Requests whose signature checks out are relayed
//! to a downstream function; everything else is refused with `403`.
//!
//! ## Architecture
//!
//! ```text
//! Storefront → App proxy → POST /backorder → verify → downstream function
//! ```

pub mod config;
pub mod forward;
pub mod verify;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use forward::{ForwardError, Forwarder};
pub use verify::{
    CanonicalForm, QueryParams, RejectReason, SharedSecret, SignatureVerifier, Verification,
};
pub use web::{router, AppState};
