//! Downstream forwarding of verified backorder payloads.
//!
//! Verified requests are relayed as-is to a single configured HTTP endpoint.
//! The relay makes exactly one attempt per request.

pub mod forwarder;
pub mod payload;

pub use forwarder::{ForwardError, Forwarder};
pub use payload::{parse_payload, variant_id};
