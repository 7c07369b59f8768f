//! Signature verification for app proxy requests.
//!
//! The platform signs the query string of every proxied request with
//! HMAC-SHA256 using the app's shared secret. Verification is pure and
//! synchronous so it can run inline on the request task.

pub mod canonical;
pub mod digest;
pub mod query;
pub mod verifier;

pub use canonical::{canonicalize, CanonicalForm, HMAC_KEY, SIGNATURE_KEY};
pub use digest::{hex_digest, HEX_DIGEST_LEN};
pub use query::QueryParams;
pub use verifier::{RejectReason, SharedSecret, SignatureVerifier, Verification};
