//! App proxy request signature verification.
//!
//! A verification is a single pass over the request's query parameters:
//!
//! 1. reject with `missing_secret` when no shared secret is configured
//! 2. take the credential from `signature`, else from `hmac`
//! 3. canonicalize the remaining parameters in the credential's form
//! 4. compute HMAC-SHA256 over the canonical message
//! 5. compare against the credential in constant time
//!
//! Every outcome is a [`Verification`] value; nothing here fails or blocks.

use std::fmt;

use serde::Serialize;
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use super::canonical::CanonicalForm;
use super::digest::hex_digest;
use super::query::QueryParams;

/// Shared secret provisioned out of band.
///
/// The bytes are never printed; `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct SharedSecret(Vec<u8>);

impl SharedSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Build from an optional configured value. Blank values count as unset;
    /// anything else is kept byte for byte, surrounding whitespace included.
    pub fn from_config(value: Option<&str>) -> Option<Self> {
        value
            .filter(|v| !v.trim().is_empty())
            .map(|v| Self::new(v.as_bytes()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(<redacted>)")
    }
}

/// Why a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    MissingSecret,
    MissingSignature,
    LengthMismatch,
    InvalidSignature,
}

impl RejectReason {
    /// Machine-readable reason string.
    pub fn as_str(self) -> &'static str {
        match self {
            RejectReason::MissingSecret => "missing_secret",
            RejectReason::MissingSignature => "missing_signature",
            RejectReason::LengthMismatch => "length_mismatch",
            RejectReason::InvalidSignature => "invalid_signature",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Accepted,
    Rejected(RejectReason),
}

impl Verification {
    pub fn is_accepted(self) -> bool {
        matches!(self, Verification::Accepted)
    }

    pub fn reject_reason(self) -> Option<RejectReason> {
        match self {
            Verification::Accepted => None,
            Verification::Rejected(reason) => Some(reason),
        }
    }
}

/// Verifies signed app proxy requests against one shared secret.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    secret: Option<SharedSecret>,
}

impl SignatureVerifier {
    pub fn new(secret: Option<SharedSecret>) -> Self {
        Self { secret }
    }

    pub fn is_enabled(&self) -> bool {
        self.secret.is_some()
    }

    /// Verify the credential carried in `params`.
    pub fn verify(&self, params: &QueryParams) -> Verification {
        let Some(secret) = &self.secret else {
            warn!(reason = %RejectReason::MissingSecret, "signature_rejected");
            return Verification::Rejected(RejectReason::MissingSecret);
        };

        let Some((form, provided)) = extract_credential(params) else {
            warn!(
                param_count = params.len(),
                reason = %RejectReason::MissingSignature,
                "signature_rejected"
            );
            return Verification::Rejected(RejectReason::MissingSignature);
        };

        let message = form.canonicalize(params);
        let expected = match hex_digest(secret.as_bytes(), &message) {
            Ok(digest) => digest,
            Err(_) => {
                warn!(reason = %RejectReason::InvalidSignature, "signature_invalid_key");
                return Verification::Rejected(RejectReason::InvalidSignature);
            }
        };

        // Length is public; only the contents need a constant-time check
        if expected.len() != provided.len() {
            warn!(
                credential_key = form.credential_key(),
                expected_length = expected.len(),
                actual_length = provided.len(),
                reason = %RejectReason::LengthMismatch,
                "signature_rejected"
            );
            return Verification::Rejected(RejectReason::LengthMismatch);
        }

        if bool::from(expected.as_bytes().ct_eq(provided.as_bytes())) {
            debug!(credential_key = form.credential_key(), "signature_accepted");
            Verification::Accepted
        } else {
            warn!(
                credential_key = form.credential_key(),
                reason = %RejectReason::InvalidSignature,
                "signature_rejected"
            );
            Verification::Rejected(RejectReason::InvalidSignature)
        }
    }
}

/// Find the credential and the form it selects. `signature` wins over `hmac`.
fn extract_credential(params: &QueryParams) -> Option<(CanonicalForm, &str)> {
    CanonicalForm::PRIORITY.into_iter().find_map(|form| {
        params
            .first(form.credential_key())
            .filter(|value| !value.is_empty())
            .map(|value| (form, value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, form: CanonicalForm, params: &QueryParams) -> String {
        hex_digest(secret.as_bytes(), &form.canonicalize(params)).unwrap()
    }

    fn verifier(secret: &str) -> SignatureVerifier {
        SignatureVerifier::new(Some(SharedSecret::new(secret)))
    }

    #[test]
    fn test_end_to_end_signature_accepted() {
        let signature = hex_digest(b"shhh", "foo=bar").unwrap();
        let params = QueryParams::from_pairs([("foo", "bar"), ("signature", signature.as_str())]);
        assert_eq!(verifier("shhh").verify(&params), Verification::Accepted);
    }

    #[test]
    fn test_end_to_end_mutated_signature_rejected() {
        let mut signature = hex_digest(b"shhh", "foo=bar").unwrap();
        let replacement = if signature.starts_with('0') { "1" } else { "0" };
        signature.replace_range(0..1, replacement);
        let params = QueryParams::from_pairs([("foo", "bar"), ("signature", signature.as_str())]);
        assert_eq!(
            verifier("shhh").verify(&params),
            Verification::Rejected(RejectReason::InvalidSignature)
        );
    }

    #[test]
    fn test_hmac_form_accepted() {
        let mut params = QueryParams::from_pairs([
            ("shop", "demo.myshopify.com"),
            ("path_prefix", "/apps/backorder"),
            ("timestamp", "1317327555"),
        ]);
        let hmac = sign("hush", CanonicalForm::Ampersand, &params);
        assert_eq!(
            CanonicalForm::Ampersand.canonicalize(&params),
            "path_prefix=/apps/backorder&shop=demo.myshopify.com&timestamp=1317327555"
        );
        params.append("hmac", hmac);
        assert!(verifier("hush").verify(&params).is_accepted());
    }

    #[test]
    fn test_signature_form_digest_does_not_verify_as_hmac() {
        let mut params = QueryParams::from_pairs([("a", "1"), ("b", "2")]);
        let wrong_form = sign("hush", CanonicalForm::Concatenated, &params);
        params.append("hmac", wrong_form);
        assert_eq!(
            verifier("hush").verify(&params),
            Verification::Rejected(RejectReason::InvalidSignature)
        );
    }

    #[test]
    fn test_missing_secret_wins_over_everything() {
        let verifier = SignatureVerifier::new(None);
        assert!(!verifier.is_enabled());
        assert_eq!(
            verifier.verify(&QueryParams::new()),
            Verification::Rejected(RejectReason::MissingSecret)
        );
        let params = QueryParams::from_pairs([("signature", "abc")]);
        assert_eq!(
            verifier.verify(&params),
            Verification::Rejected(RejectReason::MissingSecret)
        );
    }

    #[test]
    fn test_missing_signature() {
        let params = QueryParams::from_pairs([("shop", "demo")]);
        let result = verifier("hush").verify(&params);
        assert!(!result.is_accepted());
        assert_eq!(result.reject_reason(), Some(RejectReason::MissingSignature));
    }

    #[test]
    fn test_empty_credential_counts_as_missing() {
        let params = QueryParams::from_pairs([("shop", "demo"), ("signature", "")]);
        assert_eq!(
            verifier("hush").verify(&params),
            Verification::Rejected(RejectReason::MissingSignature)
        );
    }

    #[test]
    fn test_length_mismatch() {
        let params = QueryParams::from_pairs([("shop", "demo"), ("hmac", "abc123")]);
        assert_eq!(
            verifier("hush").verify(&params),
            Verification::Rejected(RejectReason::LengthMismatch)
        );
    }

    #[test]
    fn test_signature_takes_priority_over_hmac() {
        let base = QueryParams::from_pairs([("shop", "demo")]);

        // A valid hmac does not rescue a wrong signature
        let mut params = base.clone();
        params.append("hmac", sign("hush", CanonicalForm::Ampersand, &base));
        params.append("signature", "0".repeat(64));
        assert_eq!(
            verifier("hush").verify(&params),
            Verification::Rejected(RejectReason::InvalidSignature)
        );

        // The signature is computed over everything but itself, hmac included
        let mut params = base.clone();
        params.append("hmac", "whatever");
        let signature = sign("hush", CanonicalForm::Concatenated, &params);
        params.append("signature", signature);
        assert_eq!(verifier("hush").verify(&params), Verification::Accepted);
    }

    #[test]
    fn test_uppercase_hex_rejected() {
        let signature = hex_digest(b"shhh", "foo=bar").unwrap().to_uppercase();
        let params = QueryParams::from_pairs([("foo", "bar"), ("signature", signature.as_str())]);
        assert_eq!(
            verifier("shhh").verify(&params),
            Verification::Rejected(RejectReason::InvalidSignature)
        );
    }

    #[test]
    fn test_verify_does_not_mutate_params() {
        let params = QueryParams::from_pairs([("b", "2"), ("a", "1"), ("signature", "x")]);
        let before = params.clone();
        let first = verifier("hush").verify(&params);
        let second = verifier("hush").verify(&params);
        assert_eq!(params, before);
        assert_eq!(first, second);
    }

    #[test]
    fn test_shared_secret_from_config() {
        assert!(SharedSecret::from_config(None).is_none());
        assert!(SharedSecret::from_config(Some("")).is_none());
        assert!(SharedSecret::from_config(Some("   ")).is_none());
        assert_eq!(
            SharedSecret::from_config(Some("key123")).map(|s| s.as_bytes().to_vec()),
            Some(b"key123".to_vec())
        );
    }

    #[test]
    fn test_shared_secret_keeps_surrounding_whitespace() {
        let secret = SharedSecret::from_config(Some(" hush\n")).unwrap();
        assert_eq!(secret.as_bytes(), b" hush\n");

        let signature = hex_digest(b" hush\n", "foo=bar").unwrap();
        let params = QueryParams::from_pairs([("foo", "bar"), ("signature", signature.as_str())]);
        let verifier = SignatureVerifier::new(Some(secret));
        assert_eq!(verifier.verify(&params), Verification::Accepted);
    }

    #[test]
    fn test_shared_secret_debug_is_redacted() {
        let secret = SharedSecret::new("super-secret");
        let printed = format!("{:?}", verifier("super-secret"));
        assert!(!printed.contains("super-secret"));
        assert_eq!(format!("{:?}", secret), "SharedSecret(<redacted>)");
    }

    #[test]
    fn test_reject_reason_strings() {
        assert_eq!(RejectReason::MissingSecret.to_string(), "missing_secret");
        assert_eq!(RejectReason::MissingSignature.to_string(), "missing_signature");
        assert_eq!(RejectReason::LengthMismatch.to_string(), "length_mismatch");
        assert_eq!(RejectReason::InvalidSignature.to_string(), "invalid_signature");
        assert_eq!(
            serde_json::to_string(&RejectReason::LengthMismatch).unwrap(),
            "\"length_mismatch\""
        );
    }
}
