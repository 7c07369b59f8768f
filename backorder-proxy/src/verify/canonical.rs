//! Canonical message construction.
//!
//! The platform signs app proxy requests in one of two ways depending on the
//! integration path, and the two are not interchangeable:
//!
//! - `signature`: `key=value` segments sorted as whole strings, concatenated
//!   with no separator.
//! - `hmac`: `key=value` segments sorted by key, joined with `&`.
//!
//! Values of a repeated key are joined with `,` in arrival order. Nothing is
//! escaped; a value containing `=` or `&` is copied verbatim.

use super::query::QueryParams;

/// Query key carrying a [`CanonicalForm::Concatenated`] credential.
pub const SIGNATURE_KEY: &str = "signature";

/// Query key carrying a [`CanonicalForm::Ampersand`] credential.
pub const HMAC_KEY: &str = "hmac";

/// How the signed message is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalForm {
    /// Legacy form, selected by the `signature` key.
    Concatenated,
    /// Selected by the `hmac` key.
    Ampersand,
}

impl CanonicalForm {
    /// Credential forms in lookup priority order.
    pub const PRIORITY: [CanonicalForm; 2] = [CanonicalForm::Concatenated, CanonicalForm::Ampersand];

    /// The query key that carries the credential for this form.
    pub fn credential_key(self) -> &'static str {
        match self {
            CanonicalForm::Concatenated => SIGNATURE_KEY,
            CanonicalForm::Ampersand => HMAC_KEY,
        }
    }

    /// Build the message that was signed, leaving out this form's credential
    /// key.
    pub fn canonicalize(self, params: &QueryParams) -> String {
        canonicalize(params, &[self.credential_key()], self)
    }
}

/// Build the canonical message from `params` without the `exclude` keys.
pub fn canonicalize(params: &QueryParams, exclude: &[&str], form: CanonicalForm) -> String {
    let remaining = params.iter().filter(|(key, _)| !exclude.contains(key));

    match form {
        CanonicalForm::Concatenated => {
            let mut segments: Vec<String> = remaining
                .map(|(key, values)| render_segment(key, values))
                .collect();
            segments.sort_unstable();
            segments.concat()
        }
        CanonicalForm::Ampersand => {
            let mut entries: Vec<(&str, &[String])> = remaining.collect();
            entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
            entries
                .into_iter()
                .map(|(key, values)| render_segment(key, values))
                .collect::<Vec<_>>()
                .join("&")
        }
    }
}

fn render_segment(key: &str, values: &[String]) -> String {
    format!("{}={}", key, values.join(","))
}
