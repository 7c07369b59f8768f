//! Backorder request payload handling.
//!
//! The body is opaque JSON that goes downstream untouched; the relay only
//! checks that it names a variant.

use serde_json::{Map, Value};

/// Parse a request body. An empty (or whitespace-only) body is an empty object.
pub fn parse_payload(body: &[u8]) -> Result<Value, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(body)
}

/// The variant identifier, from `variantId` or else `variant_id`.
///
/// Falsy JSON values (`null`, `false`, `0`, `""`) count as absent.
pub fn variant_id(payload: &Value) -> Option<&Value> {
    ["variantId", "variant_id"]
        .into_iter()
        .filter_map(|key| payload.get(key))
        .find(|value| is_truthy(value))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
