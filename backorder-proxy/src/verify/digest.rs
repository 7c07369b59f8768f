//! HMAC-SHA256 digest rendering.

use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Length of a hex-encoded HMAC-SHA256 digest.
pub const HEX_DIGEST_LEN: usize = 64;

/// Compute `HMAC-SHA256(secret, message)` as lowercase hex.
pub fn hex_digest(secret: &[u8], message: &str) -> Result<String, InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(secret)?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}
