//! Configuration module for environment variable parsing.
//!
//! All settings come from the process environment (optionally seeded from a
//! `.env` file by the binary) and are read once at startup.

use std::env;
use std::str::FromStr;

use tracing::warn;

use crate::verify::SharedSecret;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// App shared secret used to verify proxied request signatures
    pub shared_secret: Option<SharedSecret>,

    /// Downstream function URL that receives verified payloads
    pub downstream_endpoint: Option<String>,

    /// Timeout for the downstream call in milliseconds
    pub request_timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Config {
            port: parse_var(&lookup, "PORT", 3000),

            shared_secret: SharedSecret::from_config(lookup("SHOPIFY_API_SECRET").as_deref()),

            downstream_endpoint: lookup("AZURE_ENDPOINT")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),

            request_timeout_ms: parse_var(&lookup, "REQUEST_TIMEOUT_MS", 10_000),
        }
    }
}

/// Parse a variable, falling back to `default` when unset or malformed.
fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let raw = match lookup(name) {
        Some(v) => v,
        None => return default,
    };

    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid value, using default");
            default
        }
    }
}
