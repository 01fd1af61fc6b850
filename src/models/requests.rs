//! Request DTOs for the diagnostics API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

/// Maximum key length accepted over HTTP, in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Request body for PUT /cache/:scope/:key
///
/// # Fields
/// - `value`: Any JSON value to store
/// - `ttl_ms`: Optional lifetime in milliseconds (uses the configured default if absent)
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The value to store
    pub value: serde_json::Value,
    /// Optional TTL in milliseconds
    #[serde(default)]
    pub ttl_ms: Option<i64>,
}

/// Query string for DELETE /cache/:scope
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatternQuery {
    /// Substring to match against un-namespaced keys; absent clears the scope
    #[serde(default)]
    pub pattern: Option<String>,
}

/// Validates a key taken from the request path.
///
/// Returns an error message if validation fails, None if valid.
pub fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        ));
    }
    None
}
