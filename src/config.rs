//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::cache::{CacheDuration, DEFAULT_NAMESPACE};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Sweep interval in seconds
    pub cleanup_interval: u64,
    /// TTL in milliseconds for writes that do not name one
    pub default_ttl_ms: i64,
    /// Prefix for keys owned by the cache
    pub namespace: String,
    /// JSON document backing the persistent scope
    pub persistent_store_path: PathBuf,
    /// Byte quota applied to each backend
    pub storage_quota_bytes: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 300)
    /// - `DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 300000)
    /// - `CACHE_NAMESPACE` - Key prefix (default: `cache_`)
    /// - `PERSISTENT_STORE_PATH` - Persistent scope file (default: `data/persistent_cache.json`)
    /// - `STORAGE_QUOTA_BYTES` - Per-backend quota (default: 5 MiB)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_env("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_env::<u64>("CLEANUP_INTERVAL")
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.cleanup_interval),
            default_ttl_ms: parse_env("DEFAULT_TTL_MS").unwrap_or(defaults.default_ttl_ms),
            namespace: env::var("CACHE_NAMESPACE")
                .ok()
                .filter(|ns| !ns.is_empty())
                .unwrap_or(defaults.namespace),
            persistent_store_path: env::var("PERSISTENT_STORE_PATH")
                .ok()
                .map(PathBuf::from)
                .unwrap_or(defaults.persistent_store_path),
            storage_quota_bytes: parse_env("STORAGE_QUOTA_BYTES")
                .unwrap_or(defaults.storage_quota_bytes),
        }
    }
}

fn parse_env<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cleanup_interval: 300,
            default_ttl_ms: CacheDuration::SHORT,
            namespace: DEFAULT_NAMESPACE.to_string(),
            persistent_store_path: PathBuf::from("data/persistent_cache.json"),
            storage_quota_bytes: 5 * 1024 * 1024,
        }
    }
}
