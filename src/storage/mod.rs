//! Storage Module
//!
//! Raw string key-value backends the cache layer is built on. The cache only
//! needs a handful of capabilities from a backend: read, write, remove (one
//! key or a batch) and list keys.

mod file;
mod memory;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Convenience Result type for backend calls.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

// == Storage Backend Trait ==
/// A string key-value store shared with the rest of the application.
///
/// Implementations use interior mutability so one backend can be held by the
/// cache and by unrelated code at the same time.
pub trait StorageBackend: Send + Sync {
    /// Returns the raw value stored under `key`, if any.
    fn read(&self, key: &str) -> StorageResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// On failure the previous value must be left untouched.
    fn write(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// Removes every key in `keys` as one mutation, returning how many were
    /// present. Absent keys are skipped.
    ///
    /// On failure nothing has been removed.
    fn remove_many(&self, keys: &[String]) -> StorageResult<usize>;

    /// Lists every key currently held, owned by the cache or not.
    fn list_keys(&self) -> StorageResult<Vec<String>>;
}

// == Storage Scope ==
/// Selects which of the two backends an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageScope {
    /// Lives as long as the current session/process
    Session,
    /// Survives restarts until cleared or expired
    Persistent,
}

impl StorageScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageScope::Session => "session",
            StorageScope::Persistent => "persistent",
        }
    }
}

impl fmt::Display for StorageScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Quota Accounting ==
/// Bytes a map would occupy once `key` holds `value`.
///
/// Both keys and values count toward the quota.
pub(crate) fn projected_size(map: &HashMap<String, String>, key: &str, value: &str) -> usize {
    let current: usize = map.iter().map(|(k, v)| k.len() + v.len()).sum();
    let replaced = map.get(key).map(|old| key.len() + old.len()).unwrap_or(0);
    current - replaced + key.len() + value.len()
}

/// Fails with `QuotaExceeded` when writing `value` under `key` would not fit.
pub(crate) fn check_quota(
    map: &HashMap<String, String>,
    quota: Option<usize>,
    key: &str,
    value: &str,
) -> StorageResult<()> {
    if let Some(quota) = quota {
        let needed = projected_size(map, key, value);
        if needed > quota {
            return Err(StorageError::QuotaExceeded { needed, quota });
        }
    }
    Ok(())
}
