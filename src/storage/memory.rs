//! Session-scoped storage held in process memory.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::{check_quota, StorageBackend, StorageResult};
use crate::error::StorageError;

// == Memory Storage ==
/// In-memory backend whose contents last as long as the process.
#[derive(Debug)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
    /// Maximum bytes (keys + values), None = unbounded
    quota: Option<usize>,
    available: AtomicBool,
}

impl MemoryStorage {
    /// Creates an empty, unbounded backend.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            quota: None,
            available: AtomicBool::new(true),
        }
    }

    /// Creates an empty backend that rejects writes beyond `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            quota: Some(quota_bytes),
            ..Self::new()
        }
    }

    /// Creates a backend that fails every call, as when storage is disabled.
    pub fn unavailable() -> Self {
        let storage = Self::new();
        storage.set_available(false);
        storage
    }

    /// Toggles availability. While unavailable every call fails.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, HashMap<String, String>>> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(
                "session storage is disabled".to_string(),
            ));
        }
        self.entries
            .lock()
            .map_err(|_| StorageError::Unavailable("session storage lock poisoned".to_string()))
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBackend for MemoryStorage {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.lock()?;
        check_quota(&entries, self.quota, key, value)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn remove_many(&self, keys: &[String]) -> StorageResult<usize> {
        let mut entries = self.lock()?;
        Ok(keys.iter().filter(|key| entries.remove(*key).is_some()).count())
    }

    fn list_keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.lock()?.keys().cloned().collect())
    }
}
