//! Cache Store Module
//!
//! TTL-aware façade over the session and persistent storage backends.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::{
    CacheEntry, CacheEvent, CacheObserver, CacheStats, Clock, ScopedStats, SweepReport,
    SystemClock, TracingObserver, DEFAULT_NAMESPACE,
};
use crate::error::StorageError;
use crate::storage::{StorageBackend, StorageScope};

// == Expiring Cache ==
/// Namespaced key-value cache with per-entry expiry.
///
/// Every key written is prefixed with the namespace, and every enumeration
/// ignores keys without it, so data owned by other code in the same backend
/// is never read, removed or counted. No operation returns an error: backend
/// failures are reported to the observer and surface as a miss, `false` or a
/// zero count.
pub struct ExpiringCache {
    session: Arc<dyn StorageBackend>,
    persistent: Arc<dyn StorageBackend>,
    namespace: String,
    clock: Arc<dyn Clock>,
    observer: Arc<dyn CacheObserver>,
}

impl ExpiringCache {
    // == Constructor ==
    /// Creates a cache over the two backends with the default namespace, the
    /// wall clock and a tracing observer.
    pub fn new(session: Arc<dyn StorageBackend>, persistent: Arc<dyn StorageBackend>) -> Self {
        Self {
            session,
            persistent,
            namespace: DEFAULT_NAMESPACE.to_string(),
            clock: Arc::new(SystemClock),
            observer: Arc::new(TracingObserver),
        }
    }

    /// Sets the prefix that marks keys as owned by this cache.
    ///
    /// An empty prefix would claim every key in the backends, so it falls back
    /// to [`DEFAULT_NAMESPACE`]. Caches sharing a backend must use namespaces
    /// where neither is a prefix of the other (`"app_"` and `"app_v2_"` would
    /// overlap), otherwise one cache enumerates and clears the other's keys.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        if namespace.is_empty() {
            warn!(
                fallback = DEFAULT_NAMESPACE,
                "Empty cache namespace rejected, using the default"
            );
            self.namespace = DEFAULT_NAMESPACE.to_string();
        } else {
            self.namespace = namespace;
        }
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn CacheObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    // == Set ==
    /// Stores `data` under `key` for `duration_ms` milliseconds.
    ///
    /// Returns `false` when nothing was written: empty key, a payload that
    /// cannot be serialized, or a backend refusal such as an exceeded quota.
    /// In that case any previous entry under `key` is left as it was. A zero or
    /// negative duration is accepted and stores an already-expired entry.
    pub fn set_cache<T: Serialize + ?Sized>(
        &self,
        key: &str,
        data: &T,
        duration_ms: i64,
        scope: StorageScope,
    ) -> bool {
        if key.is_empty() {
            self.observer.on_event(&CacheEvent::InvalidKey { operation: "set" });
            return false;
        }

        let value = match serde_json::to_value(data) {
            Ok(value) => value,
            Err(e) => {
                self.observer.on_event(&CacheEvent::SerializationFailure {
                    key: key.to_string(),
                    message: e.to_string(),
                });
                return false;
            }
        };

        let entry = CacheEntry::new(value, self.clock.now_ms(), duration_ms);
        let raw = match serde_json::to_string(&entry) {
            Ok(raw) => raw,
            Err(e) => {
                self.observer.on_event(&CacheEvent::SerializationFailure {
                    key: key.to_string(),
                    message: e.to_string(),
                });
                return false;
            }
        };

        match self.backend(scope).write(&self.namespaced(key), &raw) {
            Ok(()) => {
                debug!(%scope, key, duration_ms, "Cache set");
                true
            }
            Err(e) => {
                self.report(scope, "write", Some(key), &e);
                false
            }
        }
    }

    // == Get ==
    /// Returns the raw stored value if present and not expired.
    ///
    /// Expired and corrupted entries are removed on the way out.
    pub fn get_cache_value(&self, key: &str, scope: StorageScope) -> Option<serde_json::Value> {
        if key.is_empty() {
            self.observer.on_event(&CacheEvent::InvalidKey { operation: "get" });
            return None;
        }

        let full_key = self.namespaced(key);
        let raw = match self.backend(scope).read(&full_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                self.report(scope, "read", Some(key), &e);
                return None;
            }
        };

        let Ok(entry) = serde_json::from_str::<CacheEntry>(&raw) else {
            self.observer.on_event(&CacheEvent::CorruptEntry {
                scope,
                key: key.to_string(),
            });
            self.remove_raw(scope, &full_key, "remove");
            return None;
        };

        if entry.is_expired_at(self.clock.now_ms()) {
            debug!(%scope, key, "Cache entry expired on read");
            self.remove_raw(scope, &full_key, "remove");
            return None;
        }

        Some(entry.value)
    }

    /// Returns the stored value decoded as `T`.
    ///
    /// A valid entry whose value does not decode as `T` is a miss; the entry
    /// itself is kept since another reader may expect that shape.
    pub fn get_cache<T: DeserializeOwned>(&self, key: &str, scope: StorageScope) -> Option<T> {
        let value = self.get_cache_value(key, scope)?;
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                self.observer.on_event(&CacheEvent::TypeMismatch {
                    scope,
                    key: key.to_string(),
                    message: e.to_string(),
                });
                None
            }
        }
    }

    // == Get Or Fetch ==
    /// Returns the cached value, or awaits `fetcher` and caches its result.
    ///
    /// Fetcher errors are returned unchanged and nothing is stored. Failing to
    /// store a fetched value does not affect the returned result.
    pub async fn get_or_fetch<T, E, F, Fut>(
        &self,
        key: &str,
        duration_ms: i64,
        scope: StorageScope,
        fetcher: F,
    ) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        if let Some(hit) = self.get_cache(key, scope) {
            return Ok(hit);
        }

        let fresh = fetcher().await?;
        self.set_cache(key, &fresh, duration_ms, scope);
        Ok(fresh)
    }

    // == Clear ==
    /// Removes `key` whether it is valid, expired or absent.
    ///
    /// Returns `true` only if an entry was present and removed.
    pub fn clear_cache(&self, key: &str, scope: StorageScope) -> bool {
        if key.is_empty() {
            self.observer.on_event(&CacheEvent::InvalidKey { operation: "clear" });
            return false;
        }

        let full_key = self.namespaced(key);
        let existed = matches!(self.backend(scope).read(&full_key), Ok(Some(_)));
        self.remove_raw(scope, &full_key, "remove") && existed
    }

    // == Clear By Pattern ==
    /// Removes every owned entry whose un-namespaced key contains `pattern`.
    ///
    /// Matching is a case-sensitive substring test, so `"user"` matches
    /// `"user:1"` and `"current_user"` alike. An empty pattern matches every
    /// owned key. Returns the number of entries removed.
    pub fn clear_cache_by_pattern(&self, pattern: &str, scope: StorageScope) -> usize {
        let Some(keys) = self.owned_keys(scope) else {
            return 0;
        };

        let matching: Vec<String> = keys
            .into_iter()
            .filter(|full_key| self.strip_namespace(full_key).contains(pattern))
            .collect();
        let removed = self.remove_batch(scope, &matching);

        debug!(%scope, pattern, removed, "Cache cleared by pattern");
        removed
    }

    // == Clear All ==
    /// Removes every owned entry in `scope`, returning how many were removed.
    pub fn clear_all_cache(&self, scope: StorageScope) -> usize {
        let Some(keys) = self.owned_keys(scope) else {
            return 0;
        };

        let removed = self.remove_batch(scope, &keys);

        debug!(%scope, removed, "Cache cleared");
        removed
    }

    /// Clears every owned entry in both scopes.
    pub fn clear_all_scopes(&self) -> SweepReport {
        SweepReport {
            session: self.clear_all_cache(StorageScope::Session),
            persistent: self.clear_all_cache(StorageScope::Persistent),
        }
    }

    // == Clean Expired ==
    /// Removes every expired or unreadable owned entry in `scope`.
    ///
    /// Stale keys are collected first and removed as one batch, so a
    /// persisting backend is rewritten at most once per sweep. Returns the
    /// number of entries removed.
    pub fn clean_expired_cache(&self, scope: StorageScope) -> usize {
        let Some(keys) = self.owned_keys(scope) else {
            return 0;
        };

        let now = self.clock.now_ms();
        let backend = self.backend(scope);
        let mut stale_keys = Vec::new();

        for full_key in keys {
            let raw = match backend.read(&full_key) {
                Ok(Some(raw)) => raw,
                // Removed since listing
                Ok(None) => continue,
                Err(e) => {
                    self.report(scope, "read", Some(self.strip_namespace(&full_key)), &e);
                    continue;
                }
            };

            let stale = serde_json::from_str::<CacheEntry>(&raw)
                .map(|entry| entry.is_expired_at(now))
                .unwrap_or(true);

            if stale {
                stale_keys.push(full_key);
            }
        }

        self.remove_batch(scope, &stale_keys)
    }

    /// Sweeps both scopes.
    pub fn sweep_all(&self) -> SweepReport {
        SweepReport {
            session: self.clean_expired_cache(StorageScope::Session),
            persistent: self.clean_expired_cache(StorageScope::Persistent),
        }
    }

    // == Stats ==
    /// Counts the owned entries in `scope` without modifying anything.
    ///
    /// Unreadable entries count as expired, matching what a sweep would remove.
    pub fn get_cache_stats(&self, scope: StorageScope) -> CacheStats {
        let mut stats = CacheStats::new();
        let Some(keys) = self.owned_keys(scope) else {
            return stats;
        };

        let now = self.clock.now_ms();
        let backend = self.backend(scope);

        for full_key in &keys {
            let raw = match backend.read(full_key) {
                Ok(Some(raw)) => raw,
                Ok(None) => continue,
                Err(e) => {
                    self.report(scope, "read", Some(self.strip_namespace(full_key)), &e);
                    continue;
                }
            };

            match serde_json::from_str::<CacheEntry>(&raw) {
                Ok(entry) if !entry.is_expired_at(now) => stats.record_valid(raw.len()),
                _ => stats.record_expired(raw.len()),
            }
        }

        stats
    }

    /// Stats for both scopes.
    pub fn stats_all(&self) -> ScopedStats {
        ScopedStats {
            session: self.get_cache_stats(StorageScope::Session),
            persistent: self.get_cache_stats(StorageScope::Persistent),
        }
    }

    // == Helpers ==
    fn backend(&self, scope: StorageScope) -> &dyn StorageBackend {
        match scope {
            StorageScope::Session => self.session.as_ref(),
            StorageScope::Persistent => self.persistent.as_ref(),
        }
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}{}", self.namespace, key)
    }

    fn strip_namespace<'a>(&self, full_key: &'a str) -> &'a str {
        full_key.strip_prefix(&self.namespace).unwrap_or(full_key)
    }

    /// Keys in `scope` that carry the namespace, or None if listing failed.
    fn owned_keys(&self, scope: StorageScope) -> Option<Vec<String>> {
        match self.backend(scope).list_keys() {
            Ok(keys) => Some(
                keys.into_iter()
                    .filter(|k| k.starts_with(&self.namespace))
                    .collect(),
            ),
            Err(e) => {
                self.report(scope, "list_keys", None, &e);
                None
            }
        }
    }

    /// Removes `full_keys` in one backend call, returning how many were present.
    fn remove_batch(&self, scope: StorageScope, full_keys: &[String]) -> usize {
        if full_keys.is_empty() {
            return 0;
        }
        match self.backend(scope).remove_many(full_keys) {
            Ok(removed) => removed,
            Err(e) => {
                self.report(scope, "remove_many", None, &e);
                0
            }
        }
    }

    fn remove_raw(&self, scope: StorageScope, full_key: &str, operation: &'static str) -> bool {
        match self.backend(scope).remove(full_key) {
            Ok(()) => true,
            Err(e) => {
                self.report(scope, operation, Some(self.strip_namespace(full_key)), &e);
                false
            }
        }
    }

    fn report(
        &self,
        scope: StorageScope,
        operation: &'static str,
        key: Option<&str>,
        error: &StorageError,
    ) {
        self.observer.on_event(&CacheEvent::BackendFailure {
            scope,
            operation,
            key: key.map(str::to_string),
            message: error.to_string(),
        });
    }
}

impl fmt::Debug for ExpiringCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpiringCache")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}
