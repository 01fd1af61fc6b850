//! Failure Observer Module
//!
//! Cache operations never return backend failures to their caller. Each
//! suppressed failure is reported here instead.

use std::sync::Mutex;

use tracing::warn;

use crate::storage::StorageScope;

// == Cache Event ==
/// A failure the cache absorbed on the caller's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// Backend call failed (quota, unavailable, I/O)
    BackendFailure {
        scope: StorageScope,
        operation: &'static str,
        key: Option<String>,
        message: String,
    },
    /// Stored entry could not be parsed and was removed
    CorruptEntry { scope: StorageScope, key: String },
    /// Payload could not be serialized, nothing was written
    SerializationFailure { key: String, message: String },
    /// Entry is valid but its value does not match the requested type
    TypeMismatch {
        scope: StorageScope,
        key: String,
        message: String,
    },
    /// Empty key passed by the caller
    InvalidKey { operation: &'static str },
}

// == Observer Trait ==
pub trait CacheObserver: Send + Sync {
    fn on_event(&self, event: &CacheEvent);
}

/// Logs every event through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl CacheObserver for TracingObserver {
    fn on_event(&self, event: &CacheEvent) {
        match event {
            CacheEvent::BackendFailure {
                scope,
                operation,
                key,
                message,
            } => warn!(%scope, operation, ?key, "Cache backend failure: {}", message),
            CacheEvent::CorruptEntry { scope, key } => {
                warn!(%scope, key = %key, "Removed corrupted cache entry")
            }
            CacheEvent::SerializationFailure { key, message } => {
                warn!(key = %key, "Cache value not serializable: {}", message)
            }
            CacheEvent::TypeMismatch {
                scope,
                key,
                message,
            } => warn!(%scope, key = %key, "Cached value has unexpected shape: {}", message),
            CacheEvent::InvalidKey { operation } => {
                warn!(operation, "Cache operation called with an empty key")
            }
        }
    }
}

/// Keeps every event in memory so callers can inspect failure paths.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<CacheEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies of all events seen so far.
    pub fn events(&self) -> Vec<CacheEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl CacheObserver for RecordingObserver {
    fn on_event(&self, event: &CacheEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
