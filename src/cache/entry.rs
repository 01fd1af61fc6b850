//! Cache Entry Module
//!
//! Defines the persisted shape of a single cache entry and the clock used to
//! stamp and check it.

use std::sync::atomic::{AtomicI64, Ordering};

use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// The unit stored under one namespaced key.
///
/// Serialized as `{"value": .., "createdAt": .., "expiresAt": ..}`; these field
/// names are the on-disk format and must not change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// The stored payload
    pub value: serde_json::Value,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: i64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry stamped at `now` that lives for `duration_ms`.
    ///
    /// A zero or negative duration produces an entry that is already expired.
    pub fn new(value: serde_json::Value, now: i64, duration_ms: i64) -> Self {
        Self {
            value,
            created_at: now,
            expires_at: now.saturating_add(duration_ms),
        }
    }

    // == Is Expired ==
    /// An entry is expired once `now >= expires_at`.
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.expires_at
    }
}

// == Clock ==
/// Source of the current time in Unix milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Manually driven clock for simulating the passage of time.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: AtomicI64::new(start_ms),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, by_ms: i64) {
        self.now.fetch_add(by_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
