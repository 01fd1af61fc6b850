//! Cache Statistics Module
//!
//! Point-in-time counts over the entries one scope currently holds.

use serde::Serialize;

// == Cache Stats ==
/// Snapshot of the namespaced entries in one backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Every namespaced entry, valid or not
    pub total_items: usize,
    /// Entries that would currently be returned by a get
    pub valid_items: usize,
    /// Expired or unreadable entries a sweep would remove
    pub expired_items: usize,
    /// Serialized bytes across all namespaced entries
    pub total_size: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Valid ==
    pub fn record_valid(&mut self, size: usize) {
        self.total_items += 1;
        self.valid_items += 1;
        self.total_size += size;
    }

    // == Record Expired ==
    pub fn record_expired(&mut self, size: usize) {
        self.total_items += 1;
        self.expired_items += 1;
        self.total_size += size;
    }
}

/// Stats for both scopes, as shown by the diagnostics panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScopedStats {
    pub session: CacheStats,
    pub persistent: CacheStats,
}

/// Entries removed per scope by a bulk operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub session: usize,
    pub persistent: usize,
}

impl SweepReport {
    pub fn total(&self) -> usize {
        self.session + self.persistent
    }
}
