//! Cache Module
//!
//! Provides a namespaced key-value cache with TTL expiration, pattern
//! invalidation and sweep cleanup on top of the storage backends.

mod entry;
mod observer;
mod stats;
mod store;


// Re-export public types
pub use entry::{CacheEntry, Clock, ManualClock, SystemClock};
pub use observer::{CacheEvent, CacheObserver, RecordingObserver, TracingObserver};
pub use stats::{CacheStats, ScopedStats, SweepReport};
pub use store::ExpiringCache;

// == Public Constants ==
/// Prefix marking keys owned by the cache inside a shared backend
pub const DEFAULT_NAMESPACE: &str = "cache_";

/// Common entry lifetimes in milliseconds.
pub struct CacheDuration;

impl CacheDuration {
    /// 5 minutes, for listings that change often (store availability, cart totals)
    pub const SHORT: i64 = 5 * 60 * 1000;
    /// 30 minutes
    pub const MEDIUM: i64 = 30 * 60 * 1000;
    /// 2 hours, for catalogue data such as categories
    pub const LONG: i64 = 2 * 60 * 60 * 1000;
    /// 24 hours
    pub const DAY: i64 = 24 * 60 * 60 * 1000;
}
