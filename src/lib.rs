//! Expiring Cache - a namespaced TTL key-value cache
//!
//! Stores JSON values with per-entry expiry on top of pluggable session and
//! persistent storage backends, with pattern invalidation, stats and a
//! periodic sweep.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheDuration, CacheStats, ExpiringCache};
pub use config::Config;
pub use storage::{FileStorage, MemoryStorage, StorageBackend, StorageScope};
pub use tasks::SweepTask;
