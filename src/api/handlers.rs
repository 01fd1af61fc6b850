//! API Handlers
//!
//! HTTP request handlers for the cache diagnostics endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::{info, warn};

use crate::cache::{ExpiringCache, ScopedStats, SweepReport};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    validate_key, ClearResponse, GetResponse, HealthResponse, PatternQuery, RemovedResponse,
    SetRequest, SetResponse,
};
use crate::storage::{FileStorage, MemoryStorage, StorageBackend, StorageScope};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared cache over both scopes
    pub cache: Arc<ExpiringCache>,
    /// Lifetime for writes that do not name one
    pub default_ttl_ms: i64,
}

impl AppState {
    /// Creates a new AppState around the given cache.
    pub fn new(cache: ExpiringCache, default_ttl_ms: i64) -> Self {
        Self {
            cache: Arc::new(cache),
            default_ttl_ms,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// If the persistent document cannot be opened the persistent scope is
    /// served by an unavailable backend, so the server still starts and every
    /// persistent operation degrades to a miss.
    pub fn from_config(config: &Config) -> Self {
        let quota = Some(config.storage_quota_bytes);
        let session: Arc<dyn StorageBackend> =
            Arc::new(MemoryStorage::with_quota(config.storage_quota_bytes));

        let persistent: Arc<dyn StorageBackend> =
            match FileStorage::open(&config.persistent_store_path, quota) {
                Ok(storage) => Arc::new(storage),
                Err(e) => {
                    warn!(
                        path = %config.persistent_store_path.display(),
                        "Persistent storage unavailable: {}", e
                    );
                    Arc::new(MemoryStorage::unavailable())
                }
            };

        let cache = ExpiringCache::new(session, persistent).with_namespace(config.namespace.clone());
        Self::new(cache, config.default_ttl_ms)
    }

    /// Runs `op` against the cache on the blocking pool.
    ///
    /// Backends may block on file I/O, which must stay off the async workers.
    async fn blocking<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&ExpiringCache) -> T + Send + 'static,
        T: Send + 'static,
    {
        let cache = self.cache.clone();
        tokio::task::spawn_blocking(move || op(&cache))
            .await
            .map_err(|e| CacheError::Internal(e.to_string()))
    }
}

/// Handler for PUT /cache/:scope/:key
///
/// Stores a JSON value under the key with an optional TTL.
pub async fn set_handler(
    State(state): State<AppState>,
    Path((scope, key)): Path<(StorageScope, String)>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = validate_key(&key) {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let ttl_ms = req.ttl_ms.unwrap_or(state.default_ttl_ms);
    let stored = {
        let key = key.clone();
        state
            .blocking(move |cache| cache.set_cache(&key, &req.value, ttl_ms, scope))
            .await?
    };
    if !stored {
        return Err(CacheError::NotStored(format!(
            "key '{}' could not be written to {} storage",
            key, scope
        )));
    }

    Ok(Json(SetResponse::new(key, scope, ttl_ms)))
}

/// Handler for GET /cache/:scope/:key
///
/// Returns the stored value, or 404 when absent or expired.
pub async fn get_handler(
    State(state): State<AppState>,
    Path((scope, key)): Path<(StorageScope, String)>,
) -> Result<Json<GetResponse>> {
    let value = {
        let key = key.clone();
        state
            .blocking(move |cache| cache.get_cache_value(&key, scope))
            .await?
    };
    match value {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for DELETE /cache/:scope/:key
///
/// Always succeeds; `removed` reports whether an entry was present.
pub async fn clear_handler(
    State(state): State<AppState>,
    Path((scope, key)): Path<(StorageScope, String)>,
) -> Result<Json<ClearResponse>> {
    let removed = {
        let key = key.clone();
        state
            .blocking(move |cache| cache.clear_cache(&key, scope))
            .await?
    };
    Ok(Json(ClearResponse::new(key, removed)))
}

/// Handler for DELETE /cache/:scope
///
/// Clears keys containing `?pattern=`, or the whole scope without it.
pub async fn clear_scope_handler(
    State(state): State<AppState>,
    Path(scope): Path<StorageScope>,
    Query(query): Query<PatternQuery>,
) -> Result<Json<RemovedResponse>> {
    let pattern = query.pattern.clone();
    let removed = state
        .blocking(move |cache| match pattern.as_deref() {
            Some(pattern) => cache.clear_cache_by_pattern(pattern, scope),
            None => cache.clear_all_cache(scope),
        })
        .await?;

    info!(%scope, pattern = ?query.pattern, removed, "Cache entries cleared");
    Ok(Json(RemovedResponse::new(scope, removed)))
}

/// Handler for DELETE /cache
///
/// Clears every cache-owned entry in both scopes.
pub async fn clear_all_handler(State(state): State<AppState>) -> Result<Json<SweepReport>> {
    let report = state.blocking(|cache| cache.clear_all_scopes()).await?;
    info!(
        session = report.session,
        persistent = report.persistent,
        "All cache entries cleared"
    );
    Ok(Json(report))
}

/// Handler for POST /sweep/:scope
pub async fn sweep_scope_handler(
    State(state): State<AppState>,
    Path(scope): Path<StorageScope>,
) -> Result<Json<RemovedResponse>> {
    let removed = state
        .blocking(move |cache| cache.clean_expired_cache(scope))
        .await?;
    Ok(Json(RemovedResponse::new(scope, removed)))
}

/// Handler for POST /sweep
pub async fn sweep_all_handler(State(state): State<AppState>) -> Result<Json<SweepReport>> {
    let report = state.blocking(|cache| cache.sweep_all()).await?;
    Ok(Json(report))
}

/// Handler for GET /stats
///
/// Returns entry counts for both scopes without modifying them.
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<ScopedStats>> {
    let stats = state.blocking(|cache| cache.stats_all()).await?;
    Ok(Json(stats))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_state() -> AppState {
        let cache = ExpiringCache::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(MemoryStorage::new()),
        );
        AppState::new(cache, 60_000)
    }

    fn path(scope: StorageScope, key: &str) -> Path<(StorageScope, String)> {
        Path((scope, key.to_string()))
    }

    #[tokio::test]
    async fn test_set_and_get_handler() {
        let state = test_state();

        let req = SetRequest {
            value: json!({"cart": [1, 2]}),
            ttl_ms: None,
        };
        let response = set_handler(
            State(state.clone()),
            path(StorageScope::Session, "cart"),
            Json(req),
        )
        .await
        .unwrap();
        assert_eq!(response.ttl_ms, 60_000);

        let response = get_handler(State(state), path(StorageScope::Session, "cart"))
            .await
            .unwrap();
        assert_eq!(response.value, json!({"cart": [1, 2]}));
    }

    #[tokio::test]
    async fn test_get_nonexistent_key() {
        let state = test_state();

        let result = get_handler(State(state), path(StorageScope::Persistent, "nope")).await;
        assert!(matches!(result, Err(CacheError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_set_expired_ttl_is_miss() {
        let state = test_state();

        let req = SetRequest {
            value: json!(1),
            ttl_ms: Some(0),
        };
        set_handler(State(state.clone()), path(StorageScope::Session, "k"), Json(req))
            .await
            .unwrap();

        let result = get_handler(State(state), path(StorageScope::Session, "k")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_set_key_too_long() {
        let state = test_state();

        let req = SetRequest {
            value: json!(1),
            ttl_ms: None,
        };
        let long_key = "x".repeat(300);
        let result = set_handler(
            State(state),
            path(StorageScope::Session, &long_key),
            Json(req),
        )
        .await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_set_unavailable_backend() {
        let cache = ExpiringCache::new(
            Arc::new(MemoryStorage::unavailable()),
            Arc::new(MemoryStorage::new()),
        );
        let state = AppState::new(cache, 60_000);

        let req = SetRequest {
            value: json!(1),
            ttl_ms: None,
        };
        let result = set_handler(State(state), path(StorageScope::Session, "k"), Json(req)).await;
        assert!(matches!(result, Err(CacheError::NotStored(_))));
    }

    #[tokio::test]
    async fn test_clear_handler_is_idempotent() {
        let state = test_state();
        state
            .cache
            .set_cache("k", &1, 1_000, StorageScope::Session);

        let first = clear_handler(State(state.clone()), path(StorageScope::Session, "k"))
            .await
            .unwrap();
        assert!(first.removed);

        let second = clear_handler(State(state), path(StorageScope::Session, "k"))
            .await
            .unwrap();
        assert!(!second.removed);
    }

    #[tokio::test]
    async fn test_clear_scope_with_pattern() {
        let state = test_state();
        for key in ["store:1", "store:2", "category:1"] {
            state.cache.set_cache(key, &1, 1_000, StorageScope::Session);
        }

        let response = clear_scope_handler(
            State(state.clone()),
            Path(StorageScope::Session),
            Query(PatternQuery {
                pattern: Some("store".to_string()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.removed, 2);

        let response = clear_scope_handler(
            State(state),
            Path(StorageScope::Session),
            Query(PatternQuery::default()),
        )
        .await
        .unwrap();
        assert_eq!(response.removed, 1);
    }

    #[tokio::test]
    async fn test_stats_and_clear_all() {
        let state = test_state();
        state.cache.set_cache("a", &1, 1_000, StorageScope::Session);
        state.cache.set_cache("b", &1, 1_000, StorageScope::Persistent);

        let stats = stats_handler(State(state.clone())).await.unwrap();
        assert_eq!(stats.session.total_items, 1);
        assert_eq!(stats.persistent.valid_items, 1);

        let report = clear_all_handler(State(state.clone())).await.unwrap();
        assert_eq!(report.total(), 2);

        let stats = stats_handler(State(state)).await.unwrap();
        assert_eq!(stats.session.total_items + stats.persistent.total_items, 0);
    }

    #[tokio::test]
    async fn test_sweep_handlers() {
        let state = test_state();
        state.cache.set_cache("old", &1, -1, StorageScope::Session);
        state.cache.set_cache("old", &1, -1, StorageScope::Persistent);

        let response = sweep_scope_handler(State(state.clone()), Path(StorageScope::Session))
            .await
            .unwrap();
        assert_eq!(response.removed, 1);

        let report = sweep_all_handler(State(state)).await.unwrap();
        assert_eq!(report.session, 0);
        assert_eq!(report.persistent, 1);
    }

    #[tokio::test]
    async fn test_blocking_failure_is_internal_error() {
        let state = test_state();

        let result: Result<()> = state.blocking(|_| panic!("backend crashed")).await;
        assert!(matches!(result, Err(CacheError::Internal(_))));

        // The pool is still usable afterwards
        let stats = stats_handler(State(state)).await.unwrap();
        assert_eq!(stats.session.total_items, 0);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }

    #[test]
    fn test_from_config_falls_back_when_persistent_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "corrupt").unwrap();

        let config = Config {
            persistent_store_path: path,
            ..Config::default()
        };
        let state = AppState::from_config(&config);

        assert!(!state.cache.set_cache("k", &1, 1_000, StorageScope::Persistent));
        assert!(state.cache.set_cache("k", &1, 1_000, StorageScope::Session));
    }
}
