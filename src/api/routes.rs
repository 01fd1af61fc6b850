//! API Routes
//!
//! Configures the Axum router with all diagnostics endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_all_handler, clear_handler, clear_scope_handler, get_handler, health_handler,
    set_handler, stats_handler, sweep_all_handler, sweep_scope_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check
/// - `GET /stats` - Entry counts for both scopes
/// - `DELETE /cache` - Clear both scopes
/// - `DELETE /cache/:scope` - Clear a scope, or only keys matching `?pattern=`
/// - `PUT|GET|DELETE /cache/:scope/:key` - Single-entry access
/// - `POST /sweep`, `POST /sweep/:scope` - Remove expired entries now
///
/// # Middleware
/// - CORS: Allows any origin (the panel is served from another port in development)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router with all endpoints
    Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/cache", delete(clear_all_handler))
        .route("/cache/:scope", delete(clear_scope_handler))
        .route(
            "/cache/:scope/:key",
            get(get_handler).put(set_handler).delete(clear_handler),
        )
        .route("/sweep", post(sweep_all_handler))
        .route("/sweep/:scope", post(sweep_scope_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
