//! Integration Tests for API Endpoints
//!
//! Tests the full request/response cycle for each diagnostics endpoint.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use expiring_cache::{
    api::create_router, AppState, ExpiringCache, MemoryStorage, StorageBackend,
};
use serde_json::{json, Value};
use tower::ServiceExt;

// == Helper Functions ==

struct TestApp {
    router: Router,
    session: Arc<MemoryStorage>,
}

fn create_test_app() -> TestApp {
    let session = Arc::new(MemoryStorage::new());
    let cache = ExpiringCache::new(session.clone(), Arc::new(MemoryStorage::new()));
    TestApp {
        router: create_router(AppState::new(cache, 60_000)),
        session,
    }
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

// == SET / GET ==

#[tokio::test]
async fn test_set_then_get_round_trip() {
    let app = create_test_app();
    let store = json!({"id": 12, "name": "Blue Spring Water", "open": true});

    let (status, body) = send(
        &app.router,
        "PUT",
        "/cache/session/store:12",
        Some(json!({"value": store, "ttl_ms": 60000})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["key"], "store:12");
    assert_eq!(body["scope"], "session");
    assert_eq!(body["ttl_ms"], 60000);

    let (status, body) = send(&app.router, "GET", "/cache/session/store:12", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"], store);
}

#[tokio::test]
async fn test_set_uses_default_ttl() {
    let app = create_test_app();

    let (status, body) = send(
        &app.router,
        "PUT",
        "/cache/persistent/categories",
        Some(json!({"value": ["water", "grocery"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ttl_ms"], 60000);
}

#[tokio::test]
async fn test_scopes_are_separate() {
    let app = create_test_app();

    send(
        &app.router,
        "PUT",
        "/cache/session/k",
        Some(json!({"value": 1})),
    )
    .await;

    let (status, _) = send(&app.router, "GET", "/cache/persistent/k", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_positive_ttl_is_immediate_miss() {
    let app = create_test_app();

    let (status, _) = send(
        &app.router,
        "PUT",
        "/cache/session/k",
        Some(json!({"value": 1, "ttl_ms": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app.router, "GET", "/cache/session/k", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.get("error").is_some());
    // Removed lazily by the read
    assert!(app.session.list_keys().unwrap().is_empty());
}

// == DELETE ==

#[tokio::test]
async fn test_clear_single_key_is_idempotent() {
    let app = create_test_app();
    send(
        &app.router,
        "PUT",
        "/cache/session/cart",
        Some(json!({"value": [1]})),
    )
    .await;

    let (status, body) = send(&app.router, "DELETE", "/cache/session/cart", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], true);

    let (status, body) = send(&app.router, "DELETE", "/cache/session/cart", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], false);
}

#[tokio::test]
async fn test_clear_by_pattern() {
    let app = create_test_app();
    for key in ["a1", "a2", "b1"] {
        send(
            &app.router,
            "PUT",
            &format!("/cache/session/{}", key),
            Some(json!({"value": key})),
        )
        .await;
    }

    let (status, body) = send(&app.router, "DELETE", "/cache/session?pattern=a", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 2);

    let (status, _) = send(&app.router, "GET", "/cache/session/b1", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_clear_all_leaves_foreign_keys() {
    let app = create_test_app();
    app.session.write("auth_token", "abc").unwrap();
    send(
        &app.router,
        "PUT",
        "/cache/session/k",
        Some(json!({"value": 1})),
    )
    .await;
    send(
        &app.router,
        "PUT",
        "/cache/persistent/k",
        Some(json!({"value": 1})),
    )
    .await;

    let (status, body) = send(&app.router, "DELETE", "/cache", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"session": 1, "persistent": 1}));
    assert_eq!(
        app.session.read("auth_token").unwrap().as_deref(),
        Some("abc")
    );
}

// == STATS / SWEEP ==

#[tokio::test]
async fn test_stats_endpoint() {
    let app = create_test_app();
    for (key, ttl) in [("v1", 60000), ("v2", 60000), ("v3", 60000), ("e1", -1), ("e2", -1)] {
        send(
            &app.router,
            "PUT",
            &format!("/cache/session/{}", key),
            Some(json!({"value": key, "ttl_ms": ttl})),
        )
        .await;
    }

    let (status, body) = send(&app.router, "GET", "/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["total_items"], 5);
    assert_eq!(body["session"]["valid_items"], 3);
    assert_eq!(body["session"]["expired_items"], 2);
    assert!(body["session"]["total_size"].as_u64().unwrap() > 0);
    assert_eq!(body["persistent"]["total_items"], 0);

    // Reading stats does not evict
    let (_, again) = send(&app.router, "GET", "/stats", None).await;
    assert_eq!(again, body);

    let (status, body) = send(&app.router, "POST", "/sweep/session", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 2);

    let (_, body) = send(&app.router, "POST", "/sweep", None).await;
    assert_eq!(body, json!({"session": 0, "persistent": 0}));
}

// == HEALTH ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let (status, body) = send(&app.router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body.get("timestamp").is_some());
}

// == Error Responses ==

#[tokio::test]
async fn test_invalid_json_request() {
    let app = create_test_app();

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/cache/session/k")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"invalid json"#))
                .unwrap(),
        )
        .await
        .unwrap();

    // Axum returns 400 for syntax errors and 422 for shape errors
    assert!(
        response.status() == StatusCode::BAD_REQUEST
            || response.status() == StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[tokio::test]
async fn test_unavailable_backend_reports_not_stored() {
    let cache = ExpiringCache::new(
        Arc::new(MemoryStorage::unavailable()),
        Arc::new(MemoryStorage::new()),
    );
    let router = create_router(AppState::new(cache, 60_000));

    let (status, body) = send(
        &router,
        "PUT",
        "/cache/session/k",
        Some(json!({"value": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains("session"));

    // Reads and stats degrade instead of failing
    let (status, _) = send(&router, "GET", "/cache/session/k", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = send(&router, "GET", "/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["total_items"], 0);
}
