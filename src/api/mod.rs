//! API Module
//!
//! HTTP handlers and routing for the cache diagnostics panel.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /stats` - Stats for the session and persistent scopes
//! - `DELETE /cache` - Clear every cache-owned entry
//! - `DELETE /cache/:scope` - Clear a scope, optionally by `?pattern=`
//! - `PUT /cache/:scope/:key` - Store a JSON value
//! - `GET /cache/:scope/:key` - Retrieve a value
//! - `DELETE /cache/:scope/:key` - Remove one entry
//! - `POST /sweep`, `POST /sweep/:scope` - Remove expired entries

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
