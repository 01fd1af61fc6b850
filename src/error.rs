//! Error types for the expiring cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Storage Error Enum ==
/// Failures reported by a raw storage backend.
///
/// The cache layer never lets these escape its operations; they are handed to
/// the configured observer and turned into a miss or a "not performed" result.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Write would push the backend past its byte quota
    #[error("Storage quota exceeded: {needed} bytes needed, quota is {quota} bytes")]
    QuotaExceeded { needed: usize, quota: usize },

    /// Backend disabled or access denied by the host environment
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Underlying file I/O failed
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted document is not a valid key/value map
    #[error("Storage format error: {0}")]
    Format(#[from] serde_json::Error),
}

// == Cache Error Enum ==
/// Error type for the diagnostics HTTP surface.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key missing or expired
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Backend refused the write (quota, unavailable, serialization)
    #[error("Not stored: {0}")]
    NotStored(String),

    /// Cache call panicked or was cancelled on the blocking pool
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::NotStored(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the HTTP layer.
pub type Result<T> = std::result::Result<T, CacheError>;
