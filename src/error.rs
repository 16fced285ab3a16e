//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the in-process cache and its HTTP front-end.
///
/// `KeyNotFound` and `KeyExpired` are ordinary lookup outcomes, not faults.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key is not present in the cache
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// Key is present but its TTL has elapsed
    #[error("Key expired: {0}")]
    KeyExpired(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Cache was configured with a capacity it cannot honour
    #[error("Invalid capacity: {0}, the cache must hold at least one entry")]
    InvalidCapacity(usize),

    /// Cache was constructed outside a Tokio runtime
    #[error("No Tokio runtime available to run the expiry reaper")]
    NoRuntime,
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::KeyNotFound(_) | CacheError::KeyExpired(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::InvalidConfig(_)
            | CacheError::InvalidCapacity(_)
            | CacheError::NoRuntime => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
