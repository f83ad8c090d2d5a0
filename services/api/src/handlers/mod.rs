//! HTTP handlers, one module per resource
//!
//! Each module exposes a `router()` registering exactly the methods its
//! resource supports. Every other method on those paths is answered by
//! [`method_not_allowed`] before any authentication takes place.

use axum::http::Method;

use crate::error::ApiError;

pub mod comments;
pub mod follows;
pub mod groups;
pub mod posts;
pub mod token;

/// Fallback for unsupported methods on a known path
pub async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::MethodNotAllowed(method)
}

/// Fallback for unknown paths
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
