//! Router-level misses, answered in the same `{"detail"}` shape as handler errors.

use crate::error::AppError;
use axum::http::{Method, Uri};

/// No route matches the path.
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("route not found: {}", uri.path()))
}

/// The path matches but the method has no handler.
pub async fn method_not_allowed(method: Method, uri: Uri) -> AppError {
    AppError::MethodNotAllowed(format!("{} not allowed on {}", method, uri.path()))
}
