//! Response helpers: bare records and arrays, as the wire contract requires.

use axum::{http::StatusCode, Json};
use serde::Serialize;

pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(data))
}

pub fn ok<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::OK, Json(data))
}

pub fn error_body(detail: impl Into<String>) -> serde_json::Value {
    serde_json::json!({ "detail": detail.into() })
}
