//! JSON object body extractor that reports rejections in the API's error format.

use crate::error::AppError;
use async_trait::async_trait;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    Json,
};
use serde_json::{Map, Value};

/// Request body that must be a JSON object. Malformed JSON, a missing content type or a
/// non-object body become `AppError::Validation`; a body over the configured limit becomes
/// `AppError::PayloadTooLarge`.
#[derive(Clone, Debug)]
pub struct JsonObject(pub Map<String, Value>);

#[async_trait]
impl<S> FromRequest<S> for JsonObject
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(rejection_error)?;
        match value {
            Value::Object(map) => Ok(JsonObject(map)),
            _ => Err(AppError::Validation("body must be a JSON object".into())),
        }
    }
}

fn rejection_error(rejection: JsonRejection) -> AppError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(rejection.body_text())
    } else {
        AppError::Validation(rejection.body_text())
    }
}
