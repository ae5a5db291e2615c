//! Common routes: liveness, database health, version.

use crate::handlers::fallback::method_not_allowed;
use crate::response::error_body;
use crate::service::CrudService;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
struct HealthBody {
    ok: bool,
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody { ok: true })
}

async fn health_db(State(state): State<AppState>) -> Result<Json<HealthBody>, (StatusCode, Json<serde_json::Value>)> {
    match CrudService::ping(&state.pool).await {
        Ok(()) => Ok(Json(HealthBody { ok: true })),
        Err(e) => {
            tracing::warn!(error = %e, "database health check failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(error_body(format!("DB error: {}", e))),
            ))
        }
    }
}

async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /health, GET /health/db, GET /version.
pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health).fallback(method_not_allowed))
        .route("/health/db", get(health_db).fallback(method_not_allowed))
        .route("/version", get(version).fallback(method_not_allowed))
        .with_state(state)
}
