//! Router assembly: common and resource routes behind CORS, tracing and a body limit.

mod common;
mod entity;

pub use common::common_routes;
pub use entity::entity_routes;

use crate::config::ServerSettings;
use crate::handlers::fallback::not_found;
use crate::state::AppState;
use axum::{extract::DefaultBodyLimit, Router};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Full application router.
pub fn app(state: AppState, server: &ServerSettings) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    Router::new()
        .merge(common_routes(state.clone()))
        .merge(entity_routes(state))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(server.body_limit))
        .layer(middleware)
}
