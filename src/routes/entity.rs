//! Resource CRUD routes. Paths are parameterized; handlers resolve the resource by its path segment.

use crate::handlers::entity::{create, delete as delete_handler, list, read, update};
use crate::handlers::fallback::method_not_allowed;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn entity_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/:path_segment",
            get(list).post(create).fallback(method_not_allowed),
        )
        .route(
            "/:path_segment/:id",
            get(read)
                .put(update)
                .delete(delete_handler)
                .fallback(method_not_allowed),
        )
        .with_state(state)
}
