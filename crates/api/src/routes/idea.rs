//! Idea lifecycle routes.

use axum::routing::post;
use axum::Router;

use crate::handlers::idea;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(idea::propose).get(idea::list))
        .route("/{id}/approve", post(idea::approve))
        .route("/{id}/execute", post(idea::execute))
}
