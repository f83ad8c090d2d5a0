//! API service routes

use axum::{Json, Router, response::IntoResponse, routing::get};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    AppState,
    handlers::{comments, follows, groups, not_found, posts, token},
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(token::router())
        .merge(posts::router())
        .merge(comments::router())
        .merge(groups::router())
        .merge(follows::router());

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "yatube-api"
    }))
}
