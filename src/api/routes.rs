//! Route table for the proxy server

use axum::{
    extract::{Request, State},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Build the application router.
///
/// Proxy routes accept any method; each proxy answers `OPTIONS` and rejects
/// other verbs itself so that CORS headers are present on every reply.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/generate-image", any(generate_image))
        .route("/api/wanx-image", any(wanx_image))
        .route("/api/wanx-query", any(wanx_query))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn generate_image(State(state): State<Arc<AppState>>, request: Request) -> Response {
    state
        .forwarder
        .dispatch(&state.image_generation, request)
        .await
}

async fn wanx_image(State(state): State<Arc<AppState>>, request: Request) -> Response {
    state
        .forwarder
        .dispatch(&state.image_synthesis, request)
        .await
}

async fn wanx_query(State(state): State<Arc<AppState>>, request: Request) -> Response {
    state.forwarder.dispatch(&state.task_status, request).await
}
