//! Shared helpers for functional tests

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use image_gen_proxy::{api::routes::create_router, config::Settings, AppState};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::MockServer;

pub const IMAGE_GENERATION_PATH: &str = "/api/v3/images/generations";
pub const IMAGE_SYNTHESIS_PATH: &str = "/api/v1/services/aigc/text2image/image-synthesis";
pub const TASKS_PATH: &str = "/api/v1/tasks";

/// Settings with every upstream pointed at the mock server
pub fn settings_for(server: &MockServer) -> Settings {
    let mut settings = Settings::default();
    settings.upstream.image_generation_url = format!("{}{}", server.uri(), IMAGE_GENERATION_PATH);
    settings.upstream.image_synthesis_url = format!("{}{}", server.uri(), IMAGE_SYNTHESIS_PATH);
    settings.upstream.task_status_url = format!("{}{}", server.uri(), TASKS_PATH);
    settings
}

pub fn create_test_app(settings: Settings) -> Router {
    create_router(Arc::new(AppState::new(settings).unwrap()))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

pub async fn send(app: Router, request: Request<Body>) -> TestResponse {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();

    TestResponse {
        status,
        headers,
        body,
    }
}

pub fn json_request(method: &str, uri: &str, api_key: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(key) = api_key {
        builder = builder.header("authorization", format!("Bearer {}", key));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn empty_request(method: &str, uri: &str, api_key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = api_key {
        builder = builder.header("authorization", format!("Bearer {}", key));
    }
    builder.body(Body::empty()).unwrap()
}
