//! Functional tests for the Wanx asynchronous image synthesis proxy

#[path = "../common/mod.rs"]
mod common;

use axum::http::{
    header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS},
    StatusCode,
};
use common::*;
use serde_json::{json, Value};
use wiremock::matchers::{any, body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const URI: &str = "/api/wanx-image";

fn valid_body() -> Value {
    json!({
        "model": "wanx2.1-t2i-turbo",
        "input": {"prompt": "a red fox in snow"},
        "parameters": {"size": "1024*1024", "n": 1}
    })
}

async fn mount_untouchable(server: &MockServer) {
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_options_preflight_allows_async_header() {
    let server = MockServer::start().await;
    mount_untouchable(&server).await;
    let app = create_test_app(settings_for(&server));

    let response = send(app, empty_request("OPTIONS", URI, None)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.is_empty());
    assert_eq!(response.headers[ACCESS_CONTROL_ALLOW_METHODS], "POST, OPTIONS");
    assert_eq!(
        response.headers[ACCESS_CONTROL_ALLOW_HEADERS],
        "Content-Type, Authorization, X-DashScope-Async"
    );
}

#[tokio::test]
async fn test_wrong_method_rejected() {
    let server = MockServer::start().await;
    mount_untouchable(&server).await;
    let app = create_test_app(settings_for(&server));

    let response = send(app, empty_request("PUT", URI, Some("sk-wanx"))).await;

    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.json(), json!({"error": "Method not allowed"}));
}

#[tokio::test]
async fn test_missing_api_key() {
    let server = MockServer::start().await;
    mount_untouchable(&server).await;
    let app = create_test_app(settings_for(&server));

    let response = send(app, json_request("POST", URI, None, &valid_body())).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.json(), json!({"error": "Missing API key"}));
}

#[tokio::test]
async fn test_missing_input() {
    let server = MockServer::start().await;
    mount_untouchable(&server).await;
    let app = create_test_app(settings_for(&server));

    let response = send(
        app,
        json_request("POST", URI, Some("sk-wanx"), &json!({"model": "wanx-v1"})),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json(), json!({"error": "Missing required fields: model, input"}));
}

#[tokio::test]
async fn test_submits_task_with_async_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(IMAGE_SYNTHESIS_PATH))
        .and(header("authorization", "Bearer sk-wanx"))
        .and(header("content-type", "application/json"))
        .and(header("x-dashscope-async", "enable"))
        .and(body_json(json!({"model": "wanx-v1", "input": {"prompt": "cat"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_id": "t1"})))
        .expect(1)
        .mount(&server)
        .await;

    let app = create_test_app(settings_for(&server));
    let response = send(
        app,
        json_request(
            "POST",
            URI,
            Some("sk-wanx"),
            &json!({"model": "wanx-v1", "input": {"prompt": "cat"}}),
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({"task_id": "t1"}));
}

#[tokio::test]
async fn test_parameters_passed_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(IMAGE_SYNTHESIS_PATH))
        .and(body_json(valid_body()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "output": {"task_id": "t2", "task_status": "PENDING"},
            "request_id": "r1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = create_test_app(settings_for(&server));
    let response = send(app, json_request("POST", URI, Some("sk-wanx"), &valid_body())).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["output"]["task_id"], "t2");
}

#[tokio::test]
async fn test_upstream_error_wrapped_with_raw_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(IMAGE_SYNTHESIS_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API-key provided."))
        .expect(1)
        .mount(&server)
        .await;

    let app = create_test_app(settings_for(&server));
    let response = send(app, json_request("POST", URI, Some("sk-bad"), &valid_body())).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.json(),
        json!({
            "error": "Wanx API error",
            "details": "Invalid API-key provided.",
            "status": 401
        })
    );
}

#[tokio::test]
async fn test_network_failure_is_internal_error() {
    let mut settings = image_gen_proxy::config::Settings::default();
    settings.upstream.image_synthesis_url = "http://127.0.0.1:1/synthesis".to_string();
    let app = create_test_app(settings);

    let response = send(app, json_request("POST", URI, Some("sk-wanx"), &valid_body())).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.json();
    assert_eq!(body["error"], "Internal server error");
    assert!(body["message"].as_str().unwrap().contains("error sending request"));
}
