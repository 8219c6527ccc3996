//! DashScope Wanx asynchronous image synthesis and task lookup

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use reqwest::Url;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::error::{ProxyError, Result};
use crate::proxy::forwarder::upstream_status;
use crate::proxy::{
    CorsPolicy, Credential, InboundRequest, OutboundResponse, ProxyHandler, UpstreamRequest,
};

const REQUIRED_FIELDS: [&str; 2] = ["model", "input"];
const ASYNC_HEADER: &str = "X-DashScope-Async";

fn parse_url(kind: &str, value: &str) -> Result<Url> {
    Url::parse(value).map_err(|e| {
        ProxyError::Config(config::ConfigError::Message(format!(
            "Invalid {} URL '{}': {}",
            kind, value, e
        )))
    })
}

/// Relay a DashScope reply.
///
/// Error bodies are read as text since DashScope does not guarantee JSON
/// there, and are wrapped as `{error, details, status}`.
async fn relay_task_response(
    response: reqwest::Response,
    label: &'static str,
) -> Result<OutboundResponse> {
    let status = upstream_status(&response)?;
    info!(status = %status, "DashScope response received");

    if !status.is_success() {
        let details = response.text().await?;
        error!(status = %status, body = %details, "{}", label);
        return Ok(OutboundResponse::json(
            status,
            json!({
                "error": label,
                "details": details,
                "status": status.as_u16(),
            }),
        ));
    }

    let data: Value = response.json().await?;
    info!(body = %data, "DashScope response data");
    Ok(OutboundResponse::json(StatusCode::OK, data))
}

fn internal_error(error: &ProxyError) -> Value {
    json!({
        "error": "Internal server error",
        "message": error.to_string(),
    })
}

/// Submits Wanx text-to-image tasks.
///
/// The upstream answers with a task id; callers poll [`TaskStatusProxy`] for
/// the result.
#[derive(Debug, Clone)]
pub struct AsyncImageGenerationProxy {
    endpoint: Url,
}

impl AsyncImageGenerationProxy {
    pub fn new(endpoint: &str) -> Result<Self> {
        Ok(Self {
            endpoint: parse_url("image synthesis", endpoint)?,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ProxyHandler for AsyncImageGenerationProxy {
    fn name(&self) -> &'static str {
        "wanx-image"
    }

    fn method(&self) -> Method {
        Method::POST
    }

    fn cors(&self) -> CorsPolicy {
        CorsPolicy::new("POST, OPTIONS", "Content-Type, Authorization, X-DashScope-Async")
    }

    fn validate(&self, request: &InboundRequest) -> Result<()> {
        if request.missing_fields(&REQUIRED_FIELDS).is_empty() {
            Ok(())
        } else {
            Err(ProxyError::InvalidRequest(format!(
                "Missing required fields: {}",
                REQUIRED_FIELDS.join(", ")
            )))
        }
    }

    fn upstream_request(
        &self,
        request: &InboundRequest,
        credential: &Credential,
    ) -> Result<UpstreamRequest> {
        let upstream = UpstreamRequest::new(reqwest::Method::POST, self.endpoint.clone())
            .header("Authorization", credential.bearer())
            .header("Content-Type", "application/json")
            .header(ASYNC_HEADER, "enable")
            .json_body(request.body.clone());

        info!(
            url = %upstream.url,
            headers = ?upstream.redacted_headers(),
            body = ?upstream.body,
            "Proxying Wanx image synthesis request"
        );

        Ok(upstream)
    }

    async fn relay(&self, response: reqwest::Response) -> Result<OutboundResponse> {
        relay_task_response(response, "Wanx API error").await
    }

    fn internal_error_body(&self, error: &ProxyError) -> Value {
        internal_error(error)
    }
}

/// Looks up a DashScope task by id.
#[derive(Debug, Clone)]
pub struct TaskStatusProxy {
    base: Url,
}

impl TaskStatusProxy {
    pub fn new(base: &str) -> Result<Self> {
        let base = parse_url("task status", base)?;
        if base.cannot_be_a_base() {
            return Err(ProxyError::Config(config::ConfigError::Message(format!(
                "Task status URL '{}' cannot be a base",
                base
            ))));
        }
        Ok(Self { base })
    }

    /// `<base>/<task_id>`, with the id percent-encoded as one path segment
    pub fn task_url(&self, task_id: &str) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ProxyError::Internal(format!("Cannot append task id to {}", self.base)))?
            .pop_if_empty()
            .push(task_id);
        Ok(url)
    }
}

#[async_trait]
impl ProxyHandler for TaskStatusProxy {
    fn name(&self) -> &'static str {
        "wanx-query"
    }

    fn method(&self) -> Method {
        Method::GET
    }

    fn cors(&self) -> CorsPolicy {
        CorsPolicy::new("GET, OPTIONS", "Content-Type, Authorization")
    }

    fn validate(&self, request: &InboundRequest) -> Result<()> {
        match request.query_param("taskId") {
            Some(_) => Ok(()),
            None => Err(ProxyError::InvalidRequest(
                "Missing taskId parameter".to_string(),
            )),
        }
    }

    fn upstream_request(
        &self,
        request: &InboundRequest,
        credential: &Credential,
    ) -> Result<UpstreamRequest> {
        let task_id = request
            .query_param("taskId")
            .ok_or_else(|| ProxyError::InvalidRequest("Missing taskId parameter".to_string()))?;

        let upstream = UpstreamRequest::new(reqwest::Method::GET, self.task_url(task_id)?)
            .header("Authorization", credential.bearer());

        info!(
            url = %upstream.url,
            headers = ?upstream.redacted_headers(),
            task_id,
            "Proxying task query request"
        );

        Ok(upstream)
    }

    async fn relay(&self, response: reqwest::Response) -> Result<OutboundResponse> {
        relay_task_response(response, "Task query API error").await
    }

    fn internal_error_body(&self, error: &ProxyError) -> Value {
        internal_error(error)
    }
}
