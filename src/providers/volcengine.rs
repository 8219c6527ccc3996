//! Volcengine Ark synchronous image generation

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use reqwest::Url;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::error::{ProxyError, Result};
use crate::proxy::forwarder::upstream_status;
use crate::proxy::request::is_truthy;
use crate::proxy::{
    CorsPolicy, Credential, InboundRequest, OutboundResponse, ProxyHandler, UpstreamRequest,
};

const REQUIRED_FIELDS: [&str; 4] = ["model", "prompt", "response_format", "size"];
const PROMPT_PREVIEW_CHARS: usize = 50;

/// Forwards text-to-image requests to the Ark images endpoint and returns the
/// finished result.
///
/// The body is passed through untouched, so provider options such as `seed`
/// or `guidance_scale` reach the upstream as sent. Upstream error bodies are
/// relayed verbatim with the upstream status.
#[derive(Debug, Clone)]
pub struct ImageGenerationProxy {
    endpoint: Url,
}

impl ImageGenerationProxy {
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            ProxyError::Config(config::ConfigError::Message(format!(
                "Invalid image generation URL '{}': {}",
                endpoint, e
            )))
        })?;
        Ok(Self { endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ProxyHandler for ImageGenerationProxy {
    fn name(&self) -> &'static str {
        "generate-image"
    }

    fn method(&self) -> Method {
        Method::POST
    }

    fn cors(&self) -> CorsPolicy {
        CorsPolicy::new("POST, OPTIONS", "Content-Type, Authorization")
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
        info!(
            model = ?request.field("model"),
            prompt = %prompt_preview(request.field("prompt")),
            size = ?request.field("size"),
            seed = ?request.field("seed"),
            guidance_scale = ?request.field("guidance_scale"),
            "Proxying image generation request"
        );

        Ok(UpstreamRequest::new(reqwest::Method::POST, self.endpoint.clone())
            .header("Authorization", credential.bearer())
            .header("Content-Type", "application/json")
            .json_body(request.body.clone()))
    }

    async fn relay(&self, response: reqwest::Response) -> Result<OutboundResponse> {
        let status = upstream_status(&response)?;
        let data: Value = response.json().await?;

        if !status.is_success() {
            error!(status = %status, body = %data, "Image generation API error");
            return Ok(OutboundResponse::json(status, data));
        }

        let generated = data.pointer("/data/0/url").is_some_and(is_truthy);
        info!(generated, "Image generation finished");

        Ok(OutboundResponse::json(StatusCode::OK, data))
    }

    fn internal_error_body(&self, error: &ProxyError) -> Value {
        json!({
            "error": {
                "message": format!("Proxy server error: {}", error)
            }
        })
    }
}

/// First characters of the prompt followed by `...`
fn prompt_preview(prompt: Option<&Value>) -> String {
    let text = match prompt {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };
    let preview: String = text.chars().take(PROMPT_PREVIEW_CHARS).collect();
    format!("{}...", preview)
}
