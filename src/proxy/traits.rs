//! Trait implemented by each provider-facing proxy

use async_trait::async_trait;
use axum::http::Method;
use serde_json::Value;

use crate::error::{ProxyError, Result};
use crate::proxy::credential::Credential;
use crate::proxy::request::{InboundRequest, UpstreamRequest};
use crate::proxy::response::{CorsPolicy, OutboundResponse};

/// A stateless request translator in front of one upstream endpoint.
///
/// The shared lifecycle lives in [`Forwarder`](crate::proxy::Forwarder);
/// implementors only describe what differs between endpoints.
#[async_trait]
pub trait ProxyHandler: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// The single verb accepted besides `OPTIONS`
    fn method(&self) -> Method;

    /// CORS headers set on every response
    fn cors(&self) -> CorsPolicy;

    /// Check required body fields / query parameters.
    ///
    /// Must fail with [`ProxyError::InvalidRequest`] for client mistakes.
    fn validate(&self, request: &InboundRequest) -> Result<()>;

    /// Build the upstream call for a validated request
    fn upstream_request(
        &self,
        request: &InboundRequest,
        credential: &Credential,
    ) -> Result<UpstreamRequest>;

    /// Turn the provider's reply into the response sent to the caller
    async fn relay(&self, response: reqwest::Response) -> Result<OutboundResponse>;

    /// 500 body for failures that happen inside the handler
    fn internal_error_body(&self, error: &ProxyError) -> Value;
}
