//! Shared request lifecycle for all proxies

use axum::{
    extract::Request,
    http::{Method, StatusCode},
    response::Response,
};
use reqwest::Client;
use tracing::{debug, error, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::Settings;
use crate::error::{ProxyError, Result};
use crate::proxy::credential::Credential;
use crate::proxy::request::InboundRequest;
use crate::proxy::response::OutboundResponse;
use crate::proxy::traits::ProxyHandler;

/// Runs inbound calls through a [`ProxyHandler`].
///
/// Holds only the HTTP connection pool and limits; no per-call state
/// survives a call.
#[derive(Clone)]
pub struct Forwarder {
    client: Client,
    max_body_bytes: usize,
}

impl Forwarder {
    /// Create a forwarder from configuration
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.upstream.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ProxyError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_body_bytes: settings.server.max_body_bytes,
        })
    }

    /// Handle one inbound call. Always produces exactly one response, with
    /// the handler's CORS headers attached.
    pub async fn dispatch(&self, handler: &dyn ProxyHandler, request: Request) -> Response {
        let cors = handler.cors();
        let span = info_span!(
            "proxy",
            handler = handler.name(),
            request_id = %Uuid::new_v4(),
            method = %request.method(),
        );

        let outbound = async move {
            if request.method() == Method::OPTIONS {
                return OutboundResponse::empty(StatusCode::OK);
            }

            match self.forward(handler, request).await {
                Ok(response) => response,
                Err(e) => error_response(handler, e),
            }
        }
        .instrument(span)
        .await;

        outbound.into_response_with(&cors)
    }

    async fn forward(&self, handler: &dyn ProxyHandler, request: Request) -> Result<OutboundResponse> {
        if request.method() != handler.method() {
            return Err(ProxyError::MethodNotAllowed);
        }

        let credential =
            Credential::from_headers(request.headers()).ok_or(ProxyError::MissingApiKey)?;

        let inbound = InboundRequest::read(request, self.max_body_bytes).await?;
        handler.validate(&inbound)?;

        let upstream = handler.upstream_request(&inbound, &credential)?;
        debug!(url = %upstream.url, "Forwarding to upstream");

        let response = upstream.send(&self.client).await?;
        handler.relay(response).await
    }
}

fn error_response(handler: &dyn ProxyHandler, error: ProxyError) -> OutboundResponse {
    match error.client_status() {
        Some(status) => {
            warn!(status = %status, error = %error, "Rejected request");
            OutboundResponse::error(status, error.to_string())
        }
        None => {
            error!(error = %error, "Proxy server error");
            OutboundResponse::json(
                StatusCode::INTERNAL_SERVER_ERROR,
                handler.internal_error_body(&error),
            )
        }
    }
}

/// Convert a provider status into the server's status type
pub(crate) fn upstream_status(response: &reqwest::Response) -> Result<StatusCode> {
    let code = response.status().as_u16();
    StatusCode::from_u16(code)
        .map_err(|e| ProxyError::Internal(format!("Invalid upstream status {}: {}", code, e)))
}
