//! Common error types for the image generation proxy

use axum::http::StatusCode;
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Failed to read request body: {0}")]
    Body(#[from] axum::Error),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Missing API key")]
    MissingApiKey,

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProxyError {
    /// Status for errors detected locally, before anything is sent upstream.
    ///
    /// Returns `None` for internal failures, which every proxy renders
    /// through its own 500 envelope.
    pub fn client_status(&self) -> Option<StatusCode> {
        match self {
            ProxyError::MethodNotAllowed => Some(StatusCode::METHOD_NOT_ALLOWED),
            ProxyError::MissingApiKey => Some(StatusCode::UNAUTHORIZED),
            ProxyError::InvalidRequest(_) => Some(StatusCode::BAD_REQUEST),
            _ => None,
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ProxyError>;
