//! Request types flowing through a proxy call

use axum::{
    extract::{Query, Request},
    http::{HeaderMap, Method},
};
use serde_json::Value;
use std::collections::HashMap;

use crate::error::Result;

/// Inbound call as seen by a proxy, after the body has been read.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    pub headers: HeaderMap,
    /// Parsed JSON body; `None` when the request carried no body
    pub body: Option<Value>,
    pub query: HashMap<String, String>,
}

impl InboundRequest {
    /// Read and parse an axum request.
    ///
    /// An empty (or whitespace-only) body becomes `None`. Anything else must be
    /// valid JSON.
    pub async fn read(request: Request, max_body_bytes: usize) -> Result<Self> {
        let (parts, body) = request.into_parts();

        let query = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .map(|Query(query)| query)
            .unwrap_or_default();

        let bytes = axum::body::to_bytes(body, max_body_bytes).await?;
        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            None
        } else {
            Some(serde_json::from_slice::<Value>(&bytes)?)
        };

        Ok(Self {
            method: parts.method,
            headers: parts.headers,
            body,
            query,
        })
    }

    /// Body field by name, if the body is an object containing it
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.body.as_ref()?.get(name)
    }

    /// Names from `required` whose body value is absent or falsy
    pub fn missing_fields<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        required
            .iter()
            .copied()
            .filter(|name| !self.field(name).is_some_and(is_truthy))
            .collect()
    }

    /// Query parameter by name; empty values count as absent
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

/// Presence test for loosely typed client payloads.
///
/// `null`, `false`, `0` and `""` are treated as not provided. Arrays and
/// objects always count as provided, even when empty.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Request to send to an upstream provider
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub url: reqwest::Url,
    pub method: reqwest::Method,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<Value>,
}

impl UpstreamRequest {
    pub fn new(method: reqwest::Method, url: reqwest::Url) -> Self {
        Self {
            url,
            method,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn json_body(mut self, body: Option<Value>) -> Self {
        self.body = body;
        self
    }

    /// Headers with the `Authorization` value masked, for logging
    pub fn redacted_headers(&self) -> Vec<(&'static str, String)> {
        self.headers
            .iter()
            .map(|(name, value)| {
                if name.eq_ignore_ascii_case("authorization") {
                    let key = value.strip_prefix("Bearer ").unwrap_or(value);
                    let visible: String = key.chars().take(4).collect();
                    (*name, format!("Bearer {}***", visible))
                } else {
                    (*name, value.clone())
                }
            })
            .collect()
    }

    /// Issue the request. A single attempt is made.
    pub async fn send(self, client: &reqwest::Client) -> Result<reqwest::Response> {
        let mut builder = client.request(self.method, self.url);
        for (name, value) in self.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &self.body {
            builder = builder.body(serde_json::to_vec(body)?);
        }

        Ok(builder.send().await?)
    }
}
