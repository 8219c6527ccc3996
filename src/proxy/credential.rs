//! Caller-supplied provider API key

use axum::http::{header::AUTHORIZATION, HeaderMap};
use std::fmt;

const BEARER_PREFIX: &str = "Bearer ";

/// Provider API key taken from the inbound `Authorization` header.
///
/// The key is only ever forwarded to the provider for the call that carried
/// it. `Debug` and `Display` print a masked form so that it can be logged.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Extract the key from the `Authorization` header.
    ///
    /// A leading `Bearer ` is stripped when present; otherwise the whole header
    /// value is taken as the key. A missing, non-UTF-8 or empty value yields
    /// `None`. The key format itself is not checked.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
        let key = header.strip_prefix(BEARER_PREFIX).unwrap_or(header);

        if key.is_empty() {
            return None;
        }
        Some(Self(key.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Header value to send upstream
    pub fn bearer(&self) -> String {
        format!("{}{}", BEARER_PREFIX, self.0)
    }

    /// First four characters followed by `***`
    pub fn masked(&self) -> String {
        let visible: String = self.0.chars().take(4).collect();
        format!("{}***", visible)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&self.masked()).finish()
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}
