//! Proxy module - Shared lifecycle, request/response types, and credentials

pub mod credential;
pub mod forwarder;
pub mod request;
pub mod response;
pub mod traits;

pub use credential::Credential;
pub use forwarder::Forwarder;
pub use request::{InboundRequest, UpstreamRequest};
pub use response::{CorsPolicy, OutboundResponse};
pub use traits::ProxyHandler;
