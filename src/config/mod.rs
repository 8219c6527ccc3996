//! Configuration module - settings loaded from file and environment

pub mod settings;

pub use settings::{LoggingConfig, ServerConfig, Settings, UpstreamConfig};
