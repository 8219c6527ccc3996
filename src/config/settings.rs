//! Application settings and configuration management

use crate::error::{ProxyError, Result};
use config::{Config, Environment, File};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upper bound on an inbound request body
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

/// Upstream provider endpoints
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Synchronous text-to-image endpoint (Volcengine Ark)
    #[serde(default = "default_image_generation_url")]
    pub image_generation_url: String,
    /// Asynchronous text-to-image task submission endpoint (DashScope Wanx)
    #[serde(default = "default_image_synthesis_url")]
    pub image_synthesis_url: String,
    /// Base of the DashScope task lookup endpoint; the task id is appended
    #[serde(default = "default_task_status_url")]
    pub task_status_url: String,
    /// Whole-request timeout for upstream calls. Unset means no timeout.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

fn default_image_generation_url() -> String {
    "https://ark.cn-beijing.volces.com/api/v3/images/generations".to_string()
}

fn default_image_synthesis_url() -> String {
    "https://dashscope.aliyuncs.com/api/v1/services/aigc/text2image/image-synthesis".to_string()
}

fn default_task_status_url() -> String {
    "https://dashscope.aliyuncs.com/api/v1/tasks".to_string()
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Settings {
    /// Load settings from configuration files and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/default.toml")
    }

    /// Load settings from a specific configuration file path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port() as i64)?
            .set_default("server.max_body_bytes", default_max_body_bytes() as i64)?
            .set_default("upstream.image_generation_url", default_image_generation_url())?
            .set_default("upstream.image_synthesis_url", default_image_synthesis_url())?
            .set_default("upstream.task_status_url", default_task_status_url())?
            .set_default("logging.level", default_log_level())?
            .set_default("logging.format", default_log_format())?
            .add_source(File::with_name(path.as_ref().to_str().unwrap_or("config/default")).required(false))
            // Override with environment variables (prefixed with IMAGE_PROXY_)
            .add_source(
                Environment::with_prefix("IMAGE_PROXY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(invalid("Server port cannot be 0".to_string()));
        }
        if self.server.max_body_bytes == 0 {
            return Err(invalid("server.max_body_bytes cannot be 0".to_string()));
        }

        for (key, value) in [
            ("upstream.image_generation_url", &self.upstream.image_generation_url),
            ("upstream.image_synthesis_url", &self.upstream.image_synthesis_url),
            ("upstream.task_status_url", &self.upstream.task_status_url),
        ] {
            let url = Url::parse(value)
                .map_err(|e| invalid(format!("{} is not a valid URL '{}': {}", key, value, e)))?;
            if !["http", "https"].contains(&url.scheme()) {
                return Err(invalid(format!(
                    "{} has unsupported scheme '{}'. Must be 'http' or 'https'",
                    key,
                    url.scheme()
                )));
            }
        }

        if !["json", "pretty"].contains(&self.logging.format.as_str()) {
            return Err(invalid(format!(
                "Invalid log format '{}'. Must be 'json' or 'pretty'",
                self.logging.format
            )));
        }

        Ok(())
    }
}

fn invalid(message: String) -> ProxyError {
    ProxyError::Config(config::ConfigError::Message(message))
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
                max_body_bytes: default_max_body_bytes(),
            },
            upstream: UpstreamConfig {
                image_generation_url: default_image_generation_url(),
                image_synthesis_url: default_image_synthesis_url(),
                task_status_url: default_task_status_url(),
                timeout_ms: None,
            },
            logging: LoggingConfig {
                level: default_log_level(),
                format: default_log_format(),
            },
        }
    }
}
