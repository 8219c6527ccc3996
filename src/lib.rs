//! Image Generation CORS Proxy
//!
//! Stateless forwarding endpoints that let browser clients reach hosted
//! image generation APIs. Each call validates the minimum the provider
//! needs, forwards once with the caller's own API key, and relays the
//! provider's answer with permissive CORS headers.

pub mod api;
pub mod config;
pub mod error;
pub mod providers;
pub mod proxy;

pub use error::{ProxyError, Result};

use std::sync::Arc;

use providers::{AsyncImageGenerationProxy, ImageGenerationProxy, TaskStatusProxy};
use proxy::Forwarder;

/// Application state shared across all handlers.
///
/// Everything here is immutable after startup.
pub struct AppState {
    pub settings: Arc<config::Settings>,
    pub forwarder: Forwarder,
    pub image_generation: ImageGenerationProxy,
    pub image_synthesis: AsyncImageGenerationProxy,
    pub task_status: TaskStatusProxy,
}

impl AppState {
    pub fn new(settings: config::Settings) -> Result<Self> {
        let forwarder = Forwarder::new(&settings)?;
        let image_generation = ImageGenerationProxy::new(&settings.upstream.image_generation_url)?;
        let image_synthesis = AsyncImageGenerationProxy::new(&settings.upstream.image_synthesis_url)?;
        let task_status = TaskStatusProxy::new(&settings.upstream.task_status_url)?;

        Ok(Self {
            settings: Arc::new(settings),
            forwarder,
            image_generation,
            image_synthesis,
            task_status,
        })
    }
}
