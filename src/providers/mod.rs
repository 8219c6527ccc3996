//! Providers module - Upstream image generation APIs

pub mod dashscope;
pub mod volcengine;

pub use dashscope::{AsyncImageGenerationProxy, TaskStatusProxy};
pub use volcengine::ImageGenerationProxy;
