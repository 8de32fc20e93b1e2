//! OpenRouter API access: budget resolution, request assembly, dispatch.

pub mod client;
pub mod limits;
mod response;

pub use client::{OPENROUTER_API_BASE, OpenRouterClient};
pub use limits::{DEFAULT_CONTEXT_LENGTH, MODEL_TOKEN_LIMITS, ModelInfo, ModelLimits, family_context_length};
