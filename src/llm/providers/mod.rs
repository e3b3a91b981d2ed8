//! Completion provider implementations, one per hosted backend.
//!
//! The backend is chosen from an explicit [`ProviderConfig`]; callers only
//! ever see the [`LlmProvider`] trait object.

pub mod deepseek;
pub mod openai;

use std::sync::Arc;

pub use deepseek::DeepSeekProvider;
pub use openai::OpenAiProvider;

pub use super::client::LlmProvider;
use super::config::{ProviderConfig, ProviderKind};
use crate::error::LlmError;

/// Build the provider selected by `config.kind`.
pub fn build_provider(config: &ProviderConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    tracing::debug!(
        provider = %config.kind,
        model = %config.model,
        api_key = %config.api_key_masked(),
        "Building completion provider"
    );

    let provider: Arc<dyn LlmProvider> = match config.kind {
        ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(config)?),
        ProviderKind::DeepSeek => Arc::new(DeepSeekProvider::new(config)?),
    };
    Ok(provider)
}
