//! OpenAI chat-completion provider.

use async_trait::async_trait;

use crate::error::LlmError;
use crate::llm::client::{GenerationRequest, GenerationResponse, LlmProvider, OpenAiCompatClient};
use crate::llm::config::{ProviderConfig, ProviderKind};

/// Provider backed by the OpenAI API.
#[derive(Debug)]
pub struct OpenAiProvider {
    client: OpenAiCompatClient,
}

impl OpenAiProvider {
    /// Create a provider from explicit configuration.
    pub fn new(config: &ProviderConfig) -> Result<Self, LlmError> {
        Ok(Self {
            client: OpenAiCompatClient::new(config)?,
        })
    }

    /// Create a provider reading `OPENAI_API_KEY` (and optional overrides).
    ///
    /// # Errors
    ///
    /// Returns `LlmError::MissingApiKey` when `OPENAI_API_KEY` is not set.
    pub fn from_env() -> Result<Self, LlmError> {
        Self::new(&ProviderConfig::from_env(ProviderKind::OpenAi)?)
    }

    pub fn default_model(&self) -> &str {
        self.client.default_model()
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError> {
        self.client.chat(request).await
    }
}
