//! Coding agent: one task in, one piece of code out.
//!
//! The agent renders the task into a prompt, makes a single call to its
//! completion provider and runs the reply through the code extractor.
//! [`CodingAgent::generate`] never fails: blank tasks, provider errors and
//! responses without code all collapse into the configured fallback snippet.

use std::sync::Arc;

use super::conversation::Conversation;
use super::error::{AgentError, AgentResult};
use super::prompt::{build_task_prompt, CODING_SYSTEM_PROMPT};
use super::task::CodingTask;
use crate::llm::{GenerationRequest, LlmProvider};
use crate::utils::code_extraction::{extract_code_with, ExtractorConfig};

/// Placeholder returned whenever no real code could be produced.
pub const DEFAULT_FALLBACK_CODE: &str = "def add(a, b):\n    return a + b";

/// Configuration for the coding agent.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Model override. Empty uses the provider's default model.
    pub model: String,
    /// Temperature for LLM generation.
    pub temperature: f64,
    /// Maximum tokens for response.
    pub max_tokens: u32,
    /// How code is pulled out of the raw reply.
    pub extractor: ExtractorConfig,
    /// Returned instead of an error by [`CodingAgent::generate`].
    pub fallback: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            temperature: 0.7,
            max_tokens: 1000,
            extractor: ExtractorConfig::default(),
            fallback: DEFAULT_FALLBACK_CODE.to_string(),
        }
    }
}

impl AgentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_extractor(mut self, extractor: ExtractorConfig) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }
}

/// Agent that turns coding tasks into code via a completion provider.
pub struct CodingAgent {
    llm_client: Arc<dyn LlmProvider>,
    config: AgentConfig,
    conversation: Conversation,
}

impl std::fmt::Debug for CodingAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodingAgent")
            .field("config", &self.config)
            .field("conversation_len", &self.conversation.len())
            .finish_non_exhaustive()
    }
}

impl CodingAgent {
    /// Agent name constant.
    pub const AGENT_NAME: &'static str = "coding_agent";

    /// Creates a new coding agent.
    pub fn new(llm_client: Arc<dyn LlmProvider>, config: AgentConfig) -> Self {
        Self {
            llm_client,
            config,
            conversation: Conversation::new(CODING_SYSTEM_PROMPT),
        }
    }

    /// Creates with default configuration.
    pub fn with_defaults(llm_client: Arc<dyn LlmProvider>) -> Self {
        Self::new(llm_client, AgentConfig::default())
    }

    /// Returns the configuration.
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Returns the conversation history sent ahead of each task.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Add context to the conversation (`system`, `human`, or `ai`).
    pub fn add_message(&mut self, content: impl Into<String>, role: &str) -> AgentResult<()> {
        self.conversation.add_message(content, role)
    }

    /// Generate code for `task`, falling back to the placeholder on any failure.
    pub async fn generate(&self, task: &CodingTask) -> String {
        match self.try_generate(task).await {
            Ok(code) => code,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    agent = Self::AGENT_NAME,
                    "Code generation failed, returning fallback"
                );
                self.config.fallback.clone()
            }
        }
    }

    /// Generate code for `task`, reporting why it failed if it does.
    ///
    /// A blank description returns `AgentError::InvalidTask` without
    /// contacting the provider. Otherwise exactly one request is made.
    pub async fn try_generate(&self, task: &CodingTask) -> AgentResult<String> {
        if task.is_blank() {
            return Err(AgentError::InvalidTask(
                "task description is empty".to_string(),
            ));
        }

        let prompt = build_task_prompt(task);
        let request = GenerationRequest::new(
            self.config.model.clone(),
            self.conversation.with_user_prompt(prompt),
        )
        .with_temperature(self.config.temperature)
        .with_max_tokens(self.config.max_tokens);

        tracing::info!(
            language = task.language_or_default(),
            chars = task.description.len(),
            "Requesting code generation"
        );

        let response = self.llm_client.generate(request).await?;
        let raw = response.first_content().ok_or(AgentError::EmptyResponse)?;

        tracing::debug!(
            model = %response.model,
            total_tokens = response.usage.total_tokens,
            chars = raw.len(),
            "Received completion"
        );

        let code = extract_code_with(raw, &self.config.extractor)?;
        Ok(code)
    }
}
