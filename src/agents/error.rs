//! Error types for the coding agent.
//!
//! None of these reach the caller of [`CodingAgent::generate`], which turns
//! every failure into the fallback snippet; they surface through
//! [`CodingAgent::try_generate`] and in logs.
//!
//! [`CodingAgent::generate`]: super::CodingAgent::generate
//! [`CodingAgent::try_generate`]: super::CodingAgent::try_generate

use thiserror::Error;

use crate::error::LlmError;
use crate::utils::code_extraction::ExtractionError;

/// Errors that can occur during agent operations.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The task cannot be sent to a model.
    #[error("Invalid task: {0}")]
    InvalidTask(String),

    /// A conversation message used a role outside system/human/ai.
    #[error("Invalid role: {0}")]
    InvalidRole(String),

    /// Error from the LLM provider.
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// The provider answered without any choices.
    #[error("LLM response contained no choices")]
    EmptyResponse,

    /// The response text held nothing recognizable as code.
    #[error("No code found in response: {0}")]
    NoCode(#[from] ExtractionError),
}

/// Result type alias for agent operations.
pub type AgentResult<T> = Result<T, AgentError>;
