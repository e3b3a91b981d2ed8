//! Error types for codeweaver operations.
//!
//! Defines error types for the subsystems that can fail:
//! - LLM provider configuration and API interactions
//! - Writing generated code to disk

use thiserror::Error;

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Missing API key: {var} environment variable not set")]
    MissingApiKey { var: String },

    #[error("Unsupported model provider '{0}': expected 'openai' or 'deepseek'")]
    UnsupportedProvider(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse LLM response: {0}")]
    ParseError(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API error ({code}): {message}")]
    ApiError { code: u16, message: String },

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

/// Errors that can occur while saving generated code.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Cannot derive a file name from an empty task description")]
    EmptyFileName,

    #[error("Failed to create output directory '{path}': {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
