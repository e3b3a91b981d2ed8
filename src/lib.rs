//! codeweaver: a coding agent backed by hosted chat-completion APIs.
//!
//! A [`CodingTask`] is rendered into a prompt, sent to an OpenAI or DeepSeek
//! model through the [`llm::LlmProvider`] trait, and the reply is cleaned
//! down to its code payload by [`utils::code_extraction`]. Failures never
//! reach the caller of [`CodingAgent::generate`]; they yield a fixed
//! fallback snippet instead.

pub mod agents;
pub mod cli;
pub mod error;
pub mod llm;
pub mod output;
pub mod utils;

pub use agents::{AgentConfig, AgentError, CodingAgent, CodingTask};
pub use error::{LlmError, OutputError};
