//! The coding agent and the pieces it is assembled from.

pub mod coding_agent;
pub mod conversation;
pub mod error;
pub mod prompt;
pub mod task;

pub use coding_agent::{AgentConfig, CodingAgent, DEFAULT_FALLBACK_CODE};
pub use conversation::{Conversation, Role};
pub use error::{AgentError, AgentResult};
pub use prompt::{build_task_prompt, CODING_SYSTEM_PROMPT};
pub use task::CodingTask;
