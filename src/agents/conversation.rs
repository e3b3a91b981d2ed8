//! Conversation history sent ahead of each task prompt.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::AgentError;
use crate::llm::Message;

/// Speaker of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Role name on the chat-completion wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AgentError;

    /// Accepts `system`, `human`/`user` and `ai`/`assistant`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "system" => Ok(Role::System),
            "human" | "user" => Ok(Role::User),
            "ai" | "assistant" => Ok(Role::Assistant),
            _ => Err(AgentError::InvalidRole(s.to_string())),
        }
    }
}

/// Ordered message history, always starting with the system prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system_prompt)],
        }
    }

    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        let content = content.into();
        let message = match role {
            Role::System => Message::system(content),
            Role::User => Message::user(content),
            Role::Assistant => Message::assistant(content),
        };
        self.messages.push(message);
    }

    /// Append a message whose role is given by name.
    ///
    /// # Errors
    ///
    /// Returns `AgentError::InvalidRole` for names other than
    /// system/human/user/ai/assistant; the history is left untouched.
    pub fn add_message(&mut self, content: impl Into<String>, role: &str) -> Result<(), AgentError> {
        let role: Role = role.parse()?;
        self.push(role, content);
        Ok(())
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The history followed by one more user message, for a single request.
    pub fn with_user_prompt(&self, prompt: impl Into<String>) -> Vec<Message> {
        let mut messages = self.messages.clone();
        messages.push(Message::user(prompt));
        messages
    }
}
