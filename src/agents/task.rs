//! The task descriptor handed to the coding agent.

use serde::{Deserialize, Serialize};

/// A coding task: what to build, and optionally in which language and
/// under which constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodingTask {
    /// Natural-language description of the code to write.
    pub description: String,
    /// Target language (e.g. "python"). Unset means Python.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Functional requirements the code must satisfy.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requirements: Vec<String>,
    /// Behaviours the accompanying tests should cover.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub test_requirements: Vec<String>,
}

impl CodingTask {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            language: None,
            requirements: Vec::new(),
            test_requirements: Vec::new(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_requirement(mut self, requirement: impl Into<String>) -> Self {
        self.requirements.push(requirement.into());
        self
    }

    pub fn with_test_requirement(mut self, requirement: impl Into<String>) -> Self {
        self.test_requirements.push(requirement.into());
        self
    }

    /// True when the description is empty or only whitespace.
    pub fn is_blank(&self) -> bool {
        self.description.trim().is_empty()
    }

    /// Language to generate in, defaulting to Python.
    pub fn language_or_default(&self) -> &str {
        self.language
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or("python")
    }
}
