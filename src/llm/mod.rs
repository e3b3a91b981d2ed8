//! LLM integration for codeweaver.
//!
//! This module provides the completion-provider abstraction and the hosted
//! backends behind it. Every backend implements [`LlmProvider`], a single
//! async method taking a [`GenerationRequest`] and returning a
//! [`GenerationResponse`]; which one is used is decided by an explicit
//! [`ProviderConfig`].
//!
//! ```ignore
//! use codeweaver::llm::{build_provider, GenerationRequest, Message, ProviderConfig, ProviderKind};
//!
//! let config = ProviderConfig::from_env(ProviderKind::DeepSeek)?;
//! let provider = build_provider(&config)?;
//!
//! let request = GenerationRequest::new("", vec![Message::user("Write a fibonacci function")])
//!     .with_temperature(0.7)
//!     .with_max_tokens(1000);
//! let response = provider.generate(request).await?;
//! println!("{}", response.first_content().unwrap_or_default());
//! ```

pub mod client;
pub mod config;
pub mod providers;

pub use client::{
    Choice, GenerationRequest, GenerationResponse, LlmProvider, Message, OpenAiCompatClient, Usage,
};
pub use config::{ProviderConfig, ProviderKind};
pub use providers::{build_provider, DeepSeekProvider, OpenAiProvider};
