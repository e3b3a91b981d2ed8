//! Shared utility functions for codeweaver.
//!
//! This module provides helpers used across modules, chiefly pulling the
//! code payload out of raw LLM responses.

pub mod code_extraction;

pub use code_extraction::{
    contains_code_token, extract_code, extract_code_with, find_log_boundary, strip_ansi,
    unwrap_code_fence, ExtractionError, ExtractorConfig, DEFAULT_CODE_MARKER,
};
