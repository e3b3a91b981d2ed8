//! Command-line interface for codeweaver.
//!
//! Provides commands for generating code from task descriptions and for
//! extracting code from saved model output.

mod commands;

pub use commands::{parse_cli, run, run_with_cli, Cli};
