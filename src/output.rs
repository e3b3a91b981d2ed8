//! Saving generated code to disk.
//!
//! Files are named after the task description: lowercased, every
//! non-alphanumeric character replaced by `_`, cut to
//! [`MAX_FILE_STEM_CHARS`] characters, with an extension chosen from the
//! task language.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::agents::CodingTask;
use crate::error::OutputError;

/// Default directory generated files are written to.
pub const DEFAULT_OUTPUT_DIR: &str = "outputs";

/// Maximum length of a derived file stem, in characters.
pub const MAX_FILE_STEM_CHARS: usize = 30;

/// File stem derived from a task description.
pub fn file_stem_for(description: &str) -> String {
    description
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .take(MAX_FILE_STEM_CHARS)
        .collect()
}

/// Source file extension for a language name. Unknown languages get `py`.
pub fn extension_for(language: &str) -> &'static str {
    match language.trim().to_lowercase().as_str() {
        "rust" | "rs" => "rs",
        "javascript" | "js" | "node" => "js",
        "typescript" | "ts" => "ts",
        "go" | "golang" => "go",
        "java" => "java",
        "c" => "c",
        "c++" | "cpp" | "cxx" => "cpp",
        "ruby" | "rb" => "rb",
        "shell" | "bash" | "sh" => "sh",
        _ => "py",
    }
}

/// Full file name (stem plus extension) for a task.
pub fn file_name_for(task: &CodingTask) -> Result<String, OutputError> {
    let stem = file_stem_for(&task.description);
    if stem.is_empty() {
        return Err(OutputError::EmptyFileName);
    }
    Ok(format!(
        "{}.{}",
        stem,
        extension_for(task.language_or_default())
    ))
}

/// Write `code` verbatim to `dir/<file_name_for(task)>`, creating `dir`.
///
/// Returns the path written.
pub async fn write_code(
    dir: impl AsRef<Path>,
    task: &CodingTask,
    code: &str,
) -> Result<PathBuf, OutputError> {
    let dir = dir.as_ref();
    let path = dir.join(file_name_for(task)?);

    fs::create_dir_all(dir)
        .await
        .map_err(|source| OutputError::CreateDir {
            path: dir.display().to_string(),
            source,
        })?;
    fs::write(&path, code).await?;

    tracing::info!(path = %path.display(), bytes = code.len(), "Saved generated code");
    Ok(path)
}
