//! Code extraction from raw model output.
//!
//! Model responses often arrive decorated: ANSI colour codes from a terminal
//! logger, a marker line such as `> Code:` in front of the payload, and log
//! lines appended after it. [`extract_code`] peels those layers off and
//! returns the code, or an [`ExtractionError`] when nothing code-like is left.
//!
//! # Extraction steps
//!
//! 1. Strip ANSI SGR sequences (`ESC [ <digits/;> m`)
//! 2. Cut everything up to and including the first marker occurrence; with
//!    no marker, require at least one line that looks like code
//! 3. Truncate at the first unindented log line (timestamp or log level)
//! 4. Unwrap a column-0 Markdown code fence, if any, and trim
//!
//! # Example
//!
//! ```
//! use codeweaver::utils::code_extraction::extract_code;
//!
//! let raw = "\x1b[35m> Code:\ndef f():\n    pass\n2024-01-01 INFO - done";
//! assert_eq!(extract_code(raw).unwrap(), "def f():\n    pass");
//!
//! assert!(extract_code("hello there").is_err());
//! ```

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Marker that conventionally precedes the code portion of a response.
pub const DEFAULT_CODE_MARKER: &str = "> Code:";

/// Why no code could be extracted from a response.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Response is empty")]
    Empty,

    #[error("Response has no code marker and no recognizable code syntax")]
    NoCodeTokens,

    #[error("Nothing left after removing trailing log output")]
    EmptyAfterTruncation,
}

/// Knobs for [`extract_code_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    /// Literal token preceding the code block.
    pub marker: String,
    /// When no marker is present, reject text without a code keyword.
    pub require_code_token: bool,
    /// Remove surrounding Markdown ``` fences.
    pub unwrap_fences: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            marker: DEFAULT_CODE_MARKER.to_string(),
            require_code_token: true,
            unwrap_fences: true,
        }
    }
}

impl ExtractorConfig {
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    pub fn with_require_code_token(mut self, require: bool) -> Self {
        self.require_code_token = require;
        self
    }

    pub fn with_unwrap_fences(mut self, unwrap: bool) -> Self {
        self.unwrap_fences = unwrap;
        self
    }
}

fn ansi_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").expect("ANSI pattern is valid"))
}

fn log_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?m)^(?:\d{4}-\d{2}-\d{2}(?:[ T]\d{2}:\d{2}|[ \t]+\[?(?:TRACE|DEBUG|INFO|WARN|WARNING|ERROR|CRITICAL)\b)|\[(?:TRACE|DEBUG|INFO|WARN|WARNING|ERROR|CRITICAL)\][ \t]|(?:TRACE|DEBUG|INFO|WARN|WARNING|ERROR|CRITICAL)(?::[\w.]*:|[ \t]+-[ \t]))",
        )
        .expect("log line pattern is valid")
    })
}

fn code_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?m)^[ \t]*(?:(?:(?:export|public|pub|async|static)[ \t]+)*(?:def|class|import|function|fn|func|struct|enum|impl|trait|interface|package)\b|from[ \t]+\S+[ \t]+import\b|#include\b|use[ \t]+[\w:]+)",
        )
        .expect("code token pattern is valid")
    })
}

fn fence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?ms)^```[^\n`]*\n(.*?)^```").expect("fence pattern is valid")
    })
}

/// Remove ANSI colour escape sequences.
pub fn strip_ansi(text: &str) -> Cow<'_, str> {
    ansi_regex().replace_all(text, "")
}

/// Byte offset of the first line that looks like log output, if any.
///
/// Only unindented lines count: a date followed by a time or a level,
/// `LEVEL:logger:`, `LEVEL - ` or `[LEVEL] `.
pub fn find_log_boundary(text: &str) -> Option<usize> {
    log_line_regex().find(text).map(|m| m.start())
}

/// Whether any line starts with a function, class, or import keyword.
pub fn contains_code_token(text: &str) -> bool {
    code_token_regex().is_match(text)
}

/// Body of the first Markdown code fence in `text`.
///
/// Fences must open and close at column 0, and anything before the opening
/// fence must be prose, so fences quoted inside code are left alone. An
/// opening fence without a closing one (a truncated response) yields
/// everything after the opening line.
pub fn unwrap_code_fence(text: &str) -> Option<&str> {
    if let Some(caps) = fence_regex().captures(text) {
        let open = caps.get(0).map_or(0, |m| m.start());
        if contains_code_token(&text[..open]) {
            return None;
        }
        return caps.get(1).map(|m| m.as_str());
    }

    let trimmed = text.trim_start();
    trimmed
        .strip_prefix("```")
        .map(|rest| {
            let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
            body.trim_end().strip_suffix("```").unwrap_or(body)
        })
}

/// Extract code from a raw response with the default configuration.
pub fn extract_code(raw: &str) -> Result<String, ExtractionError> {
    extract_code_with(raw, &ExtractorConfig::default())
}

/// Extract code from a raw response.
///
/// # Errors
///
/// - `Empty` if the input is empty or whitespace after ANSI stripping
/// - `NoCodeTokens` if there is no marker and no code-looking line, and
///   `config.require_code_token` is set
/// - `EmptyAfterTruncation` if nothing remains after cutting log output
pub fn extract_code_with(raw: &str, config: &ExtractorConfig) -> Result<String, ExtractionError> {
    let cleaned = strip_ansi(raw);
    if cleaned.trim().is_empty() {
        return Err(ExtractionError::Empty);
    }

    let marker_hit = if config.marker.is_empty() {
        None
    } else {
        cleaned.find(config.marker.as_str())
    };

    let payload: &str = match marker_hit {
        Some(idx) => &cleaned[idx + config.marker.len()..],
        None => {
            if config.require_code_token && !contains_code_token(&cleaned) {
                return Err(ExtractionError::NoCodeTokens);
            }
            &cleaned
        }
    };

    let payload = match find_log_boundary(payload) {
        Some(end) => &payload[..end],
        None => payload,
    };

    let payload = if config.unwrap_fences {
        unwrap_code_fence(payload).unwrap_or(payload)
    } else {
        payload
    };

    let code = payload.trim();
    if code.is_empty() {
        return Err(ExtractionError::EmptyAfterTruncation);
    }

    Ok(code.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_ansi_and_log_suffix() {
        let raw = "\x1b[35m> Code:\ndef f():\n    pass\n2024-01-01 INFO - done";
        assert_eq!(extract_code(raw), Ok("def f():\n    pass".to_string()));
    }

    #[test]
    fn test_plain_text_is_not_code() {
        assert_eq!(extract_code("hello there"), Err(ExtractionError::NoCodeTokens));
    }

    #[test]
    fn test_empty_and_whitespace_input() {
        assert_eq!(extract_code(""), Err(ExtractionError::Empty));
        assert_eq!(extract_code("  \n\t "), Err(ExtractionError::Empty));
        assert_eq!(extract_code("\x1b[0m\x1b[35m"), Err(ExtractionError::Empty));
    }

    #[test]
    fn test_idempotent_on_clean_output() {
        let raw = "\x1b[32m> Code:\ndef add(a, b):\n    return a + b\n2024-03-02 12:00:01 INFO done";
        let once = extract_code(raw).expect("first pass finds code");
        let twice = extract_code(&once).expect("second pass finds code");
        assert_eq!(once, twice);
        assert_eq!(once, "def add(a, b):\n    return a + b");
    }

    #[test]
    fn test_plain_code_passes_through() {
        let code = "def add(a,b):\n    return a+b";
        assert_eq!(extract_code(code), Ok(code.to_string()));
    }

    #[test]
    fn test_marker_followed_only_by_logs() {
        let raw = "> Code:\n2024-01-01 INFO - nothing generated";
        assert_eq!(extract_code(raw), Err(ExtractionError::EmptyAfterTruncation));
    }

    #[test]
    fn test_marker_payload_needs_no_keyword() {
        let raw = "> Code:\nx = 1\nprint(x)";
        assert_eq!(extract_code(raw), Ok("x = 1\nprint(x)".to_string()));
    }

    #[test]
    fn test_only_first_marker_is_consumed() {
        let raw = "> Code:\nprint('> Code: inside')";
        assert_eq!(extract_code(raw), Ok("print('> Code: inside')".to_string()));
    }

    #[test]
    fn test_compound_ansi_sequences() {
        let raw = "\x1b[1;35mdef f():\x1b[0m\n    pass";
        assert_eq!(extract_code(raw), Ok("def f():\n    pass".to_string()));
    }

    #[test]
    fn test_log_level_lines_truncate() {
        let raw = "def f():\n    pass\nINFO:root:finished\nmore noise";
        assert_eq!(extract_code(raw), Ok("def f():\n    pass".to_string()));

        let raw = "def f():\n    pass\n[WARNING] token budget low";
        assert_eq!(extract_code(raw), Ok("def f():\n    pass".to_string()));
    }

    #[test]
    fn test_uppercase_constant_is_not_a_log_line() {
        let code = "import logging\n\nERROR = 1\nINFO = 2";
        assert_eq!(extract_code(code), Ok(code.to_string()));
    }

    #[test]
    fn test_markdown_fence_with_prose() {
        let raw = "Here is the function:\n```python\ndef add(a, b):\n    return a + b\n```\nLet me know!";
        assert_eq!(
            extract_code(raw),
            Ok("def add(a, b):\n    return a + b".to_string())
        );
    }

    #[test]
    fn test_unterminated_fence() {
        assert_eq!(
            unwrap_code_fence("```rust\nfn main() {}"),
            Some("fn main() {}")
        );
        assert_eq!(unwrap_code_fence("fn main() {}"), None);

        // Marker on the same line as the opening fence.
        assert_eq!(
            extract_code("> Code: ```rust\nfn main() {}\n```"),
            Ok("fn main() {}".to_string())
        );
    }

    #[test]
    fn test_fences_left_alone_when_disabled() {
        let config = ExtractorConfig::default().with_unwrap_fences(false);
        let raw = "```\ndef f(): pass\n```";
        assert_eq!(extract_code_with(raw, &config), Ok(raw.to_string()));
    }

    #[test]
    fn test_plain_text_accepted_without_token_requirement() {
        let config = ExtractorConfig::default().with_require_code_token(false);
        assert_eq!(
            extract_code_with("hello there", &config),
            Ok("hello there".to_string())
        );
    }

    #[test]
    fn test_custom_marker() {
        let config = ExtractorConfig::default().with_marker("Solution:");
        let raw = "Thinking...\nSolution:\nfn main() {}";
        assert_eq!(extract_code_with(raw, &config), Ok("fn main() {}".to_string()));
    }

    #[test]
    fn test_code_token_detection() {
        assert!(contains_code_token("import os"));
        assert!(contains_code_token("  class Foo:"));
        assert!(contains_code_token("from typing import List"));
        assert!(contains_code_token("pub fn main() {}"));
        assert!(contains_code_token("export function f() {}"));
        assert!(contains_code_token("#include <stdio.h>"));
        assert!(!contains_code_token("This is a first class answer."));
        assert!(!contains_code_token("hello there"));
    }

    #[test]
    fn test_find_log_boundary() {
        assert_eq!(find_log_boundary("a\n2024-01-01 12:30:00 x"), Some(2));
        assert_eq!(find_log_boundary("a\n2024-01-01T12:30:00Z done"), Some(2));
        assert_eq!(find_log_boundary("a\n2024-01-01 WARNING low"), Some(2));
        assert_eq!(find_log_boundary("a\nINFO:root:done"), Some(2));
        assert_eq!(find_log_boundary("a\nERROR - failed"), Some(2));
        assert_eq!(find_log_boundary("no logs here"), None);
        assert_eq!(find_log_boundary("2024-01-01 is a date"), None);
        assert_eq!(find_log_boundary("  INFO - indented"), None);
    }

    #[test]
    fn test_level_named_identifiers_are_not_log_lines() {
        let typed = "import os\n\nDEBUG: bool = os.environ.get('X') == '1'\n\ndef run():\n    return DEBUG";
        assert_eq!(extract_code(typed), Ok(typed.to_string()));

        let keys = "function makeLogger() {\n  const LEVELS = {\n    DEBUG: 0,\n    INFO: 1,\n  };\n  return LEVELS;\n}";
        assert_eq!(extract_code(keys), Ok(keys.to_string()));

        assert_eq!(find_log_boundary("DEBUG: bool = True"), None);
        assert_eq!(find_log_boundary("    DEBUG: 0,"), None);
    }

    #[test]
    fn test_fence_inside_docstring_is_kept() {
        let code = "def f():\n    \"\"\"Usage:\n\n    ```python\n    f()\n    ```\n    \"\"\"\n    return 1";
        assert_eq!(extract_code(code), Ok(code.to_string()));
        assert_eq!(unwrap_code_fence(code), None);
    }

    #[test]
    fn test_fence_after_code_is_not_unwrapped() {
        let text = "import os\n```\nx = 1\n```";
        assert_eq!(unwrap_code_fence(text), None);
    }

    #[test]
    fn test_clean_code_is_a_fixed_point() {
        let cases = [
            "def add(a, b):\n    return a + b",
            "import logging\n\nERROR = 1\nINFO = 2\nWARNING: int = 3",
            "import os\n\nDEBUG: bool = os.environ.get('X') == '1'\n\ndef run():\n    return DEBUG",
            "function makeLogger() {\n  const LEVELS = {\n    DEBUG: 0,\n    INFO: 1,\n  };\n  return LEVELS;\n}",
            "class Level:\n    INFO = 20\n    ERROR = 40",
            "import datetime\n\nSTART = \"2024-01-01 00:00:00\"\nprint(START)",
            "def log(msg):\n    print(f\"2024-01-01 INFO - {msg}\")",
            "use tracing::info;\n\nfn main() {\n    info!(\"INFO - starting\");\n}",
            "def f():\n    \"\"\"Usage:\n\n    ```python\n    f()\n    ```\n    \"\"\"\n    return 1",
            "/// ```\n/// let x = 1;\n/// ```\nfn f() {}",
        ];

        for code in cases {
            assert_eq!(extract_code(code), Ok(code.to_string()), "changed: {code:?}");
        }
    }
}
