//! Prompt templates for code generation.

use super::task::CodingTask;

/// System prompt that opens every conversation.
pub const CODING_SYSTEM_PROMPT: &str = r#"You are an autonomous coding agent. Your tasks are to:
- Write code based on requirements
- Create tests for the code when asked
- Keep the code small, correct and idiomatic for the target language

Respond with the code only. Do not add explanations before or after it."#;

/// Render `task` into the user prompt sent to the model.
pub fn build_task_prompt(task: &CodingTask) -> String {
    format!(
        "Write {} code for the following task:\n\n{}\n{}{}",
        task.language_or_default(),
        task.description.trim(),
        bullet_section("Requirements", &task.requirements),
        bullet_section("Test requirements", &task.test_requirements),
    )
}

fn bullet_section(title: &str, items: &[String]) -> String {
    let items: Vec<&str> = items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if items.is_empty() {
        return String::new();
    }

    let mut section = format!("\n{}:\n", title);
    for item in items {
        section.push_str("- ");
        section.push_str(item);
        section.push('\n');
    }
    section
}
