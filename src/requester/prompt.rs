//! Prompt construction for commit message generation.

/// Instructions sent ahead of the diff.
pub const COMMIT_PROMPT: &str = r#"You are a professional software engineer. Your task is to generate clear, concise, and descriptive git commit messages based on code diffs.

Guidelines:
- Use **conventional commit prefixes** where appropriate:
  - feat: for new features
  - fix: for bug fixes
  - docs: for documentation changes
  - style: for code style formatting (whitespace, formatting, etc.)
  - refactor: for code restructuring without changing behavior
  - perf: for performance improvements
  - test: for adding or fixing tests
  - chore: for maintenance or tooling changes
- Analyze the diff carefully and choose the most appropriate prefix.
- Summarize the changes in one line if possible.
- Use imperative tense (e.g., "Add feature", "Fix bug", "Update docs").
- Avoid unnecessary details like file paths or line numbers.
- Focus on the purpose and effect of the change, not implementation details.
- Keep the message under 72 characters if possible.

Only return the commit message as plain text. Do not add extra commentary or explanations.
"#;

/// Build the full request text: instructions, a separator, then the diff.
pub fn build_request_text(diff: &str) -> String {
    format!("{COMMIT_PROMPT}:\n\n{diff}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_text_ends_with_diff() {
        let text = build_request_text("+1 line");
        assert!(text.starts_with("You are a professional software engineer."));
        assert!(text.ends_with(":\n\n+1 line"));
    }

    #[test]
    fn test_prompt_lists_conventional_prefixes() {
        for prefix in ["feat:", "fix:", "docs:", "style:", "refactor:", "perf:", "test:", "chore:"] {
            assert!(COMMIT_PROMPT.contains(prefix), "missing {prefix}");
        }
    }
}
