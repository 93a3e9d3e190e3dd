//! Diff fragments and the synthetic new-file format.

use std::fmt;

/// Where a fragment's text came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentSource {
    /// Combined index-vs-HEAD diff for the staged subset.
    Staged,
    /// Combined working-tree-vs-index diff for the unstaged subset.
    Unstaged,
    /// Synthesized fragment for one untracked file.
    Untracked(String),
}

impl fmt::Display for FragmentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FragmentSource::Staged => write!(f, "staged diff"),
            FragmentSource::Unstaged => write!(f, "unstaged diff"),
            FragmentSource::Untracked(path) => write!(f, "new file {path}"),
        }
    }
}

/// One self-contained block of diff text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffFragment {
    pub source: FragmentSource,
    pub text: String,
}

impl DiffFragment {
    /// Wrap backend diff output. Returns `None` when there is nothing but whitespace.
    pub fn from_backend(source: FragmentSource, output: &str) -> Option<Self> {
        let text = output.trim_end();
        if text.trim().is_empty() {
            return None;
        }
        Some(Self {
            source,
            text: text.to_string(),
        })
    }

    /// Build a "file added from nothing" fragment for an untracked file.
    ///
    /// ```text
    /// --- /dev/null
    /// +++ b/<path>
    /// <content, verbatim>
    /// ```
    ///
    /// Content that is not valid UTF-8 is replaced by git's binary notice.
    pub fn new_file(path: &str, content: &[u8]) -> Self {
        let body = match std::str::from_utf8(content) {
            Ok(text) => text.to_string(),
            Err(_) => format!("Binary files /dev/null and b/{path} differ"),
        };
        let text = [String::from("--- /dev/null"), format!("+++ b/{path}"), body].join("\n");
        Self {
            source: FragmentSource::Untracked(path.to_string()),
            text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_file_embeds_content_verbatim() {
        let fragment = DiffFragment::new_file("notes.txt", b"hello\n");
        assert_eq!(fragment.text, "--- /dev/null\n+++ b/notes.txt\nhello\n");
        assert_eq!(
            fragment.source,
            FragmentSource::Untracked("notes.txt".to_string())
        );
    }

    #[test]
    fn test_new_file_empty_content() {
        let fragment = DiffFragment::new_file("empty", b"");
        assert_eq!(fragment.text, "--- /dev/null\n+++ b/empty\n");
    }

    #[test]
    fn test_new_file_binary_content() {
        let fragment = DiffFragment::new_file("logo.png", &[0x89, 0x50, 0xFF, 0xFE]);
        assert_eq!(
            fragment.text,
            "--- /dev/null\n+++ b/logo.png\nBinary files /dev/null and b/logo.png differ"
        );
    }

    #[test]
    fn test_from_backend_trims_trailing_newline_only() {
        let fragment =
            DiffFragment::from_backend(FragmentSource::Staged, "diff --git a/x b/x\n+1\n\n").unwrap();
        assert_eq!(fragment.text, "diff --git a/x b/x\n+1");
    }

    #[test]
    fn test_from_backend_blank_is_none() {
        assert!(DiffFragment::from_backend(FragmentSource::Unstaged, "  \n\n").is_none());
        assert!(DiffFragment::from_backend(FragmentSource::Unstaged, "").is_none());
    }

    #[test]
    fn test_source_display() {
        assert_eq!(FragmentSource::Staged.to_string(), "staged diff");
        assert_eq!(
            FragmentSource::Untracked("a.txt".into()).to_string(),
            "new file a.txt"
        );
    }
}
