//! User-defined ignore patterns.

pub mod glob;

use tracing::debug;

pub use glob::Glob;

/// A compiled set of ignore patterns.
///
/// A path is ignored when any pattern matches it. An empty set ignores nothing.
#[derive(Debug, Clone, Default)]
pub struct IgnoreMatcher {
    globs: Vec<Glob>,
}

impl IgnoreMatcher {
    /// Compile a list of patterns. Blank patterns are dropped.
    pub fn compile<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut globs = Vec::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            if pattern.trim().is_empty() {
                debug!("Skipping blank ignore pattern");
                continue;
            }
            globs.push(Glob::new(pattern));
        }
        Self { globs }
    }

    pub fn is_empty(&self) -> bool {
        self.globs.is_empty()
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.globs.iter().map(Glob::as_str)
    }

    /// Whether `path` is matched by any pattern.
    pub fn matches(&self, path: &str) -> bool {
        self.globs.iter().any(|g| g.is_match(path))
    }

    /// Keep only the items whose path is not ignored, preserving order.
    pub fn filter<T, I>(&self, items: I) -> Vec<T>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        items
            .into_iter()
            .filter(|item| !self.matches(item.as_ref()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_matcher_passes_everything() {
        let matcher = IgnoreMatcher::compile(Vec::<String>::new());
        let input = paths(&["a.js", "src/b.rs", "debug.log"]);
        assert!(matcher.is_empty());
        assert_eq!(matcher.filter(input.clone()), input);
    }

    #[test]
    fn test_filter_removes_matches_in_order() {
        let matcher = IgnoreMatcher::compile(["*.log"]);
        let filtered = matcher.filter(paths(&["debug.log", "readme.md", "z.log", "a.txt"]));
        assert_eq!(filtered, paths(&["readme.md", "a.txt"]));
    }

    #[test]
    fn test_any_pattern_matches() {
        let matcher = IgnoreMatcher::compile(["*.lock", "dist/**"]);
        assert!(matcher.matches("Cargo.lock"));
        assert!(matcher.matches("dist/a/b.js"));
        assert!(!matcher.matches("src/main.rs"));
    }

    #[test]
    fn test_filter_is_idempotent() {
        let matcher = IgnoreMatcher::compile(["*.log", "vendor/**", "src/*.gen.rs"]);
        let input = paths(&[
            "debug.log",
            "vendor/x/y.c",
            "src/a.gen.rs",
            "src/nested/a.gen.rs",
            "README.md",
        ]);
        let once = matcher.filter(input);
        let twice = matcher.filter(once.clone());
        assert_eq!(once, twice);
        assert_eq!(once, paths(&["src/nested/a.gen.rs", "README.md"]));
    }

    #[test]
    fn test_blank_patterns_are_dropped() {
        let matcher = IgnoreMatcher::compile(["", "   ", "*.tmp"]);
        assert_eq!(matcher.patterns().collect::<Vec<_>>(), vec!["*.tmp"]);
        assert!(!matcher.matches(""));
    }

    #[test]
    fn test_windows_style_candidate_paths() {
        let matcher = IgnoreMatcher::compile(["build/**"]);
        assert!(matcher.matches("build\\out\\app.exe"));
    }
}
