//! Change-set queries over a [`GitBackend`].

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{CollectError, QueryStage};

use super::backend::GitBackend;

/// Which of the three pending-change sources a path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChangeCategory {
    Staged,
    Unstaged,
    Untracked,
}

impl ChangeCategory {
    /// Categories in assembly order.
    pub const ALL: [ChangeCategory; 3] = [
        ChangeCategory::Staged,
        ChangeCategory::Unstaged,
        ChangeCategory::Untracked,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeCategory::Staged => "staged",
            ChangeCategory::Unstaged => "unstaged",
            ChangeCategory::Untracked => "untracked",
        }
    }

    fn list_stage(&self) -> QueryStage {
        match self {
            ChangeCategory::Staged => QueryStage::ListStaged,
            ChangeCategory::Unstaged => QueryStage::ListUnstaged,
            ChangeCategory::Untracked => QueryStage::ListUntracked,
        }
    }
}

impl fmt::Display for ChangeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered, de-duplicated paths from one listing query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    pub category: ChangeCategory,
    pub paths: Vec<String>,
}

impl ChangeSet {
    pub fn new(category: ChangeCategory, paths: Vec<String>) -> Self {
        Self { category, paths }
    }

    /// Build a change set from a backend listing.
    ///
    /// Empty entries and repeats are dropped; the first occurrence keeps its
    /// position. Entries are otherwise kept byte for byte, since leading or
    /// trailing spaces are legal in file names.
    pub fn from_paths<I>(category: ChangeCategory, listing: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut seen = HashSet::new();
        let paths = listing
            .into_iter()
            .filter(|p| !p.is_empty() && seen.insert(p.clone()))
            .collect();
        Self { category, paths }
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }
}

/// All three change sets for one collection run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSets {
    pub staged: ChangeSet,
    pub unstaged: ChangeSet,
    pub untracked: ChangeSet,
}

impl ChangeSets {
    pub fn new(staged: Vec<String>, unstaged: Vec<String>, untracked: Vec<String>) -> Self {
        Self {
            staged: ChangeSet::new(ChangeCategory::Staged, staged),
            unstaged: ChangeSet::new(ChangeCategory::Unstaged, unstaged),
            untracked: ChangeSet::new(ChangeCategory::Untracked, untracked),
        }
    }

    /// The sets in assembly order.
    pub fn iter(&self) -> impl Iterator<Item = &ChangeSet> {
        [&self.staged, &self.unstaged, &self.untracked].into_iter()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().all(ChangeSet::is_empty)
    }
}

/// Read-only view of a working tree's pending changes.
pub struct RepositoryInspector<B> {
    backend: B,
    workdir: PathBuf,
}

impl<B: GitBackend> RepositoryInspector<B> {
    pub fn new(backend: B, workdir: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            workdir: workdir.into(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Whether the working directory is a git work tree.
    ///
    /// Any backend failure counts as "not a repository".
    pub async fn is_repository(&self) -> bool {
        match self.backend.is_work_tree().await {
            Ok(inside) => inside,
            Err(e) => {
                debug!("Work tree check failed for {}: {}", self.workdir.display(), e);
                false
            }
        }
    }

    pub async fn staged(&self) -> Result<ChangeSet, CollectError> {
        self.query(ChangeCategory::Staged).await
    }

    pub async fn unstaged(&self) -> Result<ChangeSet, CollectError> {
        self.query(ChangeCategory::Unstaged).await
    }

    pub async fn untracked(&self) -> Result<ChangeSet, CollectError> {
        self.query(ChangeCategory::Untracked).await
    }

    /// Query all three sets in order, stopping at the first failure.
    pub async fn change_sets(&self) -> Result<ChangeSets, CollectError> {
        let staged = self.staged().await?;
        let unstaged = self.unstaged().await?;
        let untracked = self.untracked().await?;
        Ok(ChangeSets {
            staged,
            unstaged,
            untracked,
        })
    }

    async fn query(&self, category: ChangeCategory) -> Result<ChangeSet, CollectError> {
        let listing = match category {
            ChangeCategory::Staged => self.backend.list_staged().await,
            ChangeCategory::Unstaged => self.backend.list_unstaged().await,
            ChangeCategory::Untracked => self.backend.list_untracked().await,
        }
        .map_err(|e| CollectError::query(category.list_stage(), e))?;

        let set = ChangeSet::from_paths(category, listing);
        debug!("{} {} file(s)", set.len(), category);
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;
    use crate::git::backend::MockGitBackend;

    fn failure(message: &str) -> BackendError {
        BackendError::Git(git2::Error::from_str(message))
    }

    fn owned(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_from_paths_drops_blanks_and_repeats() {
        let set = ChangeSet::from_paths(
            ChangeCategory::Staged,
            owned(&["src/a.rs", "", "src/b.rs", "src/a.rs"]),
        );
        assert_eq!(set.paths, vec!["src/a.rs", "src/b.rs"]);
    }

    #[test]
    fn test_from_paths_keeps_names_verbatim() {
        let set = ChangeSet::from_paths(
            ChangeCategory::Untracked,
            owned(&[" padded.txt", "say \"hi\".txt", "tab\there.txt"]),
        );
        assert_eq!(set.paths, vec![" padded.txt", "say \"hi\".txt", "tab\there.txt"]);
    }

    #[test]
    fn test_from_paths_empty() {
        let set = ChangeSet::from_paths(ChangeCategory::Untracked, Vec::new());
        assert!(set.is_empty());
    }

    #[test]
    fn test_substring_paths_stay_distinct() {
        let set = ChangeSet::from_paths(
            ChangeCategory::Unstaged,
            owned(&["a.js", "src/a.js", "a.json"]),
        );
        assert_eq!(set.paths, vec!["a.js", "src/a.js", "a.json"]);
    }

    #[test]
    fn test_from_paths_large_listing() {
        let listing: Vec<String> = (0..20_000).map(|i| format!("f{}", i % 10_000)).collect();
        let set = ChangeSet::from_paths(ChangeCategory::Untracked, listing);
        assert_eq!(set.len(), 10_000);
        assert_eq!(set.paths[9_999], "f9999");
    }

    #[tokio::test]
    async fn test_is_repository_soft_fails() {
        let mut backend = MockGitBackend::new();
        backend
            .expect_is_work_tree()
            .returning(|| Err(failure("could not find repository")));

        let inspector = RepositoryInspector::new(backend, "/tmp");
        assert!(!inspector.is_repository().await);
    }

    #[tokio::test]
    async fn test_is_repository_false_inside_git_dir() {
        let mut backend = MockGitBackend::new();
        backend.expect_is_work_tree().returning(|| Ok(false));

        let inspector = RepositoryInspector::new(backend, "/repo/.git");
        assert!(!inspector.is_repository().await);
    }

    #[tokio::test]
    async fn test_change_sets_parses_each_category() {
        let mut backend = MockGitBackend::new();
        backend
            .expect_list_staged()
            .returning(|| Ok(owned(&["a.js"])));
        backend
            .expect_list_unstaged()
            .returning(|| Ok(owned(&["a.js", "b.js"])));
        backend
            .expect_list_untracked()
            .returning(|| Ok(owned(&["notes.txt"])));

        let inspector = RepositoryInspector::new(backend, "/repo");
        let sets = inspector.change_sets().await.unwrap();

        assert_eq!(sets.staged.paths, vec!["a.js"]);
        assert_eq!(sets.unstaged.paths, vec!["a.js", "b.js"]);
        assert_eq!(sets.untracked.paths, vec!["notes.txt"]);
        assert_eq!(sets.untracked.category, ChangeCategory::Untracked);
    }

    #[tokio::test]
    async fn test_staged_failure_stops_before_later_queries() {
        let mut backend = MockGitBackend::new();
        backend
            .expect_list_staged()
            .times(1)
            .returning(|| Err(failure("index file corrupt")));
        backend.expect_list_unstaged().never();
        backend.expect_list_untracked().never();

        let inspector = RepositoryInspector::new(backend, "/repo");
        let err = inspector.change_sets().await.unwrap_err();

        assert_eq!(err.stage(), Some(QueryStage::ListStaged));
        assert!(err.to_string().contains("index file corrupt"));
    }

    #[tokio::test]
    async fn test_untracked_failure_names_its_stage() {
        let mut backend = MockGitBackend::new();
        backend.expect_list_staged().returning(|| Ok(Vec::new()));
        backend.expect_list_unstaged().returning(|| Ok(Vec::new()));
        backend
            .expect_list_untracked()
            .returning(|| Err(failure("failed to stat 'locked/'")));

        let inspector = RepositoryInspector::new(backend, "/repo");
        let err = inspector.change_sets().await.unwrap_err();
        assert_eq!(err.stage(), Some(QueryStage::ListUntracked));
    }

    #[test]
    fn test_change_sets_iterate_in_order() {
        let sets = ChangeSets::new(vec!["a".into()], vec![], vec!["c".into()]);
        let order: Vec<ChangeCategory> = sets.iter().map(|s| s.category).collect();
        assert_eq!(order, ChangeCategory::ALL.to_vec());
        assert!(!sets.is_empty());
        assert!(ChangeSets::new(vec![], vec![], vec![]).is_empty());
    }
}
