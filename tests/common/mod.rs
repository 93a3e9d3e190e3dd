//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use git2::{Oid, Repository, Signature};

use xpocommit::git::{GitRepo, RepositoryInspector};

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Get the test signature for commits.
    fn signature(&self) -> Signature<'_> {
        Signature::now("Test User", "test@example.com").expect("Failed to create signature")
    }

    /// Write a file (creating parent directories) without staging it.
    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Stage a file's current content.
    pub fn stage(&self, rel: &str) {
        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(Path::new(rel)).expect("Failed to add file");
        index.write().expect("Failed to write index");
    }

    /// Write and stage a file in one step.
    pub fn write_staged(&self, rel: &str, content: &str) {
        self.write(rel, content);
        self.stage(rel);
    }

    /// Move a tracked file and stage the move, like `git mv`.
    pub fn move_staged(&self, from: &str, to: &str) {
        let root = self.dir.path();
        std::fs::rename(root.join(from), root.join(to)).expect("Failed to move file");
        let mut index = self.repo.index().expect("Failed to get index");
        index.remove_path(Path::new(from)).expect("Failed to remove old path");
        index.add_path(Path::new(to)).expect("Failed to add new path");
        index.write().expect("Failed to write index");
    }

    /// Commit whatever is currently staged. Returns the commit OID.
    pub fn commit(&self, message: &str) -> Oid {
        let sig = self.signature();
        let mut index = self.repo.index().expect("Failed to get index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Create and commit a set of files: `(path, content)` pairs.
    pub fn commit_files(&self, files: &[(&str, &str)], message: &str) -> Oid {
        for (rel, content) in files {
            self.write_staged(rel, content);
        }
        self.commit(message)
    }

    /// Build an inspector over this repository.
    pub fn inspector(&self) -> RepositoryInspector<GitRepo> {
        self.inspector_at(self.dir.path())
    }

    /// Build an inspector started from `dir` (may be a subdirectory).
    pub fn inspector_at(&self, dir: &Path) -> RepositoryInspector<GitRepo> {
        let backend = GitRepo::discover(dir);
        RepositoryInspector::new(backend, dir)
    }
}
