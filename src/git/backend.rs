//! The repository query surface used by the inspector and assembler.
//!
//! [`GitRepo`] reads the repository through libgit2. Every call opens the
//! repository on a blocking worker thread, so the async callers never hold a
//! `git2::Repository` across an await point.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use git2::{Delta, Diff, DiffFormat, DiffOptions, ErrorCode, Repository, Tree};
use tracing::{debug, warn};

use crate::error::BackendError;

/// Read-only queries against a working tree.
///
/// Listing queries return paths relative to the work-tree root, exactly as
/// stored (no quoting or escaping). Diff queries take an explicit path
/// allowlist; each path is matched literally.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GitBackend: Send + Sync {
    /// Whether the backend is rooted in a non-bare git work tree.
    async fn is_work_tree(&self) -> Result<bool, BackendError>;

    /// Files that differ between the index and HEAD.
    async fn list_staged(&self) -> Result<Vec<String>, BackendError>;

    /// Tracked files that differ between the working tree and the index.
    async fn list_unstaged(&self) -> Result<Vec<String>, BackendError>;

    /// Files that are neither tracked nor ignored.
    async fn list_untracked(&self) -> Result<Vec<String>, BackendError>;

    /// Index-vs-HEAD patch for exactly `paths`.
    async fn diff_staged(&self, paths: &[String]) -> Result<String, BackendError>;

    /// Working-tree-vs-index patch for exactly `paths`.
    async fn diff_unstaged(&self, paths: &[String]) -> Result<String, BackendError>;

    /// Current content of an untracked entry, relative to the work tree root.
    ///
    /// A symlink yields its target path, not the pointee. Anything that is
    /// neither a regular file nor a symlink is an `InvalidInput` error.
    async fn read_file(&self, path: &str) -> io::Result<Vec<u8>>;
}

/// [`GitBackend`] backed by libgit2.
#[derive(Debug, Clone)]
pub struct GitRepo {
    root: PathBuf,
}

impl GitRepo {
    /// Create a backend for a work tree whose top level is `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a backend rooted at the top level of the work tree containing `dir`.
    ///
    /// All queries report paths relative to the top level, so starting from a
    /// subdirectory still produces root-relative paths. If `dir` is not inside
    /// a work tree, the backend stays at `dir` and [`GitBackend::is_work_tree`]
    /// reports `false`.
    pub fn discover(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        match Repository::discover(&dir) {
            Ok(repo) => match repo.workdir() {
                Some(workdir) => {
                    debug!("Resolved work tree root: {}", workdir.display());
                    Self::new(workdir)
                }
                None => {
                    debug!("Repository at {} is bare", repo.path().display());
                    Self::new(dir)
                }
            },
            Err(e) => {
                debug!("No repository found from {}: {}", dir.display(), e.message());
                Self::new(dir)
            }
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Open the repository on a blocking thread and run `op` against it.
    async fn with_repo<T, F>(&self, op: F) -> Result<T, BackendError>
    where
        T: Send + 'static,
        F: FnOnce(&Repository) -> Result<T, git2::Error> + Send + 'static,
    {
        let root = self.root.clone();
        let result = tokio::task::spawn_blocking(move || {
            let repo = Repository::open(&root)?;
            op(&repo)
        })
        .await?;
        Ok(result?)
    }
}

/// HEAD's tree, or `None` on an unborn branch.
fn resolve_head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, git2::Error> {
    match repo.head() {
        Ok(head) => head.peel_to_tree().map(Some),
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Options restricting a diff to exactly `paths`, compared literally.
///
/// libgit2 never pairs deletes and adds into renames unless asked
/// (`Diff::find_similar`), so a moved file shows up as both of its paths.
fn literal_paths(paths: &[String]) -> DiffOptions {
    let mut opts = DiffOptions::new();
    opts.disable_pathspec_match(true);
    for path in paths {
        opts.pathspec(path.as_str());
    }
    opts
}

/// Paths touched by the deltas of `diff` that pass `keep`, in diff order.
fn delta_paths(diff: &Diff<'_>, keep: impl Fn(Delta) -> bool) -> Vec<String> {
    let mut paths = Vec::new();
    for delta in diff.deltas().filter(|d| keep(d.status())) {
        let Some(path) = delta.new_file().path().or(delta.old_file().path()) else {
            continue;
        };
        match path.to_str() {
            Some(p) => paths.push(p.to_string()),
            None => warn!("Skipping path that is not valid UTF-8: {}", path.display()),
        }
    }
    paths
}

/// Render `diff` as unified patch text.
fn patch_text(diff: &Diff<'_>) -> Result<String, git2::Error> {
    let mut text = String::new();
    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        let origin = line.origin();
        if matches!(origin, '+' | '-' | ' ') {
            text.push(origin);
        }
        text.push_str(&String::from_utf8_lossy(line.content()));
        true
    })?;
    Ok(text)
}

fn staged_diff<'r>(repo: &'r Repository, opts: &mut DiffOptions) -> Result<Diff<'r>, git2::Error> {
    let head_tree = resolve_head_tree(repo)?;
    repo.diff_tree_to_index(head_tree.as_ref(), None, Some(opts))
}

#[async_trait]
impl GitBackend for GitRepo {
    async fn is_work_tree(&self) -> Result<bool, BackendError> {
        let root = self.root.clone();
        let result = tokio::task::spawn_blocking(move || match Repository::open(&root) {
            Ok(repo) => Ok(!repo.is_bare()),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(false),
            Err(e) => Err(e),
        })
        .await?;
        Ok(result?)
    }

    async fn list_staged(&self) -> Result<Vec<String>, BackendError> {
        self.with_repo(|repo| {
            let diff = staged_diff(repo, &mut DiffOptions::new())?;
            Ok(delta_paths(&diff, |_| true))
        })
        .await
    }

    async fn list_unstaged(&self) -> Result<Vec<String>, BackendError> {
        self.with_repo(|repo| {
            let diff = repo.diff_index_to_workdir(None, None)?;
            Ok(delta_paths(&diff, |_| true))
        })
        .await
    }

    async fn list_untracked(&self) -> Result<Vec<String>, BackendError> {
        self.with_repo(|repo| {
            let mut opts = DiffOptions::new();
            opts.include_untracked(true).recurse_untracked_dirs(true);
            let diff = repo.diff_index_to_workdir(None, Some(&mut opts))?;
            Ok(delta_paths(&diff, |status| status == Delta::Untracked))
        })
        .await
    }

    async fn diff_staged(&self, paths: &[String]) -> Result<String, BackendError> {
        if paths.is_empty() {
            return Ok(String::new());
        }
        let paths = paths.to_vec();
        self.with_repo(move |repo| {
            let diff = staged_diff(repo, &mut literal_paths(&paths))?;
            patch_text(&diff)
        })
        .await
    }

    async fn diff_unstaged(&self, paths: &[String]) -> Result<String, BackendError> {
        if paths.is_empty() {
            return Ok(String::new());
        }
        let paths = paths.to_vec();
        self.with_repo(move |repo| {
            let diff = repo.diff_index_to_workdir(None, Some(&mut literal_paths(&paths)))?;
            patch_text(&diff)
        })
        .await
    }

    async fn read_file(&self, path: &str) -> io::Result<Vec<u8>> {
        let full = self.root.join(path);
        let file_type = tokio::fs::symlink_metadata(&full).await?.file_type();

        if file_type.is_symlink() {
            let target = tokio::fs::read_link(&full).await?;
            return Ok(target.to_string_lossy().into_owned().into_bytes());
        }
        if !file_type.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{path}' is not a regular file"),
            ));
        }
        tokio::fs::read(&full).await
    }
}
