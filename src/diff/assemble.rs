//! Merge staged, unstaged and untracked changes into one filtered diff.
//!
//! Each category contributes independently: one combined backend diff for the
//! surviving staged paths, one for the surviving unstaged paths, and one
//! synthesized new-file fragment per surviving untracked path. Fragments are
//! joined with a single newline in that order.

use std::fmt;

use tracing::{debug, info, warn};

use crate::error::{CollectError, QueryStage};
use crate::git::{ChangeCategory, ChangeSets, GitBackend, RepositoryInspector};
use crate::ignore::IgnoreMatcher;

use super::fragment::{DiffFragment, FragmentSource};

/// A pending change tagged with the category it was listed in.
///
/// A path both staged and modified again in the working tree yields two
/// entries, one per category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEntry {
    pub path: String,
    pub category: ChangeCategory,
}

impl AsRef<str> for ChangeEntry {
    fn as_ref(&self) -> &str {
        &self.path
    }
}

/// Why no diff was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoDiffReason {
    /// The repository has no pending changes.
    Clean,
    /// Every pending change matched an ignore pattern.
    AllIgnored { ignored: usize },
    /// Files survived filtering but none produced diff text.
    EmptyOutput,
}

impl fmt::Display for NoDiffReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoDiffReason::Clean => write!(f, "No changes to commit (working tree is clean)"),
            NoDiffReason::AllIgnored { ignored } => write!(
                f,
                "No valid files to commit after ignoring patterns ({ignored} ignored)"
            ),
            NoDiffReason::EmptyOutput => write!(f, "No diff content for the pending changes"),
        }
    }
}

/// The normalized diff payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledDiff {
    pub text: String,
    pub fragments: Vec<DiffFragment>,
    /// Entries that survived ignore filtering.
    pub files: Vec<ChangeEntry>,
}

impl AssembledDiff {
    fn from_fragments(fragments: Vec<DiffFragment>, files: Vec<ChangeEntry>) -> Option<Self> {
        if fragments.is_empty() {
            return None;
        }
        let text = fragments
            .iter()
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        Some(Self {
            text,
            fragments,
            files,
        })
    }
}

/// Result of a collection run that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffOutcome {
    Diff(AssembledDiff),
    NoDiff(NoDiffReason),
}

impl DiffOutcome {
    pub fn into_diff(self) -> Option<AssembledDiff> {
        match self {
            DiffOutcome::Diff(diff) => Some(diff),
            DiffOutcome::NoDiff(_) => None,
        }
    }

    pub fn diff(&self) -> Option<&AssembledDiff> {
        match self {
            DiffOutcome::Diff(diff) => Some(diff),
            DiffOutcome::NoDiff(_) => None,
        }
    }
}

/// Flatten the change sets into tagged entries in category order.
pub fn candidate_entries(change_sets: &ChangeSets) -> Vec<ChangeEntry> {
    change_sets
        .iter()
        .flat_map(|set| {
            set.paths.iter().map(|path| ChangeEntry {
                path: path.clone(),
                category: set.category,
            })
        })
        .collect()
}

fn paths_in(entries: &[ChangeEntry], category: ChangeCategory) -> Vec<String> {
    entries
        .iter()
        .filter(|e| e.category == category)
        .map(|e| e.path.clone())
        .collect()
}

/// Assemble the filtered diff for already-listed change sets.
///
/// The same `matcher` filters every category. `backend` serves the two
/// subset-diff requests and reads untracked file content.
pub async fn assemble<B: GitBackend + ?Sized>(
    change_sets: &ChangeSets,
    matcher: &IgnoreMatcher,
    backend: &B,
) -> Result<DiffOutcome, CollectError> {
    let candidates = candidate_entries(change_sets);
    if candidates.is_empty() {
        return Ok(DiffOutcome::NoDiff(NoDiffReason::Clean));
    }

    let total = candidates.len();
    let files = matcher.filter(candidates);
    if files.is_empty() {
        debug!("All {} candidate file(s) matched ignore patterns", total);
        return Ok(DiffOutcome::NoDiff(NoDiffReason::AllIgnored { ignored: total }));
    }
    if files.len() < total {
        debug!("Ignored {} of {} candidate file(s)", total - files.len(), total);
    }

    let mut fragments = Vec::new();

    let staged = paths_in(&files, ChangeCategory::Staged);
    if !staged.is_empty() {
        let output = backend
            .diff_staged(&staged)
            .await
            .map_err(|e| CollectError::query(QueryStage::DiffStaged, e))?;
        fragments.extend(DiffFragment::from_backend(FragmentSource::Staged, &output));
    }

    let unstaged = paths_in(&files, ChangeCategory::Unstaged);
    if !unstaged.is_empty() {
        let output = backend
            .diff_unstaged(&unstaged)
            .await
            .map_err(|e| CollectError::query(QueryStage::DiffUnstaged, e))?;
        fragments.extend(DiffFragment::from_backend(FragmentSource::Unstaged, &output));
    }

    for path in paths_in(&files, ChangeCategory::Untracked) {
        match backend.read_file(&path).await {
            Ok(content) => fragments.push(DiffFragment::new_file(&path, &content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Untracked file '{}' no longer exists, skipping", path);
            }
            Err(e) => {
                warn!("Cannot read untracked file '{}', skipping: {}", path, e);
            }
        }
    }

    match AssembledDiff::from_fragments(fragments, files) {
        Some(diff) => Ok(DiffOutcome::Diff(diff)),
        None => Ok(DiffOutcome::NoDiff(NoDiffReason::EmptyOutput)),
    }
}

/// Collect the filtered diff of all pending changes in a working tree.
///
/// Fails with [`CollectError::NotARepository`] when the inspector's directory is
/// not a work tree, and with [`CollectError::BackendQueryFailed`] on the first
/// failing query. A clean or fully ignored tree is a [`DiffOutcome::NoDiff`].
pub async fn collect_diff<B: GitBackend>(
    inspector: &RepositoryInspector<B>,
    matcher: &IgnoreMatcher,
) -> Result<DiffOutcome, CollectError> {
    if !inspector.is_repository().await {
        return Err(CollectError::NotARepository(inspector.workdir().to_path_buf()));
    }

    let change_sets = inspector.change_sets().await?;
    info!(
        staged = change_sets.staged.len(),
        unstaged = change_sets.unstaged.len(),
        untracked = change_sets.untracked.len(),
        "Collected pending changes"
    );

    if change_sets.is_empty() {
        return Ok(DiffOutcome::NoDiff(NoDiffReason::Clean));
    }

    let outcome = assemble(&change_sets, matcher, inspector.backend()).await?;
    match &outcome {
        DiffOutcome::Diff(diff) => debug!(
            "Assembled diff: {} fragment(s), {} chars",
            diff.fragments.len(),
            diff.text.len()
        ),
        DiffOutcome::NoDiff(reason) => debug!("No diff: {}", reason),
    }
    Ok(outcome)
}
