//! Error types for xpocommit modules using thiserror.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// The backend query that was running when a collection failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStage {
    ListStaged,
    ListUnstaged,
    ListUntracked,
    DiffStaged,
    DiffUnstaged,
}

impl QueryStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryStage::ListStaged => "list staged files",
            QueryStage::ListUnstaged => "list unstaged files",
            QueryStage::ListUntracked => "list untracked files",
            QueryStage::DiffStaged => "diff staged files",
            QueryStage::DiffUnstaged => "diff unstaged files",
        }
    }
}

impl fmt::Display for QueryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from a single repository query.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("git error: {}", .0.message())]
    Git(#[from] git2::Error),

    #[error("Repository query task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Errors that abort diff collection.
#[derive(Error, Debug)]
pub enum CollectError {
    #[error("Not a git repository: {}", .0.display())]
    NotARepository(PathBuf),

    #[error("Failed to {stage}: {message}")]
    BackendQueryFailed { stage: QueryStage, message: String },
}

impl CollectError {
    /// Wrap a backend failure with the stage that produced it.
    pub fn query(stage: QueryStage, err: BackendError) -> Self {
        let message = match err {
            BackendError::Git(e) => e.message().trim().to_string(),
            other => other.to_string(),
        };
        CollectError::BackendQueryFailed { stage, message }
    }

    /// The failing query stage, if this error came from the backend.
    pub fn stage(&self) -> Option<QueryStage> {
        match self {
            CollectError::BackendQueryFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Errors from the commit message service.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("No API key found. Set XPOCOMMIT_API_KEY or GEMINI_API_KEY.")]
    MissingCredential,

    #[error("Message service rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Message service returned no usable commit message")]
    EmptyResponse,

    #[error("Message service request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Failed to reach message service: {0}")]
    Transport(#[source] reqwest::Error),
}

/// Errors from loading settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
