//! xpocommit - collects pending git changes into one diff for commit message generation.
//!
//! # Overview
//!
//! xpocommit lists staged, unstaged and untracked files through libgit2,
//! drops paths matching user-defined ignore globs, and assembles a single
//! normalized diff. Untracked files get a synthesized `/dev/null` diff so the
//! whole payload follows one textual convention. The diff can then be sent to
//! a text-generation service (Gemini) that returns a commit message.

pub mod config;
pub mod diff;
pub mod error;
pub mod git;
pub mod ignore;
pub mod requester;

// Re-export commonly used types
pub use config::Settings;
pub use diff::{AssembledDiff, DiffOutcome, NoDiffReason, collect_diff};
pub use error::{BackendError, CollectError, ConfigError, QueryStage, RequestError};
pub use git::{ChangeCategory, GitBackend, GitRepo, RepositoryInspector};
pub use ignore::IgnoreMatcher;
pub use requester::{Credential, GeminiClient, MessageRequester};
