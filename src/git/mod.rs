//! Repository inspection through libgit2.

pub mod backend;
pub mod inspector;

pub use backend::{GitBackend, GitRepo};
pub use inspector::{ChangeCategory, ChangeSet, ChangeSets, RepositoryInspector};
