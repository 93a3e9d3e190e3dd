//! Diff collection and normalization.

pub mod assemble;
pub mod fragment;

pub use assemble::{
    AssembledDiff, ChangeEntry, DiffOutcome, NoDiffReason, assemble, candidate_entries,
    collect_diff,
};
pub use fragment::{DiffFragment, FragmentSource};
