//! Core building blocks for the release flow
//!
//! - **error**: error taxonomy with contextual help messages and exit codes
//! - **guard**: guarded undo actions for partially irreversible operations
//! - **vcs**: git operations abstraction (SystemGit)

pub mod error;
pub mod guard;
pub mod vcs;
