//! CLI commands for relcut
//!
//! - **release**: cut a new release on the current repository

pub mod release;

pub use release::run_release;
