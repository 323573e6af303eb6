//! Release command implementation
//!
//! Thin entry point: builds the run options, wires up the interactive
//! confirmation, and hands control to the orchestrator.

use crate::core::error::RelResult;
use crate::release::orchestrator::{self, Confirm, ReleaseOptions};
use std::env;
use std::io::{self, Write};

/// Interactive confirmation on stdin.
///
/// Pressing ENTER (an empty line) confirms; any other input declines.
struct StdinConfirm;

impl Confirm for StdinConfirm {
  fn confirm(&mut self, prompt: &str) -> RelResult<bool> {
    print!("\n{} ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().is_empty())
  }
}

/// Run the release command against the current working directory
pub fn run_release(token: String, bump_major: bool) -> RelResult<()> {
  let cwd = env::current_dir()?;
  let options = ReleaseOptions { token, bump_major };

  orchestrator::run(&cwd, &options, &mut StdinConfirm)
}
