//! Fetch staleness gate
//!
//! Releasing against stale remote-tracking refs would let the sync check
//! pass on outdated information, so a fetch is forced unless one happened
//! recently. The last fetch time lives in a sidecar file inside the git
//! control directory as a base-10 Unix timestamp.

use crate::core::error::{RelResult, ResultExt};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

/// Minimum interval between fetches before staleness forces another one
pub const FETCH_GRACE_PERIOD_SECS: i64 = 60;

const LAST_FETCH_FILENAME: &str = "last-fetch.txt";

/// Sidecar-backed decision on whether a fetch is due
pub struct FetchGate {
  sidecar: PathBuf,
}

impl FetchGate {
  pub fn new(git_dir: &Path) -> Self {
    Self {
      sidecar: git_dir.join(LAST_FETCH_FILENAME),
    }
  }

  /// Whether enough time has passed since the last recorded fetch.
  ///
  /// A missing or unreadable timestamp, and a timestamp in the future
  /// (clock skew), both force a fetch.
  pub fn is_stale(&self) -> bool {
    self.is_stale_at(Utc::now().timestamp())
  }

  fn is_stale_at(&self, now: i64) -> bool {
    let Ok(content) = fs::read_to_string(&self.sidecar) else {
      return true;
    };
    let Ok(last_fetched) = content.trim().parse::<i64>() else {
      return true;
    };
    if last_fetched > now {
      return true;
    }
    now >= last_fetched + FETCH_GRACE_PERIOD_SECS
  }

  /// Record that a fetch just happened
  pub fn record_fetch(&self) -> RelResult<()> {
    self.record_fetch_at(Utc::now().timestamp())
  }

  fn record_fetch_at(&self, now: i64) -> RelResult<()> {
    fs::write(&self.sidecar, now.to_string())
      .with_context(|| format!("Failed to write last-fetch timestamp to '{}'", self.sidecar.display()))
  }
}
