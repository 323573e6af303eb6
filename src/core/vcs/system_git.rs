//! System git backend for the release flow
//!
//! Uses the system `git` binary through subprocesses with an isolated
//! environment, so user aliases and exotic config cannot change the
//! meaning of a release. Read-side operations live here; mutating
//! operations (fetch, commit, tag, push, reset) are in `system_git_ops`.

use crate::core::error::{GitError, RelError, RelResult, ResultExt};
use crate::core::vcs::Identity;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Git backend using system git
pub struct SystemGit {
  /// Working tree root
  work_tree: PathBuf,

  /// Git control directory (`.git`), absolute
  git_dir: PathBuf,
}

impl SystemGit {
  /// Open a git repository at or above `path`
  pub fn open(path: &Path) -> RelResult<Self> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel", "--absolute-git-dir"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") {
        return Err(RelError::Git(GitError::RepoNotFound {
          path: path.to_path_buf(),
        }));
      }
      return Err(RelError::message(format!("Failed to open git repository: {}", stderr)));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut lines = stdout.lines();
    let work_tree = lines
      .next()
      .ok_or_else(|| RelError::message("git rev-parse returned no worktree path"))?;
    let git_dir = lines
      .next()
      .ok_or_else(|| RelError::message("git rev-parse returned no git directory path"))?;

    Ok(Self {
      work_tree: PathBuf::from(work_tree),
      git_dir: PathBuf::from(git_dir),
    })
  }

  /// Working tree root
  pub fn work_tree(&self) -> &Path {
    &self.work_tree
  }

  /// Git control directory
  pub fn git_dir(&self) -> &Path {
    &self.git_dir
  }

  /// Read the global git identity (name and email).
  ///
  /// Unset values come back as empty strings; completeness is checked by
  /// the caller so it can report both fields at once.
  pub fn global_identity(&self) -> RelResult<Identity> {
    Ok(Identity {
      name: self.read_global_config("user.name")?,
      email: self.read_global_config("user.email")?,
    })
  }

  fn read_global_config(&self, key: &str) -> RelResult<String> {
    let output = self
      .git_cmd()
      .args(["config", "--global", "--get", key])
      .output()
      .with_context(|| format!("Failed to read global git config '{}'", key))?;

    // git exits 1 when the key is unset; treat that as empty
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// URL of a configured remote
  pub fn remote_url(&self, remote: &str) -> RelResult<Option<String>> {
    let output = self
      .git_cmd()
      .args(["remote", "get-url", remote])
      .output()
      .context("Failed to read remote URL")?;

    if !output.status.success() {
      return Ok(None);
    }

    Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string()))
  }

  /// Porcelain worktree status; empty means clean
  pub fn worktree_status(&self) -> RelResult<String> {
    let output = self
      .git_cmd()
      .args(["status", "--porcelain"])
      .output()
      .context("Failed to read worktree status")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(RelError::Git(GitError::CommandFailed {
        command: "git status --porcelain".to_string(),
        stderr: stderr.to_string(),
      }));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
  }

  /// Resolve a revision (branch name, remote-tracking ref, HEAD) to a commit SHA
  pub fn resolve_revision(&self, revision: &str) -> RelResult<String> {
    let output = self
      .git_cmd()
      .args(["rev-parse", "--verify", &format!("{}^{{commit}}", revision)])
      .output()
      .with_context(|| format!("Failed to resolve revision '{}'", revision))?;

    if !output.status.success() {
      return Err(RelError::Git(GitError::RevisionNotFound {
        revision: revision.to_string(),
      }));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Commit SHA of HEAD
  pub fn head_commit(&self) -> RelResult<String> {
    self.resolve_revision("HEAD")
  }

  /// All tag names in the repository
  pub fn list_tags(&self) -> RelResult<Vec<String>> {
    let output = self
      .git_cmd()
      .args(["tag", "--list"])
      .output()
      .context("Failed to list tags")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(RelError::Git(GitError::CommandFailed {
        command: "git tag --list".to_string(),
        stderr: stderr.to_string(),
      }));
    }

    let tags = String::from_utf8_lossy(&output.stdout)
      .lines()
      .map(|s| s.trim().to_string())
      .filter(|s| !s.is_empty())
      .collect();

    Ok(tags)
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to the worktree root
  /// - Clears environment variables, whitelisting only PATH and HOME
  /// - Adds safe configuration overrides
  pub(crate) fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(&self.work_tree);

    // Isolated environment (don't trust ambient variables)
    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }

    // Force safe behavior (override user config)
    cmd.arg("-c").arg("protocol.version=2");
    cmd.arg("-c").arg("advice.detachedHead=false");
    cmd.arg("-c").arg("core.quotePath=false");

    cmd
  }
}
