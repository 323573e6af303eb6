//! Mutating operations for SystemGit (fetch, checkout, commit, tags, push)

use super::system_git::SystemGit;
use crate::core::error::{GitError, RelError, RelResult, ResultExt};
use crate::core::vcs::Identity;

impl SystemGit {
  /// Fetch branch heads from a remote into its remote-tracking refs.
  ///
  /// When `auth_url` is set (token-authenticated HTTP remote), the fetch
  /// targets that URL directly with an explicit refspec so the
  /// remote-tracking refs under the named remote are still updated.
  pub fn fetch(&self, remote: &str, auth_url: Option<&str>) -> RelResult<()> {
    let mut cmd = self.git_cmd();
    match auth_url {
      Some(url) => {
        let refspec = format!("+refs/heads/*:refs/remotes/{}/*", remote);
        cmd.args(["fetch", url, &refspec]);
      }
      None => {
        cmd.args(["fetch", remote]);
      }
    }

    let output = cmd.output().context("Failed to run git fetch")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(RelError::Git(GitError::CommandFailed {
        command: format!("git fetch {}", remote),
        stderr: stderr.to_string(),
      }));
    }

    Ok(())
  }

  /// Checkout a branch
  pub fn checkout(&self, branch: &str) -> RelResult<()> {
    let output = self
      .git_cmd()
      .args(["checkout", branch])
      .output()
      .context("Failed to checkout branch")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(RelError::Git(GitError::CommandFailed {
        command: format!("git checkout {}", branch),
        stderr: stderr.to_string(),
      }));
    }

    Ok(())
  }

  /// Stage all changes. System git consumes `.gitignore` natively, so
  /// ignored files never enter the release commit.
  pub fn add_all(&self) -> RelResult<()> {
    let output = self
      .git_cmd()
      .args(["add", "-A"])
      .output()
      .context("Failed to stage changes")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(RelError::Git(GitError::CommandFailed {
        command: "git add -A".to_string(),
        stderr: stderr.to_string(),
      }));
    }

    Ok(())
  }

  /// Create a commit with an explicit author identity
  pub fn commit(&self, message: &str, identity: &Identity) -> RelResult<()> {
    let output = self
      .git_cmd()
      .arg("-c")
      .arg(format!("user.name={}", identity.name))
      .arg("-c")
      .arg(format!("user.email={}", identity.email))
      .args(["commit", "-m", message])
      .output()
      .context("Failed to create commit")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(RelError::Git(GitError::CommandFailed {
        command: "git commit".to_string(),
        stderr: stderr.to_string(),
      }));
    }

    Ok(())
  }

  /// Create a lightweight tag pointing at a commit
  pub fn create_tag(&self, name: &str, target: &str) -> RelResult<()> {
    let output = self
      .git_cmd()
      .args(["tag", name, target])
      .output()
      .with_context(|| format!("Failed to create tag '{}'", name))?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(RelError::Git(GitError::CommandFailed {
        command: format!("git tag {}", name),
        stderr: stderr.to_string(),
      }));
    }

    Ok(())
  }

  /// Delete a local tag.
  ///
  /// Deleting a tag that does not exist is treated as success so undo
  /// actions stay idempotent when the forward step never ran.
  pub fn delete_local_tag(&self, name: &str) -> RelResult<()> {
    let output = self
      .git_cmd()
      .args(["tag", "-d", name])
      .output()
      .with_context(|| format!("Failed to delete tag '{}'", name))?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not found") {
        return Ok(());
      }
      return Err(RelError::Git(GitError::CommandFailed {
        command: format!("git tag -d {}", name),
        stderr: stderr.to_string(),
      }));
    }

    Ok(())
  }

  /// Push a single refspec to a remote (or directly to an authenticated URL)
  pub fn push_refspec(&self, remote: &str, auth_url: Option<&str>, refspec: &str) -> RelResult<()> {
    let destination = auth_url.unwrap_or(remote);
    let output = self
      .git_cmd()
      .args(["push", destination, refspec])
      .output()
      .context("Failed to run git push")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(RelError::Git(GitError::PushFailed {
        remote: remote.to_string(),
        refspec: refspec.to_string(),
        reason: stderr.to_string(),
      }));
    }

    Ok(())
  }

  /// Delete a tag on the remote by pushing an empty refspec
  pub fn delete_remote_tag(&self, remote: &str, auth_url: Option<&str>, tag: &str) -> RelResult<()> {
    self.push_refspec(remote, auth_url, &format!(":refs/tags/{}", tag))
  }

  /// Hard-reset the worktree to a commit
  pub fn reset_hard(&self, commit: &str) -> RelResult<()> {
    let output = self
      .git_cmd()
      .args(["reset", "--hard", commit])
      .output()
      .context("Failed to reset worktree")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(RelError::Git(GitError::CommandFailed {
        command: format!("git reset --hard {}", commit),
        stderr: stderr.to_string(),
      }));
    }

    Ok(())
  }
}
