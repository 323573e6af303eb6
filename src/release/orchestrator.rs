//! Release orchestration
//!
//! Drives one release run as a linear state machine: precondition gates
//! first (no mutation, abort freely), then version resolution and operator
//! confirmation, then the mutating phase where every step registers an
//! undo guard before it runs. Remote refs are pushed from easiest to
//! reverse to hardest: the v-prefixed tag, then the branch commits, then
//! the plain version tag. The plain tag triggers downstream automation,
//! so it is the publish point; only after it lands are the guards
//! disarmed.

use crate::core::error::{PreconditionError, RelError, RelResult, ResultExt};
use crate::core::guard::UndoStack;
use crate::core::vcs::{Identity, SystemGit, authenticated_url};
use crate::release::changelog;
use crate::release::freshness::FetchGate;
use crate::release::scripts;
use crate::release::version::{VersionBump, latest_released_version};
use semver::Version;
use std::fs;
use std::path::{Path, PathBuf};

pub const ORIGIN_REMOTE: &str = "origin";
pub const MAIN_BRANCH: &str = "main";
pub const CHANGELOG_REL_PATH: &str = "docs/changelog.md";

/// Operator confirmation, injected so tests can script the answer
pub trait Confirm {
  fn confirm(&mut self, prompt: &str) -> RelResult<bool>;
}

/// Options for one release run
pub struct ReleaseOptions {
  /// Token authenticating fetches and pushes on HTTP remotes
  pub token: String,
  /// Force a major bump instead of changelog-driven inference
  pub bump_major: bool,
}

/// Everything decided before the operator confirms.
///
/// Lives only for the duration of one run; never persisted.
pub struct ReleasePlan {
  pub next_version: Version,
  pub has_breaking_change: bool,
  pub scripts: Vec<PathBuf>,
}

/// Run the full release flow against the repository at `repo_dir`
pub fn run(repo_dir: &Path, options: &ReleaseOptions, confirm: &mut dyn Confirm) -> RelResult<()> {
  println!("Starting release...");
  let git = SystemGit::open(repo_dir)?;

  println!("Reading git identity and remote...");
  let identity = git.global_identity()?;
  if !identity.is_complete() {
    return Err(RelError::Precondition(PreconditionError::MissingIdentity {
      name: identity.name,
      email: identity.email,
    }));
  }
  let remote_url = git.remote_url(ORIGIN_REMOTE)?.ok_or_else(|| {
    RelError::Precondition(PreconditionError::MissingRemote {
      name: ORIGIN_REMOTE.to_string(),
    })
  })?;
  let auth_url = authenticated_url(&remote_url, &options.token);

  println!("Checking that the worktree is clean...");
  let status = git.worktree_status()?;
  if !status.is_empty() {
    return Err(RelError::Precondition(PreconditionError::DirtyWorktree { status }));
  }

  println!("Fetching '{}' if stale...", ORIGIN_REMOTE);
  let fetch_gate = FetchGate::new(git.git_dir());
  if fetch_gate.is_stale() {
    git.fetch(ORIGIN_REMOTE, auth_url.as_deref())?;
    fetch_gate.record_fetch()?;
  }

  let remote_main_rev = format!("{}/{}", ORIGIN_REMOTE, MAIN_BRANCH);
  println!("Checking that '{}' and '{}' are in sync...", MAIN_BRANCH, remote_main_rev);
  let local_main = git.resolve_revision(MAIN_BRANCH)?;
  let remote_main = git.resolve_revision(&remote_main_rev)?;
  if local_main != remote_main {
    return Err(RelError::Precondition(PreconditionError::BranchOutOfSync {
      local: MAIN_BRANCH.to_string(),
      remote: remote_main_rev,
    }));
  }

  println!("Checking out '{}'...", MAIN_BRANCH);
  git.checkout(MAIN_BRANCH)?;

  println!("Validating the changelog...");
  let changelog_path = git.work_tree().join(CHANGELOG_REL_PATH);
  let changelog_text = match fs::read_to_string(&changelog_path) {
    Ok(text) => text,
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
      return Err(RelError::Precondition(PreconditionError::MissingFile {
        path: changelog_path,
      }));
    }
    Err(e) => {
      return Err(RelError::from(e).context(format!("Failed to read changelog at '{}'", changelog_path.display())));
    }
  };
  let has_breaking_change = changelog::scan_pending_section(&changelog_text)?;

  println!("Resolving the next version...");
  let latest = latest_released_version(git.list_tags()?);
  let bump = VersionBump::from_policy(options.bump_major, has_breaking_change);
  let plan = ReleasePlan {
    next_version: bump.apply(&latest),
    has_breaking_change,
    scripts: scripts::load_manifest(git.work_tree())?,
  };

  println!();
  println!("  Latest released version: {}", latest);
  println!("  Next version:            {}", plan.next_version);
  println!("  Breaking change:         {}", if plan.has_breaking_change { "yes" } else { "no" });
  println!("  Pre-release scripts:     {}", plan.scripts.len());

  let prompt = format!(
    "Release new version '{}'? (press ENTER to continue, anything else to abort)",
    plan.next_version
  );
  if !confirm.confirm(&prompt)? {
    println!("Release aborted; nothing was changed.");
    return Ok(());
  }

  let mut undo = UndoStack::new();
  let result = publish(&git, &identity, &plan, auth_url.as_deref(), &remote_main, &changelog_path, &mut undo);
  match result {
    Ok(()) => {
      println!("✅ Released version {}.", plan.next_version);
      Ok(())
    }
    Err(err) => {
      eprintln!("Release failed; undoing completed steps...");
      undo.unwind();
      Err(err)
    }
  }
}

/// The mutating phase: scripts, changelog rewrite, commit, tags, pushes.
///
/// Each step registers its undo before running, so an abort anywhere in
/// here leaves exactly the completed steps to unwind.
fn publish<'a>(
  git: &'a SystemGit,
  identity: &Identity,
  plan: &ReleasePlan,
  auth_url: Option<&'a str>,
  remote_main: &str,
  changelog_path: &Path,
  undo: &mut UndoStack<'a>,
) -> RelResult<()> {
  let version = plan.next_version.to_string();
  let plain_tag = version.clone();
  let v_tag = format!("v{}", version);

  let reset_guard = undo.push(format!("reset '{}' to {}", MAIN_BRANCH, remote_main), {
    let remote_main = remote_main.to_string();
    move || {
      git.reset_hard(&remote_main).map_err(|e| {
        RelError::with_help(
          e.to_string(),
          format!("Run `git reset --hard {}/{}` to undo the local release changes manually.", ORIGIN_REMOTE, MAIN_BRANCH),
        )
      })
    }
  });

  println!("Running pre-release scripts...");
  scripts::run_all(git.work_tree(), &plan.scripts, &version)?;

  println!("Updating the changelog...");
  changelog::rewrite_changelog(changelog_path, &version)?;

  println!("Committing changes locally...");
  git.add_all()?;
  let commit_message = format!("Finalize changes for release version '{}'", version);
  git.commit(&commit_message, identity).context("Failed to create the release commit")?;
  let head = git.head_commit()?;

  println!("Tagging '{}' and '{}'...", plain_tag, v_tag);
  let plain_tag_guard = undo.push(format!("delete local tag '{}'", plain_tag), {
    let tag = plain_tag.clone();
    move || git.delete_local_tag(&tag)
  });
  git.create_tag(&plain_tag, &head)?;

  let v_tag_guard = undo.push(format!("delete local tag '{}'", v_tag), {
    let tag = v_tag.clone();
    move || git.delete_local_tag(&tag)
  });
  git.create_tag(&v_tag, &head)?;

  println!("Pushing tag '{}' to '{}'...", v_tag, ORIGIN_REMOTE);
  let remote_v_tag_guard = undo.push(format!("delete tag '{}' on '{}'", v_tag, ORIGIN_REMOTE), {
    let tag = v_tag.clone();
    move || {
      git.delete_remote_tag(ORIGIN_REMOTE, auth_url, &tag).map_err(|e| {
        RelError::with_help(
          e.to_string(),
          format!("Run `git push --delete {} {}` to remove the tag manually.", ORIGIN_REMOTE, tag),
        )
      })
    }
  });
  git.push_refspec(ORIGIN_REMOTE, auth_url, &format!("refs/tags/{}:refs/tags/{}", v_tag, v_tag))?;

  println!("Pushing release commit to '{}/{}'...", ORIGIN_REMOTE, MAIN_BRANCH);
  let push_warn_guard = undo.push(format!("revert the push to '{}/{}'", ORIGIN_REMOTE, MAIN_BRANCH), move || {
    // Rewinding a remote branch can destroy history that arrived after our
    // push, so this is never attempted automatically.
    Err(RelError::with_help(
      format!("The release commit may already be on '{}/{}' and is not reverted automatically.", ORIGIN_REMOTE, MAIN_BRANCH),
      format!(
        "Fetch '{remote}', verify that '{remote}/{branch}' has no commits you would destroy, then force-push the previous '{branch}' tip manually.",
        remote = ORIGIN_REMOTE,
        branch = MAIN_BRANCH,
      ),
    ))
  });
  git.push_refspec(ORIGIN_REMOTE, auth_url, &format!("refs/heads/{}:refs/heads/{}", MAIN_BRANCH, MAIN_BRANCH))?;

  println!("Pushing tag '{}' to '{}'...", plain_tag, ORIGIN_REMOTE);
  git.push_refspec(ORIGIN_REMOTE, auth_url, &format!("refs/tags/{}:refs/tags/{}", plain_tag, plain_tag))?;

  // Publish point reached: downstream automation may already be running
  // off the plain tag, so every completed step is now kept.
  undo.disarm(reset_guard);
  undo.disarm(plain_tag_guard);
  undo.disarm(v_tag_guard);
  undo.disarm(remote_v_tag_guard);
  undo.disarm(push_warn_guard);

  Ok(())
}
