//! End-to-end tests for `relcut release`

use crate::helpers::{SEED_CHANGELOG, TEST_TOKEN, TestRepo};
use anyhow::Result;

const CONFIRM: &str = "\n";
const DECLINE: &str = "no\n";

#[test]
fn test_release_happy_path_patch_bump() -> Result<()> {
  let repo = TestRepo::new()?;

  let output = repo.run_relcut(&["release", TEST_TOKEN], CONFIRM)?;
  assert!(
    output.status.success(),
    "release failed:\nstdout: {}\nstderr: {}",
    String::from_utf8_lossy(&output.stdout),
    String::from_utf8_lossy(&output.stderr)
  );

  // Both tags exist locally and on the remote
  let local_tags = repo.local_tags()?;
  assert!(local_tags.contains(&"0.1.1".to_string()), "local tags: {:?}", local_tags);
  assert!(local_tags.contains(&"v0.1.1".to_string()), "local tags: {:?}", local_tags);
  let remote_tags = repo.remote_tags()?;
  assert!(remote_tags.contains(&"0.1.1".to_string()), "remote tags: {:?}", remote_tags);
  assert!(remote_tags.contains(&"v0.1.1".to_string()), "remote tags: {:?}", remote_tags);

  // The release commit is on both main branches
  assert_eq!(repo.head_subject()?, "Finalize changes for release version '0.1.1'");
  assert_eq!(repo.head_sha()?, repo.remote_main_sha()?);

  // The changelog's second section header is the released version, with
  // the former pending body beneath it
  let changelog = repo.read_changelog()?;
  assert!(changelog.starts_with("# TBD\n\n# 0.1.1\n"), "changelog:\n{}", changelog);
  assert!(changelog.contains("- first pending note"));
  assert!(changelog.contains("# 0.1.0"));

  // The fetch timestamp sidecar was recorded
  let sidecar = std::fs::read_to_string(repo.path.join(".git/last-fetch.txt"))?;
  assert!(sidecar.trim().parse::<u64>().is_ok(), "sidecar: {:?}", sidecar);

  Ok(())
}

#[test]
fn test_release_breaking_change_bumps_minor() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.set_changelog("# TBD\n\n## Breaking changes\n\n- renamed the config file\n\n# 0.1.0\n\n- initial release\n")?;

  let output = repo.run_relcut(&["release", TEST_TOKEN], CONFIRM)?;
  assert!(output.status.success());

  let local_tags = repo.local_tags()?;
  assert!(local_tags.contains(&"0.2.0".to_string()), "local tags: {:?}", local_tags);
  assert!(local_tags.contains(&"v0.2.0".to_string()), "local tags: {:?}", local_tags);

  Ok(())
}

#[test]
fn test_release_bump_major_flag_overrides_changelog() -> Result<()> {
  let repo = TestRepo::new()?;

  let output = repo.run_relcut(&["release", TEST_TOKEN, "--bump-major"], CONFIRM)?;
  assert!(output.status.success());

  let local_tags = repo.local_tags()?;
  assert!(local_tags.contains(&"1.0.0".to_string()), "local tags: {:?}", local_tags);
  assert!(local_tags.contains(&"v1.0.0".to_string()), "local tags: {:?}", local_tags);

  Ok(())
}

#[test]
fn test_release_resolves_latest_tag_among_noise() -> Result<()> {
  let repo = TestRepo::new()?;
  // Noise tags must not affect resolution; 0.9.0 should win over 0.1.0
  repo.git(&["tag", "0.9.0"])?;
  repo.git(&["tag", "v4.0.0"])?;
  repo.git(&["tag", "nightly"])?;
  repo.git(&["tag", "2.0"])?;

  let output = repo.run_relcut(&["release", TEST_TOKEN], CONFIRM)?;
  assert!(output.status.success());

  assert!(repo.local_tags()?.contains(&"0.9.1".to_string()));

  Ok(())
}

#[test]
fn test_release_declined_confirmation_changes_nothing() -> Result<()> {
  let repo = TestRepo::new()?;
  let before_sha = repo.head_sha()?;

  let output = repo.run_relcut(&["release", TEST_TOKEN], DECLINE)?;
  assert!(output.status.success(), "declining must exit cleanly");
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("aborted"), "stdout: {}", stdout);

  assert_eq!(repo.head_sha()?, before_sha);
  assert_eq!(repo.local_tags()?, vec!["0.1.0".to_string()]);
  assert_eq!(repo.read_changelog()?, SEED_CHANGELOG);

  Ok(())
}

#[test]
fn test_release_dirty_worktree_aborts_before_mutation() -> Result<()> {
  let repo = TestRepo::new()?;
  std::fs::write(repo.path.join("uncommitted.txt"), "work in progress\n")?;

  let output = repo.run_relcut(&["release", TEST_TOKEN], CONFIRM)?;
  assert_eq!(output.status.code(), Some(3));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("clean"), "stderr: {}", stderr);

  assert_eq!(repo.local_tags()?, vec!["0.1.0".to_string()]);

  Ok(())
}

#[test]
fn test_release_out_of_sync_branches_abort() -> Result<()> {
  let repo = TestRepo::new()?;

  // Put a commit on the remote that the local branch does not have
  std::fs::write(repo.path.join("README.md"), "# widget\n\nUpdated elsewhere.\n")?;
  repo.commit_all_and_push("Update readme")?;
  repo.git(&["reset", "--hard", "HEAD~1"])?;

  let output = repo.run_relcut(&["release", TEST_TOKEN], CONFIRM)?;
  assert_eq!(output.status.code(), Some(3));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("not in sync"), "stderr: {}", stderr);

  assert_eq!(repo.local_tags()?, vec!["0.1.0".to_string()]);

  Ok(())
}

#[test]
fn test_release_missing_changelog_aborts() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.git(&["rm", "docs/changelog.md"])?;
  repo.commit_all_and_push("Drop changelog")?;

  let output = repo.run_relcut(&["release", TEST_TOKEN], CONFIRM)?;
  assert_eq!(output.status.code(), Some(3));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("changelog.md"), "stderr: {}", stderr);

  Ok(())
}

#[test]
fn test_release_empty_pending_section_aborts() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.set_changelog("# TBD\n\n\n# 0.1.0\n\n- initial release\n")?;

  let output = repo.run_relcut(&["release", TEST_TOKEN], CONFIRM)?;
  assert_eq!(output.status.code(), Some(1));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("no pending entries"), "stderr: {}", stderr);

  Ok(())
}

#[cfg(unix)]
#[test]
fn test_release_script_failure_unwinds_everything() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.add_script("veto.sh", "#!/bin/sh\necho 'release blocked: manifest drift' >&2\nexit 1\n")?;
  let before_sha = repo.commit_all_and_push("Add veto script")?;

  let output = repo.run_relcut(&["release", TEST_TOKEN], CONFIRM)?;
  assert_eq!(output.status.code(), Some(3));

  // The script's stderr is surfaced verbatim
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("release blocked: manifest drift"), "stderr: {}", stderr);

  // Nothing was committed, tagged, or rewritten
  assert_eq!(repo.head_sha()?, before_sha);
  assert_eq!(repo.local_tags()?, vec!["0.1.0".to_string()]);
  assert_eq!(repo.read_changelog()?, SEED_CHANGELOG);

  Ok(())
}

#[cfg(unix)]
#[test]
fn test_release_scripts_receive_resolved_version() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.add_script("record-version.sh", "#!/bin/sh\necho \"$1\" > release-version.txt\n")?;
  repo.commit_all_and_push("Add version recording script")?;

  let output = repo.run_relcut(&["release", TEST_TOKEN], CONFIRM)?;
  assert!(output.status.success());

  // The script ran before the release commit, so its output is part of it
  let recorded = std::fs::read_to_string(repo.path.join("release-version.txt"))?;
  assert_eq!(recorded.trim(), "0.1.1");
  let output = repo.git(&["show", "HEAD:release-version.txt"])?;
  assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "0.1.1");

  Ok(())
}

#[test]
fn test_release_plain_tag_push_failure_rolls_back() -> Result<()> {
  let repo = TestRepo::new()?;
  let before_sha = repo.head_sha()?;

  // Occupy the plain tag name on the remote with a different target, so
  // the final push (the publish point) is rejected
  repo.git(&["push", "origin", &format!("{}:refs/tags/0.1.1", before_sha)])?;

  // A fresh sidecar timestamp keeps the grace period active, so the run
  // must not fetch (which would auto-follow the conflicting tag locally)
  let now = std::time::SystemTime::now()
    .duration_since(std::time::UNIX_EPOCH)?
    .as_secs();
  std::fs::write(repo.path.join(".git/last-fetch.txt"), now.to_string())?;

  let output = repo.run_relcut(&["release", TEST_TOKEN], CONFIRM)?;
  assert_ne!(output.status.code(), Some(0));

  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("ACTION REQUIRED"), "stderr: {}", stderr);

  // Local state is fully rolled back
  assert_eq!(repo.head_sha()?, before_sha);
  assert_eq!(repo.local_tags()?, vec!["0.1.0".to_string()]);
  assert_eq!(repo.read_changelog()?, SEED_CHANGELOG);

  // The pushed v-tag was deleted again; the conflicting plain tag remains
  let remote_tags = repo.remote_tags()?;
  assert!(!remote_tags.contains(&"v0.1.1".to_string()), "remote tags: {:?}", remote_tags);
  assert!(remote_tags.contains(&"0.1.1".to_string()), "remote tags: {:?}", remote_tags);

  // The branch push cannot be auto-reverted: the release commit is still
  // on the remote and the operator was told what to do about it
  assert_ne!(repo.remote_main_sha()?, before_sha);

  Ok(())
}
