//! Pre-release script manifest
//!
//! `.pre-release-scripts.txt` at the repository root lists scripts to run
//! before the changelog is rewritten, one path per line relative to the
//! repository root. Each script receives the resolved version string as
//! its only argument and can veto the release by exiting non-zero.

use crate::core::error::{PreconditionError, RelError, RelResult, ScriptError};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

pub const MANIFEST_FILENAME: &str = ".pre-release-scripts.txt";

/// Read the script manifest, preserving file order and skipping blank lines
pub fn load_manifest(repo_root: &Path) -> RelResult<Vec<PathBuf>> {
  let manifest_path = repo_root.join(MANIFEST_FILENAME);
  let content = match fs::read_to_string(&manifest_path) {
    Ok(content) => content,
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
      return Err(RelError::Precondition(PreconditionError::MissingFile {
        path: manifest_path,
      }));
    }
    Err(e) => return Err(e.into()),
  };

  let scripts = content
    .lines()
    .map(str::trim)
    .filter(|line| !line.is_empty())
    .map(PathBuf::from)
    .collect();

  Ok(scripts)
}

/// Run each script in manifest order, passing the release version.
///
/// The first non-zero exit aborts with the script's stderr surfaced
/// verbatim.
pub fn run_all(repo_root: &Path, scripts: &[PathBuf], version: &str) -> RelResult<()> {
  for script in scripts {
    let script_path = repo_root.join(script);
    let output = Command::new(&script_path)
      .arg(version)
      .current_dir(repo_root)
      .output()
      .map_err(|e| {
        RelError::Script(ScriptError::Spawn {
          script: script.clone(),
          source: e,
        })
      })?;

    if !output.status.success() {
      return Err(RelError::Script(ScriptError::Failed {
        script: script.clone(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
      }));
    }
  }

  Ok(())
}
