//! Changelog scanning and rewriting
//!
//! The changelog is plain markdown with a fixed shape: a single pending
//! section headed `# TBD` (always first), followed by released sections
//! headed `# MAJOR.MINOR.PATCH`. A subheader starting with a
//! case-insensitive `break` inside the pending section marks the upcoming
//! release as breaking.
//!
//! Scanning is a pure function over the document text; rewriting produces
//! the new document text and is applied to disk atomically (the only
//! in-place file mutation in the whole flow).

use crate::core::error::{ChangelogError, RelResult, ResultExt};
use crate::release::version::parse_strict_version;
use std::fs;
use std::path::Path;
use tempfile::NamedTempFile;

/// Whitespace-only lines count as blank
fn is_blank(line: &str) -> bool {
  line.trim().is_empty()
}

/// `#`, optional whitespace, `TBD`, optional trailing whitespace
fn is_pending_header(line: &str) -> bool {
  match line.strip_prefix('#') {
    Some(rest) => rest.trim() == "TBD",
    None => false,
  }
}

/// `#`, optional whitespace, strict `MAJOR.MINOR.PATCH`, optional trailing whitespace
fn is_version_header(line: &str) -> bool {
  match line.strip_prefix('#') {
    Some(rest) => parse_strict_version(rest.trim()).is_some(),
    None => false,
  }
}

/// Two or more `#`, optional whitespace, then a case-insensitive `break` prefix
fn is_breaking_subheader(line: &str) -> bool {
  let stripped = line.trim_start_matches('#');
  let depth = line.len() - stripped.len();
  if depth < 2 {
    return false;
  }
  let lowered = stripped.trim_start().to_lowercase();
  lowered.starts_with("break")
}

/// Scan the pending section of a changelog document.
///
/// Returns whether the pending section contains a breaking-change marker.
/// Fails when the document does not have exactly one well-placed pending
/// section with content, followed by at least one released section.
pub fn scan_pending_section(content: &str) -> Result<bool, ChangelogError> {
  let mut lines = content.lines();

  // The pending header must be the first non-blank line
  let mut pending_header_found = false;
  for line in lines.by_ref() {
    if is_blank(line) {
      continue;
    }
    if !is_pending_header(line) {
      return Err(ChangelogError::Malformed);
    }
    pending_header_found = true;
    break;
  }
  if !pending_header_found {
    return Err(ChangelogError::Empty);
  }

  // Scan until the most recent released version header, tracking what the
  // pending section contains along the way
  let mut has_breaking_change = false;
  let mut has_pending_content = false;
  let mut found_released_header = false;
  for line in lines {
    if is_pending_header(line) {
      return Err(ChangelogError::DuplicatePendingSection);
    }
    if is_version_header(line) {
      found_released_header = true;
      break;
    }
    if !is_blank(line) {
      has_pending_content = true;
    }
    if is_breaking_subheader(line) {
      has_breaking_change = true;
    }
  }

  if !found_released_header {
    return Err(ChangelogError::NoPriorRelease);
  }
  if !has_pending_content {
    return Err(ChangelogError::EmptyPendingSection);
  }

  Ok(has_breaking_change)
}

/// Insert a released section for `version` after the pending header.
///
/// The first line must be the pending header; it stays in place, a new
/// `# X.Y.Z` header follows it, and the former pending body becomes the
/// new section's body.
pub fn insert_release_section(content: &str, version: &str) -> Result<String, ChangelogError> {
  let (first_line, rest) = match content.split_once('\n') {
    Some((first, rest)) => (first, rest),
    None => (content, ""),
  };

  if !is_pending_header(first_line) {
    return Err(ChangelogError::Malformed);
  }

  Ok(format!("{}\n\n# {}\n\n{}", first_line, version, rest))
}

/// Rewrite the changelog file on disk for a release.
///
/// The new content is written to a temporary file next to the changelog
/// and renamed over it, so the orchestrator either sees the full rewrite
/// or no change at all.
pub fn rewrite_changelog(path: &Path, version: &str) -> RelResult<()> {
  let content =
    fs::read_to_string(path).with_context(|| format!("Failed to read changelog at '{}'", path.display()))?;
  let updated = insert_release_section(&content, version)?;

  let dir = path.parent().unwrap_or_else(|| Path::new("."));
  let tmp = NamedTempFile::new_in(dir)
    .with_context(|| format!("Failed to create temporary file next to '{}'", path.display()))?;
  fs::write(tmp.path(), updated)
    .with_context(|| format!("Failed to write updated changelog for '{}'", path.display()))?;
  tmp
    .persist(path)
    .map_err(|e| e.error)
    .with_context(|| format!("Failed to replace changelog at '{}'", path.display()))?;

  Ok(())
}
