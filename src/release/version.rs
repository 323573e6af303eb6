//! Next-version resolution from repository tags
//!
//! Release tags are bare `MAJOR.MINOR.PATCH` names. Anything else
//! (v-prefixed tags, pre-releases, arbitrary names) is ignored when
//! resolving the latest released version.

use semver::Version;

/// Parse a strict `MAJOR.MINOR.PATCH` version.
///
/// Rejects pre-release and build metadata as well as anything semver
/// itself rejects (leading `v`, missing components).
pub fn parse_strict_version(s: &str) -> Option<Version> {
  let version = Version::parse(s).ok()?;
  if !version.pre.is_empty() || !version.build.is_empty() {
    return None;
  }
  Some(version)
}

/// Latest released version across a repository's tags.
///
/// A pure function of the tag set: filters to strict `MAJOR.MINOR.PATCH`
/// names and takes the maximum; `0.0.0` when no tag matches.
pub fn latest_released_version<I>(tags: I) -> Version
where
  I: IntoIterator,
  I::Item: AsRef<str>,
{
  tags
    .into_iter()
    .filter_map(|tag| parse_strict_version(tag.as_ref()))
    .max()
    .unwrap_or_else(|| Version::new(0, 0, 0))
}

/// Version bump for the upcoming release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionBump {
  /// Major version bump (forced by the operator)
  Major,
  /// Minor version bump (changelog declares a breaking change)
  Minor,
  /// Patch version bump (default)
  Patch,
}

impl VersionBump {
  /// Decide the bump from the CLI flag and the changelog scan.
  ///
  /// An explicit major bump wins over changelog-driven inference.
  pub fn from_policy(bump_major: bool, has_breaking_change: bool) -> Self {
    if bump_major {
      VersionBump::Major
    } else if has_breaking_change {
      VersionBump::Minor
    } else {
      VersionBump::Patch
    }
  }

  /// Apply bump to a semver version, producing a new value
  pub fn apply(&self, version: &Version) -> Version {
    match self {
      VersionBump::Major => Version::new(version.major + 1, 0, 0),
      VersionBump::Minor => Version::new(version.major, version.minor + 1, 0),
      VersionBump::Patch => Version::new(version.major, version.minor, version.patch + 1),
    }
  }
}
