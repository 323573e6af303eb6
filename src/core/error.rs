//! Error types for relcut with contextual messages and exit codes
//!
//! Every failure class the release flow can hit gets its own category so
//! the exit code and the help text shown to the operator stay accurate.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for relcut
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (bad changelog, invalid args, missing files)
  User = 1,
  /// System error (git, network, I/O)
  System = 2,
  /// Validation failure (preconditions, pre-release scripts)
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for relcut
#[derive(Debug)]
pub enum RelError {
  /// A release precondition was not met (nothing has been mutated)
  Precondition(PreconditionError),

  /// Changelog format errors
  Changelog(ChangelogError),

  /// Pre-release script failures
  Script(ScriptError),

  /// Git operation errors
  Git(GitError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl RelError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    RelError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    RelError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      RelError::Message { message, context, help } => RelError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      RelError::Io(e) => RelError::Message {
        message: format!("{}: {}", ctx_str, e),
        context: None,
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      RelError::Precondition(_) => ExitCode::Validation,
      RelError::Changelog(_) => ExitCode::User,
      RelError::Script(_) => ExitCode::Validation,
      RelError::Git(_) => ExitCode::System,
      RelError::Io(_) => ExitCode::System,
      RelError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      RelError::Precondition(e) => e.help_message(),
      RelError::Changelog(e) => e.help_message(),
      RelError::Git(e) => e.help_message(),
      RelError::Script(_) => None,
      RelError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for RelError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RelError::Precondition(e) => write!(f, "{}", e),
      RelError::Changelog(e) => write!(f, "{}", e),
      RelError::Script(e) => write!(f, "{}", e),
      RelError::Git(e) => write!(f, "{}", e),
      RelError::Io(e) => write!(f, "I/O error: {}", e),
      RelError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for RelError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      RelError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for RelError {
  fn from(err: io::Error) -> Self {
    RelError::Io(err)
  }
}

impl From<PreconditionError> for RelError {
  fn from(err: PreconditionError) -> Self {
    RelError::Precondition(err)
  }
}

impl From<ChangelogError> for RelError {
  fn from(err: ChangelogError) -> Self {
    RelError::Changelog(err)
  }
}

impl From<ScriptError> for RelError {
  fn from(err: ScriptError) -> Self {
    RelError::Script(err)
  }
}

impl From<GitError> for RelError {
  fn from(err: GitError) -> Self {
    RelError::Git(err)
  }
}

/// Precondition failures: the repository is not in a releasable state.
///
/// These abort before any mutation, so no undo is ever required for them.
#[derive(Debug)]
pub enum PreconditionError {
  /// Worktree has staged or unstaged changes
  DirtyWorktree { status: String },

  /// Local and remote branch tips differ
  BranchOutOfSync { local: String, remote: String },

  /// Global git identity is incomplete
  MissingIdentity { name: String, email: String },

  /// Required remote is not configured
  MissingRemote { name: String },

  /// A file the release flow needs does not exist
  MissingFile { path: PathBuf },
}

impl PreconditionError {
  fn help_message(&self) -> Option<String> {
    match self {
      PreconditionError::DirtyWorktree { .. } => {
        Some("Commit or stash your changes, then run the release again.".to_string())
      }
      PreconditionError::BranchOutOfSync { local, remote } => Some(format!(
        "Bring '{}' and '{}' to the same commit (pull or push) before releasing.",
        local, remote
      )),
      PreconditionError::MissingIdentity { .. } => Some(
        "Set both with `git config --global user.name <name>` and `git config --global user.email <email>`."
          .to_string(),
      ),
      PreconditionError::MissingRemote { name } => {
        Some(format!("Add it with `git remote add {} <url>` and push the repository.", name))
      }
      PreconditionError::MissingFile { .. } => None,
    }
  }
}

impl fmt::Display for PreconditionError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PreconditionError::DirtyWorktree { status } => {
        write!(
          f,
          "The worktree contains modified files; it must be clean before releasing.\n{}",
          status
        )
      }
      PreconditionError::BranchOutOfSync { local, remote } => {
        write!(f, "The local '{}' branch is not in sync with '{}'.", local, remote)
      }
      PreconditionError::MissingIdentity { name, email } => {
        write!(
          f,
          "Incomplete global git identity (name: '{}', email: '{}'); both are required to annotate the release commit.",
          name, email
        )
      }
      PreconditionError::MissingRemote { name } => {
        write!(f, "Remote '{}' is not configured for this repository.", name)
      }
      PreconditionError::MissingFile { path } => {
        write!(f, "Required file not found: {}", path.display())
      }
    }
  }
}

/// Changelog format errors
#[derive(Debug, PartialEq, Eq)]
pub enum ChangelogError {
  /// The pending placeholder header is missing or not the first non-blank line
  Malformed,

  /// The document has no content at all
  Empty,

  /// More than one pending placeholder header exists
  DuplicatePendingSection,

  /// No released version section follows the pending section
  NoPriorRelease,

  /// The pending section has no content to release
  EmptyPendingSection,
}

impl ChangelogError {
  fn help_message(&self) -> Option<String> {
    match self {
      ChangelogError::Malformed | ChangelogError::Empty => {
        Some("The changelog must start with a '# TBD' header followed by the unreleased notes.".to_string())
      }
      ChangelogError::EmptyPendingSection => {
        Some("Add the unreleased notes under the '# TBD' header before cutting a release.".to_string())
      }
      ChangelogError::NoPriorRelease => Some(
        "Expected at least one released section ('# X.Y.Z'). Check that the changelog matches the release tags on this branch."
          .to_string(),
      ),
      ChangelogError::DuplicatePendingSection => None,
    }
  }
}

impl fmt::Display for ChangelogError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ChangelogError::Malformed => {
        write!(f, "The '# TBD' header is missing or is not the first non-blank line of the changelog")
      }
      ChangelogError::Empty => write!(f, "The changelog file is empty"),
      ChangelogError::DuplicatePendingSection => {
        write!(f, "Found more than one '# TBD' header; the changelog may contain only one")
      }
      ChangelogError::NoPriorRelease => {
        write!(f, "No previously released version section was found in the changelog")
      }
      ChangelogError::EmptyPendingSection => {
        write!(f, "The changelog has no pending entries for the upcoming release")
      }
    }
  }
}

/// Pre-release script failures
#[derive(Debug)]
pub enum ScriptError {
  /// A script exited non-zero; its stderr is surfaced verbatim
  Failed { script: PathBuf, stderr: String },

  /// A script could not be spawned at all
  Spawn { script: PathBuf, source: io::Error },
}

impl fmt::Display for ScriptError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ScriptError::Failed { script, stderr } => {
        write!(f, "Pre-release script '{}' failed:\n{}", script.display(), stderr)
      }
      ScriptError::Spawn { script, source } => {
        write!(f, "Could not run pre-release script '{}': {}", script.display(), source)
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// A revision could not be resolved
  RevisionNotFound { revision: String },

  /// Push failed
  PushFailed { remote: String, refspec: String, reason: String },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::PushFailed { reason, .. } => {
        if reason.contains("non-fast-forward") || reason.contains("already exists") {
          Some("The remote already has conflicting refs. Fetch and inspect the remote before retrying.".to_string())
        } else if reason.contains("403") || reason.contains("401") || reason.contains("Authentication") {
          Some("Check that the release token grants push access to this repository.".to_string())
        } else {
          None
        }
      }
      GitError::RepoNotFound { path } => Some(format!(
        "Run relcut from the root of a git repository (no repository found at {}).",
        path.display()
      )),
      GitError::RevisionNotFound { revision } => {
        Some(format!("Check that '{}' exists locally (`git branch -a`).", revision))
      }
      _ => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      GitError::RevisionNotFound { revision } => {
        write!(f, "Could not resolve revision: {}", revision)
      }
      GitError::PushFailed { remote, refspec, reason } => {
        write!(f, "Push of '{}' to '{}' failed: {}", refspec, remote, reason)
      }
    }
  }
}

/// Result type alias for relcut
pub type RelResult<T> = Result<T, RelError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> RelResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> RelResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<RelError>,
{
  fn context(self, ctx: impl Into<String>) -> RelResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> RelResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &RelError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
