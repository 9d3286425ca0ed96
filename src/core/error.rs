//! Error types for release-automation with contextual messages
//!
//! Every pipeline failure is a `ReleaseError`. Phase functions return the
//! specific error (clone, branch, resolve, descriptor, commit, push) and the
//! coordinator wraps it with the phase it happened in, so the single line
//! printed to the user reads "target repo handling failed: ...".

use crate::core::release::RunState;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for release-automation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// Release recorded in both repositories
  Success = 0,
  /// Usage error or pipeline failure
  Failure = 1,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Error class, independent of phase wrapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Usage,
  Config,
  Setup,
  Clone,
  Branch,
  Resolve,
  Io,
  Commit,
  Push,
}

/// Pipeline phase an error surfaced in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  Setup,
  TargetRepo,
  ConfigRepo,
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Phase::Setup => write!(f, "setup failed"),
      Phase::TargetRepo => write!(f, "target repo handling failed"),
      Phase::ConfigRepo => write!(f, "config repo handling failed"),
    }
  }
}

/// Main error type for release-automation
#[derive(Debug)]
pub enum ReleaseError {
  /// Invalid request (empty fields, unsafe file name parts)
  Usage { message: String },

  /// Settings file errors
  Config(ConfigError),

  /// Workspace could not be created
  Setup { path: PathBuf, source: io::Error },

  /// Version-control operation errors
  Git(GitError),

  /// Release descriptor could not be written
  Descriptor { path: PathBuf, source: io::Error },

  /// Error raised inside a pipeline phase
  Phase {
    phase: Phase,
    last_state: RunState,
    source: Box<ReleaseError>,
  },

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ReleaseError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create a usage error
  pub fn usage(msg: impl Into<String>) -> Self {
    ReleaseError::Usage { message: msg.into() }
  }

  /// Wrap an error with the phase it happened in
  pub fn in_phase(self, phase: Phase, last_state: RunState) -> Self {
    ReleaseError::Phase {
      phase,
      last_state,
      source: Box::new(self),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ReleaseError::Message { message, context, help } => ReleaseError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      ReleaseError::Io(err) => ReleaseError::Message {
        message: format!("{}: {}", ctx_str, err),
        context: None,
        help: None,
      },
      _ => self,
    }
  }

  /// Error class, looking through phase wrappers
  pub fn kind(&self) -> ErrorKind {
    match self {
      ReleaseError::Usage { .. } => ErrorKind::Usage,
      ReleaseError::Config(_) => ErrorKind::Config,
      ReleaseError::Setup { .. } => ErrorKind::Setup,
      ReleaseError::Git(e) => e.kind(),
      ReleaseError::Descriptor { .. } | ReleaseError::Io(_) => ErrorKind::Io,
      ReleaseError::Phase { source, .. } => source.kind(),
      ReleaseError::Message { .. } => ErrorKind::Io,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    ExitCode::Failure
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ReleaseError::Config(e) => e.help_message(),
      ReleaseError::Git(e) => e.help_message(),
      ReleaseError::Setup { .. } => {
        Some("Check that the workspace root is writable, or pass --workspace-root.".to_string())
      }
      ReleaseError::Descriptor { .. } => {
        Some("Check the descriptor directory in your settings and the permissions of the config checkout.".to_string())
      }
      ReleaseError::Phase {
        last_state, source, ..
      } => {
        let mut lines: Vec<String> = source.help_message().into_iter().collect();
        lines.push(format!("Stopped after: {}", last_state));
        lines.extend(last_state.partial_effects());
        Some(lines.join("\n   "))
      }
      ReleaseError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for ReleaseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseError::Usage { message } => write!(f, "{}", message),
      ReleaseError::Config(e) => write!(f, "{}", e),
      ReleaseError::Setup { path, source } => {
        write!(f, "failed to create workspace {}: {}", path.display(), source)
      }
      ReleaseError::Git(e) => write!(f, "{}", e),
      ReleaseError::Descriptor { path, source } => {
        write!(f, "failed to write release descriptor {}: {}", path.display(), source)
      }
      ReleaseError::Phase { phase, source, .. } => write!(f, "{}: {}", phase, source),
      ReleaseError::Io(e) => write!(f, "I/O error: {}", e),
      ReleaseError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ReleaseError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ReleaseError::Io(e) => Some(e),
      ReleaseError::Setup { source, .. } | ReleaseError::Descriptor { source, .. } => Some(source),
      ReleaseError::Phase { source, .. } => Some(source.as_ref()),
      _ => None,
    }
  }
}

impl From<io::Error> for ReleaseError {
  fn from(err: io::Error) -> Self {
    ReleaseError::Io(err)
  }
}

impl From<String> for ReleaseError {
  fn from(msg: String) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<&str> for ReleaseError {
  fn from(msg: &str) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<GitError> for ReleaseError {
  fn from(err: GitError) -> Self {
    ReleaseError::Git(err)
  }
}

impl From<ConfigError> for ReleaseError {
  fn from(err: ConfigError) -> Self {
    ReleaseError::Config(err)
  }
}

impl From<toml_edit::de::Error> for ReleaseError {
  fn from(err: toml_edit::de::Error) -> Self {
    ReleaseError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for ReleaseError {
  fn from(err: serde_json::Error) -> Self {
    ReleaseError::message(format!("JSON error: {}", err))
  }
}

/// Settings-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Explicit settings file does not exist
  NotFound { path: PathBuf },

  /// Settings file could not be read or parsed
  Parse { path: PathBuf, reason: String },

  /// Field has an unusable value
  InvalidField { field: String, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => {
        Some("Omit --config to use defaults, or point it at an existing release.toml.".to_string())
      }
      ConfigError::Parse { .. } => Some(
        "Settings are TOML with optional [release], [descriptor], [git], [commit] and [workspace] tables.".to_string(),
      ),
      ConfigError::InvalidField { .. } => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { path } => write!(f, "Settings file not found: {}", path.display()),
      ConfigError::Parse { path, reason } => {
        write!(f, "Failed to parse settings from {}: {}", path.display(), reason)
      }
      ConfigError::InvalidField { field, reason } => write!(f, "Invalid setting '{}': {}", field, reason),
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git could not be started at all
  Spawn { program: String, source: io::Error },

  /// Clone failed (auth, network, missing repo)
  CloneFailed { url: String, reason: String },

  /// Branch operation failed
  BranchError { branch: String, step: String, reason: String },

  /// HEAD could not be resolved
  ResolveFailed { reason: String },

  /// Staging or committing failed
  CommitFailed { reason: String },

  /// Staged tree is identical to HEAD
  NothingToCommit,

  /// Push failed
  PushFailed {
    remote: String,
    branch: String,
    reason: String,
  },
}

impl GitError {
  /// Error class for this git failure
  pub fn kind(&self) -> ErrorKind {
    match self {
      GitError::Spawn { .. } => ErrorKind::Setup,
      GitError::CloneFailed { .. } => ErrorKind::Clone,
      GitError::BranchError { .. } => ErrorKind::Branch,
      GitError::ResolveFailed { .. } => ErrorKind::Resolve,
      GitError::CommitFailed { .. } | GitError::NothingToCommit => ErrorKind::Commit,
      GitError::PushFailed { .. } => ErrorKind::Push,
    }
  }

  fn help_message(&self) -> Option<String> {
    match self {
      GitError::Spawn { program, .. } => Some(format!(
        "Make sure '{}' is installed and on PATH, or set git.program in release.toml.",
        program
      )),
      GitError::CloneFailed { .. } => Some(
        "Check the repository URL and that your credentials (e.g. SSH agent) are listed in git.env.".to_string(),
      ),
      GitError::BranchError { branch, step, .. } if step == "verify-absent" => Some(format!(
        "Branch '{}' already exists on the target remote. Delete it or choose another version.",
        branch
      )),
      GitError::BranchError { step, .. } if step == "checkout" => {
        Some("The source branch must exist on the target repository.".to_string())
      }
      GitError::NothingToCommit => {
        Some("The config repository already contains this exact descriptor; the release is already recorded.".to_string())
      }
      GitError::PushFailed { reason, .. } => {
        if reason.contains("non-fast-forward") {
          Some("The remote has commits you don't have. Re-run to record the release on top of them.".to_string())
        } else {
          Some("Check that you have push access to the repository.".to_string())
        }
      }
      _ => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::Spawn { program, source } => write!(f, "Failed to execute {}: {}", program, source),
      GitError::CloneFailed { url, reason } => write!(f, "Clone of {} failed: {}", url, reason),
      GitError::BranchError { branch, step, reason } => {
        write!(f, "Branch operation '{}' for {} failed: {}", step, branch, reason)
      }
      GitError::ResolveFailed { reason } => write!(f, "Failed to resolve HEAD: {}", reason),
      GitError::CommitFailed { reason } => write!(f, "Commit failed: {}", reason),
      GitError::NothingToCommit => write!(f, "Commit failed: nothing to commit"),
      GitError::PushFailed { remote, branch, reason } => {
        write!(f, "Push to {}/{} failed: {}", remote, branch, reason)
      }
    }
  }
}

/// Result type alias for release-automation
pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ReleaseError>,
{
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Print an error to stderr with help text
pub fn print_error(error: &ReleaseError) {
  eprintln!("Error: {}", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}", help);
  } else if error.kind() == ErrorKind::Usage {
    eprintln!("💡 Help: run `release-automation --help` for usage");
  }
}

/// Convert anyhow::Error to ReleaseError
impl From<anyhow::Error> for ReleaseError {
  fn from(err: anyhow::Error) -> Self {
    ReleaseError::message(err.to_string())
  }
}
