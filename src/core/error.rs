//! Error types for affected-ci with contextual messages and exit codes
//!
//! One enum covers every failure the tool can surface. Inventory, graph and
//! contract problems are collected and reported as a batch; task failures are
//! fail-fast and carry the exit code of the subprocess that broke the run.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for affected-ci
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, manifests, contract violations)
  User,
  /// System error (git, I/O)
  System,
  /// A delegated task failed; its own exit code is propagated
  Task(i32),
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    match self {
      ExitCode::User => 1,
      ExitCode::System => 2,
      ExitCode::Task(code) => code,
    }
  }
}

/// Main error type for affected-ci
#[derive(Debug)]
pub enum GateError {
  /// Missing or invalid run parameters / config file
  Config(ConfigError),

  /// A workspace manifest is missing or unparsable
  Manifest(ManifestError),

  /// Workspace contract violations (all of them, collected)
  Contract(Vec<String>),

  /// A delegated task exited non-zero
  Task(TaskFailure),

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

impl GateError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    GateError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    GateError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      GateError::Message { message, context, help } => GateError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      GateError::Io(err) => GateError::Message {
        message: format!("I/O error: {}", err),
        context: Some(ctx_str),
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      GateError::Config(_) => ExitCode::User,
      GateError::Manifest(_) => ExitCode::User,
      GateError::Contract(_) => ExitCode::User,
      GateError::Task(failure) => ExitCode::Task(failure.exit_code()),
      GateError::Git(_) => ExitCode::System,
      GateError::Io(_) => ExitCode::System,
      GateError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      GateError::Config(e) => e.help_message(),
      GateError::Manifest(e) => e.help_message(),
      GateError::Contract(_) => {
        Some("Fix the listed workspaces, or set workspaceStatus: \"inactive\" to opt one out.".to_string())
      }
      GateError::Git(e) => e.help_message(),
      GateError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for GateError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GateError::Config(e) => write!(f, "{}", e),
      GateError::Manifest(e) => write!(f, "{}", e),
      GateError::Contract(violations) => {
        write!(f, "Workspace contract check failed:")?;
        for violation in violations {
          write!(f, "\n- {}", violation)?;
        }
        Ok(())
      }
      GateError::Task(e) => write!(f, "{}", e),
      GateError::Git(e) => write!(f, "{}", e),
      GateError::Io(e) => write!(f, "I/O error: {}", e),
      GateError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for GateError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      GateError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for GateError {
  fn from(err: io::Error) -> Self {
    GateError::Io(err)
  }
}

impl From<String> for GateError {
  fn from(msg: String) -> Self {
    GateError::message(msg)
  }
}

impl From<&str> for GateError {
  fn from(msg: &str) -> Self {
    GateError::message(msg)
  }
}

impl From<serde_json::Error> for GateError {
  fn from(err: serde_json::Error) -> Self {
    GateError::message(format!("JSON error: {}", err))
  }
}

impl From<toml_edit::de::Error> for GateError {
  fn from(err: toml_edit::de::Error) -> Self {
    GateError::Config(ConfigError::Invalid {
      reason: err.to_string(),
    })
  }
}

impl From<ConfigError> for GateError {
  fn from(err: ConfigError) -> Self {
    GateError::Config(err)
  }
}

impl From<ManifestError> for GateError {
  fn from(err: ManifestError) -> Self {
    GateError::Manifest(err)
  }
}

impl From<TaskFailure> for GateError {
  fn from(err: TaskFailure) -> Self {
    GateError::Task(err)
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// A change mode needs parameters that were not supplied
  MissingParameter { mode: String, parameter: String },

  /// Unknown change mode
  UnknownMode { value: String },

  /// affected.toml could not be parsed
  Invalid { reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::MissingParameter { parameter, .. } => Some(format!(
        "Pass --{} or export {} before running.",
        parameter.to_lowercase().replace('_', "-"),
        parameter
      )),
      ConfigError::UnknownMode { .. } => Some("Valid modes: staged, pr, range".to_string()),
      ConfigError::Invalid { .. } => Some("Check affected.toml against the documented keys.".to_string()),
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::MissingParameter { mode, parameter } => {
        write!(f, "Change mode '{}' requires {}", mode, parameter)
      }
      ConfigError::UnknownMode { value } => write!(f, "Unknown change mode '{}'", value),
      ConfigError::Invalid { reason } => write!(f, "Invalid configuration: {}", reason),
    }
  }
}

/// Manifest (package.json) errors
#[derive(Debug)]
pub enum ManifestError {
  /// Manifest file not present where one was required
  Missing { path: PathBuf },

  /// Manifest is not valid JSON / has the wrong shape
  Unparsable { path: PathBuf, reason: String },
}

impl ManifestError {
  fn help_message(&self) -> Option<String> {
    match self {
      ManifestError::Missing { .. } => Some("Every workspace directory needs a package.json.".to_string()),
      ManifestError::Unparsable { .. } => None,
    }
  }
}

impl fmt::Display for ManifestError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ManifestError::Missing { path } => write!(f, "Manifest not found: {}", path.display()),
      ManifestError::Unparsable { path, reason } => {
        write!(f, "Failed to parse manifest {}: {}", path.display(), reason)
      }
    }
  }
}

/// A task that exited non-zero
#[derive(Debug, Clone)]
pub struct TaskFailure {
  /// Step label as shown in progress output
  pub label: String,
  /// Rendered command line
  pub command: String,
  /// Process exit code (None when killed by a signal or never started)
  pub code: Option<i32>,
}

impl TaskFailure {
  pub fn exit_code(&self) -> i32 {
    match self.code {
      Some(code) if code != 0 => code,
      _ => 1,
    }
  }
}

impl fmt::Display for TaskFailure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.code {
      Some(code) => write!(f, "Task '{}' failed with exit code {}: {}", self.label, code, self.command),
      None => write!(f, "Task '{}' failed: {}", self.label, self.command),
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
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::RepoNotFound { path } => Some(format!(
        "Run affected-ci inside a git checkout or pass --root: {}",
        path.display()
      )),
      GitError::CommandFailed { stderr, .. } => {
        if stderr.contains("unknown revision") || stderr.contains("bad revision") {
          Some("Fetch the base reference first (e.g. `git fetch origin <branch>`).".to_string())
        } else {
          None
        }
      }
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
    }
  }
}

/// Result type alias for affected-ci
pub type GateResult<T> = Result<T, GateError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> GateResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> GateResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<GateError>,
{
  fn context(self, ctx: impl Into<String>) -> GateResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> GateResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Print an error to stderr with its help text
pub fn print_error(error: &GateError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
