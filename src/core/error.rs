//! Error types for pkgship with contextual messages and exit codes
//!
//! Every error is categorized so the process exits with a code a CI caller can
//! act on, and most categories carry a suggestion for the operator.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for pkgship
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, missing files)
  User = 1,
  /// System error (remote API, build commands, I/O)
  System = 2,
  /// Validation failure (smoke tests, health checks)
  Validation = 3,
  /// Run superseded by a newer run in the same concurrency group
  Cancelled = 4,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for pkgship
#[derive(Debug)]
pub enum ShipError {
  /// Configuration errors
  Config(ConfigError),

  /// Remote release API errors
  Remote(RemoteError),

  /// Build job failures
  Build(BuildError),

  /// Asset synchronization failures
  Sync(SyncError),

  /// Validation (smoke test) failures
  Validation(ValidationError),

  /// This run lost its concurrency-group lease
  Cancelled { group: String, superseded_by: String },

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ShipError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ShipError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ShipError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ShipError::Message { message, context, help } => ShipError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      ShipError::Io(err) => ShipError::Message {
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
      ShipError::Config(_) => ExitCode::User,
      ShipError::Remote(_) => ExitCode::System,
      ShipError::Build(_) => ExitCode::System,
      ShipError::Sync(_) => ExitCode::System,
      ShipError::Validation(_) => ExitCode::Validation,
      ShipError::Cancelled { .. } => ExitCode::Cancelled,
      ShipError::Io(_) => ExitCode::System,
      ShipError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ShipError::Config(e) => e.help_message(),
      ShipError::Remote(e) => e.help_message(),
      ShipError::Sync(e) => e.help_message(),
      ShipError::Validation(_) => {
        Some("Packages were not published. Inspect the validation reports and re-run.".to_string())
      }
      ShipError::Cancelled { .. } => {
        Some("A newer run took over this concurrency group; its result supersedes this one.".to_string())
      }
      ShipError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for ShipError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ShipError::Config(e) => write!(f, "{}", e),
      ShipError::Remote(e) => write!(f, "{}", e),
      ShipError::Build(e) => write!(f, "{}", e),
      ShipError::Sync(e) => write!(f, "{}", e),
      ShipError::Validation(e) => write!(f, "{}", e),
      ShipError::Cancelled { group, superseded_by } => {
        write!(f, "Run cancelled: concurrency group '{}' now belongs to run {}", group, superseded_by)
      }
      ShipError::Io(e) => write!(f, "I/O error: {}", e),
      ShipError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ShipError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ShipError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for ShipError {
  fn from(err: io::Error) -> Self {
    ShipError::Io(err)
  }
}

impl From<String> for ShipError {
  fn from(msg: String) -> Self {
    ShipError::message(msg)
  }
}

impl From<&str> for ShipError {
  fn from(msg: &str) -> Self {
    ShipError::message(msg)
  }
}

impl From<toml_edit::de::Error> for ShipError {
  fn from(err: toml_edit::de::Error) -> Self {
    ShipError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for ShipError {
  fn from(err: serde_json::Error) -> Self {
    ShipError::message(format!("JSON error: {}", err))
  }
}

impl From<regex::Error> for ShipError {
  fn from(err: regex::Error) -> Self {
    ShipError::message(format!("Pattern error: {}", err))
  }
}

impl From<glob::PatternError> for ShipError {
  fn from(err: glob::PatternError) -> Self {
    ShipError::message(format!("Invalid glob pattern: {}", err))
  }
}

impl From<glob::GlobError> for ShipError {
  fn from(err: glob::GlobError) -> Self {
    ShipError::message(format!("Glob traversal error: {}", err))
  }
}

impl From<std::path::StripPrefixError> for ShipError {
  fn from(err: std::path::StripPrefixError) -> Self {
    ShipError::message(format!("Path strip prefix error: {}", err))
  }
}

impl From<std::string::FromUtf8Error> for ShipError {
  fn from(err: std::string::FromUtf8Error) -> Self {
    ShipError::message(format!("UTF-8 conversion error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// pkgship.toml not found
  NotFound { workspace_root: PathBuf },

  /// Missing required field
  MissingField { field: String },

  /// Field present but unusable
  InvalidField { field: String, reason: String },

  /// Build target not found in configuration
  TargetNotFound { name: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => {
        Some("Create a pkgship.toml with a [release] section and at least one [[targets]] entry.".to_string())
      }
      ConfigError::TargetNotFound { name } => Some(format!(
        "Check the [[targets]] names in pkgship.toml; '{}' is not one of them.",
        name
      )),
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { workspace_root } => {
        write!(
          f,
          "No pkgship configuration found.\nExpected file: {}/pkgship.toml",
          workspace_root.display()
        )
      }
      ConfigError::MissingField { field } => {
        write!(f, "Missing required field in config: {}", field)
      }
      ConfigError::InvalidField { field, reason } => {
        write!(f, "Invalid value for '{}': {}", field, reason)
      }
      ConfigError::TargetNotFound { name } => {
        write!(f, "Build target '{}' not found in configuration", name)
      }
    }
  }
}

/// Remote release API errors
#[derive(Debug)]
pub enum RemoteError {
  /// Backend command failed
  CommandFailed { command: String, stderr: String },

  /// No published release exists
  NoRelease { remote: String },

  /// Release with this tag does not exist
  ReleaseNotFound { tag: String },

  /// An asset with this name is already attached
  AssetExists { tag: String, name: String },

  /// Asset to delete is not attached
  AssetNotFound { tag: String, name: String },
}

impl RemoteError {
  fn help_message(&self) -> Option<String> {
    match self {
      RemoteError::CommandFailed { stderr, .. } => {
        if stderr.contains("401") || stderr.contains("auth login") || stderr.contains("GH_TOKEN") {
          Some("Authenticate the gh CLI (gh auth login) or export GH_TOKEN.".to_string())
        } else if stderr.contains("executable file not found") || stderr.contains("No such file") {
          Some("Install the GitHub CLI (https://cli.github.com) and make sure it is on PATH.".to_string())
        } else {
          None
        }
      }
      RemoteError::NoRelease { .. } => {
        Some("Publish a release first; manual runs rebuild the latest existing release.".to_string())
      }
      RemoteError::AssetExists { .. } => {
        Some("Re-run in replace mode (manual dispatch) to overwrite existing assets.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for RemoteError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RemoteError::CommandFailed { command, stderr } => {
        write!(f, "Remote command failed: {}\n{}", command, stderr)
      }
      RemoteError::NoRelease { remote } => write!(f, "No published release found for {}", remote),
      RemoteError::ReleaseNotFound { tag } => write!(f, "Release '{}' not found", tag),
      RemoteError::AssetExists { tag, name } => {
        write!(f, "Asset '{}' is already attached to release '{}'", name, tag)
      }
      RemoteError::AssetNotFound { tag, name } => {
        write!(f, "Asset '{}' is not attached to release '{}'", name, tag)
      }
    }
  }
}

/// Build job failures
#[derive(Debug)]
pub enum BuildError {
  /// One or more jobs failed; downstream jobs were skipped
  JobsFailed { failed: Vec<String> },
}

impl fmt::Display for BuildError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BuildError::JobsFailed { failed } => {
        write!(f, "{} build job(s) failed: {}", failed.len(), failed.join(", "))
      }
    }
  }
}

/// Asset synchronization failures
#[derive(Debug)]
pub enum SyncError {
  /// Some uploads failed; the release is incomplete
  UploadsFailed { tag: String, files: Vec<String> },

  /// Every upload landed but stale assets are still attached
  DeletesFailed { tag: String, files: Vec<String> },
}

impl SyncError {
  fn help_message(&self) -> Option<String> {
    match self {
      SyncError::UploadsFailed { .. } => {
        Some("Re-run the same command; the intent log lets it resume where this run stopped.".to_string())
      }
      SyncError::DeletesFailed { .. } => {
        Some("Re-run the same command; uploads already made are kept and only the stale assets are deleted.".to_string())
      }
    }
  }
}

impl fmt::Display for SyncError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SyncError::UploadsFailed { tag, files } => {
        write!(f, "{} upload(s) to release '{}' failed: {}", files.len(), tag, files.join(", "))
      }
      SyncError::DeletesFailed { tag, files } => {
        write!(
          f,
          "{} stale asset(s) could not be removed from release '{}': {}",
          files.len(),
          tag,
          files.join(", ")
        )
      }
    }
  }
}

/// Validation errors
#[derive(Debug)]
pub enum ValidationError {
  /// Smoke tests failed for these targets
  SmokeTestsFailed { targets: Vec<String> },

  /// Health checks reported errors
  ChecksFailed { count: usize },
}

impl fmt::Display for ValidationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ValidationError::SmokeTestsFailed { targets } => {
        write!(f, "Validation failed for: {}", targets.join(", "))
      }
      ValidationError::ChecksFailed { count } => write!(f, "{} health check(s) failed", count),
    }
  }
}

/// Result type alias for pkgship
pub type ShipResult<T> = Result<T, ShipError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ShipResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ShipResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ShipError>,
{
  fn context(self, ctx: impl Into<String>) -> ShipResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ShipResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ShipError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}

impl From<anyhow::Error> for ShipError {
  fn from(err: anyhow::Error) -> Self {
    ShipError::message(err.to_string())
  }
}
