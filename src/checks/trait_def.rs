//! Check trait and the context checks share
//!
//! The workspace configuration is loaded once per doctor run and handed to every
//! check through [`CheckContext`]. A check that needs a valid configuration and
//! finds none passes with a "skipping" note; reporting the broken file is
//! `config-validity`'s job.

use crate::core::config::ShipConfig;
use crate::core::error::ShipResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Severity level for check results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
  Info,
  /// Releases still work, but something will bite later
  Warning,
  /// A release run would fail
  Error,
}

/// Result of running a check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
  pub check_name: String,
  pub passed: bool,
  pub severity: Severity,
  pub message: String,
  pub suggestion: Option<String>,
}

impl CheckResult {
  pub fn pass(check_name: impl Into<String>, message: impl Into<String>) -> Self {
    Self {
      check_name: check_name.into(),
      passed: true,
      severity: Severity::Info,
      message: message.into(),
      suggestion: None,
    }
  }

  pub fn error(check_name: impl Into<String>, message: impl Into<String>, suggestion: Option<impl Into<String>>) -> Self {
    Self::failed(check_name.into(), Severity::Error, message.into(), suggestion.map(Into::into))
  }

  pub fn warning(
    check_name: impl Into<String>,
    message: impl Into<String>,
    suggestion: Option<impl Into<String>>,
  ) -> Self {
    Self::failed(check_name.into(), Severity::Warning, message.into(), suggestion.map(Into::into))
  }

  fn failed(check_name: String, severity: Severity, message: String, suggestion: Option<String>) -> Self {
    Self {
      check_name,
      passed: false,
      severity,
      message,
      suggestion,
    }
  }

  /// Failed with error severity (makes `doctor` exit non-zero)
  pub fn is_blocking(&self) -> bool {
    !self.passed && self.severity == Severity::Error
  }
}

/// Context passed to checks
#[derive(Debug, Clone)]
pub struct CheckContext {
  pub workspace_root: PathBuf,
  /// Run expensive checks too (network, authentication)
  pub thorough: bool,
  config: Option<ShipConfig>,
}

impl CheckContext {
  /// Load the workspace configuration once; a broken file leaves it unset
  pub fn new(workspace_root: &Path, thorough: bool) -> Self {
    Self {
      workspace_root: workspace_root.to_path_buf(),
      thorough,
      config: ShipConfig::load(workspace_root).ok(),
    }
  }

  pub fn config(&self) -> Option<&ShipConfig> {
    self.config.as_ref()
  }

  /// Configured state directory, or the default one when the config is unusable
  pub fn state_dir(&self) -> PathBuf {
    let relative = self
      .config
      .as_ref()
      .map(|c| c.release.state_dir.clone())
      .unwrap_or_else(|| PathBuf::from(".pkgship"));
    self.workspace_root.join(relative)
  }
}

/// Health check trait
///
/// ```rust,ignore
/// struct ValidatedTargetsCheck;
///
/// impl Check for ValidatedTargetsCheck {
///   fn name(&self) -> &str {
///     "validated-targets"
///   }
///
///   fn description(&self) -> &str {
///     "Every build target has a smoke test"
///   }
///
///   fn run(&self, ctx: &CheckContext) -> ShipResult<CheckResult> {
///     let Some(config) = ctx.config() else {
///       return Ok(CheckResult::pass(self.name(), "No valid pkgship.toml, skipping"));
///     };
///     let bare: Vec<&str> = config
///       .targets
///       .iter()
///       .filter(|t| t.validate.is_none())
///       .map(|t| t.name.as_str())
///       .collect();
///     if bare.is_empty() {
///       Ok(CheckResult::pass(self.name(), "All targets are validated"))
///     } else {
///       Ok(CheckResult::warning(
///         self.name(),
///         format!("Published without a smoke test: {}", bare.join(", ")),
///         Some("Add [targets.validate] to each of them"),
///       ))
///     }
///   }
/// }
/// ```
pub trait Check: Send + Sync {
  /// Unique name for this check (kebab-case)
  fn name(&self) -> &str;

  /// Human-readable description of what this check validates
  fn description(&self) -> &str;

  fn run(&self, ctx: &CheckContext) -> ShipResult<CheckResult>;

  /// Whether this check is expensive (requires network, etc.)
  fn is_expensive(&self) -> bool {
    false
  }
}
