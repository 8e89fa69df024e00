//! Release context - resolve once, pass everywhere
//!
//! # Design
//!
//! `ReleaseContext` is the single value that flows from version resolution into
//! every downstream step (builds, validation, synchronization, repository
//! publishing). It is built once per run and never mutated; steps that need it
//! take `&ReleaseContext`.
//!
//! ```text
//! main.rs:
//!   RunContext::detect() -> resolve() -> ReleaseContext
//!   |
//!   v
//! dispatch / sync / repository:
//!   fn run(ctx: &ReleaseContext, ...)
//! ```

use crate::core::config::ShipConfig;
use crate::core::error::{ResultExt, ShipResult};
use crate::release::{ReleaseNumber, ReleaseTag, Resolution, RunMode, Version};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};

/// Immutable per-run state shared by every job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseContext {
  pub package: String,
  pub version: Version,
  pub release: ReleaseNumber,
  pub tag: ReleaseTag,
  pub mode: RunMode,

  /// Concurrency group this run serializes on
  pub concurrency_group: String,

  /// Unique id of this run (lease owner)
  pub run_id: String,

  /// Workspace root (absolute)
  pub workspace_root: PathBuf,

  /// State directory for locks, intent logs and reports (absolute)
  pub state_dir: PathBuf,
}

impl ReleaseContext {
  /// Combine a resolution with workspace configuration
  pub fn new(resolution: Resolution, config: &ShipConfig, workspace_root: &Path) -> Self {
    Self {
      package: config.release.package.clone(),
      version: resolution.version,
      release: resolution.release,
      tag: resolution.tag,
      mode: resolution.mode,
      concurrency_group: config.concurrency_group(),
      run_id: new_run_id(),
      workspace_root: workspace_root.to_path_buf(),
      state_dir: workspace_root.join(&config.release.state_dir),
    }
  }

  /// `{version}-{release}` as it appears in package file names
  pub fn full_version(&self) -> String {
    format!("{}-{}", self.version, self.release)
  }

  /// Environment passed to every job command
  pub fn job_env(&self) -> Vec<(&'static str, String)> {
    vec![
      ("PKGSHIP_PACKAGE", self.package.clone()),
      ("PKGSHIP_VERSION", self.version.to_string()),
      ("PKGSHIP_RELEASE", self.release.to_string()),
      ("PKGSHIP_TAG", self.tag.to_string()),
    ]
  }

  /// `key=value` lines in the GitHub Actions output format
  pub fn to_github_output(&self) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "version={}", self.version);
    let _ = writeln!(out, "release={}", self.release);
    let _ = writeln!(out, "tag={}", self.tag);
    let _ = writeln!(
      out,
      "mode={}",
      match self.mode {
        RunMode::Event => "event",
        RunMode::Manual => "manual",
      }
    );
    out
  }

  /// Append the outputs to a GITHUB_OUTPUT file
  pub fn append_github_output(&self, path: &Path) -> ShipResult<()> {
    let mut file = OpenOptions::new()
      .create(true)
      .append(true)
      .open(path)
      .with_context(|| format!("Failed to open {}", path.display()))?;
    file
      .write_all(self.to_github_output().as_bytes())
      .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
  }
}

/// Run id: timestamp plus process id, unique enough to order runs on one host
pub fn new_run_id() -> String {
  format!(
    "{}-{}",
    chrono::Utc::now().format("%Y%m%dT%H%M%S%.6fZ"),
    std::process::id()
  )
}
