//! State directory checks

use super::trait_def::{Check, CheckContext, CheckResult};
use crate::core::error::ShipResult;
use crate::sync::intent::SyncIntent;
use std::fs;

/// The state directory (locks, intent logs, reports) must be writable
pub struct StateDirCheck;

impl Check for StateDirCheck {
  fn name(&self) -> &str {
    "state-dir"
  }

  fn description(&self) -> &str {
    "Validates the state directory is writable"
  }

  fn run(&self, ctx: &CheckContext) -> ShipResult<CheckResult> {
    let dir = ctx.state_dir();
    let probe = dir.join(".probe");

    let writable = fs::create_dir_all(&dir)
      .and_then(|_| fs::write(&probe, b"ok"))
      .and_then(|_| fs::remove_file(&probe));

    match writable {
      Ok(()) => Ok(CheckResult::pass(self.name(), format!("{} is writable", dir.display()))),
      Err(e) => Ok(CheckResult::error(
        self.name(),
        format!("Cannot write to {}: {}", dir.display(), e),
        Some("Fix permissions or set [release].state_dir"),
      )),
    }
  }
}

/// Interrupted synchronizations leave intent logs behind
pub struct PendingSyncCheck;

impl Check for PendingSyncCheck {
  fn name(&self) -> &str {
    "pending-sync"
  }

  fn description(&self) -> &str {
    "Reports synchronizations interrupted before completion"
  }

  fn run(&self, ctx: &CheckContext) -> ShipResult<CheckResult> {
    let dir = ctx.state_dir().join("sync");
    if !dir.is_dir() {
      return Ok(CheckResult::pass(self.name(), "No interrupted synchronizations"));
    }

    let mut pending = Vec::new();
    for entry in fs::read_dir(&dir)? {
      let path = entry?.path();
      if path.extension().is_some_and(|e| e == "json")
        && let Ok(content) = fs::read_to_string(&path)
        && let Ok(intent) = serde_json::from_str::<SyncIntent>(&content)
      {
        pending.push(format!(
          "{} ({}, {} uploaded, last update {})",
          intent.tag,
          intent.mode,
          intent.uploaded.len(),
          intent.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
      }
    }
    pending.sort();

    if pending.is_empty() {
      return Ok(CheckResult::pass(self.name(), "No interrupted synchronizations"));
    }
    Ok(CheckResult::warning(
      self.name(),
      format!("Interrupted synchronization(s): {}", pending.join("; ")),
      Some("Re-run the same sync to resume, or delete the intent file to start over"),
    ))
  }
}
