//! Persisted synchronization intent
//!
//! Written to `<state_dir>/sync/<tag>.json` before the first remote mutation and
//! rewritten before each upload starts and after every completed delete or
//! upload. A later run with the same plan id reads it back to learn which
//! uploads already landed.

use super::SyncMode;
use crate::core::error::{ResultExt, ShipResult};
use crate::utils::sanitize_component;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// An upload recorded as complete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRecord {
  pub name: String,
  pub size: u64,
}

/// In-flight synchronization state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncIntent {
  /// Full plan id (tag, mode, file names and digests)
  pub plan_id: String,
  pub tag: String,
  pub mode: SyncMode,
  /// Run that last wrote the intent
  pub run_id: String,
  pub started_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  #[serde(default)]
  pub deleted: Vec<String>,
  #[serde(default)]
  pub uploaded: Vec<UploadRecord>,
  /// Uploads started whose outcome was never confirmed
  #[serde(default)]
  pub attempted: Vec<String>,
}

impl SyncIntent {
  pub fn new(plan_id: &str, tag: &str, mode: SyncMode, run_id: &str) -> Self {
    let now = Utc::now();
    Self {
      plan_id: plan_id.to_string(),
      tag: tag.to_string(),
      mode,
      run_id: run_id.to_string(),
      started_at: now,
      updated_at: now,
      deleted: Vec::new(),
      uploaded: Vec::new(),
      attempted: Vec::new(),
    }
  }

  pub fn record_delete(&mut self, name: &str) {
    if !self.deleted.iter().any(|d| d == name) {
      self.deleted.push(name.to_string());
    }
  }

  pub fn record_upload(&mut self, name: &str, size: u64) {
    self.uploaded.retain(|u| u.name != name);
    self.uploaded.push(UploadRecord {
      name: name.to_string(),
      size,
    });
  }

  pub fn record_attempt(&mut self, name: &str) {
    if !self.attempted.iter().any(|a| a == name) {
      self.attempted.push(name.to_string());
    }
  }

  pub fn was_attempted(&self, name: &str) -> bool {
    self.attempted.iter().any(|a| a == name)
  }

  pub fn find_upload(&self, name: &str) -> Option<&UploadRecord> {
    self.uploaded.iter().find(|u| u.name == name)
  }
}

/// Location of the intent file for one release
#[derive(Debug, Clone)]
pub struct IntentLog {
  path: PathBuf,
}

impl IntentLog {
  pub fn for_tag(state_dir: &Path, tag: &str) -> Self {
    Self {
      path: state_dir.join("sync").join(format!("{}.json", sanitize_component(tag))),
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Read the intent; an unreadable file is ignored (and overwritten later)
  pub fn load(&self) -> ShipResult<Option<SyncIntent>> {
    if !self.path.exists() {
      return Ok(None);
    }
    let content = fs::read_to_string(&self.path).with_context(|| format!("Failed to read {}", self.path.display()))?;
    match serde_json::from_str(&content) {
      Ok(intent) => Ok(Some(intent)),
      Err(e) => {
        warn!(path = %self.path.display(), error = %e, "ignoring corrupt sync intent");
        Ok(None)
      }
    }
  }

  /// Persist the intent (write to a temp file, then rename)
  pub fn save(&self, intent: &mut SyncIntent) -> ShipResult<()> {
    intent.updated_at = Utc::now();
    if let Some(parent) = self.path.parent() {
      fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let tmp = self.path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_vec_pretty(intent)?).with_context(|| format!("Failed to write {}", tmp.display()))?;
    fs::rename(&tmp, &self.path).with_context(|| format!("Failed to write {}", self.path.display()))?;
    Ok(())
  }

  pub fn remove(&self) -> ShipResult<()> {
    if self.path.exists() {
      fs::remove_file(&self.path).with_context(|| format!("Failed to remove {}", self.path.display()))?;
    }
    Ok(())
  }
}
