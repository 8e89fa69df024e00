//! Concurrency group lease
//!
//! A group is a file `<state_dir>/locks/<group>.lock` holding the id of the run
//! that owns it. Acquiring always overwrites: the newest run wins and any older
//! run still in flight notices on its next `ensure_current()` and stops.

use crate::core::error::{ResultExt, ShipError, ShipResult};
use crate::utils::sanitize_component;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Ownership of a concurrency group for the lifetime of one run
#[derive(Debug)]
pub struct ConcurrencyLease {
  group: String,
  run_id: String,
  path: PathBuf,
  released: bool,
}

impl ConcurrencyLease {
  /// Take over the group, superseding whichever run held it
  pub fn acquire(state_dir: &Path, group: &str, run_id: &str) -> ShipResult<Self> {
    let dir = state_dir.join("locks");
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let path = dir.join(format!("{}.lock", sanitize_component(group)));
    if let Some(previous) = read_holder(&path)?
      && previous != run_id
    {
      info!(group, previous = %previous, run_id, "superseding in-flight run");
    }

    fs::write(&path, run_id).with_context(|| format!("Failed to write {}", path.display()))?;
    debug!(group, run_id, path = %path.display(), "lease acquired");

    Ok(Self {
      group: group.to_string(),
      run_id: run_id.to_string(),
      path,
      released: false,
    })
  }

  pub fn group(&self) -> &str {
    &self.group
  }

  pub fn run_id(&self) -> &str {
    &self.run_id
  }

  /// Fail with `Cancelled` if another run took the group over
  pub fn ensure_current(&self) -> ShipResult<()> {
    match read_holder(&self.path)? {
      Some(holder) if holder == self.run_id => Ok(()),
      holder => Err(ShipError::Cancelled {
        group: self.group.clone(),
        superseded_by: holder.unwrap_or_else(|| "<released>".to_string()),
      }),
    }
  }

  /// Give the group up; a no-op when a newer run already owns it
  pub fn release(mut self) -> ShipResult<()> {
    self.release_inner()
  }

  fn release_inner(&mut self) -> ShipResult<()> {
    if self.released {
      return Ok(());
    }
    self.released = true;

    if read_holder(&self.path)?.as_deref() == Some(self.run_id.as_str()) {
      fs::remove_file(&self.path).with_context(|| format!("Failed to remove {}", self.path.display()))?;
      debug!(group = %self.group, run_id = %self.run_id, "lease released");
    }
    Ok(())
  }
}

impl Drop for ConcurrencyLease {
  fn drop(&mut self) {
    if let Err(e) = self.release_inner() {
      warn!(group = %self.group, error = %e, "failed to release lease");
    }
  }
}

fn read_holder(path: &Path) -> ShipResult<Option<String>> {
  if !path.exists() {
    return Ok(None);
  }
  let holder = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
  Ok(Some(holder.trim().to_string()))
}
