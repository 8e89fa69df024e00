//! Asset synchronization: reconcile a release's attached files with a new set
//!
//! Two modes:
//!
//! - **append** (release events): upload the new files, delete nothing
//! - **replace** (manual rebuilds): delete every attached asset, then upload the
//!   full new set, so no stale or duplicate asset survives
//!
//! Synchronization runs in two phases (delete, then upload) and is recorded in an
//! intent log so that a retried run of the same plan resumes instead of starting
//! over. See [`synchronizer`] for the execution rules.

pub mod intent;
pub mod synchronizer;

use crate::release::RunMode;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use synchronizer::{SyncPlan, SyncReport, Synchronizer};

/// How the new set is merged into the release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
  /// Upload only; existing assets stay
  Append,
  /// Delete every attached asset, then upload
  Replace,
}

impl SyncMode {
  /// Default mode for a run: events append, manual rebuilds replace
  pub fn for_run(mode: RunMode) -> Self {
    match mode {
      RunMode::Event => SyncMode::Append,
      RunMode::Manual => SyncMode::Replace,
    }
  }
}

impl fmt::Display for SyncMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SyncMode::Append => write!(f, "append"),
      SyncMode::Replace => write!(f, "replace"),
    }
  }
}
