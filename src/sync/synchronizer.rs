//! Two-phase release asset synchronization
//!
//! Rules:
//!
//! - The plan id covers the tag, the mode and the name and SHA-256 of every new
//!   file. Deletions are not part of it (they depend on what is attached now).
//! - Before the first mutation the intent is written; it is rewritten before
//!   each upload and after each completed delete or upload, and removed once
//!   every delete and upload succeeded.
//! - A run whose plan id matches a stored intent keeps the uploads the intent
//!   records, provided they are still attached with the same size. An upload
//!   that was started but never confirmed counts too when its name was free at
//!   plan time.
//! - Delete failures are logged and the run carries on to the upload phase.
//!   Upload failures are collected per file. Either kind fails the run and keeps
//!   the intent, so a retry finishes the job.
//! - The concurrency lease is checked before every remote mutation.

use super::SyncMode;
use super::intent::{IntentLog, SyncIntent};
use crate::core::error::{ShipError, ShipResult, SyncError};
use crate::core::lock::ConcurrencyLease;
use crate::core::plan::{Operation, OperationType, Plan, PlanId};
use crate::release::ReleaseTag;
use crate::remote::{ReleaseBackend, RemoteAsset};
use crate::ui::progress::AssetProgress;
use crate::utils::{file_name_of, sha256_file};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// A freshly produced file destined for the release
#[derive(Debug, Clone, Serialize)]
pub struct LocalFile {
  pub path: PathBuf,
  pub name: String,
  pub size: u64,
  pub sha256: String,
}

impl LocalFile {
  pub fn from_path(path: &Path) -> ShipResult<Self> {
    let metadata = std::fs::metadata(path)
      .map_err(|e| ShipError::message(format!("Cannot read {}: {}", path.display(), e)))?;
    if !metadata.is_file() {
      return Err(ShipError::message(format!("{} is not a file", path.display())));
    }
    Ok(Self {
      path: path.to_path_buf(),
      name: file_name_of(path),
      size: metadata.len(),
      sha256: sha256_file(path)?,
    })
  }
}

/// What a synchronization will do
#[derive(Debug, Clone, Serialize)]
pub struct SyncPlan {
  pub plan: Plan,
  pub tag: ReleaseTag,
  pub mode: SyncMode,
  pub remote: String,
  /// Delete phase
  pub deletes: Vec<RemoteAsset>,
  /// Every new file, in upload order
  pub uploads: Vec<LocalFile>,
  /// Files an interrupted run of this plan already uploaded
  pub resumed: BTreeSet<String>,
  #[serde(skip)]
  previous: Option<SyncIntent>,
  /// Names attached when the plan was made
  #[serde(skip)]
  attached: BTreeSet<String>,
}

impl SyncPlan {
  pub fn id(&self) -> &PlanId {
    self.plan.id()
  }

  /// Uploads still to perform
  pub fn pending_uploads(&self) -> impl Iterator<Item = &LocalFile> {
    self.uploads.iter().filter(|f| !self.resumed.contains(&f.name))
  }

  pub fn is_noop(&self) -> bool {
    self.deletes.is_empty() && self.pending_uploads().next().is_none()
  }

  pub fn to_human_readable(&self) -> String {
    let mut output = self.plan.to_human_readable();
    output.push_str(&format!("   Remote: {}\n", self.remote));
    if !self.resumed.is_empty() {
      output.push_str(&format!(
        "\n   Already uploaded by an interrupted run ({}), kept:\n",
        self.resumed.len()
      ));
      for name in &self.resumed {
        output.push_str(&format!("   • {}\n", name));
      }
    }
    output
  }
}

/// A per-file failure
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
  pub name: String,
  pub reason: String,
}

/// Outcome of an executed synchronization
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
  pub plan_id: String,
  pub tag: String,
  pub mode: SyncMode,
  pub deleted: Vec<String>,
  pub uploaded: Vec<String>,
  pub resumed: Vec<String>,
  pub delete_failures: Vec<FileFailure>,
  pub upload_failures: Vec<FileFailure>,
}

impl SyncReport {
  fn new(plan: &SyncPlan) -> Self {
    Self {
      plan_id: plan.id().as_str().to_string(),
      tag: plan.tag.to_string(),
      mode: plan.mode,
      deleted: Vec::new(),
      uploaded: Vec::new(),
      resumed: plan.resumed.iter().cloned().collect(),
      delete_failures: Vec::new(),
      upload_failures: Vec::new(),
    }
  }

  /// Every delete and every upload landed
  pub fn is_success(&self) -> bool {
    self.upload_failures.is_empty() && self.delete_failures.is_empty()
  }

  /// Turn per-file failures into an error; upload failures take precedence
  pub fn ensure_success(&self) -> ShipResult<()> {
    let names = |failures: &[FileFailure]| -> Vec<String> { failures.iter().map(|f| f.name.clone()).collect() };
    if !self.upload_failures.is_empty() {
      return Err(ShipError::Sync(SyncError::UploadsFailed {
        tag: self.tag.clone(),
        files: names(&self.upload_failures),
      }));
    }
    if !self.delete_failures.is_empty() {
      return Err(ShipError::Sync(SyncError::DeletesFailed {
        tag: self.tag.clone(),
        files: names(&self.delete_failures),
      }));
    }
    Ok(())
  }
}

/// Reconciles one release at a time against a backend
pub struct Synchronizer<'a> {
  backend: &'a dyn ReleaseBackend,
  state_dir: PathBuf,
}

impl<'a> Synchronizer<'a> {
  pub fn new(backend: &'a dyn ReleaseBackend, state_dir: &Path) -> Self {
    Self {
      backend,
      state_dir: state_dir.to_path_buf(),
    }
  }

  /// Plan a synchronization of `files` into the release `tag`
  pub fn plan(&self, tag: &ReleaseTag, mode: SyncMode, files: &[PathBuf]) -> ShipResult<SyncPlan> {
    let mut uploads = files
      .iter()
      .map(|p| LocalFile::from_path(p))
      .collect::<ShipResult<Vec<_>>>()?;
    uploads.sort_by(|a, b| a.name.cmp(&b.name));

    let mut seen = HashSet::new();
    for file in &uploads {
      if !seen.insert(file.name.as_str()) {
        return Err(ShipError::with_help(
          format!("Two files share the asset name '{}'", file.name),
          "Asset names must be unique within a release; check the artifact globs",
        ));
      }
    }

    let attached = self.backend.list_assets(tag)?;
    debug!(tag = %tag, attached = attached.len(), "listed release assets");

    let mut plan = Plan::new(OperationType::Sync, Some(tag.to_string())).with_salt(mode.to_string());
    let upload_ops: Vec<Operation> = uploads
      .iter()
      .map(|f| Operation::UploadAsset {
        tag: tag.to_string(),
        name: f.name.clone(),
        path: f.path.display().to_string(),
        size: f.size,
        sha256: f.sha256.clone(),
      })
      .collect();
    plan.add_operations(upload_ops);

    let previous = IntentLog::for_tag(&self.state_dir, tag.as_str())
      .load()?
      .filter(|intent| intent.plan_id == plan.id().as_str());

    let resumed: BTreeSet<String> = match &previous {
      Some(intent) => uploads
        .iter()
        .filter(|f| {
          let landed = intent.find_upload(&f.name).is_some_and(|record| record.size == f.size)
            || intent.was_attempted(&f.name);
          landed && attached.iter().any(|a| a.name == f.name && a.size == f.size)
        })
        .map(|f| f.name.clone())
        .collect(),
      None => BTreeSet::new(),
    };
    if !resumed.is_empty() {
      info!(tag = %tag, plan = %plan.id(), kept = resumed.len(), "resuming interrupted synchronization");
    }

    let attached_names: BTreeSet<String> = attached.iter().map(|a| a.name.clone()).collect();
    let deletes: Vec<RemoteAsset> = match mode {
      SyncMode::Append => Vec::new(),
      SyncMode::Replace => attached.into_iter().filter(|a| !resumed.contains(&a.name)).collect(),
    };

    // Delete phase first in the listing
    let mut ordered = Plan::new(OperationType::Sync, Some(tag.to_string())).with_salt(mode.to_string());
    ordered.add_operations(deletes.iter().map(|a| Operation::DeleteAsset {
      tag: tag.to_string(),
      name: a.name.clone(),
    }));
    ordered.add_operations(plan.operations);

    let summary = format!(
      "   Mode: {} ({} to delete, {} to upload, {} kept)",
      mode,
      deletes.len(),
      uploads.len() - resumed.len(),
      resumed.len()
    );
    let mut plan = ordered.with_summary(summary);
    if !deletes.is_empty() {
      plan = plan.mark_destructive();
    }

    Ok(SyncPlan {
      plan,
      tag: tag.clone(),
      mode,
      remote: self.backend.describe(),
      deletes,
      uploads,
      resumed,
      previous,
      attached: attached_names,
    })
  }

  /// Execute a plan; returns per-file outcomes
  ///
  /// Errors are reserved for conditions that stop the whole run (cancellation,
  /// intent log I/O). Per-file failures land in the report.
  pub fn execute(&self, plan: &SyncPlan, lease: &ConcurrencyLease) -> ShipResult<SyncReport> {
    let log = IntentLog::for_tag(&self.state_dir, plan.tag.as_str());
    let mut report = SyncReport::new(plan);

    if plan.is_noop() {
      info!(tag = %plan.tag, "release already in sync");
      log.remove()?;
      return Ok(report);
    }

    lease.ensure_current()?;

    let mut intent = match &plan.previous {
      Some(previous) => previous.clone(),
      None => SyncIntent::new(plan.id().as_str(), plan.tag.as_str(), plan.mode, lease.run_id()),
    };
    intent.run_id = lease.run_id().to_string();
    log.save(&mut intent)?;

    // Phase 1: delete
    let mut progress = AssetProgress::new(plan.deletes.len(), "Deleting stale assets");
    for asset in &plan.deletes {
      lease.ensure_current()?;
      match self.backend.delete_asset(&plan.tag, asset) {
        Ok(()) => {
          info!(tag = %plan.tag, asset = %asset.name, "deleted asset");
          intent.record_delete(&asset.name);
          log.save(&mut intent)?;
          report.deleted.push(asset.name.clone());
        }
        Err(e) => {
          warn!(tag = %plan.tag, asset = %asset.name, error = %e, "failed to delete asset, continuing");
          report.delete_failures.push(FileFailure {
            name: asset.name.clone(),
            reason: e.to_string(),
          });
        }
      }
      progress.inc();
    }

    // Phase 2: upload
    let pending: Vec<&LocalFile> = plan.pending_uploads().collect();
    let mut progress = AssetProgress::new(pending.len(), "Uploading assets");
    for file in pending {
      lease.ensure_current()?;
      // A name already taken at plan time is a collision, not an upload of ours
      if !plan.attached.contains(&file.name) {
        intent.record_attempt(&file.name);
        log.save(&mut intent)?;
      }
      match self.backend.upload_asset(&plan.tag, &file.path) {
        Ok(asset) => {
          info!(tag = %plan.tag, asset = %asset.name, size = asset.size, "uploaded asset");
          intent.record_upload(&asset.name, asset.size);
          log.save(&mut intent)?;
          report.uploaded.push(asset.name);
        }
        Err(e) => {
          error!(tag = %plan.tag, asset = %file.name, error = %e, "failed to upload asset");
          report.upload_failures.push(FileFailure {
            name: file.name.clone(),
            reason: e.to_string(),
          });
        }
      }
      progress.inc();
    }

    if report.is_success() {
      log.remove()?;
    } else {
      info!(path = %log.path().display(), "keeping sync intent for retry");
    }

    Ok(report)
  }
}
