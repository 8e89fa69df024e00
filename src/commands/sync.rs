//! Synchronize release assets with a set of local files

use super::Workspace;
use crate::core::error::{ResultExt, ShipError, ShipResult};
use crate::core::lock::ConcurrencyLease;
use crate::sync::{SyncMode, SyncReport, Synchronizer};
use crate::ui::summary::RunSummary;
use std::path::PathBuf;

/// Run the sync command
///
/// The target release is `--tag`, the release event's tag, or the latest
/// release. Without `--mode`, event runs append and manual runs replace.
pub fn run_sync(
  files: Vec<PathBuf>,
  tag: Option<String>,
  remote: Option<String>,
  mode: Option<SyncMode>,
  apply: bool,
  json: bool,
) -> ShipResult<()> {
  if files.is_empty() {
    return Err(ShipError::with_help(
      "No files to synchronize",
      "Try: pkgship sync --apply out/*.rpm out/*.deb",
    ));
  }

  let workspace = Workspace::load()?;
  let backend = workspace.backend(remote.as_deref())?;
  let ctx = workspace.resolve_context(tag.as_deref(), backend.as_ref())?;
  let mode = mode.unwrap_or_else(|| SyncMode::for_run(ctx.mode));

  let synchronizer = Synchronizer::new(backend.as_ref(), &ctx.state_dir);
  let plan = synchronizer.plan(&ctx.tag, mode, &files)?;

  if !apply {
    if json {
      print_json(&plan)?;
    } else {
      println!("{}", plan.to_human_readable());
      println!("💡 Dry-run only; re-run with --apply to synchronize");
    }
    return Ok(());
  }

  let lease = ConcurrencyLease::acquire(&ctx.state_dir, &ctx.concurrency_group, &ctx.run_id)?;
  if !json {
    println!("🔄 Synchronizing {} ({}) on {}", plan.tag, plan.mode, plan.remote);
  }

  let report = synchronizer.execute(&plan, &lease)?;

  if json {
    print_json(&report)?;
  } else {
    print_sync_report(&report);
  }

  let mut summary = RunSummary::new(format!("pkgship sync {}", report.tag));
  add_sync_sections(&mut summary, &report);
  summary.publish()?;

  lease.release()?;
  report.ensure_success()
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> ShipResult<()> {
  let output = serde_json::to_string_pretty(value).context("Failed to serialize JSON")?;
  println!("{}", output);
  Ok(())
}

pub(crate) fn print_sync_report(report: &SyncReport) {
  println!("\n📋 Synchronization of {} ({}):", report.tag, report.mode);
  for name in &report.deleted {
    println!("   🗑️  deleted {}", name);
  }
  for name in &report.resumed {
    println!("   ♻️  kept {}", name);
  }
  for name in &report.uploaded {
    println!("   ✅ uploaded {}", name);
  }
  for failure in &report.delete_failures {
    println!("   ⚠️  could not delete {}: {}", failure.name, failure.reason);
  }
  for failure in &report.upload_failures {
    println!("   ❌ failed to upload {}: {}", failure.name, failure.reason);
  }
  println!(
    "\n   {} deleted, {} uploaded, {} kept, {} failed",
    report.deleted.len(),
    report.uploaded.len(),
    report.resumed.len(),
    report.upload_failures.len() + report.delete_failures.len()
  );
}

pub(crate) fn add_sync_sections(summary: &mut RunSummary, report: &SyncReport) {
  summary
    .fact("Release", &report.tag)
    .fact("Sync mode", report.mode)
    .fact("Sync plan", &report.plan_id[..12.min(report.plan_id.len())])
    .section("Uploaded", report.uploaded.iter().cloned())
    .section("Deleted", report.deleted.iter().cloned())
    .section(
      "Upload failures",
      report.upload_failures.iter().map(|f| format!("{}: {}", f.name, f.reason)),
    )
    .section(
      "Delete failures",
      report.delete_failures.iter().map(|f| format!("{}: {}", f.name, f.reason)),
    );
}

