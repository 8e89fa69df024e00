//! End-to-end release pipeline
//!
//! resolve -> build -> validate -> (gate) -> sync assets -> publish repository
//!
//! The whole run holds the concurrency group lease; a newer run of the same
//! group cancels this one at its next job wave or remote mutation.

use super::Workspace;
use super::build::print_dispatch_report;
use super::repo::print_publish_report;
use super::sync::{add_sync_sections, print_json, print_sync_report};
use crate::core::context::ReleaseContext;
use crate::core::error::ShipResult;
use crate::core::lock::ConcurrencyLease;
use crate::dispatch::{DispatchReport, Dispatcher, JobStatus, ShellExecutor};
use crate::remote::ReleaseBackend;
use crate::repository::{PublishReport, RepositoryPublisher};
use crate::sync::{SyncMode, SyncReport, Synchronizer};
use crate::ui::summary::RunSummary;
use serde::Serialize;
use tracing::info;

/// Everything a release run did, for `--json`
#[derive(Debug, Serialize)]
struct ReleaseOutcome<'a> {
  context: &'a ReleaseContext,
  dispatch: &'a DispatchReport,
  #[serde(skip_serializing_if = "Option::is_none")]
  sync: Option<&'a SyncReport>,
  #[serde(skip_serializing_if = "Option::is_none")]
  repository: Option<&'a PublishReport>,
}

/// Run the release command
pub fn run_release(
  tag: Option<String>,
  remote: Option<String>,
  mode: Option<SyncMode>,
  skip_repo: bool,
  apply: bool,
  json: bool,
) -> ShipResult<()> {
  let workspace = Workspace::load()?;
  let backend = workspace.backend(remote.as_deref())?;
  let ctx = workspace.resolve_context(tag.as_deref(), backend.as_ref())?;
  let mode = mode.unwrap_or_else(|| SyncMode::for_run(ctx.mode));
  let publish_repo = !skip_repo && workspace.config.repository.is_some();

  let executor = ShellExecutor;
  let targets = &workspace.config.targets;

  if !apply {
    return show_plan(&workspace, &ctx, backend.as_ref(), mode, publish_repo, json);
  }

  let lease = ConcurrencyLease::acquire(&ctx.state_dir, &ctx.concurrency_group, &ctx.run_id)?;
  if !json {
    println!(
      "🚀 Releasing {} {} ({}, tag {}, {} mode)",
      ctx.package,
      ctx.full_version(),
      backend.describe(),
      ctx.tag,
      mode
    );
  }

  // Build and validate
  let dispatch = Dispatcher::new(&ctx, targets, &executor).with_lease(&lease).run()?;
  if !json {
    print_dispatch_report(&ctx, &dispatch);
  }

  let mut summary = RunSummary::new(format!("pkgship release {}", ctx.tag));
  summary
    .fact("Package", &ctx.package)
    .fact("Version", &ctx.version)
    .fact("Release", ctx.release)
    .fact("Tag", &ctx.tag)
    .section("Jobs", dispatch.jobs.iter().map(|job| match &job.status {
      JobStatus::Succeeded => format!("✅ {}", job.id),
      JobStatus::Failed(reason) => format!("❌ {}: {}", job.id, reason),
      JobStatus::Skipped(reason) => format!("⏭️ {}: {}", job.id, reason),
    }));

  if let Err(e) = dispatch.ensure_publishable() {
    summary.section("Outcome", [format!("Nothing published: {}", e)]);
    summary.publish()?;
    if json {
      print_json(&ReleaseOutcome {
        context: &ctx,
        dispatch: &dispatch,
        sync: None,
        repository: None,
      })?;
    }
    return Err(e);
  }

  // Synchronize release assets
  let files: Vec<_> = dispatch.packages.iter().map(|p| p.path.clone()).collect();
  let synchronizer = Synchronizer::new(backend.as_ref(), &ctx.state_dir);
  let plan = synchronizer.plan(&ctx.tag, mode, &files)?;
  info!(plan = %plan.id(), deletes = plan.deletes.len(), uploads = plan.uploads.len(), "synchronizing release assets");
  let sync = synchronizer.execute(&plan, &lease)?;
  if !json {
    print_sync_report(&sync);
  }
  add_sync_sections(&mut summary, &sync);

  // Package repository
  let repository = if publish_repo {
    let publisher = RepositoryPublisher::new(&workspace.config.repository(), &workspace.root, &executor);
    let report = publisher.publish(&dispatch.packages, Some(&lease))?;
    if !json {
      println!("\n📚 Repository {}:", publisher.root().display());
      print_publish_report(&report);
    }
    summary.section(
      "Repository leaves",
      report.replaced_leaves.iter().map(|leaf| leaf.display().to_string()),
    );
    Some(report)
  } else {
    None
  };

  if let Some(path) = summary.publish()? {
    info!(path = %path.display(), "wrote step summary");
  }

  if json {
    print_json(&ReleaseOutcome {
      context: &ctx,
      dispatch: &dispatch,
      sync: Some(&sync),
      repository: repository.as_ref(),
    })?;
  } else if sync.is_success() {
    println!("\n✨ Released {} {}", ctx.package, ctx.full_version());
  }

  lease.release()?;
  sync.ensure_success()
}

/// Dry-run: job plan plus what synchronization would touch
fn show_plan(
  workspace: &Workspace,
  ctx: &ReleaseContext,
  backend: &dyn ReleaseBackend,
  mode: SyncMode,
  publish_repo: bool,
  json: bool,
) -> ShipResult<()> {
  let executor = ShellExecutor;
  let plan = Dispatcher::new(ctx, &workspace.config.targets, &executor).plan()?;

  if json {
    println!("{}", plan.to_json()?);
    return Ok(());
  }

  println!("{}", plan.to_human_readable());
  println!("🔄 Then synchronize {} on {} ({} mode)", ctx.tag, backend.describe(), mode);
  if mode == SyncMode::Replace {
    let attached = backend.list_assets(&ctx.tag)?;
    if attached.is_empty() {
      println!("   No assets attached yet");
    } else {
      println!("   Would delete {} attached asset(s):", attached.len());
      for asset in &attached {
        println!("   • {}", asset.name);
      }
    }
  }
  if publish_repo {
    let root = workspace.root.join(&workspace.config.repository().root);
    println!("📚 Then publish packages under {}", root.display());
  }
  println!("\n💡 Dry-run only; re-run with --apply to release");
  Ok(())
}
