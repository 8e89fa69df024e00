//! Build and validate packages without publishing

use super::Workspace;
use super::sync::print_json;
use crate::core::config::BuildTarget;
use crate::core::context::ReleaseContext;
use crate::core::error::ShipResult;
use crate::core::lock::ConcurrencyLease;
use crate::dispatch::{DispatchReport, Dispatcher, JobStatus, ShellExecutor};

/// Run the build command
///
/// With `dry_run` only the job plan is shown. Otherwise every job runs and the
/// command fails when a build or validation failed.
pub fn run_build(
  tag: Option<String>,
  remote: Option<String>,
  targets: Vec<String>,
  dry_run: bool,
  json: bool,
) -> ShipResult<()> {
  let workspace = Workspace::load()?;
  let backend = workspace.backend(remote.as_deref())?;
  let ctx = workspace.resolve_context(tag.as_deref(), backend.as_ref())?;
  let selected = select_targets(&workspace, &targets)?;

  let executor = ShellExecutor;

  if dry_run {
    let plan = Dispatcher::new(&ctx, &selected, &executor).plan()?;
    if json {
      println!("{}", plan.to_json()?);
    } else {
      println!("{}", plan.to_human_readable());
      println!("💡 Dry-run only; drop --dry-run to run the jobs");
    }
    return Ok(());
  }

  let lease = ConcurrencyLease::acquire(&ctx.state_dir, &ctx.concurrency_group, &ctx.run_id)?;
  if !json {
    println!(
      "🔨 Building {} {} for {} target(s) (group {})",
      ctx.package,
      ctx.full_version(),
      selected.len(),
      lease.group()
    );
  }

  let report = Dispatcher::new(&ctx, &selected, &executor).with_lease(&lease).run()?;

  if json {
    print_json(&report)?;
  } else {
    print_dispatch_report(&ctx, &report);
  }

  lease.release()?;
  report.ensure_publishable()
}

/// Targets named on the command line, or all of them
pub(crate) fn select_targets(workspace: &Workspace, names: &[String]) -> ShipResult<Vec<BuildTarget>> {
  if names.is_empty() {
    return Ok(workspace.config.targets.clone());
  }
  names
    .iter()
    .map(|name| workspace.config.find_target(name).cloned())
    .collect()
}

/// Job table and produced packages
pub(crate) fn print_dispatch_report(ctx: &ReleaseContext, report: &DispatchReport) {
  println!("\n📋 Jobs for {} {}:", ctx.package, ctx.full_version());
  for job in &report.jobs {
    let (icon, detail) = match &job.status {
      JobStatus::Succeeded => ("✅", format!("{} ms", job.duration_ms)),
      JobStatus::Failed(reason) => ("❌", reason.clone()),
      JobStatus::Skipped(reason) => ("⏭️ ", format!("skipped: {}", reason)),
    };
    println!("   {} {} ({})", icon, job.id, detail);
  }

  if !report.packages.is_empty() {
    println!("\n📦 Packages:");
    for package in &report.packages {
      println!("   • {}", package.path.display());
    }
  }
  if !report.reports.is_empty() {
    println!("\n🧪 Validation reports:");
    for path in &report.reports {
      println!("   • {}", path.display());
    }
  }
  println!();
}
