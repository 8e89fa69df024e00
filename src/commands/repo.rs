//! Publish packages into the repository tree

use super::Workspace;
use super::sync::print_json;
use crate::core::context::new_run_id;
use crate::core::error::{ShipError, ShipResult};
use crate::core::lock::ConcurrencyLease;
use crate::dispatch::ShellExecutor;
use crate::release::PackageFile;
use crate::repository::{PublishReport, RepositoryPublisher};
use crate::utils::file_name_of;
use std::path::PathBuf;

/// Run the repo publish command
///
/// Package name, version and architecture come from each file's asset name;
/// `--distro` / `--distro-version` fill in (or override) the distribution.
pub fn run_repo_publish(
  files: Vec<PathBuf>,
  distro: Option<String>,
  distro_version: Option<String>,
  apply: bool,
  json: bool,
) -> ShipResult<()> {
  if files.is_empty() {
    return Err(ShipError::with_help(
      "No packages to publish",
      "Try: pkgship repo publish --apply out/*.rpm",
    ));
  }

  let workspace = Workspace::load()?;
  let packages = files
    .iter()
    .map(|path| {
      PackageFile::from_asset_name(path, distro.as_deref(), distro_version.as_deref()).ok_or_else(|| {
        ShipError::with_help(
          format!("Cannot annotate '{}'", file_name_of(path)),
          "Name packages {package}-{version}-{release}.{distro}.{distro_version}.{arch}.{rpm|deb} or pass --distro and --distro-version",
        )
      })
    })
    .collect::<ShipResult<Vec<_>>>()?;

  let executor = ShellExecutor;
  let publisher = RepositoryPublisher::new(&workspace.config.repository(), &workspace.root, &executor);

  if !apply {
    let plan = publisher.plan(&packages)?;
    if json {
      println!("{}", plan.to_json()?);
    } else {
      println!("{}", plan.to_human_readable());
      println!("💡 Dry-run only; re-run with --apply to publish");
    }
    return Ok(());
  }

  let run_id = new_run_id();
  let lease = ConcurrencyLease::acquire(&workspace.state_dir(), &workspace.config.concurrency_group(), &run_id)?;
  let report = publisher.publish(&packages, Some(&lease))?;
  lease.release()?;

  if json {
    print_json(&report)?;
  } else {
    println!("📚 Published {} package(s) under {}", report.placed.len(), publisher.root().display());
    print_publish_report(&report);
  }
  Ok(())
}

pub(crate) fn print_publish_report(report: &PublishReport) {
  for leaf in &report.replaced_leaves {
    println!("   🔁 replaced {}", leaf.display());
  }
  for file in &report.placed {
    println!("   📦 {}", file.display());
  }
  println!("   🗂️  reindexed {} leaf director(ies)", report.indexed_leaves.len());
}
