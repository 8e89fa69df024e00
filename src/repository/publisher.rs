//! Place packages into the repository tree and regenerate leaf indexes

use super::index::{find_leaves, write_index};
use crate::core::config::RepositoryConfig;
use crate::core::error::{ResultExt, ShipError, ShipResult};
use crate::core::lock::ConcurrencyLease;
use crate::core::plan::{Operation, OperationType, Plan};
use crate::dispatch::executor::{JobCommand, JobExecutor};
use crate::release::PackageFile;
use crate::utils::sanitize_component;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What a publish did
#[derive(Debug, Clone, Default, Serialize)]
pub struct PublishReport {
  pub replaced_leaves: Vec<PathBuf>,
  pub placed: Vec<PathBuf>,
  pub indexed_leaves: Vec<PathBuf>,
}

pub struct RepositoryPublisher<'a> {
  root: PathBuf,
  index_command: Option<String>,
  executor: &'a dyn JobExecutor,
}

impl<'a> RepositoryPublisher<'a> {
  /// `workspace_root` anchors a relative repository root
  pub fn new(config: &RepositoryConfig, workspace_root: &Path, executor: &'a dyn JobExecutor) -> Self {
    Self {
      root: workspace_root.join(&config.root),
      index_command: config.index_command.clone(),
      executor,
    }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// `{root}/{distro}/{distro_version}/{version}`
  pub fn leaf_for(&self, file: &PackageFile) -> PathBuf {
    self
      .root
      .join(sanitize_component(&file.distro))
      .join(sanitize_component(&file.distro_version))
      .join(sanitize_component(file.version.as_str()))
  }

  /// Group files by destination leaf; two files with one name in a leaf is an error
  fn group<'f>(&self, files: &'f [PackageFile]) -> ShipResult<BTreeMap<PathBuf, Vec<&'f PackageFile>>> {
    let mut leaves: BTreeMap<PathBuf, Vec<&PackageFile>> = BTreeMap::new();
    for file in files {
      let leaf = self.leaf_for(file);
      let group = leaves.entry(leaf.clone()).or_default();
      if group.iter().any(|f| f.file_name() == file.file_name()) {
        return Err(ShipError::message(format!(
          "Two packages named '{}' target {}",
          file.file_name(),
          leaf.display()
        )));
      }
      group.push(file);
    }
    Ok(leaves)
  }

  /// Leaves whose index will be regenerated after placing `files`
  fn leaves_after(&self, placed: impl IntoIterator<Item = PathBuf>) -> ShipResult<BTreeSet<PathBuf>> {
    let mut leaves: BTreeSet<PathBuf> = find_leaves(&self.root)?.into_iter().collect();
    leaves.extend(placed);
    Ok(leaves)
  }

  /// Plan of a publish (dry-run output)
  pub fn plan(&self, files: &[PackageFile]) -> ShipResult<Plan> {
    let groups = self.group(files)?;
    let mut plan = Plan::new(OperationType::Repository, None)
      .with_summary(format!("   Root: {}", self.root.display()));

    for (leaf, group) in &groups {
      plan.add_operation(Operation::ClearLeaf {
        dir: leaf.display().to_string(),
      });
      for file in group {
        plan.add_operation(Operation::PlaceFile {
          from: file.path.display().to_string(),
          to: leaf.join(file.file_name()).display().to_string(),
        });
      }
    }
    for leaf in self.leaves_after(groups.into_keys())? {
      plan.add_operation(Operation::RegenerateIndex {
        dir: leaf.display().to_string(),
      });
    }

    Ok(plan.mark_destructive())
  }

  /// Replace each target leaf with the given files, then reindex every leaf
  pub fn publish(&self, files: &[PackageFile], lease: Option<&ConcurrencyLease>) -> ShipResult<PublishReport> {
    let groups = self.group(files)?;
    let mut report = PublishReport::default();

    for (leaf, group) in &groups {
      if let Some(lease) = lease {
        lease.ensure_current()?;
      }

      let staging = sibling(leaf, "staging");
      clear_dir(&staging)?;
      fs::create_dir_all(&staging).with_context(|| format!("Failed to create {}", staging.display()))?;

      // Sources may live inside the leaf being replaced; copy before touching it
      for file in group {
        let staged = staging.join(file.file_name());
        fs::copy(&file.path, &staged)
          .with_context(|| format!("Failed to copy {} to {}", file.path.display(), staged.display()))?;
        debug!(from = %file.path.display(), to = %leaf.join(file.file_name()).display(), "placed package");
        report.placed.push(leaf.join(file.file_name()));
      }

      swap_in(&staging, leaf)?;
      report.replaced_leaves.push(leaf.clone());
      info!(leaf = %leaf.display(), files = group.len(), "replaced repository leaf");
    }

    for leaf in self.leaves_after(groups.into_keys())? {
      let index = write_index(&self.root, &leaf)?;
      debug!(leaf = %index.path, packages = index.packages.len(), "wrote leaf index");
      self.run_index_command(&leaf)?;
      report.indexed_leaves.push(leaf);
    }

    Ok(report)
  }

  fn run_index_command(&self, leaf: &Path) -> ShipResult<()> {
    let Some(template) = &self.index_command else {
      return Ok(());
    };
    let dir = leaf.display().to_string();
    let command = JobCommand {
      label: format!("index:{}", dir),
      script: template.replace("{dir}", &dir),
      cwd: self.root.clone(),
      env: vec![("PKGSHIP_LEAF".to_string(), dir.clone())],
    };
    let output = self.executor.run(&command)?;
    if !output.success {
      return Err(ShipError::with_help(
        format!(
          "Index command failed for {} ({}): {}",
          dir,
          output.describe_exit(),
          output.stderr.trim()
        ),
        "Check [repository].index_command; the leaf contents are already in place",
      ));
    }
    Ok(())
  }
}

/// Hidden directory next to `leaf`, skipped by leaf discovery
fn sibling(leaf: &Path, suffix: &str) -> PathBuf {
  let name = leaf
    .file_name()
    .map(|n| n.to_string_lossy().to_string())
    .unwrap_or_default();
  leaf.with_file_name(format!(".{}.{}", name, suffix))
}

fn clear_dir(dir: &Path) -> ShipResult<()> {
  if dir.exists() {
    fs::remove_dir_all(dir).with_context(|| format!("Failed to clear {}", dir.display()))?;
  }
  Ok(())
}

/// Move `staging` to `leaf`, retiring whatever `leaf` held
fn swap_in(staging: &Path, leaf: &Path) -> ShipResult<()> {
  let retired = sibling(leaf, "old");
  clear_dir(&retired)?;
  if leaf.exists() {
    fs::rename(leaf, &retired).with_context(|| format!("Failed to retire {}", leaf.display()))?;
  } else if let Some(parent) = leaf.parent() {
    fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
  }
  fs::rename(staging, leaf).with_context(|| format!("Failed to move {} into place", staging.display()))?;
  clear_dir(&retired)
}
