//! Built-in leaf index: `index.json` and `SHA256SUMS`

use crate::core::config::PackageFormat;
use crate::core::error::{ResultExt, ShipResult};
use crate::release::AssetName;
use crate::utils::{file_name_of, sha256_file};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const INDEX_FILE: &str = "index.json";
pub const SUMS_FILE: &str = "SHA256SUMS";

/// One package in a leaf
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
  pub name: String,
  pub size: u64,
  pub sha256: String,
  pub format: PackageFormat,
  /// Annotations parsed from the file name, when it follows the asset convention
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub package: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub arch: Option<String>,
}

/// Contents of `index.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeafIndex {
  pub generated_at: DateTime<Utc>,
  /// Leaf path relative to the repository root
  pub path: String,
  pub packages: Vec<IndexEntry>,
}

/// Package files directly inside `dir`, sorted by name
pub fn package_files(dir: &Path) -> ShipResult<Vec<PathBuf>> {
  let mut files = Vec::new();
  for entry in fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))? {
    let path = entry?.path();
    if path.is_file() && package_format(&path).is_some() {
      files.push(path);
    }
  }
  files.sort();
  Ok(files)
}

fn package_format(path: &Path) -> Option<PackageFormat> {
  path
    .extension()
    .and_then(|e| e.to_str())
    .and_then(PackageFormat::from_extension)
}

/// Leaf directories: at least two levels below `root` and directly holding packages
///
/// Hidden directories (staging areas, `.git`) are not descended into.
pub fn find_leaves(root: &Path) -> ShipResult<Vec<PathBuf>> {
  let mut leaves = Vec::new();
  if root.is_dir() {
    walk(root, 0, &mut leaves)?;
  }
  leaves.sort();
  Ok(leaves)
}

fn walk(dir: &Path, depth: usize, leaves: &mut Vec<PathBuf>) -> ShipResult<()> {
  if depth >= 2 && !package_files(dir)?.is_empty() {
    leaves.push(dir.to_path_buf());
  }
  for entry in fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))? {
    let entry = entry?;
    let hidden = entry.file_name().to_string_lossy().starts_with('.');
    if entry.file_type()?.is_dir() && !hidden {
      walk(&entry.path(), depth + 1, leaves)?;
    }
  }
  Ok(())
}

/// Rewrite the index files of one leaf from its current contents
pub fn write_index(root: &Path, leaf: &Path) -> ShipResult<LeafIndex> {
  let mut packages = Vec::new();
  for path in package_files(leaf)? {
    let name = file_name_of(&path);
    let Some(format) = package_format(&path) else {
      continue;
    };
    let parsed = AssetName::parse(&name);
    packages.push(IndexEntry {
      size: fs::metadata(&path)?.len(),
      sha256: sha256_file(&path)?,
      format,
      package: parsed.as_ref().map(|a| a.package.clone()),
      arch: parsed.map(|a| a.arch),
      name,
    });
  }

  let relative = leaf.strip_prefix(root).unwrap_or(leaf);
  let index = LeafIndex {
    generated_at: Utc::now(),
    path: relative.to_string_lossy().replace('\\', "/"),
    packages,
  };

  let index_path = leaf.join(INDEX_FILE);
  fs::write(&index_path, serde_json::to_vec_pretty(&index)?)
    .with_context(|| format!("Failed to write {}", index_path.display()))?;

  let sums: String = index
    .packages
    .iter()
    .map(|p| format!("{}  {}\n", p.sha256, p.name))
    .collect();
  let sums_path = leaf.join(SUMS_FILE);
  fs::write(&sums_path, sums).with_context(|| format!("Failed to write {}", sums_path.display()))?;

  Ok(index)
}
