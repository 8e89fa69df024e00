//! Directory-backed release store
//!
//! Layout:
//!
//! ```text
//! <root>/LATEST            tag of the most recent release
//! <root>/<tag>/<asset>     attached files
//! ```
//!
//! Used for offline mirrors and as the remote in tests. Asset ids are file names.

use super::{ReleaseBackend, RemoteAsset, RemoteRelease};
use crate::core::error::{RemoteError, ResultExt, ShipError, ShipResult};
use crate::release::ReleaseTag;
use crate::utils::{file_name_of, sanitize_component};
use std::fs;
use std::path::{Path, PathBuf};

const LATEST_FILE: &str = "LATEST";

pub struct LocalBackend {
  root: PathBuf,
}

impl LocalBackend {
  /// Open a store; the root directory must exist
  pub fn open(root: &Path) -> ShipResult<Self> {
    if !root.is_dir() {
      return Err(ShipError::with_help(
        format!("Release store not found at {}", root.display()),
        "Create the directory or point [release].remote at a GitHub owner/repo",
      ));
    }
    Ok(Self { root: root.to_path_buf() })
  }

  fn release_dir(&self, tag: &ReleaseTag) -> PathBuf {
    self.root.join(sanitize_component(tag.as_str()))
  }

  /// Create an empty release and mark it as the latest
  #[cfg(test)]
  pub fn create_release(&self, tag: &ReleaseTag) -> ShipResult<()> {
    fs::create_dir_all(self.release_dir(tag))?;
    fs::write(self.root.join(LATEST_FILE), tag.as_str())?;
    Ok(())
  }
}

impl ReleaseBackend for LocalBackend {
  fn describe(&self) -> String {
    format!("local:{}", self.root.display())
  }

  fn latest_release(&self) -> ShipResult<RemoteRelease> {
    let latest = self.root.join(LATEST_FILE);
    if !latest.exists() {
      return Err(ShipError::Remote(RemoteError::NoRelease {
        remote: self.describe(),
      }));
    }
    let tag = fs::read_to_string(&latest).with_context(|| format!("Failed to read {}", latest.display()))?;
    let tag = ReleaseTag::new(tag.trim());
    let assets = self.list_assets(&tag)?;
    Ok(RemoteRelease { tag, assets })
  }

  fn list_assets(&self, tag: &ReleaseTag) -> ShipResult<Vec<RemoteAsset>> {
    let dir = self.release_dir(tag);
    if !dir.is_dir() {
      return Err(ShipError::Remote(RemoteError::ReleaseNotFound { tag: tag.to_string() }));
    }

    let mut assets = Vec::new();
    for entry in fs::read_dir(&dir).with_context(|| format!("Failed to list {}", dir.display()))? {
      let entry = entry?;
      let metadata = entry.metadata()?;
      if !metadata.is_file() {
        continue;
      }
      let name = entry.file_name().to_string_lossy().to_string();
      assets.push(RemoteAsset {
        id: name.clone(),
        name,
        size: metadata.len(),
      });
    }
    assets.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(assets)
  }

  fn delete_asset(&self, tag: &ReleaseTag, asset: &RemoteAsset) -> ShipResult<()> {
    let path = self.release_dir(tag).join(sanitize_component(&asset.id));
    if !path.is_file() {
      return Err(ShipError::Remote(RemoteError::AssetNotFound {
        tag: tag.to_string(),
        name: asset.name.clone(),
      }));
    }
    fs::remove_file(&path).with_context(|| format!("Failed to delete {}", path.display()))?;
    Ok(())
  }

  fn upload_asset(&self, tag: &ReleaseTag, file: &Path) -> ShipResult<RemoteAsset> {
    let dir = self.release_dir(tag);
    if !dir.is_dir() {
      return Err(ShipError::Remote(RemoteError::ReleaseNotFound { tag: tag.to_string() }));
    }

    let name = file_name_of(file);
    let target = dir.join(sanitize_component(&name));
    if target.exists() {
      return Err(ShipError::Remote(RemoteError::AssetExists {
        tag: tag.to_string(),
        name,
      }));
    }

    let size = fs::copy(file, &target).with_context(|| format!("Failed to upload {}", file.display()))?;
    Ok(RemoteAsset {
      id: name.clone(),
      name,
      size,
    })
  }
}
