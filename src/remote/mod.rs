//! Remote release API abstraction
//!
//! Everything pkgship does to a published release goes through [`ReleaseBackend`]:
//!
//! - **github**: GitHub releases through the `gh` CLI (`owner/repo` remotes)
//! - **local**: a directory tree standing in for a release host (path remotes),
//!   used for offline mirrors and tests
//!
//! The four operations mirror the release API surface the pipeline consumes:
//! get-latest-release, list-release-assets, delete-release-asset and
//! upload-asset-to-release.

pub mod github;
pub mod local;

use crate::core::error::ShipResult;
use crate::release::ReleaseTag;
use crate::utils::is_local_path;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use github::GithubBackend;
pub use local::LocalBackend;

/// A file attached to a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAsset {
  /// Backend-specific identifier (GitHub asset id, or the name for local stores)
  pub id: String,
  pub name: String,
  pub size: u64,
}

/// A published release and its attached assets, in listing order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteRelease {
  pub tag: ReleaseTag,
  pub assets: Vec<RemoteAsset>,
}

/// Release host operations
pub trait ReleaseBackend: Send + Sync {
  /// Human-readable identity of the remote (for logs and plans)
  fn describe(&self) -> String;

  /// Most recent published release
  fn latest_release(&self) -> ShipResult<RemoteRelease>;

  /// Assets currently attached to a release
  fn list_assets(&self, tag: &ReleaseTag) -> ShipResult<Vec<RemoteAsset>>;

  /// Remove one attached asset
  fn delete_asset(&self, tag: &ReleaseTag, asset: &RemoteAsset) -> ShipResult<()>;

  /// Attach a file under its own file name
  fn upload_asset(&self, tag: &ReleaseTag, file: &Path) -> ShipResult<RemoteAsset>;
}

/// Open the backend for a configured remote
///
/// Local paths (relative paths resolved against `workspace_root`) use the
/// directory store; anything else is treated as a GitHub `owner/repo`.
pub fn open_backend(remote: &str, workspace_root: &Path) -> ShipResult<Box<dyn ReleaseBackend>> {
  if is_local_path(remote) {
    let root = workspace_root.join(remote);
    return Ok(Box::new(LocalBackend::open(&root)?));
  }
  Ok(Box::new(GithubBackend::new(remote)?))
}

#[cfg(test)]
pub(crate) mod testing {
  //! Fault-injecting backend for synchronizer tests

  use super::*;
  use crate::core::error::{RemoteError, ShipError};
  use std::collections::HashSet;
  use std::sync::Mutex;

  pub struct FaultyBackend {
    pub inner: LocalBackend,
    pub fail_deletes: HashSet<String>,
    pub fail_uploads: HashSet<String>,
    /// Uploads that land on the remote but report an error
    pub lose_upload_replies: HashSet<String>,
    pub calls: Mutex<Vec<String>>,
  }

  impl FaultyBackend {
    pub fn new(inner: LocalBackend) -> Self {
      Self {
        inner,
        fail_deletes: HashSet::new(),
        fail_uploads: HashSet::new(),
        lose_upload_replies: HashSet::new(),
        calls: Mutex::new(Vec::new()),
      }
    }

    pub fn calls(&self) -> Vec<String> {
      self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
      self.calls.lock().unwrap().push(call);
    }
  }

  impl ReleaseBackend for FaultyBackend {
    fn describe(&self) -> String {
      format!("faulty({})", self.inner.describe())
    }

    fn latest_release(&self) -> ShipResult<RemoteRelease> {
      self.inner.latest_release()
    }

    fn list_assets(&self, tag: &ReleaseTag) -> ShipResult<Vec<RemoteAsset>> {
      self.inner.list_assets(tag)
    }

    fn delete_asset(&self, tag: &ReleaseTag, asset: &RemoteAsset) -> ShipResult<()> {
      self.record(format!("delete {}", asset.name));
      if self.fail_deletes.contains(&asset.name) {
        return Err(ShipError::Remote(RemoteError::CommandFailed {
          command: format!("delete {}", asset.name),
          stderr: "HTTP 502: injected failure".to_string(),
        }));
      }
      self.inner.delete_asset(tag, asset)
    }

    fn upload_asset(&self, tag: &ReleaseTag, file: &Path) -> ShipResult<RemoteAsset> {
      let name = file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
      self.record(format!("upload {}", name));
      if self.fail_uploads.contains(&name) {
        return Err(ShipError::Remote(RemoteError::CommandFailed {
          command: format!("upload {}", name),
          stderr: "HTTP 502: injected failure".to_string(),
        }));
      }
      let asset = self.inner.upload_asset(tag, file)?;
      if self.lose_upload_replies.contains(&name) {
        return Err(ShipError::Remote(RemoteError::CommandFailed {
          command: format!("list assets after uploading {}", name),
          stderr: "HTTP 503: injected failure".to_string(),
        }));
      }
      Ok(asset)
    }
  }
}
