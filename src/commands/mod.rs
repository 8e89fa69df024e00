//! CLI commands for pkgship
//!
//! ## Release identity
//! - **resolve**: Resolve (version, release, tag) for this run
//!
//! ## Pipeline stages
//! - **build**: Run build and validation jobs for every target
//! - **sync**: Reconcile a release's attached assets with a new set of files
//! - **repo publish**: Place packages into the repository tree and reindex
//!
//! ## End to end
//! - **release**: resolve, build, validate, sync and publish in one run
//!
//! ## Inspection
//! - **doctor**: Run health checks and diagnostics
//!
//! Mutating commands show a plan and change nothing unless `--apply` is given.

pub mod build;
pub mod doctor;
pub mod release;
pub mod repo;
pub mod resolve;
pub mod sync;

pub use build::run_build;
pub use doctor::run_doctor;
pub use release::run_release;
pub use repo::run_repo_publish;
pub use resolve::run_resolve;
pub use sync::run_sync;

use crate::core::config::ShipConfig;
use crate::core::context::ReleaseContext;
use crate::core::error::ShipResult;
use crate::release::{RunContext, resolve};
use crate::remote::{ReleaseBackend, open_backend};
use std::env;
use std::path::PathBuf;

/// Workspace root plus its loaded configuration
pub(crate) struct Workspace {
  pub root: PathBuf,
  pub config: ShipConfig,
}

impl Workspace {
  /// Load pkgship.toml from the current directory
  pub fn load() -> ShipResult<Self> {
    let root = env::current_dir()?;
    let config = ShipConfig::load(&root)?;
    Ok(Self { root, config })
  }

  /// Release backend, honoring a `--remote` override
  pub fn backend(&self, remote: Option<&str>) -> ShipResult<Box<dyn ReleaseBackend>> {
    let remote = remote.unwrap_or(&self.config.release.remote);
    open_backend(remote, &self.root)
  }

  /// Detect the run, resolve its tuple and build the release context
  pub fn resolve_context(&self, tag: Option<&str>, backend: &dyn ReleaseBackend) -> ShipResult<ReleaseContext> {
    let run = RunContext::detect(tag)?;
    let resolution = resolve(&run, backend)?;
    Ok(ReleaseContext::new(resolution, &self.config, &self.root))
  }

  pub fn state_dir(&self) -> PathBuf {
    self.root.join(&self.config.release.state_dir)
  }
}
