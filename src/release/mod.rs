//! Release identity: versions, tags, asset names and version resolution
//!
//! # Invariants
//!
//! 1. **A tuple is resolved once per run**
//!    - `(version, release, tag)` is computed before any build starts
//!    - Downstream steps receive it by value and never change it
//!
//! 2. **Release numbers only move forward within a version**
//!    - Manual rebuilds continue the lineage found on the latest release (+1)
//!    - A new version published through a release event restarts at 1
//!
//! 3. **Resolution never hard-fails on naming**
//!    - Unparsable or missing asset versions fall back to the tag's version and
//!      release 1

pub mod artifact;
pub mod asset;
pub mod resolver;
pub mod version;

pub use artifact::PackageFile;
pub use asset::AssetName;
pub use resolver::{Resolution, RunContext, RunMode, resolve};
pub use version::{ReleaseNumber, ReleaseTag, Version};
