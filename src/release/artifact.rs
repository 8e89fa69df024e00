//! Produced package files and their annotations

use super::asset::AssetName;
use super::version::{ReleaseNumber, Version};
use crate::core::config::{BuildTarget, PackageFormat};
use crate::utils::file_name_of;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A package file annotated with where it belongs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageFile {
  pub path: PathBuf,
  pub package: String,
  pub version: Version,
  pub release: ReleaseNumber,
  pub distro: String,
  pub distro_version: String,
  pub arch: String,
  pub format: PackageFormat,
}

impl PackageFile {
  /// Annotate a file produced by a build target
  pub fn from_target(path: &Path, target: &BuildTarget, package: &str, version: &Version, release: ReleaseNumber) -> Self {
    Self {
      path: path.to_path_buf(),
      package: package.to_string(),
      version: version.clone(),
      release,
      distro: target.distro.clone(),
      distro_version: target.distro_version.clone(),
      arch: target.arch.clone(),
      format: target.format,
    }
  }

  /// Annotate a file from its asset name; distro parts missing from the name
  /// must come from the overrides
  pub fn from_asset_name(path: &Path, distro: Option<&str>, distro_version: Option<&str>) -> Option<Self> {
    let name = AssetName::parse(&file_name_of(path))?;
    let format = PackageFormat::from_extension(&name.ext)?;
    Some(Self {
      path: path.to_path_buf(),
      package: name.package,
      version: name.version,
      release: name.release,
      distro: distro.map(str::to_string).or(name.distro)?,
      distro_version: distro_version.map(str::to_string).or(name.distro_version)?,
      arch: name.arch,
      format,
    })
  }

  pub fn file_name(&self) -> String {
    file_name_of(&self.path)
  }
}
