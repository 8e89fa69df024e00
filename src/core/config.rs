use crate::core::error::{ConfigError, ShipError, ShipResult, ResultExt};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for pkgship
/// Searched in order: pkgship.toml, .pkgship.toml, .config/pkgship.toml
///
/// # Example
///
/// ```toml
/// [release]
/// remote = "alumet-dev/alumet"
/// package = "alumet-agent"
///
/// [[targets]]
/// name = "rpm-el8-x86_64"
/// format = "rpm"
/// distro = "el8"
/// distro_version = "8"
/// arch = "x86_64"
/// command = "./packaging/build-rpm.sh"
/// artifacts = "target/rpm/*.rpm"
///
/// [targets.validate]
/// command = "./packaging/goss.sh"
/// image = "rockylinux:8"
///
/// [repository]
/// root = "public"
/// index_command = "createrepo_c --update {dir}"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipConfig {
  pub release: ReleaseSettings,
  #[serde(default)]
  pub targets: Vec<BuildTarget>,
  #[serde(default)]
  pub repository: Option<RepositoryConfig>,
}

/// Where releases live and how runs are serialized
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseSettings {
  /// GitHub `owner/repo`, or a local path for a directory-backed store
  pub remote: String,

  /// Package name used in asset names
  pub package: String,

  /// Concurrency group name (default: "pkgship-{package}")
  #[serde(default)]
  pub concurrency_group: Option<String>,

  /// State directory for locks, intent logs and reports (relative to the workspace)
  #[serde(default = "default_state_dir")]
  pub state_dir: PathBuf,
}

fn default_state_dir() -> PathBuf {
  PathBuf::from(".pkgship")
}

/// Package format produced by a build target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageFormat {
  Rpm,
  Deb,
}

impl fmt::Display for PackageFormat {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PackageFormat::Rpm => write!(f, "rpm"),
      PackageFormat::Deb => write!(f, "deb"),
    }
  }
}

impl PackageFormat {
  /// Guess the format from a file extension
  pub fn from_extension(ext: &str) -> Option<Self> {
    match ext.to_ascii_lowercase().as_str() {
      "rpm" => Some(PackageFormat::Rpm),
      "deb" => Some(PackageFormat::Deb),
      _ => None,
    }
  }
}

/// One independent package build (one format, distro and architecture)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildTarget {
  /// Unique job name (kebab-case recommended)
  pub name: String,
  pub format: PackageFormat,
  pub distro: String,
  pub distro_version: String,
  pub arch: String,

  /// Shell command that builds the package
  pub command: String,

  /// Glob (relative to the workspace root) matching the produced files
  pub artifacts: String,

  /// Smoke test run against each produced package
  #[serde(default)]
  pub validate: Option<ValidationConfig>,
}

/// Smoke-test harness invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
  /// Shell command; receives the package path in PKGSHIP_ARTIFACT
  pub command: String,

  /// Target OS image the harness should install into (passed as PKGSHIP_IMAGE)
  #[serde(default)]
  pub image: Option<String>,
}

/// Static package repository settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
  /// Tree root (relative to the workspace)
  #[serde(default = "default_repository_root")]
  pub root: PathBuf,

  /// Extra indexer run per leaf directory; `{dir}` is replaced by the leaf path
  #[serde(default)]
  pub index_command: Option<String>,
}

fn default_repository_root() -> PathBuf {
  PathBuf::from("public")
}

impl Default for RepositoryConfig {
  fn default() -> Self {
    Self {
      root: default_repository_root(),
      index_command: None,
    }
  }
}

impl ShipConfig {
  /// Find config file in search order: pkgship.toml, .pkgship.toml, .config/pkgship.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = [
      path.join("pkgship.toml"),
      path.join(".pkgship.toml"),
      path.join(".config").join("pkgship.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load and validate config (searches multiple locations)
  pub fn load(path: &Path) -> ShipResult<Self> {
    let config_path = Self::find_config_path(path).ok_or_else(|| {
      ShipError::Config(ConfigError::NotFound {
        workspace_root: path.to_path_buf(),
      })
    })?;

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config: ShipConfig = toml_edit::de::from_str(&content)
      .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

    config.validate()?;

    Ok(config)
  }

  /// Validate cross-field constraints
  pub fn validate(&self) -> ShipResult<()> {
    if self.release.remote.trim().is_empty() {
      return Err(ShipError::Config(ConfigError::MissingField {
        field: "release.remote".to_string(),
      }));
    }
    if self.release.package.trim().is_empty() {
      return Err(ShipError::Config(ConfigError::MissingField {
        field: "release.package".to_string(),
      }));
    }

    let mut seen = HashSet::new();
    for target in &self.targets {
      if target.name.is_empty() || !target.name.chars().all(|c| c.is_ascii_alphanumeric() || "-_.".contains(c)) {
        return Err(ShipError::Config(ConfigError::InvalidField {
          field: "targets.name".to_string(),
          reason: format!("'{}' must be non-empty and use only letters, digits, '-', '_' or '.'", target.name),
        }));
      }
      if !seen.insert(target.name.as_str()) {
        return Err(ShipError::Config(ConfigError::InvalidField {
          field: "targets.name".to_string(),
          reason: format!("duplicate target '{}'", target.name),
        }));
      }
      if target.command.trim().is_empty() {
        return Err(ShipError::Config(ConfigError::MissingField {
          field: format!("command for target '{}'", target.name),
        }));
      }
      if target.artifacts.trim().is_empty() {
        return Err(ShipError::Config(ConfigError::MissingField {
          field: format!("artifacts for target '{}'", target.name),
        }));
      }
      if let Some(validate) = &target.validate
        && validate.command.trim().is_empty()
      {
        return Err(ShipError::Config(ConfigError::MissingField {
          field: format!("validate.command for target '{}'", target.name),
        }));
      }
    }

    Ok(())
  }

  /// Effective concurrency group name
  pub fn concurrency_group(&self) -> String {
    self
      .release
      .concurrency_group
      .clone()
      .unwrap_or_else(|| format!("pkgship-{}", self.release.package))
  }

  /// Find a build target by name
  pub fn find_target(&self, name: &str) -> ShipResult<&BuildTarget> {
    self
      .targets
      .iter()
      .find(|t| t.name == name)
      .ok_or_else(|| ShipError::Config(ConfigError::TargetNotFound { name: name.to_string() }))
  }

  /// Repository settings, defaulted when the section is absent
  pub fn repository(&self) -> RepositoryConfig {
    self.repository.clone().unwrap_or_default()
  }
}
