//! Asset name parsing
//!
//! Release assets follow `{package}-{version}-{release}.{distro}.{distro_version}.{arch}.{ext}`.
//! DEB assets usually omit the distro part (`pkg-1.4.0-1.amd64.deb`) and some RPM
//! assets omit the distro version (`pkg-1.4.0-1.el8.x86_64.rpm`), so both are optional.

use super::version::{ReleaseNumber, Version};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static ASSET_NAME: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^(?P<package>.+?)-(?P<version>\d[\d.]*)-(?P<release>\d+)\.(?P<rest>.+)$").expect("valid regex"));

/// `(digits-and-dots, length >= 3) - (digits)` anywhere in a name
static EMBEDDED_VERSION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d[\d.]{2,})-(\d*)").expect("valid regex"));

/// Structured view of a release asset file name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetName {
  pub package: String,
  pub version: Version,
  pub release: ReleaseNumber,
  pub distro: Option<String>,
  pub distro_version: Option<String>,
  pub arch: String,
  pub ext: String,
}

impl AssetName {
  /// Parse a full asset name; None if it does not follow the naming convention
  pub fn parse(name: &str) -> Option<Self> {
    let caps = ASSET_NAME.captures(name)?;
    let version = Version::parse_dotted(&caps["version"])?;
    let release = ReleaseNumber::new(caps["release"].parse().ok()?);

    let mut segments: Vec<&str> = caps["rest"].split('.').collect();
    if segments.len() < 2 || segments.iter().any(|s| s.is_empty()) {
      return None;
    }
    let ext = segments.pop()?.to_string();
    let arch = segments.pop()?.to_string();
    let (distro, distro_version) = match segments.split_first() {
      Some((first, rest)) if rest.is_empty() => (Some(first.to_string()), None),
      Some((first, rest)) => (Some(first.to_string()), Some(rest.join("."))),
      None => (None, None),
    };

    Some(Self {
      package: caps["package"].to_string(),
      version,
      release,
      distro,
      distro_version,
      arch,
      ext,
    })
  }
}

/// Version/release pair found inside an asset name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedVersion {
  pub version: Version,
  /// None when the name carries `{version}-` with no digits after the dash
  pub release: Option<u32>,
}

/// Find the first `{version}-{release}` substring in an asset name
pub fn extract_embedded_version(name: &str) -> Option<EmbeddedVersion> {
  let caps = EMBEDDED_VERSION.captures(name)?;
  let version = Version::new(&caps[1]);
  let release = match &caps[2] {
    "" => None,
    digits => digits.parse().ok(),
  };
  Some(EmbeddedVersion { version, release })
}
