//! Version, release number and tag value types
//!
//! Package versions here are not semver: `9.5` and `1.2.3.4` are both valid
//! package versions. They compare component-wise as numbers.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Semantic package version, independent of the build iteration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(String);

impl Version {
  /// Wrap a version string as-is
  pub fn new(version: impl Into<String>) -> Self {
    Self(version.into())
  }

  /// Parse a dotted numeric version (digits and dots, at least 3 characters)
  pub fn parse_dotted(s: &str) -> Option<Self> {
    let valid = s.len() >= 3
      && s.starts_with(|c: char| c.is_ascii_digit())
      && s.chars().all(|c| c.is_ascii_digit() || c == '.');
    valid.then(|| Self(s.to_string()))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// Numeric components, or None if any component is not a number.
  /// Empty components (`1..2`) count as zero.
  pub fn components(&self) -> Option<Vec<u64>> {
    self
      .0
      .split('.')
      .map(|part| if part.is_empty() { Some(0) } else { part.parse().ok() })
      .collect()
  }
}

impl Ord for Version {
  fn cmp(&self, other: &Self) -> Ordering {
    match (self.components(), other.components()) {
      (Some(a), Some(b)) => {
        let len = a.len().max(b.len());
        for i in 0..len {
          let x = a.get(i).copied().unwrap_or(0);
          let y = b.get(i).copied().unwrap_or(0);
          match x.cmp(&y) {
            Ordering::Equal => continue,
            other => return other,
          }
        }
        // 1.0 and 1.0.0 are numerically equal; keep the order total
        self.0.cmp(&other.0)
      }
      (Some(_), None) => Ordering::Greater,
      (None, Some(_)) => Ordering::Less,
      (None, None) => self.0.cmp(&other.0),
    }
  }
}

impl PartialOrd for Version {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl fmt::Display for Version {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Build iteration within a version (starts at 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReleaseNumber(u32);

impl ReleaseNumber {
  pub const FIRST: ReleaseNumber = ReleaseNumber(1);

  /// Create a release number; zero is clamped to 1
  pub fn new(n: u32) -> Self {
    Self(n.max(1))
  }

  /// The release number following a previously published `n` (0 counts as absent)
  ///
  /// None once the number space is exhausted.
  pub fn after(n: u32) -> Option<Self> {
    n.checked_add(1).map(Self)
  }

  #[cfg(test)]
  pub fn get(self) -> u32 {
    self.0
  }
}

impl fmt::Display for ReleaseNumber {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Identifier of a published release (e.g. `v1.2.3`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReleaseTag(String);

impl ReleaseTag {
  pub fn new(tag: impl Into<String>) -> Self {
    Self(tag.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// Version named by this tag: one leading `v`/`V` marker is stripped
  pub fn version(&self) -> Version {
    let stripped = self
      .0
      .strip_prefix('v')
      .or_else(|| self.0.strip_prefix('V'))
      .unwrap_or(&self.0);
    Version::new(stripped)
  }
}

impl fmt::Display for ReleaseTag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}
