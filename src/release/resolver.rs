//! Version resolution: which (version, release number) does this run build?
//!
//! - **Event-triggered** runs take the version straight from the release tag and
//!   start a fresh lineage at release 1.
//! - **Manual** runs rebuild the latest release. The version and previous release
//!   number come from the asset names already attached to it; the new release
//!   number is one higher.
//!
//! Asset listings are not ordered reliably, so instead of trusting the first asset
//! the resolver sorts and deduplicates the names and picks the maximum
//! `(version, release)` pair.

use super::asset::extract_embedded_version;
use super::version::{ReleaseNumber, ReleaseTag, Version};
use crate::core::error::{ResultExt, ShipError, ShipResult};
use crate::remote::ReleaseBackend;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info};

/// What started this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunContext {
  /// A release was published; carries its tag
  EventTriggered { tag: ReleaseTag },
  /// Operator-requested rebuild of the latest release
  ManualDispatch,
}

/// Run mode as carried by the release context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
  Event,
  Manual,
}

impl RunContext {
  /// Detect the run context from an explicit tag or the GitHub Actions environment
  pub fn detect(explicit_tag: Option<&str>) -> ShipResult<Self> {
    Self::detect_with(explicit_tag, |key| std::env::var(key).ok())
  }

  /// Detection with an injectable environment lookup
  pub fn detect_with(explicit_tag: Option<&str>, env: impl Fn(&str) -> Option<String>) -> ShipResult<Self> {
    if let Some(tag) = explicit_tag.filter(|t| !t.is_empty()) {
      return Ok(RunContext::EventTriggered {
        tag: ReleaseTag::new(tag),
      });
    }

    if env("GITHUB_EVENT_NAME").as_deref() != Some("release") {
      return Ok(RunContext::ManualDispatch);
    }

    if let Some(path) = env("GITHUB_EVENT_PATH")
      && let Some(tag) = tag_from_event_payload(Path::new(&path))?
    {
      return Ok(RunContext::EventTriggered { tag });
    }

    match env("GITHUB_REF_NAME").filter(|r| !r.is_empty()) {
      Some(tag) => Ok(RunContext::EventTriggered {
        tag: ReleaseTag::new(tag),
      }),
      None => Ok(RunContext::ManualDispatch),
    }
  }

  pub fn mode(&self) -> RunMode {
    match self {
      RunContext::EventTriggered { .. } => RunMode::Event,
      RunContext::ManualDispatch => RunMode::Manual,
    }
  }
}

/// Read `release.tag_name` from a GitHub event payload file
fn tag_from_event_payload(path: &Path) -> ShipResult<Option<ReleaseTag>> {
  if !path.is_file() {
    return Ok(None);
  }
  let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
  let payload: serde_json::Value =
    serde_json::from_str(&content).with_context(|| format!("Invalid event payload in {}", path.display()))?;
  Ok(
    payload
      .pointer("/release/tag_name")
      .and_then(|v| v.as_str())
      .filter(|t| !t.is_empty())
      .map(ReleaseTag::new),
  )
}

/// Where the resolved version came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionSource {
  /// Release event tag
  EventTag,
  /// Latest release had no assets
  EmptyRelease,
  /// Derived from this attached asset
  Asset { name: String },
  /// Assets attached but none carried a version
  NoMatchingAsset,
}

/// Resolved tuple for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
  pub version: Version,
  pub release: ReleaseNumber,
  pub tag: ReleaseTag,
  pub mode: RunMode,
  pub source: ResolutionSource,
}

/// Resolve the tuple for a run. Event runs never touch the backend.
pub fn resolve(run: &RunContext, backend: &dyn ReleaseBackend) -> ShipResult<Resolution> {
  match run {
    RunContext::EventTriggered { tag } => {
      let resolution = Resolution {
        version: tag.version(),
        release: ReleaseNumber::FIRST,
        tag: tag.clone(),
        mode: run.mode(),
        source: ResolutionSource::EventTag,
      };
      info!(tag = %tag, version = %resolution.version, "resolved from release event");
      Ok(resolution)
    }
    RunContext::ManualDispatch => {
      let latest = backend.latest_release()?;
      let names: Vec<String> = latest.assets.iter().map(|a| a.name.clone()).collect();
      let resolution = resolve_from_assets(latest.tag, &names)?;
      info!(
        tag = %resolution.tag,
        version = %resolution.version,
        release = %resolution.release,
        "resolved from latest release"
      );
      Ok(resolution)
    }
  }
}

/// Resolve a manual run from the latest release's tag and asset names
///
/// Fails only when the previous release number has no successor.
pub fn resolve_from_assets(tag: ReleaseTag, asset_names: &[String]) -> ShipResult<Resolution> {
  let fallback = |source| Resolution {
    version: tag.version(),
    release: ReleaseNumber::FIRST,
    tag: tag.clone(),
    mode: RunMode::Manual,
    source,
  };

  if asset_names.is_empty() {
    return Ok(fallback(ResolutionSource::EmptyRelease));
  }

  let names: BTreeSet<&str> = asset_names.iter().map(String::as_str).collect();

  // Max by (version, release); a missing release number sorts below any number.
  // Ties keep the first name in sorted order.
  let mut best: Option<(Version, Option<u32>, &str)> = None;
  for name in names {
    let Some(found) = extract_embedded_version(name) else {
      debug!(asset = name, "asset carries no version");
      continue;
    };
    let is_better = match &best {
      None => true,
      Some((version, release, _)) => (&found.version, found.release) > (version, *release),
    };
    if is_better {
      best = Some((found.version, found.release, name));
    }
  }

  let Some((version, release, name)) = best else {
    return Ok(fallback(ResolutionSource::NoMatchingAsset));
  };
  let release = match release {
    Some(previous) => ReleaseNumber::after(previous).ok_or_else(|| {
      ShipError::with_help(
        format!("Asset '{}' already carries the highest possible release number {}", name, previous),
        "Publish a new version (a new release tag) instead of rebuilding this one",
      )
    })?,
    None => ReleaseNumber::FIRST,
  };
  Ok(Resolution {
    version,
    release,
    tag: tag.clone(),
    mode: RunMode::Manual,
    source: ResolutionSource::Asset { name: name.to_string() },
  })
}
