//! GitHub releases through the `gh` CLI
//!
//! Uses `gh api` for reads and deletes and `gh release upload` for uploads, so
//! authentication, enterprise hosts and retries are whatever the operator's `gh`
//! is configured for. Each call runs in an isolated environment that only
//! forwards the variables `gh` needs.

use super::{ReleaseBackend, RemoteAsset, RemoteRelease};
use crate::core::error::{RemoteError, ResultExt, ShipError, ShipResult};
use crate::release::ReleaseTag;
use crate::utils::file_name_of;
use serde::Deserialize;
use std::path::Path;
use std::process::{Command, Output};
use tracing::debug;

/// Environment variables forwarded to `gh`
const FORWARDED_ENV: &[&str] = &[
  "PATH",
  "HOME",
  "GH_TOKEN",
  "GITHUB_TOKEN",
  "GH_HOST",
  "GH_ENTERPRISE_TOKEN",
  "GH_CONFIG_DIR",
  "XDG_CONFIG_HOME",
];

/// Override for the `gh` executable (useful for testing)
const GH_PROGRAM_ENV: &str = "PKGSHIP_GH";

#[derive(Debug, Deserialize)]
struct ApiRelease {
  id: u64,
  tag_name: String,
}

#[derive(Debug, Deserialize)]
struct ApiAsset {
  id: u64,
  name: String,
  #[serde(default)]
  size: u64,
}

impl From<ApiAsset> for RemoteAsset {
  fn from(asset: ApiAsset) -> Self {
    RemoteAsset {
      id: asset.id.to_string(),
      name: asset.name,
      size: asset.size,
    }
  }
}

/// Release backend for a GitHub repository (`owner/repo`)
pub struct GithubBackend {
  repo: String,
  program: String,
}

impl GithubBackend {
  pub fn new(repo: &str) -> ShipResult<Self> {
    let valid = repo
      .split_once('/')
      .is_some_and(|(owner, name)| !owner.is_empty() && !name.is_empty() && !name.contains('/'));
    if !valid {
      return Err(ShipError::with_help(
        format!("Invalid GitHub repository '{}'", repo),
        "Use the owner/repo form (e.g. alumet-dev/alumet) or a local path such as ./releases",
      ));
    }

    Ok(Self {
      repo: repo.to_string(),
      program: std::env::var(GH_PROGRAM_ENV).unwrap_or_else(|_| "gh".to_string()),
    })
  }

  /// Create a `gh` command with an isolated environment
  fn gh_cmd(&self) -> Command {
    let mut cmd = Command::new(&self.program);
    cmd.env_clear();
    for key in FORWARDED_ENV {
      if let Ok(value) = std::env::var(key) {
        cmd.env(key, value);
      }
    }
    cmd.env("GH_PROMPT_DISABLED", "1");
    cmd.env("NO_COLOR", "1");
    cmd
  }

  fn run(&self, args: &[&str]) -> ShipResult<Output> {
    let rendered = format!("gh {}", args.join(" "));
    debug!(command = %rendered, "running gh");

    let output = self
      .gh_cmd()
      .args(args)
      .output()
      .with_context(|| format!("Failed to execute {}", rendered))?;

    if !output.status.success() {
      return Err(ShipError::Remote(RemoteError::CommandFailed {
        command: rendered,
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
      }));
    }

    Ok(output)
  }

  /// First line of `gh --version`; fails when gh is not installed
  pub fn tool_version(&self) -> ShipResult<String> {
    let output = self.run(&["--version"])?;
    Ok(
      String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .to_string(),
    )
  }

  fn fetch_release(&self, endpoint: &str) -> ShipResult<ApiRelease> {
    let output = self.run(&["api", endpoint])?;
    let release: ApiRelease =
      serde_json::from_slice(&output.stdout).with_context(|| format!("Unexpected response from {}", endpoint))?;
    Ok(release)
  }

  /// Every asset of a release, following pagination
  ///
  /// `gh api --paginate` prints one JSON array per page back to back.
  fn fetch_assets(&self, release_id: u64) -> ShipResult<Vec<RemoteAsset>> {
    let endpoint = format!("repos/{}/releases/{}/assets?per_page=100", self.repo, release_id);
    let output = self.run(&["api", "--paginate", &endpoint])?;
    parse_asset_pages(&output.stdout).with_context(|| format!("Unexpected response from {}", endpoint))
  }
}

fn parse_asset_pages(stdout: &[u8]) -> Result<Vec<RemoteAsset>, serde_json::Error> {
  let mut assets = Vec::new();
  for page in serde_json::Deserializer::from_slice(stdout).into_iter::<Vec<ApiAsset>>() {
    assets.extend(page?.into_iter().map(RemoteAsset::from));
  }
  Ok(assets)
}

fn is_not_found(err: &ShipError) -> bool {
  matches!(err, ShipError::Remote(RemoteError::CommandFailed { stderr, .. }) if stderr.contains("404"))
}

impl ReleaseBackend for GithubBackend {
  fn describe(&self) -> String {
    format!("github:{}", self.repo)
  }

  fn latest_release(&self) -> ShipResult<RemoteRelease> {
    let endpoint = format!("repos/{}/releases/latest", self.repo);
    let release = self.fetch_release(&endpoint).map_err(|e| {
      if is_not_found(&e) {
        ShipError::Remote(RemoteError::NoRelease {
          remote: self.describe(),
        })
      } else {
        e
      }
    })?;

    Ok(RemoteRelease {
      tag: ReleaseTag::new(release.tag_name),
      assets: self.fetch_assets(release.id)?,
    })
  }

  fn list_assets(&self, tag: &ReleaseTag) -> ShipResult<Vec<RemoteAsset>> {
    let endpoint = format!("repos/{}/releases/tags/{}", self.repo, tag);
    let release = self.fetch_release(&endpoint).map_err(|e| {
      if is_not_found(&e) {
        ShipError::Remote(RemoteError::ReleaseNotFound { tag: tag.to_string() })
      } else {
        e
      }
    })?;
    self.fetch_assets(release.id)
  }

  fn delete_asset(&self, tag: &ReleaseTag, asset: &RemoteAsset) -> ShipResult<()> {
    let endpoint = format!("repos/{}/releases/assets/{}", self.repo, asset.id);
    self.run(&["api", "--method", "DELETE", &endpoint]).map_err(|e| {
      if is_not_found(&e) {
        ShipError::Remote(RemoteError::AssetNotFound {
          tag: tag.to_string(),
          name: asset.name.clone(),
        })
      } else {
        e
      }
    })?;
    Ok(())
  }

  fn upload_asset(&self, tag: &ReleaseTag, file: &Path) -> ShipResult<RemoteAsset> {
    let name = file_name_of(file);
    let path = file.to_string_lossy().to_string();
    self
      .run(&["release", "upload", tag.as_str(), &path, "--repo", &self.repo])
      .map_err(|e| match e {
        ShipError::Remote(RemoteError::CommandFailed { ref stderr, .. }) if stderr.contains("already_exists") => {
          ShipError::Remote(RemoteError::AssetExists {
            tag: tag.to_string(),
            name: name.clone(),
          })
        }
        other => other,
      })?;

    // gh does not print the created asset; read it back for its id
    let uploaded = self
      .list_assets(tag)?
      .into_iter()
      .find(|a| a.name == name)
      .ok_or_else(|| ShipError::message(format!("Uploaded asset '{}' is not listed on release '{}'", name, tag)))?;
    Ok(uploaded)
  }
}
