//! Release remote checks

use super::trait_def::{Check, CheckContext, CheckResult};
use crate::core::error::{RemoteError, ShipError, ShipResult};
use crate::remote::{GithubBackend, open_backend};
use crate::utils::is_local_path;

/// The tooling the configured remote needs is present
pub struct ReleaseToolCheck;

impl Check for ReleaseToolCheck {
  fn name(&self) -> &str {
    "release-tool"
  }

  fn description(&self) -> &str {
    "Validates the gh CLI (GitHub remotes) or the release store (local remotes)"
  }

  fn run(&self, ctx: &CheckContext) -> ShipResult<CheckResult> {
    let Some(config) = ctx.config() else {
      return Ok(CheckResult::pass(self.name(), "No valid pkgship.toml, skipping"));
    };
    let remote = &config.release.remote;

    if is_local_path(remote) {
      let root = ctx.workspace_root.join(remote);
      return Ok(if root.is_dir() {
        CheckResult::pass(self.name(), format!("Local release store at {}", root.display()))
      } else {
        CheckResult::error(
          self.name(),
          format!("Local release store {} does not exist", root.display()),
          Some("Create the directory or point [release].remote at owner/repo"),
        )
      });
    }

    let backend = match GithubBackend::new(remote) {
      Ok(backend) => backend,
      Err(e) => return Ok(CheckResult::error(self.name(), e.to_string(), e.help_message())),
    };
    match backend.tool_version() {
      Ok(version) => Ok(CheckResult::pass(self.name(), format!("Found {}", version))),
      Err(e) => Ok(CheckResult::error(
        self.name(),
        format!("gh is not usable: {}", e),
        Some("Install the GitHub CLI (https://cli.github.com) or set PKGSHIP_GH"),
      )),
    }
  }
}

/// The latest release can be read (network, authentication)
pub struct RemoteAccessCheck;

impl Check for RemoteAccessCheck {
  fn name(&self) -> &str {
    "remote-access"
  }

  fn description(&self) -> &str {
    "Reads the latest release from the configured remote"
  }

  fn is_expensive(&self) -> bool {
    true
  }

  fn run(&self, ctx: &CheckContext) -> ShipResult<CheckResult> {
    let Some(config) = ctx.config() else {
      return Ok(CheckResult::pass(self.name(), "No valid pkgship.toml, skipping"));
    };

    let backend = match open_backend(&config.release.remote, &ctx.workspace_root) {
      Ok(backend) => backend,
      Err(e) => return Ok(CheckResult::error(self.name(), e.to_string(), e.help_message())),
    };

    match backend.latest_release() {
      Ok(release) => Ok(CheckResult::pass(
        self.name(),
        format!(
          "{}: latest release {} ({} asset(s))",
          backend.describe(),
          release.tag,
          release.assets.len()
        ),
      )),
      Err(ShipError::Remote(RemoteError::NoRelease { remote })) => Ok(CheckResult::warning(
        self.name(),
        format!("{} has no published release yet", remote),
        Some("Manual rebuilds need an existing release; publish one first"),
      )),
      Err(e) => Ok(CheckResult::error(
        self.name(),
        format!("{}: {}", backend.describe(), e),
        Some("Check `gh auth status` and the repository name"),
      )),
    }
  }
}
