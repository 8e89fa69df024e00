//! Configuration validity check

use super::trait_def::{Check, CheckContext, CheckResult};
use crate::core::config::ShipConfig;
use crate::core::error::ShipResult;

/// Validates pkgship.toml: it loads, passes validation and its globs parse
pub struct ConfigValidityCheck;

impl Check for ConfigValidityCheck {
  fn name(&self) -> &str {
    "config-validity"
  }

  fn description(&self) -> &str {
    "Validates pkgship.toml and build target definitions"
  }

  fn run(&self, ctx: &CheckContext) -> ShipResult<CheckResult> {
    let config = match ShipConfig::load(&ctx.workspace_root) {
      Ok(config) => config,
      Err(e) => {
        return Ok(CheckResult::error(
          self.name(),
          e.to_string(),
          e.help_message().or_else(|| Some("Fix pkgship.toml".to_string())),
        ));
      }
    };

    for target in &config.targets {
      if let Err(e) = glob::Pattern::new(&target.artifacts) {
        return Ok(CheckResult::error(
          self.name(),
          format!("Invalid artifacts glob for '{}': {}", target.name, e),
          Some("Use a glob relative to the workspace root, e.g. target/rpm/*.rpm"),
        ));
      }
    }

    if config.targets.is_empty() {
      return Ok(CheckResult::warning(
        self.name(),
        "No [[targets]] configured; builds will produce nothing",
        Some("Add a [[targets]] entry per package format, distro and architecture"),
      ));
    }

    Ok(CheckResult::pass(
      self.name(),
      format!(
        "Configuration valid ({} target(s), package '{}')",
        config.targets.len(),
        config.release.package
      ),
    ))
  }
}
