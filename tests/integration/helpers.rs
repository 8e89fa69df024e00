//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Variables a CI runner may set that would change how pkgship resolves or reports
const SCRUBBED_ENV: &[&str] = &[
  "GITHUB_EVENT_NAME",
  "GITHUB_EVENT_PATH",
  "GITHUB_REF_NAME",
  "GITHUB_OUTPUT",
  "GITHUB_STEP_SUMMARY",
  "PKGSHIP_LOG",
  "PKGSHIP_GH",
];

/// Two targets (el8 rpm with a smoke test, ubuntu deb without) and a local release store
pub const DEFAULT_CONFIG: &str = r#"[release]
remote = "./releases"
package = "pkg"

[[targets]]
name = "el8-rpm"
format = "rpm"
distro = "el8"
distro_version = "8"
arch = "x86_64"
command = 'echo "rpm $PKGSHIP_VERSION-$PKGSHIP_RELEASE" > "$PKGSHIP_OUT_DIR/pkg-$PKGSHIP_VERSION-$PKGSHIP_RELEASE.el8.x86_64.rpm"'
artifacts = ".pkgship/out/el8-rpm/*.rpm"

[targets.validate]
command = 'test -s "$PKGSHIP_ARTIFACT"'
image = "rockylinux:8"

[[targets]]
name = "ubuntu-deb"
format = "deb"
distro = "ubuntu"
distro_version = "24.04"
arch = "amd64"
command = 'echo "deb $PKGSHIP_VERSION-$PKGSHIP_RELEASE" > "$PKGSHIP_OUT_DIR/pkg-$PKGSHIP_VERSION-$PKGSHIP_RELEASE.amd64.deb"'
artifacts = ".pkgship/out/ubuntu-deb/*.deb"

[repository]
root = "public"
"#;

/// A workspace with pkgship.toml and an empty local release store
pub struct TestWorkspace {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestWorkspace {
  pub fn new() -> Result<Self> {
    Self::with_config(DEFAULT_CONFIG)
  }

  pub fn with_config(config: &str) -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    std::fs::write(path.join("pkgship.toml"), config)?;
    std::fs::create_dir_all(path.join("releases"))?;

    Ok(Self { _root: root, path })
  }

  /// Create a release in the local store with the given assets and mark it latest
  pub fn create_release(&self, tag: &str, assets: &[(&str, &str)]) -> Result<()> {
    let dir = self.path.join("releases").join(tag);
    std::fs::create_dir_all(&dir)?;
    for (name, content) in assets {
      std::fs::write(dir.join(name), content)?;
    }
    std::fs::write(self.path.join("releases/LATEST"), tag)?;
    Ok(())
  }

  /// Asset names attached to a release, sorted
  pub fn release_assets(&self, tag: &str) -> Result<Vec<String>> {
    let dir = self.path.join("releases").join(tag);
    let mut names = Vec::new();
    for entry in std::fs::read_dir(&dir).with_context(|| format!("No release at {}", dir.display()))? {
      names.push(entry?.file_name().to_string_lossy().to_string());
    }
    names.sort();
    Ok(names)
  }

  /// Write a file relative to the workspace
  pub fn write_file(&self, path: &str, content: &str) -> Result<PathBuf> {
    let full = self.path.join(path);
    if let Some(parent) = full.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&full, content)?;
    Ok(full)
  }

  pub fn file_exists(&self, path: &str) -> bool {
    self.path.join(path).exists()
  }

  pub fn read_file(&self, path: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(path))?)
  }

  /// Sorted file names directly inside a directory of the workspace
  pub fn list_dir(&self, path: &str) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(self.path.join(path))? {
      names.push(entry?.file_name().to_string_lossy().to_string());
    }
    names.sort();
    Ok(names)
  }
}

fn pkgship_command(cwd: &Path, args: &[&str], envs: &[(&str, &str)]) -> Command {
  let mut cmd = Command::new(env!("CARGO_BIN_EXE_pkgship"));
  cmd.current_dir(cwd).args(args);
  for key in SCRUBBED_ENV {
    cmd.env_remove(key);
  }
  for (key, value) in envs {
    cmd.env(key, value);
  }
  cmd
}

/// Run pkgship and require success
pub fn run_pkgship(cwd: &Path, args: &[&str]) -> Result<Output> {
  run_pkgship_with_env(cwd, args, &[])
}

/// Run pkgship with extra environment and require success
pub fn run_pkgship_with_env(cwd: &Path, args: &[&str], envs: &[(&str, &str)]) -> Result<Output> {
  let output = pkgship_command(cwd, args, envs)
    .output()
    .context("Failed to run pkgship")?;

  if !output.status.success() {
    anyhow::bail!(
      "pkgship command failed: pkgship {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      String::from_utf8_lossy(&output.stdout),
      String::from_utf8_lossy(&output.stderr)
    );
  }

  Ok(output)
}

/// Run pkgship without checking the exit status
pub fn run_pkgship_unchecked(cwd: &Path, args: &[&str], envs: &[(&str, &str)]) -> Result<Output> {
  pkgship_command(cwd, args, envs)
    .output()
    .context("Failed to run pkgship")
}

pub fn stdout(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).to_string()
}
