//! Tests for the `resolve` command

use crate::helpers::*;
use anyhow::Result;

fn resolve_json(workspace: &TestWorkspace, args: &[&str], envs: &[(&str, &str)]) -> Result<serde_json::Value> {
  let mut full = vec!["resolve", "--json"];
  full.extend_from_slice(args);
  let output = run_pkgship_with_env(&workspace.path, &full, envs)?;
  Ok(serde_json::from_slice(&output.stdout)?)
}

#[test]
fn test_resolve_event_tag() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  let resolved = resolve_json(&workspace, &["--tag", "v1.4.0"], &[])?;
  assert_eq!(resolved["version"], "1.4.0");
  assert_eq!(resolved["release"], 1);
  assert_eq!(resolved["tag"], "v1.4.0");
  assert_eq!(resolved["mode"], "event");

  Ok(())
}

#[test]
fn test_resolve_event_payload() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  let payload = workspace.write_file("event.json", r#"{"release": {"tag_name": "V3.1.0"}}"#)?;
  let payload = payload.display().to_string();

  let resolved = resolve_json(
    &workspace,
    &[],
    &[("GITHUB_EVENT_NAME", "release"), ("GITHUB_EVENT_PATH", &payload)],
  )?;
  assert_eq!(resolved["version"], "3.1.0");
  assert_eq!(resolved["release"], 1);
  assert_eq!(resolved["tag"], "V3.1.0");

  Ok(())
}

#[test]
fn test_resolve_manual_empty_release() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.create_release("v2.0.0", &[])?;

  let resolved = resolve_json(&workspace, &[], &[])?;
  assert_eq!(resolved["version"], "2.0.0");
  assert_eq!(resolved["release"], 1);
  assert_eq!(resolved["mode"], "manual");

  Ok(())
}

#[test]
fn test_resolve_manual_increments_release() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.create_release("v9.5", &[("pkg-9.5-3.el8.x86_64.rpm", "rpm")])?;

  let resolved = resolve_json(&workspace, &[], &[])?;
  assert_eq!(resolved["version"], "9.5");
  assert_eq!(resolved["release"], 4);
  assert_eq!(resolved["tag"], "v9.5");

  Ok(())
}

#[test]
fn test_resolve_manual_picks_highest_lineage() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.create_release(
    "v1.4.0",
    &[
      ("pkg-1.4.0-2.amd64.deb", "deb"),
      ("pkg-1.4.0-3.el8.x86_64.rpm", "rpm"),
      ("pkg-1.4.0-1.el8.x86_64.rpm", "rpm"),
    ],
  )?;

  let resolved = resolve_json(&workspace, &[], &[])?;
  assert_eq!(resolved["version"], "1.4.0");
  assert_eq!(resolved["release"], 4);

  Ok(())
}

#[test]
fn test_resolve_writes_github_output() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  let output_file = workspace.path.join("github_output");
  std::fs::write(&output_file, "earlier=1\n")?;

  let output = run_pkgship(
    &workspace.path,
    &[
      "resolve",
      "--tag",
      "v1.4.0",
      "--github-output",
      &output_file.display().to_string(),
    ],
  )?;
  assert!(stdout(&output).contains("Version: 1.4.0"));

  let written = std::fs::read_to_string(&output_file)?;
  assert!(written.starts_with("earlier=1\n"));
  assert!(written.contains("version=1.4.0\n"));
  assert!(written.contains("release=1\n"));
  assert!(written.contains("tag=v1.4.0\n"));

  Ok(())
}

#[test]
fn test_resolve_without_release_fails() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  let output = run_pkgship_unchecked(&workspace.path, &["resolve"], &[])?;
  assert_eq!(output.status.code(), Some(2));
  assert!(String::from_utf8_lossy(&output.stderr).contains("No published release"));

  Ok(())
}

#[test]
fn test_missing_config_is_user_error() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  std::fs::remove_file(workspace.path.join("pkgship.toml"))?;

  let output = run_pkgship_unchecked(&workspace.path, &["resolve", "--tag", "v1.0.0"], &[])?;
  assert_eq!(output.status.code(), Some(1));

  Ok(())
}
