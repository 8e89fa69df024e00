//! Tests for the `sync` command

use crate::helpers::*;
use anyhow::Result;

const RPM: &str = "dist/pkg-1.4.0-2.el8.x86_64.rpm";
const DEB: &str = "dist/pkg-1.4.0-2.amd64.deb";

fn write_new_set(workspace: &TestWorkspace) -> Result<()> {
  workspace.write_file(RPM, "rpm 1.4.0-2")?;
  workspace.write_file(DEB, "deb 1.4.0-2")?;
  Ok(())
}

#[test]
fn test_sync_dry_run_changes_nothing() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.create_release("v1.4.0", &[("pkg-1.4.0-1.el8.x86_64.rpm", "old")])?;
  write_new_set(&workspace)?;

  let output = run_pkgship(
    &workspace.path,
    &["sync", "--tag", "v1.4.0", "--mode", "replace", RPM, DEB],
  )?;
  let out = stdout(&output);
  assert!(out.contains("pkg-1.4.0-1.el8.x86_64.rpm"));
  assert!(out.contains("Dry-run"));

  assert_eq!(workspace.release_assets("v1.4.0")?, vec!["pkg-1.4.0-1.el8.x86_64.rpm"]);
  assert!(!workspace.file_exists(".pkgship/sync/v1.4.0.json"));

  Ok(())
}

#[test]
fn test_sync_replace_twice_leaves_exactly_new_set() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.create_release(
    "v1.4.0",
    &[("pkg-1.4.0-1.el8.x86_64.rpm", "old rpm"), ("pkg-1.4.0-1.amd64.deb", "old deb")],
  )?;
  write_new_set(&workspace)?;

  for _ in 0..2 {
    run_pkgship(
      &workspace.path,
      &["sync", "--tag", "v1.4.0", "--mode", "replace", "--apply", RPM, DEB],
    )?;
    assert_eq!(
      workspace.release_assets("v1.4.0")?,
      vec!["pkg-1.4.0-2.amd64.deb", "pkg-1.4.0-2.el8.x86_64.rpm"]
    );
  }
  assert_eq!(workspace.read_file("releases/v1.4.0/pkg-1.4.0-2.el8.x86_64.rpm")?, "rpm 1.4.0-2");

  // Success leaves no intent log and no lease behind
  assert!(!workspace.file_exists(".pkgship/sync/v1.4.0.json"));
  assert!(!workspace.file_exists(".pkgship/locks/pkgship-pkg.lock"));

  Ok(())
}

#[test]
fn test_sync_append_keeps_existing_assets() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.create_release("v1.4.0", &[("CHANGELOG.md", "notes")])?;
  write_new_set(&workspace)?;

  // An explicit tag is an event run, which appends by default
  run_pkgship(&workspace.path, &["sync", "--tag", "v1.4.0", "--apply", RPM, DEB])?;

  assert_eq!(
    workspace.release_assets("v1.4.0")?,
    vec!["CHANGELOG.md", "pkg-1.4.0-2.amd64.deb", "pkg-1.4.0-2.el8.x86_64.rpm"]
  );

  Ok(())
}

#[test]
fn test_sync_manual_run_replaces_latest_release() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.create_release("v1.4.0", &[("pkg-1.4.0-1.el8.x86_64.rpm", "old")])?;
  write_new_set(&workspace)?;

  run_pkgship(&workspace.path, &["sync", "--apply", RPM, DEB])?;

  assert_eq!(
    workspace.release_assets("v1.4.0")?,
    vec!["pkg-1.4.0-2.amd64.deb", "pkg-1.4.0-2.el8.x86_64.rpm"]
  );

  Ok(())
}

#[test]
fn test_sync_append_collision_fails_per_file() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.create_release("v1.4.0", &[("pkg-1.4.0-2.el8.x86_64.rpm", "someone else's rpm")])?;
  write_new_set(&workspace)?;

  let output = run_pkgship_unchecked(
    &workspace.path,
    &["sync", "--tag", "v1.4.0", "--mode", "append", "--apply", RPM, DEB],
    &[],
  )?;
  assert_eq!(output.status.code(), Some(2));
  assert!(stdout(&output).contains("failed to upload pkg-1.4.0-2.el8.x86_64.rpm"));

  // The sibling still landed; the colliding asset is untouched
  assert_eq!(
    workspace.release_assets("v1.4.0")?,
    vec!["pkg-1.4.0-2.amd64.deb", "pkg-1.4.0-2.el8.x86_64.rpm"]
  );
  assert_eq!(
    workspace.read_file("releases/v1.4.0/pkg-1.4.0-2.el8.x86_64.rpm")?,
    "someone else's rpm"
  );

  // The failed run leaves its intent for a retry
  assert!(workspace.file_exists(".pkgship/sync/v1.4.0.json"));

  Ok(())
}

#[test]
fn test_sync_json_report() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.create_release("v1.4.0", &[("pkg-1.4.0-1.el8.x86_64.rpm", "old")])?;
  write_new_set(&workspace)?;

  let output = run_pkgship(
    &workspace.path,
    &["sync", "--tag", "v1.4.0", "--mode", "replace", "--apply", "--json", RPM, DEB],
  )?;
  let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  assert_eq!(report["mode"], "replace");
  assert_eq!(report["deleted"], serde_json::json!(["pkg-1.4.0-1.el8.x86_64.rpm"]));
  assert_eq!(report["uploaded"].as_array().map(Vec::len), Some(2));
  assert!(report["upload_failures"].as_array().is_some_and(Vec::is_empty));

  Ok(())
}

#[test]
fn test_sync_writes_step_summary() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.create_release("v1.4.0", &[])?;
  write_new_set(&workspace)?;
  let summary = workspace.path.join("summary.md");
  let summary_path = summary.display().to_string();

  run_pkgship_with_env(
    &workspace.path,
    &["sync", "--tag", "v1.4.0", "--apply", RPM, DEB],
    &[("GITHUB_STEP_SUMMARY", &summary_path)],
  )?;

  let markdown = std::fs::read_to_string(&summary)?;
  assert!(markdown.contains("## pkgship sync v1.4.0"));
  assert!(markdown.contains("- pkg-1.4.0-2.amd64.deb"));

  Ok(())
}

#[test]
fn test_sync_requires_files() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  let output = run_pkgship_unchecked(&workspace.path, &["sync", "--tag", "v1.4.0"], &[])?;
  assert_eq!(output.status.code(), Some(1));

  Ok(())
}
