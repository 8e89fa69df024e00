//! Tests for the `repo publish` command

use crate::helpers::*;
use anyhow::Result;

const LEAF: &str = "public/el8/8/1.4.0";

fn index_names(workspace: &TestWorkspace, leaf: &str) -> Result<Vec<String>> {
  let index: serde_json::Value = serde_json::from_str(&workspace.read_file(&format!("{}/index.json", leaf))?)?;
  let mut names: Vec<String> = index["packages"]
    .as_array()
    .map(|packages| {
      packages
        .iter()
        .filter_map(|p| p["name"].as_str().map(str::to_string))
        .collect()
    })
    .unwrap_or_default();
  names.sort();
  Ok(names)
}

#[test]
fn test_repo_publish_dry_run_changes_nothing() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.write_file("dist/pkg-1.4.0-1.el8.8.x86_64.rpm", "rpm")?;

  let output = run_pkgship(
    &workspace.path,
    &["repo", "publish", "dist/pkg-1.4.0-1.el8.8.x86_64.rpm"],
  )?;
  assert!(stdout(&output).contains("Dry-run"));
  assert!(!workspace.file_exists("public"));

  Ok(())
}

#[test]
fn test_repo_publish_twice_keeps_one_copy() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.write_file("dist/pkg-1.4.0-1.el8.8.x86_64.rpm", "rpm")?;

  for _ in 0..2 {
    run_pkgship(
      &workspace.path,
      &["repo", "publish", "--apply", "dist/pkg-1.4.0-1.el8.8.x86_64.rpm"],
    )?;
  }

  assert_eq!(
    workspace.list_dir(LEAF)?,
    vec!["SHA256SUMS", "index.json", "pkg-1.4.0-1.el8.8.x86_64.rpm"]
  );
  assert_eq!(index_names(&workspace, LEAF)?, vec!["pkg-1.4.0-1.el8.8.x86_64.rpm"]);
  assert_eq!(workspace.read_file(&format!("{}/SHA256SUMS", LEAF))?.lines().count(), 1);

  Ok(())
}

#[test]
fn test_repo_publish_from_the_leaf_itself() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.write_file("dist/pkg-1.4.0-1.el8.8.x86_64.rpm", "rpm")?;
  run_pkgship(
    &workspace.path,
    &["repo", "publish", "--apply", "dist/pkg-1.4.0-1.el8.8.x86_64.rpm"],
  )?;

  let placed = format!("{}/pkg-1.4.0-1.el8.8.x86_64.rpm", LEAF);
  run_pkgship(&workspace.path, &["repo", "publish", "--apply", &placed])?;

  assert_eq!(workspace.read_file(&placed)?, "rpm");
  assert_eq!(index_names(&workspace, LEAF)?, vec!["pkg-1.4.0-1.el8.8.x86_64.rpm"]);
  assert_eq!(workspace.list_dir("public/el8/8")?, vec!["1.4.0"]);

  Ok(())
}

#[test]
fn test_repo_publish_replaces_leaf() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.write_file("dist/pkg-1.4.0-1.el8.8.x86_64.rpm", "rpm 1")?;
  workspace.write_file("dist/pkg-1.4.0-2.el8.8.x86_64.rpm", "rpm 2")?;

  run_pkgship(
    &workspace.path,
    &["repo", "publish", "--apply", "dist/pkg-1.4.0-1.el8.8.x86_64.rpm"],
  )?;
  run_pkgship(
    &workspace.path,
    &["repo", "publish", "--apply", "dist/pkg-1.4.0-2.el8.8.x86_64.rpm"],
  )?;

  assert_eq!(index_names(&workspace, LEAF)?, vec!["pkg-1.4.0-2.el8.8.x86_64.rpm"]);
  assert!(!workspace.file_exists(&format!("{}/pkg-1.4.0-1.el8.8.x86_64.rpm", LEAF)));

  Ok(())
}

#[test]
fn test_repo_publish_reindexes_other_leaves() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  // A leaf from an earlier version, indexed by hand and now stale
  workspace.write_file("public/el8/8/1.3.0/pkg-1.3.0-1.el8.8.x86_64.rpm", "old")?;
  workspace.write_file("public/el8/8/1.3.0/index.json", r#"{"packages": []}"#)?;
  workspace.write_file("dist/pkg-1.4.0-1.el8.8.x86_64.rpm", "rpm")?;

  run_pkgship(
    &workspace.path,
    &["repo", "publish", "--apply", "dist/pkg-1.4.0-1.el8.8.x86_64.rpm"],
  )?;

  assert_eq!(
    index_names(&workspace, "public/el8/8/1.3.0")?,
    vec!["pkg-1.3.0-1.el8.8.x86_64.rpm"]
  );
  assert_eq!(index_names(&workspace, LEAF)?, vec!["pkg-1.4.0-1.el8.8.x86_64.rpm"]);

  Ok(())
}

#[test]
fn test_repo_publish_with_distro_flags() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.write_file("dist/pkg-1.4.0-1.amd64.deb", "deb")?;

  // Without a distribution in the name or the flags the file cannot be placed
  let output = run_pkgship_unchecked(
    &workspace.path,
    &["repo", "publish", "--apply", "dist/pkg-1.4.0-1.amd64.deb"],
    &[],
  )?;
  assert_eq!(output.status.code(), Some(1));

  run_pkgship(
    &workspace.path,
    &[
      "repo",
      "publish",
      "--apply",
      "--distro",
      "ubuntu",
      "--distro-version",
      "24.04",
      "dist/pkg-1.4.0-1.amd64.deb",
    ],
  )?;
  assert!(workspace.file_exists("public/ubuntu/24.04/1.4.0/pkg-1.4.0-1.amd64.deb"));
  assert_eq!(
    index_names(&workspace, "public/ubuntu/24.04/1.4.0")?,
    vec!["pkg-1.4.0-1.amd64.deb"]
  );

  Ok(())
}

#[test]
fn test_repo_publish_runs_index_command() -> Result<()> {
  let config = format!(
    "{}index_command = 'touch \"{{dir}}/repodata.stamp\"'\n",
    DEFAULT_CONFIG
  );
  let workspace = TestWorkspace::with_config(&config)?;
  workspace.write_file("dist/pkg-1.4.0-1.el8.8.x86_64.rpm", "rpm")?;

  run_pkgship(
    &workspace.path,
    &["repo", "publish", "--apply", "dist/pkg-1.4.0-1.el8.8.x86_64.rpm"],
  )?;
  assert!(workspace.file_exists(&format!("{}/repodata.stamp", LEAF)));

  Ok(())
}
