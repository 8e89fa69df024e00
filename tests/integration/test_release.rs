//! End-to-end tests for the `release` pipeline

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_release_event_appends_new_packages() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.create_release("v1.4.0", &[("CHANGELOG.md", "notes")])?;

  run_pkgship(&workspace.path, &["release", "--tag", "v1.4.0", "--apply"])?;

  // Both packages appended, nothing deleted
  assert_eq!(
    workspace.release_assets("v1.4.0")?,
    vec!["CHANGELOG.md", "pkg-1.4.0-1.amd64.deb", "pkg-1.4.0-1.el8.x86_64.rpm"]
  );

  // Validation report for the target with a smoke test
  let report = workspace.read_file(".pkgship/reports/el8-rpm.txt")?;
  assert!(report.contains("PASS pkg-1.4.0-1.el8.x86_64.rpm"));
  assert!(report.contains("image: rockylinux:8"));
  assert!(report.contains("result: PASS"));

  // Repository leaves come from the target annotations
  assert!(workspace.file_exists("public/el8/8/1.4.0/pkg-1.4.0-1.el8.x86_64.rpm"));
  assert!(workspace.file_exists("public/el8/8/1.4.0/index.json"));
  assert!(workspace.file_exists("public/ubuntu/24.04/1.4.0/pkg-1.4.0-1.amd64.deb"));

  assert!(!workspace.file_exists(".pkgship/locks/pkgship-pkg.lock"));

  Ok(())
}

#[test]
fn test_release_manual_rebuild_replaces_assets() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.create_release("v1.4.0", &[("pkg-1.4.0-1.el8.x86_64.rpm", "rpm 1.4.0-1")])?;

  run_pkgship(&workspace.path, &["release", "--apply"])?;

  assert_eq!(
    workspace.release_assets("v1.4.0")?,
    vec!["pkg-1.4.0-2.amd64.deb", "pkg-1.4.0-2.el8.x86_64.rpm"]
  );
  assert_eq!(
    workspace.read_file("releases/v1.4.0/pkg-1.4.0-2.el8.x86_64.rpm")?.trim(),
    "rpm 1.4.0-2"
  );
  assert_eq!(workspace.list_dir("public/el8/8/1.4.0")?, vec![
    "SHA256SUMS",
    "index.json",
    "pkg-1.4.0-2.el8.x86_64.rpm"
  ]);

  Ok(())
}

#[test]
fn test_release_ignores_stale_build_outputs() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.create_release("v1.4.0", &[("pkg-1.4.0-1.el8.x86_64.rpm", "rpm 1.4.0-1")])?;
  // Left over from the build of release 1
  workspace.write_file(".pkgship/out/el8-rpm/pkg-1.4.0-1.el8.x86_64.rpm", "stale")?;
  // Shares the "1.4.0-2" prefix but belongs to release 21
  workspace.write_file(".pkgship/out/el8-rpm/pkg-1.4.0-21.el8.x86_64.rpm", "lookalike")?;

  run_pkgship(&workspace.path, &["release", "--apply"])?;

  assert_eq!(
    workspace.release_assets("v1.4.0")?,
    vec!["pkg-1.4.0-2.amd64.deb", "pkg-1.4.0-2.el8.x86_64.rpm"]
  );

  Ok(())
}

#[test]
fn test_release_dry_run_changes_nothing() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.create_release("v1.4.0", &[("pkg-1.4.0-1.el8.x86_64.rpm", "rpm")])?;

  let output = run_pkgship(&workspace.path, &["release"])?;
  let out = stdout(&output);
  assert!(out.contains("Build el8-rpm"));
  assert!(out.contains("Would delete 1 attached asset(s)"));
  assert!(out.contains("Dry-run"));

  assert_eq!(workspace.release_assets("v1.4.0")?, vec!["pkg-1.4.0-1.el8.x86_64.rpm"]);
  assert!(!workspace.file_exists(".pkgship/out"));
  assert!(!workspace.file_exists("public"));

  Ok(())
}

#[test]
fn test_release_failed_build_publishes_nothing() -> Result<()> {
  let config = DEFAULT_CONFIG.replace(
    r#"command = 'echo "deb $PKGSHIP_VERSION-$PKGSHIP_RELEASE" > "$PKGSHIP_OUT_DIR/pkg-$PKGSHIP_VERSION-$PKGSHIP_RELEASE.amd64.deb"'"#,
    "command = 'exit 7'",
  );
  let workspace = TestWorkspace::with_config(&config)?;
  workspace.create_release("v1.4.0", &[("pkg-1.4.0-1.el8.x86_64.rpm", "rpm")])?;

  let output = run_pkgship_unchecked(&workspace.path, &["release", "--apply"], &[])?;
  assert_eq!(output.status.code(), Some(2));
  assert!(stdout(&output).contains("exit status 7"));

  // The other target built, but the gate stayed closed
  assert_eq!(workspace.release_assets("v1.4.0")?, vec!["pkg-1.4.0-1.el8.x86_64.rpm"]);
  assert!(!workspace.file_exists("public"));

  Ok(())
}

#[test]
fn test_release_failed_validation_publishes_nothing() -> Result<()> {
  let config = DEFAULT_CONFIG.replace(r#"command = 'test -s "$PKGSHIP_ARTIFACT"'"#, "command = 'false'");
  let workspace = TestWorkspace::with_config(&config)?;
  workspace.create_release("v1.4.0", &[])?;
  let summary = workspace.path.join("summary.md");
  let summary_path = summary.display().to_string();

  let output = run_pkgship_unchecked(
    &workspace.path,
    &["release", "--tag", "v1.4.0", "--apply"],
    &[("GITHUB_STEP_SUMMARY", &summary_path)],
  )?;
  assert_eq!(output.status.code(), Some(3));

  assert!(workspace.release_assets("v1.4.0")?.is_empty());
  assert!(!workspace.file_exists("public"));
  assert!(workspace.read_file(".pkgship/reports/el8-rpm.txt")?.contains("result: FAIL"));

  let markdown = std::fs::read_to_string(&summary)?;
  assert!(markdown.contains("Nothing published"));
  assert!(markdown.contains("validate:el8-rpm"));

  Ok(())
}

#[test]
fn test_release_skip_repo() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.create_release("v1.4.0", &[])?;

  run_pkgship(&workspace.path, &["release", "--tag", "v1.4.0", "--skip-repo", "--apply"])?;

  assert_eq!(workspace.release_assets("v1.4.0")?.len(), 2);
  assert!(!workspace.file_exists("public"));

  Ok(())
}

#[test]
fn test_build_only_runs_selected_target() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  let output = run_pkgship(
    &workspace.path,
    &["build", "--tag", "v2.0.0", "--target", "ubuntu-deb", "--json"],
  )?;
  let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  let ids: Vec<&str> = report["jobs"]
    .as_array()
    .map(|jobs| jobs.iter().filter_map(|j| j["id"].as_str()).collect())
    .unwrap_or_default();
  assert_eq!(ids, vec!["build:ubuntu-deb", "publish"]);

  assert!(workspace.file_exists(".pkgship/out/ubuntu-deb/pkg-2.0.0-1.amd64.deb"));
  assert!(!workspace.file_exists(".pkgship/out/el8-rpm"));
  assert!(workspace.release_assets("v2.0.0").is_err());

  Ok(())
}
