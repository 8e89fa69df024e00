//! Fan the resolved release out to build and validation jobs
//!
//! Jobs run wave by wave (see [`JobGraph::waves`]); jobs inside a wave run in
//! parallel. A job whose dependency did not succeed is skipped, so a failed build
//! never reaches validation and a failed build or validation keeps the publish
//! gate closed.

use super::executor::{JobCommand, JobExecutor, JobOutput};
use super::graph::{JobGraph, JobKind};
use crate::core::config::BuildTarget;
use crate::core::context::ReleaseContext;
use crate::core::error::{BuildError, ResultExt, ShipError, ShipResult, ValidationError};
use crate::core::lock::ConcurrencyLease;
use crate::core::plan::{Operation, OperationType, Plan};
use crate::release::PackageFile;
use crate::ui::progress::JobProgress;
use crate::utils::file_name_of;
use petgraph::graph::NodeIndex;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Terminal state of a job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum JobStatus {
  Succeeded,
  Failed(String),
  Skipped(String),
}

impl JobStatus {
  pub fn is_success(&self) -> bool {
    matches!(self, JobStatus::Succeeded)
  }
}

/// Outcome of one job
#[derive(Debug, Clone, Serialize)]
pub struct JobRecord {
  pub id: String,
  pub kind: JobKind,
  pub target: Option<String>,
  pub status: JobStatus,
  pub duration_ms: u128,
  /// Packages produced (build jobs)
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub artifacts: Vec<PathBuf>,
  /// Pass/fail report (validation jobs)
  #[serde(skip_serializing_if = "Option::is_none")]
  pub report: Option<PathBuf>,
}

impl JobRecord {
  fn finished(id: &str, kind: JobKind, target: Option<&str>, status: JobStatus, started: Instant) -> Self {
    Self {
      id: id.to_string(),
      kind,
      target: target.map(str::to_string),
      status,
      duration_ms: started.elapsed().as_millis(),
      artifacts: Vec::new(),
      report: None,
    }
  }
}

/// Outcome of a dispatch
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
  /// Jobs in execution order
  pub jobs: Vec<JobRecord>,
  /// Packages from successful builds
  pub packages: Vec<PackageFile>,
  /// Validation reports written
  pub reports: Vec<PathBuf>,
}

impl DispatchReport {
  fn failed(&self, kind: JobKind) -> Vec<String> {
    self
      .jobs
      .iter()
      .filter(|j| j.kind == kind && matches!(j.status, JobStatus::Failed(_)))
      .filter_map(|j| j.target.clone())
      .collect()
  }

  /// True when every build and validation succeeded
  pub fn publish_ready(&self) -> bool {
    self
      .jobs
      .iter()
      .any(|j| j.kind == JobKind::Publish && j.status.is_success())
  }

  /// Error describing why the publish gate is closed
  pub fn ensure_publishable(&self) -> ShipResult<()> {
    let failed_builds = self.failed(JobKind::Build);
    if !failed_builds.is_empty() {
      return Err(ShipError::Build(BuildError::JobsFailed { failed: failed_builds }));
    }
    let failed_validations = self.failed(JobKind::Validate);
    if !failed_validations.is_empty() {
      return Err(ShipError::Validation(ValidationError::SmokeTestsFailed {
        targets: failed_validations,
      }));
    }
    if !self.publish_ready() {
      return Err(ShipError::message("Publish gate did not open"));
    }
    Ok(())
  }
}

/// Result of a single job, before it is merged into the report
struct JobResult {
  record: JobRecord,
  packages: Vec<PackageFile>,
}

pub struct Dispatcher<'a> {
  ctx: &'a ReleaseContext,
  targets: &'a [BuildTarget],
  executor: &'a dyn JobExecutor,
  lease: Option<&'a ConcurrencyLease>,
}

impl<'a> Dispatcher<'a> {
  pub fn new(ctx: &'a ReleaseContext, targets: &'a [BuildTarget], executor: &'a dyn JobExecutor) -> Self {
    Self {
      ctx,
      targets,
      executor,
      lease: None,
    }
  }

  /// Stop between waves if the run loses its concurrency group
  pub fn with_lease(mut self, lease: &'a ConcurrencyLease) -> Self {
    self.lease = Some(lease);
    self
  }

  /// Plan of the jobs (dry-run output)
  pub fn plan(&self) -> ShipResult<Plan> {
    let graph = JobGraph::for_targets(self.targets)?;
    let mut plan = Plan::new(OperationType::Build, Some(self.ctx.tag.to_string())).with_summary(format!(
      "   Version: {} (release {})",
      self.ctx.version, self.ctx.release
    ));
    for wave in graph.waves()? {
      for idx in wave {
        let node = graph.node(idx);
        let Some(target) = node.target.as_deref().and_then(|t| self.target(t)) else {
          continue;
        };
        match node.kind {
          JobKind::Build => plan.add_operation(Operation::RunBuild {
            target: target.name.clone(),
            command: target.command.clone(),
          }),
          JobKind::Validate => plan.add_operation(Operation::RunValidation {
            target: target.name.clone(),
            command: target.validate.as_ref().map(|v| v.command.clone()).unwrap_or_default(),
          }),
          JobKind::Publish => {}
        }
      }
    }
    Ok(plan)
  }

  fn target(&self, name: &str) -> Option<&'a BuildTarget> {
    self.targets.iter().find(|t| t.name == name)
  }

  fn out_dir(&self, target: &BuildTarget) -> PathBuf {
    self.ctx.state_dir.join("out").join(&target.name)
  }

  fn report_path(&self, target: &BuildTarget) -> PathBuf {
    self.ctx.state_dir.join("reports").join(format!("{}.txt", target.name))
  }

  /// Run every job
  ///
  /// Job failures are recorded in the report; only cancellation and graph
  /// errors abort the dispatch.
  pub fn run(&self) -> ShipResult<DispatchReport> {
    let graph = JobGraph::for_targets(self.targets)?;
    let waves = graph.waves()?;
    info!(jobs = graph.len(), waves = waves.len(), version = %self.ctx.version, release = %self.ctx.release, "dispatching jobs");

    let mut status: HashMap<NodeIndex, JobStatus> = HashMap::new();
    let mut built: HashMap<String, Vec<PackageFile>> = HashMap::new();
    let mut report = DispatchReport {
      jobs: Vec::new(),
      packages: Vec::new(),
      reports: Vec::new(),
    };
    let progress = JobProgress::new();

    for (n, wave) in waves.iter().enumerate() {
      if let Some(lease) = self.lease {
        lease.ensure_current()?;
      }

      let mut runnable = Vec::new();
      for idx in wave {
        let node = graph.node(*idx);
        let blocked = graph
          .dependencies(*idx)
          .into_iter()
          .find(|dep| !status.get(dep).is_some_and(JobStatus::is_success));
        match blocked {
          Some(dep) => {
            let reason = format!("{} did not succeed", graph.node(dep).id);
            info!(job = %node.id, %reason, "skipping job");
            let record = JobRecord::finished(
              &node.id,
              node.kind,
              node.target.as_deref(),
              JobStatus::Skipped(reason),
              Instant::now(),
            );
            status.insert(*idx, record.status.clone());
            report.jobs.push(record);
          }
          None => runnable.push(*idx),
        }
      }

      let bar = progress.add_bar(runnable.len(), format!("Wave {}", n + 1));
      let results: Vec<(NodeIndex, JobResult)> = runnable
        .par_iter()
        .map(|idx| {
          let node = graph.node(*idx);
          let result = match node.kind {
            JobKind::Build => self.run_build(&node.id, node.target.as_deref()),
            JobKind::Validate => self.run_validation(&node.id, node.target.as_deref(), &built),
            JobKind::Publish => JobResult {
              record: JobRecord::finished(&node.id, node.kind, None, JobStatus::Succeeded, Instant::now()),
              packages: Vec::new(),
            },
          };
          progress.inc(bar.as_ref());
          (*idx, result)
        })
        .collect();

      for (idx, result) in results {
        match &result.record.status {
          JobStatus::Failed(reason) => error!(job = %result.record.id, %reason, "job failed"),
          _ => info!(job = %result.record.id, ms = result.record.duration_ms, "job succeeded"),
        }
        if let Some(target) = &result.record.target
          && !result.packages.is_empty()
        {
          built.insert(target.clone(), result.packages.clone());
        }
        if let Some(path) = &result.record.report {
          report.reports.push(path.clone());
        }
        status.insert(idx, result.record.status.clone());
        report.jobs.push(result.record);
      }
    }

    // Build outputs are reported even when the gate is closed; callers check
    // `ensure_publishable` before using them
    for target in self.targets {
      if let Some(packages) = built.get(&target.name) {
        report.packages.extend(packages.iter().cloned());
      }
    }

    Ok(report)
  }

  fn job_env(&self, target: &BuildTarget) -> Vec<(String, String)> {
    let mut env: Vec<(String, String)> = self
      .ctx
      .job_env()
      .into_iter()
      .map(|(k, v)| (k.to_string(), v))
      .collect();
    env.extend([
      ("PKGSHIP_TARGET".to_string(), target.name.clone()),
      ("PKGSHIP_FORMAT".to_string(), target.format.to_string()),
      ("PKGSHIP_DISTRO".to_string(), target.distro.clone()),
      ("PKGSHIP_DISTRO_VERSION".to_string(), target.distro_version.clone()),
      ("PKGSHIP_ARCH".to_string(), target.arch.clone()),
      ("PKGSHIP_OUT_DIR".to_string(), self.out_dir(target).display().to_string()),
    ]);
    env
  }

  fn run_build(&self, id: &str, target: Option<&str>) -> JobResult {
    let started = Instant::now();
    let fail = |reason: String| JobResult {
      record: JobRecord::finished(id, JobKind::Build, target, JobStatus::Failed(reason), started),
      packages: Vec::new(),
    };
    let Some(target) = target.and_then(|t| self.target(t)) else {
      return fail("unknown target".to_string());
    };

    let out_dir = self.out_dir(target);
    if let Err(e) = fs::create_dir_all(&out_dir) {
      return fail(format!("cannot create {}: {}", out_dir.display(), e));
    }

    let command = JobCommand {
      label: id.to_string(),
      script: target.command.clone(),
      cwd: self.ctx.workspace_root.clone(),
      env: self.job_env(target),
    };
    match self.executor.run(&command) {
      Ok(output) if output.success => {}
      Ok(output) => {
        log_output_tail(id, &output);
        return fail(format!("build command failed ({})", output.describe_exit()));
      }
      Err(e) => return fail(e.to_string()),
    }

    match self.collect_artifacts(target) {
      Ok(paths) => {
        let packages = paths
          .iter()
          .map(|p| PackageFile::from_target(p, target, &self.ctx.package, &self.ctx.version, self.ctx.release))
          .collect();
        let mut record = JobRecord::finished(id, JobKind::Build, Some(&target.name), JobStatus::Succeeded, started);
        record.artifacts = paths;
        JobResult { record, packages }
      }
      Err(e) => fail(e.to_string()),
    }
  }

  /// Files matching the target's glob that carry this run's `{version}-{release}`
  fn collect_artifacts(&self, target: &BuildTarget) -> ShipResult<Vec<PathBuf>> {
    let pattern = self.ctx.workspace_root.join(&target.artifacts);
    let pattern = pattern.to_string_lossy();
    let marker = format!("-{}.", self.ctx.full_version());

    let mut matched = Vec::new();
    let mut ignored = 0usize;
    for entry in glob::glob(&pattern)? {
      let path = entry?;
      if !path.is_file() {
        continue;
      }
      // Delimited on both sides so 1.4.0-1 never picks up 1.4.0-12 or 11.4.0-1
      if file_name_of(&path).contains(&marker) {
        matched.push(path);
      } else {
        ignored += 1;
        debug!(path = %path.display(), %marker, "ignoring artifact from another build");
      }
    }
    matched.sort();

    if matched.is_empty() {
      let detail = if ignored > 0 {
        format!(" ({} file(s) matched but none carry '{}')", ignored, marker)
      } else {
        String::new()
      };
      return Err(ShipError::message(format!(
        "no artifacts matched '{}'{}",
        target.artifacts, detail
      )));
    }
    Ok(matched)
  }

  fn run_validation(&self, id: &str, target: Option<&str>, built: &HashMap<String, Vec<PackageFile>>) -> JobResult {
    let started = Instant::now();
    let fail = |reason: String| JobResult {
      record: JobRecord::finished(id, JobKind::Validate, target, JobStatus::Failed(reason), started),
      packages: Vec::new(),
    };
    let Some(target) = target.and_then(|t| self.target(t)) else {
      return fail("unknown target".to_string());
    };
    let Some(validate) = &target.validate else {
      return fail("no validation configured".to_string());
    };
    let packages = built.get(&target.name).map(Vec::as_slice).unwrap_or_default();

    let mut text = format!(
      "pkgship validation report\ntarget: {}\nversion: {}-{}\nimage: {}\n\n",
      target.name,
      self.ctx.version,
      self.ctx.release,
      validate.image.as_deref().unwrap_or("-")
    );
    let mut failures = Vec::new();

    for package in packages {
      let mut env = self.job_env(target);
      env.push(("PKGSHIP_ARTIFACT".to_string(), package.path.display().to_string()));
      if let Some(image) = &validate.image {
        env.push(("PKGSHIP_IMAGE".to_string(), image.clone()));
      }
      let command = JobCommand {
        label: id.to_string(),
        script: validate.command.clone(),
        cwd: self.ctx.workspace_root.clone(),
        env,
      };

      let name = package.file_name();
      match self.executor.run(&command) {
        Ok(output) if output.success => {
          let _ = writeln!(text, "PASS {}", name);
          append_output(&mut text, &output);
        }
        Ok(output) => {
          log_output_tail(id, &output);
          let _ = writeln!(text, "FAIL {} ({})", name, output.describe_exit());
          append_output(&mut text, &output);
          failures.push(name);
        }
        Err(e) => {
          let _ = writeln!(text, "FAIL {} ({})", name, e);
          failures.push(name);
        }
      }
    }

    let _ = writeln!(
      text,
      "\nresult: {} ({} of {} passed)",
      if failures.is_empty() { "PASS" } else { "FAIL" },
      packages.len() - failures.len(),
      packages.len()
    );

    let report_path = self.report_path(target);
    if let Err(e) = write_report(&report_path, &text) {
      return fail(e.to_string());
    }

    let status = if failures.is_empty() {
      JobStatus::Succeeded
    } else {
      JobStatus::Failed(format!("smoke test failed for {}", failures.join(", ")))
    };
    let mut record = JobRecord::finished(id, JobKind::Validate, Some(&target.name), status, started);
    record.report = Some(report_path);
    JobResult {
      record,
      packages: Vec::new(),
    }
  }
}

fn append_output(text: &mut String, output: &JobOutput) {
  for line in output.stdout.lines().chain(output.stderr.lines()) {
    let _ = writeln!(text, "    {}", line);
  }
}

fn log_output_tail(job: &str, output: &JobOutput) {
  let tail: Vec<&str> = output.stderr.lines().rev().take(20).collect();
  for line in tail.into_iter().rev() {
    warn!(job, "{}", line);
  }
}

fn write_report(path: &Path, text: &str) -> ShipResult<()> {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
  }
  fs::write(path, text).with_context(|| format!("Failed to write report {}", path.display()))?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::core::config::{PackageFormat, ValidationConfig};
  use crate::core::context::test_support::context;
  use crate::release::RunMode;
  use std::collections::HashSet;
  use std::sync::Mutex;
  use tempfile::TempDir;

  /// Builds by writing `{package}-{version}-{release}.{distro}.{arch}.{format}`
  /// into the out dir; fails jobs whose label or artifact is listed
  #[derive(Default)]
  struct FakeExecutor {
    fail_labels: HashSet<String>,
    fail_artifacts: HashSet<String>,
    calls: Mutex<Vec<String>>,
  }

  impl JobExecutor for FakeExecutor {
    fn run(&self, command: &JobCommand) -> ShipResult<JobOutput> {
      self.calls.lock().unwrap().push(command.label.clone());
      if self.fail_labels.contains(&command.label) {
        return Ok(JobOutput {
          success: false,
          code: Some(1),
          stderr: "boom".to_string(),
          ..Default::default()
        });
      }

      if let Some(artifact) = command.env_value("PKGSHIP_ARTIFACT") {
        let name = file_name_of(Path::new(artifact));
        let success = !self.fail_artifacts.contains(&name);
        return Ok(JobOutput {
          success,
          code: Some(if success { 0 } else { 1 }),
          stdout: "goss: 3 passed".to_string(),
          ..Default::default()
        });
      }

      let get = |k: &str| command.env_value(k).unwrap_or_default().to_string();
      let name = format!(
        "{}-{}-{}.{}.{}.{}",
        get("PKGSHIP_PACKAGE"),
        get("PKGSHIP_VERSION"),
        get("PKGSHIP_RELEASE"),
        get("PKGSHIP_DISTRO"),
        get("PKGSHIP_ARCH"),
        get("PKGSHIP_FORMAT")
      );
      fs::write(Path::new(&get("PKGSHIP_OUT_DIR")).join(name), "package").unwrap();
      Ok(JobOutput {
        success: true,
        code: Some(0),
        ..Default::default()
      })
    }
  }

  fn target(name: &str, format: PackageFormat, validated: bool) -> BuildTarget {
    BuildTarget {
      name: name.to_string(),
      format,
      distro: "el8".to_string(),
      distro_version: "8".to_string(),
      arch: "x86_64".to_string(),
      command: "make".to_string(),
      artifacts: format!(".pkgship/out/{}/*", name),
      validate: validated.then(|| ValidationConfig {
        command: "goss validate".to_string(),
        image: Some("rockylinux:8".to_string()),
      }),
    }
  }

  fn targets() -> Vec<BuildTarget> {
    vec![
      target("rpm", PackageFormat::Rpm, true),
      target("deb", PackageFormat::Deb, true),
    ]
  }

  #[test]
  fn test_all_jobs_succeed() {
    let dir = TempDir::new().unwrap();
    let ctx = context(dir.path(), "1.4.0", 1, RunMode::Event);
    let targets = targets();
    let executor = FakeExecutor::default();

    let report = Dispatcher::new(&ctx, &targets, &executor).run().unwrap();

    assert!(report.publish_ready());
    assert!(report.ensure_publishable().is_ok());
    assert_eq!(report.packages.len(), 2);
    assert_eq!(report.reports.len(), 2);
    let names: Vec<String> = report.packages.iter().map(|p| p.file_name()).collect();
    assert!(names.contains(&"pkg-1.4.0-1.el8.x86_64.rpm".to_string()));

    let text = fs::read_to_string(dir.path().join(".pkgship/reports/rpm.txt")).unwrap();
    assert!(text.contains("PASS pkg-1.4.0-1.el8.x86_64.rpm"));
    assert!(text.contains("image: rockylinux:8"));
    assert!(text.contains("result: PASS"));
  }

  #[test]
  fn test_failed_build_skips_validation_and_publish() {
    let dir = TempDir::new().unwrap();
    let ctx = context(dir.path(), "1.4.0", 1, RunMode::Event);
    let targets = targets();
    let executor = FakeExecutor {
      fail_labels: HashSet::from(["build:rpm".to_string()]),
      ..Default::default()
    };

    let report = Dispatcher::new(&ctx, &targets, &executor).run().unwrap();

    let status = |id: &str| report.jobs.iter().find(|j| j.id == id).unwrap().status.clone();
    assert!(matches!(status("build:rpm"), JobStatus::Failed(_)));
    assert!(matches!(status("validate:rpm"), JobStatus::Skipped(_)));
    assert!(status("validate:deb").is_success());
    assert!(matches!(status("publish"), JobStatus::Skipped(_)));
    assert!(!report.publish_ready());
    assert!(matches!(
      report.ensure_publishable(),
      Err(ShipError::Build(BuildError::JobsFailed { .. }))
    ));
    assert!(!executor.calls.lock().unwrap().contains(&"validate:rpm".to_string()));
  }

  #[test]
  fn test_failed_validation_closes_gate() {
    let dir = TempDir::new().unwrap();
    let ctx = context(dir.path(), "1.4.0", 1, RunMode::Event);
    let targets = targets();
    let executor = FakeExecutor {
      fail_artifacts: HashSet::from(["pkg-1.4.0-1.el8.x86_64.deb".to_string()]),
      ..Default::default()
    };

    let report = Dispatcher::new(&ctx, &targets, &executor).run().unwrap();
    assert!(matches!(
      report.ensure_publishable(),
      Err(ShipError::Validation(ValidationError::SmokeTestsFailed { .. }))
    ));
    let text = fs::read_to_string(dir.path().join(".pkgship/reports/deb.txt")).unwrap();
    assert!(text.contains("FAIL pkg-1.4.0-1.el8.x86_64.deb"));
    assert!(text.contains("result: FAIL"));
  }

  #[test]
  fn test_stale_artifacts_ignored() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join(".pkgship/out/rpm");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("pkg-1.4.0-1.el8.x86_64.rpm"), "old").unwrap();

    let ctx = context(dir.path(), "1.4.0", 2, RunMode::Manual);
    let targets = vec![target("rpm", PackageFormat::Rpm, false)];
    let report = Dispatcher::new(&ctx, &targets, &FakeExecutor::default()).run().unwrap();

    let names: Vec<String> = report.packages.iter().map(|p| p.file_name()).collect();
    assert_eq!(names, vec!["pkg-1.4.0-2.el8.x86_64.rpm".to_string()]);
  }

  #[test]
  fn test_artifacts_from_lookalike_versions_ignored() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join(".pkgship/out/rpm");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("pkg-1.4.0-12.el8.x86_64.rpm"), "later release").unwrap();
    fs::write(out.join("pkg-11.4.0-1.el8.x86_64.rpm"), "other version").unwrap();

    let ctx = context(dir.path(), "1.4.0", 1, RunMode::Event);
    let targets = vec![target("rpm", PackageFormat::Rpm, false)];
    let report = Dispatcher::new(&ctx, &targets, &FakeExecutor::default()).run().unwrap();

    let names: Vec<String> = report.packages.iter().map(|p| p.file_name()).collect();
    assert_eq!(names, vec!["pkg-1.4.0-1.el8.x86_64.rpm".to_string()]);
  }

  #[test]
  fn test_no_artifacts_fails_build() {
    let dir = TempDir::new().unwrap();
    let ctx = context(dir.path(), "1.4.0", 1, RunMode::Event);
    let mut targets = vec![target("rpm", PackageFormat::Rpm, false)];
    targets[0].artifacts = "nowhere/*.rpm".to_string();

    let report = Dispatcher::new(&ctx, &targets, &FakeExecutor::default()).run().unwrap();
    match &report.jobs[0].status {
      JobStatus::Failed(reason) => assert!(reason.contains("no artifacts matched")),
      other => panic!("unexpected status {:?}", other),
    }
  }

  #[test]
  fn test_superseded_dispatch_is_cancelled() {
    let dir = TempDir::new().unwrap();
    let ctx = context(dir.path(), "1.4.0", 1, RunMode::Event);
    let targets = targets();
    let lease = ConcurrencyLease::acquire(&ctx.state_dir, &ctx.concurrency_group, "run-1").unwrap();
    let _newer = ConcurrencyLease::acquire(&ctx.state_dir, &ctx.concurrency_group, "run-2").unwrap();

    let executor = FakeExecutor::default();
    let err = Dispatcher::new(&ctx, &targets, &executor)
      .with_lease(&lease)
      .run()
      .unwrap_err();
    assert!(matches!(err, ShipError::Cancelled { .. }));
    assert!(executor.calls.lock().unwrap().is_empty());
  }

  #[test]
  fn test_plan_lists_jobs() {
    let dir = TempDir::new().unwrap();
    let ctx = context(dir.path(), "1.4.0", 1, RunMode::Event);
    let targets = targets();
    let executor = FakeExecutor::default();
    let plan = Dispatcher::new(&ctx, &targets, &executor).plan().unwrap();
    assert_eq!(plan.len(), 4);
    assert!(plan.to_human_readable().contains("Build rpm (make)"));
  }
}
