//! Job command execution

use crate::core::error::{ResultExt, ShipResult};
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// A shell command for one job
#[derive(Debug, Clone)]
pub struct JobCommand {
  /// Job id (for logs)
  pub label: String,
  pub script: String,
  pub cwd: PathBuf,
  pub env: Vec<(String, String)>,
}

impl JobCommand {
  #[cfg(test)]
  pub fn env_value(&self, key: &str) -> Option<&str> {
    self.env.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
  }
}

/// Captured result of a job command
#[derive(Debug, Clone, Default)]
pub struct JobOutput {
  pub success: bool,
  /// Exit code (None when killed by a signal)
  pub code: Option<i32>,
  pub stdout: String,
  pub stderr: String,
}

impl JobOutput {
  pub fn describe_exit(&self) -> String {
    match self.code {
      Some(code) => format!("exit status {}", code),
      None => "terminated by signal".to_string(),
    }
  }
}

/// Runs job commands; swapped out in tests
pub trait JobExecutor: Send + Sync {
  fn run(&self, command: &JobCommand) -> ShipResult<JobOutput>;
}

/// Runs commands through `sh -c` with the job environment added to the
/// inherited one (build toolchains need the runner's PATH and credentials)
pub struct ShellExecutor;

impl JobExecutor for ShellExecutor {
  fn run(&self, command: &JobCommand) -> ShipResult<JobOutput> {
    debug!(job = %command.label, script = %command.script, "running job command");

    let output = Command::new("sh")
      .arg("-c")
      .arg(&command.script)
      .current_dir(&command.cwd)
      .envs(command.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
      .output()
      .with_context(|| format!("Failed to start job '{}'", command.label))?;

    Ok(JobOutput {
      success: output.status.success(),
      code: output.status.code(),
      stdout: String::from_utf8_lossy(&output.stdout).to_string(),
      stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
  }
}
