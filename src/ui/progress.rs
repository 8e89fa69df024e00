//! Progress indicators for long-running operations
//!
//! Uses `linya` for allocation-free, concurrency-friendly progress bars.
//! Bars are only drawn when stderr is a terminal; in CI logs the tracing
//! output already records each step.

use linya::{Bar, Progress};
use std::io::IsTerminal;
use std::sync::{Arc, Mutex};

fn interactive() -> bool {
  std::io::stderr().is_terminal()
}

/// Progress bar for sequential asset operations (deletes, uploads)
pub struct AssetProgress {
  inner: Option<(Progress, Bar)>,
}

impl AssetProgress {
  pub fn new(total: usize, label: impl Into<String>) -> Self {
    if total == 0 || !interactive() {
      return Self { inner: None };
    }
    let mut progress = Progress::new();
    let bar = progress.bar(total, label.into());
    Self {
      inner: Some((progress, bar)),
    }
  }

  /// Increment progress by 1
  pub fn inc(&mut self) {
    if let Some((progress, bar)) = self.inner.as_mut() {
      progress.inc_and_draw(bar, 1);
    }
  }
}

/// Shared progress for jobs running in parallel
/// Thread-safe wrapper; one bar per wave
#[derive(Clone)]
pub struct JobProgress {
  progress: Option<Arc<Mutex<Progress>>>,
}

impl JobProgress {
  pub fn new() -> Self {
    Self {
      progress: interactive().then(|| Arc::new(Mutex::new(Progress::new()))),
    }
  }

  /// Add a new bar with a label and total
  pub fn add_bar(&self, total: usize, label: impl Into<String>) -> Option<Bar> {
    let progress = self.progress.as_ref()?;
    let mut progress = progress.lock().ok()?;
    Some(progress.bar(total, label.into()))
  }

  /// Increment a bar (thread-safe)
  pub fn inc(&self, bar: Option<&Bar>) {
    if let (Some(progress), Some(bar)) = (self.progress.as_ref(), bar)
      && let Ok(mut progress) = progress.lock()
    {
      progress.inc_and_draw(bar, 1);
    }
  }
}

impl Default for JobProgress {
  fn default() -> Self {
    Self::new()
  }
}
