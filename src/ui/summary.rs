//! Run summary rendered as Markdown for the GitHub Actions step summary

use crate::core::error::{ResultExt, ShipResult};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

const STEP_SUMMARY_ENV: &str = "GITHUB_STEP_SUMMARY";

/// Markdown summary of one run
#[derive(Debug, Default)]
pub struct RunSummary {
  title: String,
  facts: Vec<(String, String)>,
  sections: Vec<(String, Vec<String>)>,
}

impl RunSummary {
  pub fn new(title: impl Into<String>) -> Self {
    Self {
      title: title.into(),
      ..Default::default()
    }
  }

  /// Add a row to the header table
  pub fn fact(&mut self, key: impl Into<String>, value: impl ToString) -> &mut Self {
    self.facts.push((key.into(), value.to_string()));
    self
  }

  /// Add a bulleted section; empty sections are omitted
  pub fn section(&mut self, heading: impl Into<String>, items: impl IntoIterator<Item = String>) -> &mut Self {
    let items: Vec<String> = items.into_iter().collect();
    if !items.is_empty() {
      self.sections.push((heading.into(), items));
    }
    self
  }

  pub fn to_markdown(&self) -> String {
    let mut out = format!("## {}\n\n", self.title);

    if !self.facts.is_empty() {
      out.push_str("| | |\n|---|---|\n");
      for (key, value) in &self.facts {
        out.push_str(&format!("| {} | `{}` |\n", key, value));
      }
      out.push('\n');
    }

    for (heading, items) in &self.sections {
      out.push_str(&format!("### {}\n\n", heading));
      for item in items {
        out.push_str(&format!("- {}\n", item));
      }
      out.push('\n');
    }

    out
  }

  /// Append to `$GITHUB_STEP_SUMMARY` when running under GitHub Actions
  pub fn publish(&self) -> ShipResult<Option<PathBuf>> {
    match std::env::var_os(STEP_SUMMARY_ENV) {
      Some(path) if !path.is_empty() => {
        let path = PathBuf::from(path);
        self.append_to(&path)?;
        Ok(Some(path))
      }
      _ => Ok(None),
    }
  }

  fn append_to(&self, path: &Path) -> ShipResult<()> {
    let mut file = OpenOptions::new()
      .create(true)
      .append(true)
      .open(path)
      .with_context(|| format!("Failed to open step summary {}", path.display()))?;
    file
      .write_all(self.to_markdown().as_bytes())
      .with_context(|| format!("Failed to write step summary {}", path.display()))?;
    Ok(())
  }
}
