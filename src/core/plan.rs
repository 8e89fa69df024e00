//! Plan-based operations for idempotent, reviewable, and resumable workflows
//!
//! Every mutating operation produces a `Plan` before execution, enabling:
//!
//! - **Dry-run mode**: show what will happen without doing it
//! - **Idempotency**: same input, same plan id
//! - **Auditability**: plans are JSON-serializable for CI logs
//! - **Resumption**: a sync intent is keyed by its plan id, so a retry of the same
//!   plan can pick up where an interrupted run stopped
//!
//! # Architecture
//!
//! ```text
//! Command (sync, repo publish, build)
//!   ↓
//! Plan (what to do)
//!   ↓
//! Synchronizer / Publisher / Dispatcher (apply the plan)
//!   ↓
//! Report
//! ```

use crate::core::error::ShipResult;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Plan identifier (SHA256 hash of plan contents)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlanId(String);

impl PlanId {
  /// Create a plan ID from plan contents
  pub fn from_contents(contents: &[u8]) -> Self {
    let mut hasher = Sha256::new();
    hasher.update(contents);
    let result = hasher.finalize();
    Self(format!("{:x}", result))
  }

  /// Get the short ID (first 12 characters)
  pub fn short(&self) -> &str {
    &self.0[..12.min(self.0.len())]
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for PlanId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.short())
  }
}

/// Operation that can be performed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
  /// Delete an attached asset from a release
  DeleteAsset { tag: String, name: String },

  /// Upload a local file to a release
  UploadAsset {
    tag: String,
    name: String,
    path: String,
    size: u64,
    sha256: String,
  },

  /// Remove and recreate a repository leaf directory
  ClearLeaf { dir: String },

  /// Copy a package file into a leaf
  PlaceFile { from: String, to: String },

  /// Regenerate index metadata for a leaf
  RegenerateIndex { dir: String },

  /// Run a package build job
  RunBuild { target: String, command: String },

  /// Run a validation job
  RunValidation { target: String, command: String },
}

/// Type of operation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
  Sync,
  Repository,
  Build,
}

impl fmt::Display for OperationType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      OperationType::Sync => write!(f, "sync"),
      OperationType::Repository => write!(f, "repository"),
      OperationType::Build => write!(f, "build"),
    }
  }
}

/// Plan metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanMetadata {
  /// Plan ID (content hash)
  pub id: PlanId,

  /// What operation this plan represents
  pub operation_type: OperationType,

  /// Release tag the plan acts on (if applicable)
  pub tag: Option<String>,

  /// Whether this plan will make destructive changes
  pub is_destructive: bool,
}

/// A plan represents a sequence of operations to perform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
  pub metadata: PlanMetadata,

  /// Operations to perform (in order)
  pub operations: Vec<Operation>,

  /// Extra material folded into the id (e.g. the sync mode)
  #[serde(skip_serializing_if = "Vec::is_empty", default)]
  pub salt: Vec<String>,

  /// Human-readable summary
  pub summary: String,
}

impl Plan {
  pub fn new(operation_type: OperationType, tag: Option<String>) -> Self {
    let mut plan = Self {
      metadata: PlanMetadata {
        id: PlanId::from_contents(&[]),
        operation_type,
        tag,
        is_destructive: false,
      },
      operations: Vec::new(),
      salt: Vec::new(),
      summary: String::new(),
    };
    plan.recompute_id();
    plan
  }

  /// Add an operation to the plan
  pub fn add_operation(&mut self, operation: Operation) {
    self.operations.push(operation);
    self.recompute_id();
  }

  /// Add multiple operations
  pub fn add_operations(&mut self, operations: impl IntoIterator<Item = Operation>) {
    self.operations.extend(operations);
    self.recompute_id();
  }

  /// Fold an extra value into the plan id
  pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
    self.salt.push(salt.into());
    self.recompute_id();
    self
  }

  pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
    self.summary = summary.into();
    self
  }

  pub fn mark_destructive(mut self) -> Self {
    self.metadata.is_destructive = true;
    self
  }

  /// Recompute plan ID from type, tag, salt and the outcome-defining operations
  ///
  /// Asset deletions are derived from whatever is attached right now, so they are
  /// left out: a retry after a partial delete phase keeps the same id.
  fn recompute_id(&mut self) {
    let outcome: Vec<&Operation> = self
      .operations
      .iter()
      .filter(|op| !matches!(op, Operation::DeleteAsset { .. }))
      .collect();
    let material = (
      &self.metadata.operation_type,
      &self.metadata.tag,
      &self.salt,
      &outcome,
    );
    let json = serde_json::to_vec(&material).unwrap_or_default();
    self.metadata.id = PlanId::from_contents(&json);
  }

  pub fn id(&self) -> &PlanId {
    &self.metadata.id
  }

  /// Serialize to JSON
  pub fn to_json(&self) -> ShipResult<String> {
    Ok(serde_json::to_string_pretty(self)?)
  }

  /// Get human-readable representation
  pub fn to_human_readable(&self) -> String {
    let mut output = String::new();

    output.push_str(&format!(
      "📋 Plan: {} ({})\n",
      self.metadata.operation_type, self.metadata.id
    ));

    if let Some(ref tag) = self.metadata.tag {
      output.push_str(&format!("   Release: {}\n", tag));
    }

    if !self.summary.is_empty() {
      output.push_str(&format!("\n{}\n", self.summary));
    }

    output.push_str(&format!("\n   Operations ({}):\n", self.operations.len()));

    for (i, op) in self.operations.iter().enumerate() {
      output.push_str(&format!("   {}. {}\n", i + 1, operation_to_string(op)));
    }

    if self.metadata.is_destructive {
      output.push_str("\n⚠️  NOTE: This plan deletes existing files\n");
      output.push_str("   (Delete and upload are not atomic; an interrupted run resumes from the intent log)\n");
    }

    output
  }

  #[cfg(test)]
  pub fn len(&self) -> usize {
    self.operations.len()
  }
}

/// Convert operation to human-readable string
fn operation_to_string(op: &Operation) -> String {
  match op {
    Operation::DeleteAsset { tag, name } => format!("Delete {} from {}", name, tag),
    Operation::UploadAsset { tag, name, size, .. } => format!("Upload {} to {} ({} bytes)", name, tag, size),
    Operation::ClearLeaf { dir } => format!("Replace leaf {}", dir),
    Operation::PlaceFile { from, to } => format!("Copy {} → {}", from, to),
    Operation::RegenerateIndex { dir } => format!("Regenerate index for {}", dir),
    Operation::RunBuild { target, command } => format!("Build {} ({})", target, command),
    Operation::RunValidation { target, command } => format!("Validate {} ({})", target, command),
  }
}
