//! Job dependency graph
//!
//! - **Directed Graph**: `A → B` means "B waits for A"
//! - **Nodes**: jobs (`build:<target>`, `validate:<target>`, `publish`)
//! - **Waves**: jobs grouped by longest distance from a root; every job in a wave
//!   only depends on jobs of earlier waves, so a wave can run in parallel

use crate::core::config::BuildTarget;
use crate::core::error::{ShipError, ShipResult};
use petgraph::Direction;
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::collections::HashMap;

/// Name of the gate that opens when every build and validation succeeded
pub const PUBLISH_JOB: &str = "publish";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
  Build,
  Validate,
  Publish,
}

/// A job node
#[derive(Debug, Clone)]
pub struct JobNode {
  pub id: String,
  pub kind: JobKind,
  /// Target the job belongs to (None for the publish gate)
  pub target: Option<String>,
}

pub struct JobGraph {
  graph: DiGraph<JobNode, ()>,
  index: HashMap<String, NodeIndex>,
}

impl JobGraph {
  pub fn new() -> Self {
    Self {
      graph: DiGraph::new(),
      index: HashMap::new(),
    }
  }

  /// Standard pipeline: `build:<t> → validate:<t> → publish`, or
  /// `build:<t> → publish` for targets without validation
  pub fn for_targets(targets: &[BuildTarget]) -> ShipResult<Self> {
    let mut graph = Self::new();
    let publish = graph.add_job(PUBLISH_JOB, JobKind::Publish, None)?;

    for target in targets {
      let build = graph.add_job(&format!("build:{}", target.name), JobKind::Build, Some(&target.name))?;
      if target.validate.is_some() {
        let validate = graph.add_job(&format!("validate:{}", target.name), JobKind::Validate, Some(&target.name))?;
        graph.add_edge(build, validate);
        graph.add_edge(validate, publish);
      } else {
        graph.add_edge(build, publish);
      }
    }

    Ok(graph)
  }

  pub fn add_job(&mut self, id: &str, kind: JobKind, target: Option<&str>) -> ShipResult<NodeIndex> {
    if self.index.contains_key(id) {
      return Err(ShipError::message(format!("Duplicate job '{}'", id)));
    }
    let idx = self.graph.add_node(JobNode {
      id: id.to_string(),
      kind,
      target: target.map(str::to_string),
    });
    self.index.insert(id.to_string(), idx);
    Ok(idx)
  }

  /// `to` waits for `from`
  pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex) {
    self.graph.add_edge(from, to, ());
  }

  pub fn node(&self, idx: NodeIndex) -> &JobNode {
    &self.graph[idx]
  }

  /// Jobs that must finish before `idx` starts
  pub fn dependencies(&self, idx: NodeIndex) -> Vec<NodeIndex> {
    self.graph.neighbors_directed(idx, Direction::Incoming).collect()
  }

  pub fn len(&self) -> usize {
    self.graph.node_count()
  }

  /// Group jobs into waves of mutually independent jobs
  ///
  /// # Errors
  /// Returns error if the job graph contains a cycle.
  pub fn waves(&self) -> ShipResult<Vec<Vec<NodeIndex>>> {
    let topo = algo::toposort(&self.graph, None).map_err(|cycle| {
      let node = &self.graph[cycle.node_id()];
      ShipError::message(format!("Job cycle detected involving '{}'", node.id))
    })?;

    let mut level: HashMap<NodeIndex, usize> = HashMap::new();
    for idx in &topo {
      let depth = self
        .dependencies(*idx)
        .iter()
        .filter_map(|dep| level.get(dep))
        .map(|l| l + 1)
        .max()
        .unwrap_or(0);
      level.insert(*idx, depth);
    }

    let depth = level.values().copied().max().map_or(0, |d| d + 1);
    let mut waves: Vec<Vec<NodeIndex>> = vec![Vec::new(); depth];
    for idx in topo {
      waves[level[&idx]].push(idx);
    }
    for wave in &mut waves {
      wave.sort_by(|a, b| self.graph[*a].id.cmp(&self.graph[*b].id));
    }
    Ok(waves)
  }
}

impl Default for JobGraph {
  fn default() -> Self {
    Self::new()
  }
}
