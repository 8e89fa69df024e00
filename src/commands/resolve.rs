//! Resolve the release tuple for this run

use super::Workspace;
use super::sync::print_json;
use crate::core::context::ReleaseContext;
use crate::core::error::ShipResult;
use crate::release::resolver::ResolutionSource;
use crate::release::{RunContext, resolve};
use std::path::PathBuf;

/// Run the resolve command
///
/// Prints the resolved (version, release, tag) and optionally appends them to a
/// GitHub Actions output file for later jobs.
pub fn run_resolve(
  tag: Option<String>,
  remote: Option<String>,
  json: bool,
  github_output: Option<PathBuf>,
) -> ShipResult<()> {
  let workspace = Workspace::load()?;
  let backend = workspace.backend(remote.as_deref())?;

  let run = RunContext::detect(tag.as_deref())?;
  let resolution = resolve(&run, backend.as_ref())?;
  let ctx = ReleaseContext::new(resolution.clone(), &workspace.config, &workspace.root);

  if let Some(path) = &github_output {
    ctx.append_github_output(path)?;
  }

  if json {
    print_json(&resolution)?;
    return Ok(());
  }

  println!("🔎 Resolved release for {}", ctx.package);
  println!("   Version: {}", ctx.version);
  println!("   Release: {}", ctx.release);
  println!("   Tag:     {}", ctx.tag);
  println!(
    "   Source:  {}",
    match &resolution.source {
      ResolutionSource::EventTag => "release event tag".to_string(),
      ResolutionSource::EmptyRelease => "latest release (no assets attached)".to_string(),
      ResolutionSource::Asset { name } => format!("asset {}", name),
      ResolutionSource::NoMatchingAsset => "latest release tag (no asset carried a version)".to_string(),
    }
  );
  if let Some(path) = &github_output {
    println!("   📝 Outputs appended to {}", path.display());
  }

  Ok(())
}
