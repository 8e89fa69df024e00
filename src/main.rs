mod checks;
mod commands;
mod core;
mod dispatch;
mod release;
mod remote;
mod repository;
mod sync;
mod ui;
mod utils;

use clap::{Parser, Subcommand};
use core::error::{ShipError, print_error};
use std::path::PathBuf;
use sync::SyncMode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding a tracing filter (overrides -v)
const LOG_ENV: &str = "PKGSHIP_LOG";

/// Build, validate and publish Linux packages for a release
#[derive(Parser)]
#[command(name = "pkgship")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Increase log verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, action = clap::ArgAction::Count, global = true)]
  verbose: u8,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  // ============================================================================
  // Release identity
  // ============================================================================
  /// Resolve the version, release number and tag for this run
  Resolve {
    /// Release tag (default: release event tag, else the latest release)
    #[arg(long)]
    tag: Option<String>,
    /// Override the release remote (owner/repo or a local path)
    #[arg(long)]
    remote: Option<String>,
    /// Output the resolution in JSON format
    #[arg(long)]
    json: bool,
    /// Append version=, release=, tag= lines to this file
    #[arg(long, env = "GITHUB_OUTPUT")]
    github_output: Option<PathBuf>,
  },

  // ============================================================================
  // Pipeline stages
  // ============================================================================
  /// Run build and validation jobs (no publishing)
  Build {
    /// Release tag (default: release event tag, else the latest release)
    #[arg(long)]
    tag: Option<String>,
    /// Override the release remote (owner/repo or a local path)
    #[arg(long)]
    remote: Option<String>,
    /// Only build these targets (repeatable)
    #[arg(long = "target")]
    targets: Vec<String>,
    /// Show the job plan without running anything
    #[arg(long)]
    dry_run: bool,
    /// Output the plan or report in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Reconcile a release's attached assets with the given files
  Sync {
    /// Files to attach
    files: Vec<PathBuf>,
    /// Release tag (default: release event tag, else the latest release)
    #[arg(long)]
    tag: Option<String>,
    /// Override the release remote (owner/repo or a local path)
    #[arg(long)]
    remote: Option<String>,
    /// append (upload only) or replace (delete everything, then upload)
    #[arg(long, value_enum)]
    mode: Option<SyncMode>,
    /// Actually synchronize (default: dry-run mode showing plan)
    #[arg(long)]
    apply: bool,
    /// Output the plan or report in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Package repository tree operations
  #[command(subcommand)]
  Repo(RepoCommands),

  // ============================================================================
  // End to end
  // ============================================================================
  /// Resolve, build, validate, synchronize and publish in one run
  Release {
    /// Release tag (default: release event tag, else the latest release)
    #[arg(long)]
    tag: Option<String>,
    /// Override the release remote (owner/repo or a local path)
    #[arg(long)]
    remote: Option<String>,
    /// Override the synchronization mode
    #[arg(long, value_enum)]
    mode: Option<SyncMode>,
    /// Skip publishing into the package repository tree
    #[arg(long)]
    skip_repo: bool,
    /// Actually release (default: dry-run mode showing plan)
    #[arg(long)]
    apply: bool,
    /// Output the plan or outcome in JSON format
    #[arg(long)]
    json: bool,
  },

  // ============================================================================
  // Inspection
  // ============================================================================
  /// Run health checks and diagnostics
  Doctor {
    /// Run thorough checks (includes remote access)
    #[arg(long)]
    thorough: bool,
    /// Output results in JSON format
    #[arg(long)]
    json: bool,
  },
}

#[derive(Subcommand)]
enum RepoCommands {
  /// Place packages into {distro}/{distro_version}/{version} and reindex
  Publish {
    /// Package files
    files: Vec<PathBuf>,
    /// Distribution, when the file names do not carry it
    #[arg(long)]
    distro: Option<String>,
    /// Distribution version, when the file names do not carry it
    #[arg(long)]
    distro_version: Option<String>,
    /// Actually publish (default: dry-run mode showing plan)
    #[arg(long)]
    apply: bool,
    /// Output the plan or report in JSON format
    #[arg(long)]
    json: bool,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

/// Logs go to stderr; stdout is reserved for command output
fn init_tracing(verbose: u8) {
  let default = match verbose {
    0 => "warn",
    1 => "info",
    2 => "debug",
    _ => "trace",
  };
  let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

  tracing_subscriber::registry()
    .with(filter)
    .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let result = match cli.command {
    Commands::Resolve {
      tag,
      remote,
      json,
      github_output,
    } => commands::run_resolve(tag, remote, json, github_output),

    Commands::Build {
      tag,
      remote,
      targets,
      dry_run,
      json,
    } => commands::run_build(tag, remote, targets, dry_run, json),
    Commands::Sync {
      files,
      tag,
      remote,
      mode,
      apply,
      json,
    } => commands::run_sync(files, tag, remote, mode, apply, json),
    Commands::Repo(repo_cmd) => match repo_cmd {
      RepoCommands::Publish {
        files,
        distro,
        distro_version,
        apply,
        json,
      } => commands::run_repo_publish(files, distro, distro_version, apply, json),
    },

    Commands::Release {
      tag,
      remote,
      mode,
      skip_repo,
      apply,
      json,
    } => commands::run_release(tag, remote, mode, skip_repo, apply, json),

    Commands::Doctor { thorough, json } => commands::run_doctor(thorough, json),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: ShipError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
