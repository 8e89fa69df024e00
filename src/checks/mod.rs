//! Health checks run by `pkgship doctor`
//!
//! # Built-in Checks
//!
//! - **config-validity**: pkgship.toml loads, validates, and its globs parse
//! - **state-dir**: the state directory is writable
//! - **pending-sync**: intent logs left by interrupted synchronizations
//! - **release-tool**: `gh` is installed (GitHub remotes) or the local store exists
//! - **remote-access**: the latest release can be read (thorough only)

mod config;
mod remote;
mod runner;
mod state;
mod trait_def;

pub use runner::create_default_runner;
pub use trait_def::{CheckContext, Severity};
