//! Dependent build dispatch
//!
//! Every configured target becomes a build job, optionally followed by a
//! validation job; a single publish gate waits for all of them.
//!
//! ```text
//! build:rpm-el8 ──▶ validate:rpm-el8 ──┐
//!                                       ├──▶ publish
//! build:deb-ubuntu ─────────────────────┘
//! ```

pub mod dispatcher;
pub mod executor;
pub mod graph;

pub use dispatcher::{DispatchReport, Dispatcher, JobStatus};
pub use executor::ShellExecutor;
