//! Core engine for pkgship operations
//!
//! - **config**: pkgship.toml parsing and validation
//! - **context**: the immutable per-run `ReleaseContext`
//! - **error**: error types with exit codes and contextual help
//! - **lock**: concurrency-group lease (newest run wins)
//! - **plan**: content-addressed operation plans for dry-run and resumption

pub mod config;
pub mod context;
pub mod error;
pub mod lock;
pub mod plan;
