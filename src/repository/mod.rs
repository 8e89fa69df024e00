//! Static package repository
//!
//! ```text
//! <root>/
//!   el8/8/1.4.0/            one leaf per (distro, distro_version, version)
//!     pkg-1.4.0-2.el8.x86_64.rpm
//!     index.json
//!     SHA256SUMS
//!   ubuntu/24.04/1.4.0/
//! ```
//!
//! A publish replaces the leaves it targets (never merges) and then rebuilds the
//! index of every leaf in the tree, so indexes always match what is on disk.

pub mod index;
pub mod publisher;

pub use publisher::{PublishReport, RepositoryPublisher};
