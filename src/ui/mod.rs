//! Terminal and CI presentation

pub mod progress;
pub mod summary;
