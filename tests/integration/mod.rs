//! Integration tests driving the compiled pkgship binary

mod helpers;
mod test_release;
mod test_repo;
mod test_resolve;
mod test_sync;
