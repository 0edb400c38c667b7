//! The change execution engine.
//!
//! [`executor::ChangeExecutor`] turns an approved idea plus a set of file
//! changes into a branch and pull request on the remote repository.

pub mod executor;

pub use executor::{ChangeExecutor, ExecutionOutcome};
