//! dbforge - batch CodeQL database creation for Java projects
//!
//! This crate merges per-project build metadata, resolves the JDK and build
//! tools each project needs from a version registry, and runs the database
//! creation tool once per project in an isolated environment.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities and mocks for dbforge unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a mock process executor and on-disk fixtures.
#[cfg(test)]
pub mod test_support;

pub use builder::{BatchExecutor, BuildContext};
pub use core::{
    BatchReport, BuildInfoRecord, BuildInfoSet, BuildOutcome, FailureKind, ToolCategory,
    VersionRegistry,
};
pub use util::context::GlobalContext;
