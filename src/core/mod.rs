//! Core data structures for dbforge.
//!
//! - The installed toolchain registry
//! - Build-info records and the local/global merge
//! - Per-project outcomes

pub mod build_info;
pub mod outcome;
pub mod registry;

pub use build_info::{
    merge, BuildInfoError, BuildInfoRecord, BuildInfoSet, RecordOrigin, StatusCell,
};
pub use outcome::{BatchReport, BuildOutcome, Failure, FailureKind, ProjectReport};
pub use registry::{RegistryError, ToolCategory, VersionRegistry};
