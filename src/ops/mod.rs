//! High-level operations.
//!
//! This module contains the implementation of dbforge commands.

pub mod create;
pub mod toolchain;

pub use create::{create, create_with, load_projects, CreateOptions};
pub use toolchain::{
    check_toolchains, format_registry, format_report, InstallCheck, ToolchainReport,
};
