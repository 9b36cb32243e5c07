//! Database creation.
//!
//! This module resolves per-project toolchain environments and drives the
//! external database-creation tool over a batch of projects.

pub mod context;
pub mod database;
pub mod environment;
pub mod events;
pub mod executor;

pub use context::{BuildContext, CodeqlSettings};
pub use database::DatabaseBuilder;
pub use environment::{resolve, Environment, EnvironmentError, ResolvedEnvironment};
pub use events::BuildEvent;
pub use executor::BatchExecutor;
