//! Global context for dbforge operations.
//!
//! Provides centralized access to the working directory and the merged
//! configuration (`~/.dbforge/config.toml` under `.dbforge/config.toml`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::util::config::{self, Config};
use crate::util::fs::resolve_against;

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Merged global + project configuration
    config: Config,
}

impl GlobalContext {
    /// Create a context for the current directory, loading config files.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a context rooted at `cwd`, loading config files.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        let global = config::global_config_dir().map(|h| h.join("config.toml"));
        let config = config::load_config(global.as_deref(), &config::project_config_path(&cwd));

        GlobalContext { cwd, config }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolve a possibly relative path against the working directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        resolve_against(&self.cwd, path)
    }

    /// Resolve a program path. Bare names are left for PATH lookup.
    pub fn resolve_program(&self, program: &Path) -> PathBuf {
        if program.components().count() > 1 {
            self.resolve(program)
        } else {
            program.to_path_buf()
        }
    }

    /// Pick the CLI value if given, the config value otherwise, and resolve it.
    pub fn resolve_or(&self, flag: Option<&Path>, configured: PathBuf) -> PathBuf {
        match flag {
            Some(path) => self.resolve(path),
            None => self.resolve(&configured),
        }
    }
}
