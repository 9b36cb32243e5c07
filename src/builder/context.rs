//! Build context - registry, base environment, output layout.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::builder::environment::Environment;
use crate::core::registry::VersionRegistry;
use crate::util::fs::absolute;
use crate::util::process::{ProcessExecutor, SystemExecutor};

/// Default CodeQL language selector.
pub const DEFAULT_LANGUAGE: &str = "java";

/// How to invoke the database-creation tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeqlSettings {
    /// Program name or path (`codeql` is looked up on the project's PATH)
    pub program: PathBuf,
    /// Value passed to `--language`
    pub language: String,
}

impl Default for CodeqlSettings {
    fn default() -> Self {
        CodeqlSettings {
            program: PathBuf::from("codeql"),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

/// Everything a project attempt reads. Shared read-only across attempts.
#[derive(Clone)]
pub struct BuildContext {
    /// Installed toolchains
    pub registry: Arc<VersionRegistry>,

    /// Ambient environment captured at startup
    pub base_env: Arc<Environment>,

    /// Process runner
    pub executor: Arc<dyn ProcessExecutor>,

    /// Databases are created at `<database_root>/<project>`
    pub database_root: PathBuf,

    /// Sources are read from `<sources_root>/<project>`
    pub sources_root: PathBuf,

    /// Database-creation tool settings
    pub codeql: CodeqlSettings,
}

impl fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildContext")
            .field("registry", &self.registry)
            .field("database_root", &self.database_root)
            .field("sources_root", &self.sources_root)
            .field("codeql", &self.codeql)
            .finish_non_exhaustive()
    }
}

impl BuildContext {
    /// Create a context that runs real processes in the current environment.
    ///
    /// Both roots are made absolute against the current directory.
    pub fn new(registry: VersionRegistry, database_root: &Path, sources_root: &Path) -> Self {
        BuildContext {
            registry: Arc::new(registry),
            base_env: Arc::new(Environment::capture()),
            executor: Arc::new(SystemExecutor),
            database_root: absolute(database_root),
            sources_root: absolute(sources_root),
            codeql: CodeqlSettings::default(),
        }
    }

    /// Replace the process runner.
    pub fn with_executor(mut self, executor: Arc<dyn ProcessExecutor>) -> Self {
        self.executor = executor;
        self
    }

    /// Replace the base environment.
    pub fn with_base_env(mut self, env: Environment) -> Self {
        self.base_env = Arc::new(env);
        self
    }

    pub fn with_codeql(mut self, codeql: CodeqlSettings) -> Self {
        self.codeql = codeql;
        self
    }

    /// Where the database for `project` is written.
    pub fn database_path(&self, project: &str) -> PathBuf {
        self.database_root.join(project)
    }

    /// Where the sources of `project` live.
    pub fn source_path(&self, project: &str) -> PathBuf {
        self.sources_root.join(project)
    }
}
