//! Per-project process environments.
//!
//! Every project attempt gets its own copy of the ambient environment with
//! the project's JDK and build tools placed first on `PATH`. The base
//! environment is captured once and only ever read.

use std::collections::BTreeMap;
use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

use crate::core::build_info::BuildInfoRecord;
use crate::core::registry::{ToolCategory, VersionRegistry};

/// Name of the search path variable.
pub const PATH_VAR: &str = "PATH";

/// Variable pointing at the selected JDK.
pub const JAVA_HOME_VAR: &str = "JAVA_HOME";

/// A snapshot of environment variables.
///
/// Names and values are kept as `OsString` so bytes that are not valid
/// UTF-8 reach child processes unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<OsString, OsString>,
}

impl Environment {
    /// An empty environment.
    pub fn new() -> Self {
        Environment::default()
    }

    /// Capture the current process environment.
    pub fn capture() -> Self {
        Environment {
            vars: env::vars_os().collect(),
        }
    }

    pub fn get(&self, key: impl AsRef<OsStr>) -> Option<&OsStr> {
        self.vars.get(key.as_ref()).map(OsString::as_os_str)
    }

    pub fn set(&mut self, key: impl Into<OsString>, value: impl Into<OsString>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn with_var(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.set(key, value);
        self
    }

    /// Put `dir` in front of every existing `PATH` entry.
    pub fn prepend_path(&mut self, dir: &Path) {
        let existing = self.get(PATH_VAR).filter(|p| !p.is_empty());
        let joined = match existing {
            None => dir.as_os_str().to_owned(),
            Some(existing) => env::join_paths(
                std::iter::once(dir.to_path_buf()).chain(env::split_paths(existing)),
            )
            .unwrap_or_else(|_| {
                // `dir` itself holds a separator; keep the old entries byte for byte
                let mut path = dir.as_os_str().to_owned();
                path.push(if cfg!(windows) { ";" } else { ":" });
                path.push(existing);
                path
            }),
        };
        self.set(PATH_VAR, joined);
    }

    /// `PATH` split into its non-empty entries.
    pub fn path_entries(&self) -> Vec<PathBuf> {
        self.get(PATH_VAR)
            .map(|p| {
                env::split_paths(p)
                    .filter(|e| !e.as_os_str().is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.vars.iter().map(|(k, v)| (k.as_os_str(), v.as_os_str()))
    }
}

/// Errors that prevent a project from being attempted at all.
#[derive(Debug, Clone, Error, Diagnostic, PartialEq, Eq)]
pub enum EnvironmentError {
    #[error("project `{project}` declares no JDK version")]
    #[diagnostic(
        code(dbforge::env::jdk_undeclared),
        help("Fill in the `jdk_version` column for this project")
    )]
    JdkNotDeclared { project: String },

    #[error("Java version {version} not found in available installations")]
    #[diagnostic(
        code(dbforge::env::jdk_not_registered),
        help("Add the JDK {version} install root under `jdks` in the version registry")
    )]
    JdkNotRegistered { project: String, version: String },
}

/// A build tool version that was declared but is not installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftMiss {
    pub category: ToolCategory,
    pub version: String,
}

impl std::fmt::Display for SoftMiss {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} is not installed, using the default on PATH",
            self.category.display_name(),
            self.version
        )
    }
}

/// The environment one project attempt runs in.
#[derive(Debug, Clone)]
pub struct ResolvedEnvironment {
    env: Environment,
    java_home: PathBuf,
    misses: Vec<SoftMiss>,
}

impl ResolvedEnvironment {
    /// The full variable set for child processes.
    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Install root of the selected JDK.
    pub fn java_home(&self) -> &Path {
        &self.java_home
    }

    /// Declared build tool versions missing from the registry.
    pub fn misses(&self) -> &[SoftMiss] {
        &self.misses
    }
}

/// Derive a project's environment from `base`.
///
/// Maven and Gradle entries are optional: an undeclared version leaves the
/// ambient tool in place, and a declared but unregistered version is only
/// recorded as a soft miss. The JDK must resolve. Its `bin` directory ends
/// up ahead of the build tool entries so `java` resolves to it.
pub fn resolve(
    record: &BuildInfoRecord,
    base: &Environment,
    registry: &VersionRegistry,
) -> Result<ResolvedEnvironment, EnvironmentError> {
    let project = &record.project_slug;

    // Look the JDK up first so a failure never builds a partial copy
    let jdk_version = record
        .declared_version(ToolCategory::Jdk)
        .ok_or_else(|| EnvironmentError::JdkNotDeclared {
            project: project.clone(),
        })?;
    let java_home = registry
        .resolve(ToolCategory::Jdk, jdk_version)
        .ok_or_else(|| EnvironmentError::JdkNotRegistered {
            project: project.clone(),
            version: jdk_version.to_string(),
        })?
        .to_path_buf();

    let mut env = base.clone();
    let mut misses = Vec::new();

    for category in [ToolCategory::Maven, ToolCategory::Gradle] {
        let Some(version) = record.declared_version(category) else {
            continue;
        };

        match registry.resolve(category, version) {
            Some(root) => {
                env.prepend_path(&root.join("bin"));
                tracing::debug!(
                    "{}: {} {} at {}",
                    project,
                    category.display_name(),
                    version,
                    root.display()
                );
            }
            None => {
                tracing::debug!(
                    "{}: {} {} is not installed, falling back to the default on PATH",
                    project,
                    category.display_name(),
                    version
                );
                misses.push(SoftMiss {
                    category,
                    version: version.to_string(),
                });
            }
        }
    }

    env.set(JAVA_HOME_VAR, java_home.as_os_str());
    env.prepend_path(&java_home.join("bin"));
    tracing::debug!("{}: JAVA_HOME set to {}", project, java_home.display());

    Ok(ResolvedEnvironment {
        env,
        java_home,
        misses,
    })
}
