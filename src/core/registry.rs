//! Installed toolchain registry.
//!
//! The registry maps a toolchain category and a version string to the
//! installation root of that toolchain. It is read once at startup from a
//! JSON or TOML file and then passed down by reference; nothing mutates it
//! afterwards.
//!
//! ```json
//! {
//!   "jdks":   { "17": "/opt/jdk-17", "1.8": "/opt/jdk8u392" },
//!   "mvn":    { "3.9.6": "/opt/apache-maven-3.9.6" },
//!   "gradle": { "7.6": "/opt/gradle-7.6" }
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A class of build tool for which several versions may be installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCategory {
    Jdk,
    Maven,
    Gradle,
}

impl ToolCategory {
    pub const ALL: [ToolCategory; 3] = [ToolCategory::Jdk, ToolCategory::Maven, ToolCategory::Gradle];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolCategory::Jdk => "jdk",
            ToolCategory::Maven => "mvn",
            ToolCategory::Gradle => "gradle",
        }
    }

    /// The launcher expected under `<root>/bin` for this category.
    pub fn launcher(&self) -> &'static str {
        match self {
            ToolCategory::Jdk => "java",
            ToolCategory::Maven => "mvn",
            ToolCategory::Gradle => "gradle",
        }
    }

    /// Human-readable name used in diagnostics.
    pub fn display_name(&self) -> &'static str {
        match self {
            ToolCategory::Jdk => "JDK",
            ToolCategory::Maven => "Maven",
            ToolCategory::Gradle => "Gradle",
        }
    }
}

impl fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while loading the registry file.
#[derive(Debug, Error, Diagnostic)]
pub enum RegistryError {
    #[error("version registry not found: {}", path.display())]
    #[diagnostic(
        code(dbforge::registry::missing),
        help("Point `paths.versions` in .dbforge/config.toml (or --versions) at your dep_configs.json")
    )]
    Missing { path: PathBuf },

    #[error("failed to read version registry: {}", path.display())]
    #[diagnostic(code(dbforge::registry::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse version registry {}: {message}", path.display())]
    #[diagnostic(
        code(dbforge::registry::parse),
        help("Expected tables `jdks`, `mvn` and `gradle` mapping version strings to install paths")
    )]
    Parse { path: PathBuf, message: String },
}

/// On-disk shape of the registry file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RegistryFile {
    #[serde(alias = "jdk")]
    jdks: BTreeMap<String, PathBuf>,
    #[serde(alias = "maven")]
    mvn: BTreeMap<String, PathBuf>,
    gradle: BTreeMap<String, PathBuf>,
}

/// Read-only table of installed toolchains.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionRegistry {
    jdks: BTreeMap<String, PathBuf>,
    maven: BTreeMap<String, PathBuf>,
    gradle: BTreeMap<String, PathBuf>,
}

impl VersionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        VersionRegistry::default()
    }

    /// Register an installation. Only used while constructing the registry.
    pub fn with_entry(
        mut self,
        category: ToolCategory,
        version: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        self.table_mut(category).insert(version.into(), path.into());
        self
    }

    /// Load the registry from a JSON or TOML file.
    ///
    /// Files ending in `.toml` are parsed as TOML; everything else as JSON.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        if !path.exists() {
            return Err(RegistryError::Missing {
                path: path.to_path_buf(),
            });
        }

        let contents = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_toml = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("toml"))
            .unwrap_or(false);

        let file: RegistryFile = if is_toml {
            toml::from_str(&contents).map_err(|e| RegistryError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        } else {
            serde_json::from_str(&contents).map_err(|e| RegistryError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        };

        let registry = VersionRegistry {
            jdks: file.jdks,
            maven: file.mvn,
            gradle: file.gradle,
        };

        tracing::debug!(
            "loaded version registry from {}: {} jdk, {} mvn, {} gradle",
            path.display(),
            registry.jdks.len(),
            registry.maven.len(),
            registry.gradle.len()
        );

        Ok(registry)
    }

    /// Look up the install root of `version` in `category`.
    ///
    /// A miss is an ordinary outcome; the caller decides whether it is fatal.
    pub fn resolve(&self, category: ToolCategory, version: &str) -> Option<&Path> {
        self.table(category).get(version).map(PathBuf::as_path)
    }

    /// Registered versions of a category, sorted by version string.
    pub fn versions(&self, category: ToolCategory) -> impl Iterator<Item = (&str, &Path)> {
        self.table(category)
            .iter()
            .map(|(v, p)| (v.as_str(), p.as_path()))
    }

    /// Total number of registered installations.
    pub fn len(&self) -> usize {
        self.jdks.len() + self.maven.len() + self.gradle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn table(&self, category: ToolCategory) -> &BTreeMap<String, PathBuf> {
        match category {
            ToolCategory::Jdk => &self.jdks,
            ToolCategory::Maven => &self.maven,
            ToolCategory::Gradle => &self.gradle,
        }
    }

    fn table_mut(&mut self, category: ToolCategory) -> &mut BTreeMap<String, PathBuf> {
        match category {
            ToolCategory::Jdk => &mut self.jdks,
            ToolCategory::Maven => &mut self.maven,
            ToolCategory::Gradle => &mut self.gradle,
        }
    }
}
