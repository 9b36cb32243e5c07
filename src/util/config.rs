//! Configuration file support for dbforge.
//!
//! dbforge supports two configuration file locations:
//! - Global: `~/.dbforge/config.toml` - User-wide defaults
//! - Project: `.dbforge/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config, field by field.
//! Command-line flags take precedence over both.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default global build-info table.
pub const DEFAULT_BUILD_INFO: &str = "data/build-info/build_info.csv";
/// Default local override table.
pub const DEFAULT_LOCAL_BUILD_INFO: &str = "data/build-info/build_info_local.csv";
/// Default version registry.
pub const DEFAULT_VERSIONS: &str = "dep_configs.json";
/// Default database output root.
pub const DEFAULT_DATABASE_DIR: &str = "data/codeql-dbs";
/// Default project sources root.
pub const DEFAULT_SOURCES_DIR: &str = "data/project-sources";

/// Errors reading a config file.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    #[diagnostic(code(dbforge::config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    #[diagnostic(
        code(dbforge::config::parse),
        help("Sections are [paths], [codeql] and [build]")
    )]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// dbforge configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input and output locations
    pub paths: PathsConfig,

    /// Database-creation tool settings
    pub codeql: CodeqlConfig,

    /// Batch settings
    pub build: BuildConfig,
}

/// Input and output locations. Unset fields fall back to the defaults above.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub build_info: Option<PathBuf>,
    pub local_build_info: Option<PathBuf>,
    pub versions: Option<PathBuf>,
    pub database_dir: Option<PathBuf>,
    pub sources_dir: Option<PathBuf>,
}

/// Database-creation tool settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeqlConfig {
    /// Program name or path (e.g. /opt/codeql/codeql)
    pub program: Option<PathBuf>,

    /// Language passed to `--language`
    pub language: Option<String>,
}

/// Batch settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Projects attempted concurrently (None = 1)
    pub jobs: Option<usize>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("{}", e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        // Paths
        if other.paths.build_info.is_some() {
            self.paths.build_info = other.paths.build_info;
        }
        if other.paths.local_build_info.is_some() {
            self.paths.local_build_info = other.paths.local_build_info;
        }
        if other.paths.versions.is_some() {
            self.paths.versions = other.paths.versions;
        }
        if other.paths.database_dir.is_some() {
            self.paths.database_dir = other.paths.database_dir;
        }
        if other.paths.sources_dir.is_some() {
            self.paths.sources_dir = other.paths.sources_dir;
        }

        // CodeQL
        if other.codeql.program.is_some() {
            self.codeql.program = other.codeql.program;
        }
        if other.codeql.language.is_some() {
            self.codeql.language = other.codeql.language;
        }

        // Build
        if other.build.jobs.is_some() {
            self.build.jobs = other.build.jobs;
        }
    }

    pub fn build_info(&self) -> PathBuf {
        self.paths
            .build_info
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BUILD_INFO))
    }

    pub fn local_build_info(&self) -> PathBuf {
        self.paths
            .local_build_info
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOCAL_BUILD_INFO))
    }

    pub fn versions(&self) -> PathBuf {
        self.paths
            .versions
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_VERSIONS))
    }

    pub fn database_dir(&self) -> PathBuf {
        self.paths
            .database_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_DIR))
    }

    pub fn sources_dir(&self) -> PathBuf {
        self.paths
            .sources_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCES_DIR))
    }

    /// Configured job count, at least 1.
    pub fn jobs(&self) -> usize {
        self.build.jobs.unwrap_or(1).max(1)
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.dbforge/config.toml)
/// 2. Global config (~/.dbforge/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        if global_path.exists() {
            tracing::debug!("loading global config from {}", global_path.display());
            config.merge(Config::load_or_default(global_path));
        }
    }

    if project_path.exists() {
        tracing::debug!("loading project config from {}", project_path.display());
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global dbforge config directory (~/.dbforge).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".dbforge"))
}

/// Get the project config path (.dbforge/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".dbforge").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.build_info(), PathBuf::from(DEFAULT_BUILD_INFO));
        assert_eq!(config.versions(), PathBuf::from("dep_configs.json"));
        assert_eq!(config.database_dir(), PathBuf::from("data/codeql-dbs"));
        assert_eq!(config.jobs(), 1);
        assert!(config.codeql.program.is_none());
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");

        std::fs::write(
            &config_path,
            r#"
[paths]
build_info = "tables/build_info.csv"
database_dir = "/srv/dbs"

[codeql]
program = "/opt/codeql/codeql"

[build]
jobs = 4
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.build_info(), PathBuf::from("tables/build_info.csv"));
        assert_eq!(config.database_dir(), PathBuf::from("/srv/dbs"));
        assert_eq!(config.sources_dir(), PathBuf::from(DEFAULT_SOURCES_DIR));
        assert_eq!(config.codeql.program, Some(PathBuf::from("/opt/codeql/codeql")));
        assert_eq!(config.jobs(), 4);
    }

    #[test]
    fn test_config_parse_error() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");
        std::fs::write(&config_path, "[build]\njobs = \"many\"\n").unwrap();

        let err = Config::load(&config_path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert_eq!(Config::load_or_default(&config_path), Config::default());
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        base.paths.versions = Some(PathBuf::from("global.json"));
        base.build.jobs = Some(4);

        let mut override_cfg = Config::default();
        override_cfg.paths.versions = Some(PathBuf::from("project.json"));

        base.merge(override_cfg);

        assert_eq!(base.versions(), PathBuf::from("project.json"));
        assert_eq!(base.jobs(), 4); // Not overridden
    }

    #[test]
    fn test_load_config_precedence() {
        let tmp = TempDir::new().unwrap();
        let global_path = tmp.path().join("global.toml");
        let project_path = tmp.path().join("project.toml");

        std::fs::write(
            &global_path,
            "[codeql]\nprogram = \"/usr/local/bin/codeql\"\nlanguage = \"java\"\n",
        )
        .unwrap();
        std::fs::write(&project_path, "[codeql]\nlanguage = \"java-kotlin\"\n").unwrap();

        let config = load_config(Some(&global_path), &project_path);
        assert_eq!(config.codeql.program, Some(PathBuf::from("/usr/local/bin/codeql")));
        assert_eq!(config.codeql.language.as_deref(), Some("java-kotlin"));
    }

    #[test]
    fn test_load_config_missing_files() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(None, &project_config_path(tmp.path()));
        assert_eq!(config, Config::default());
    }
}
