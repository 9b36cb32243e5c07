//! Implementation of `dbforge create`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::builder::{BatchExecutor, BuildContext, CodeqlSettings};
use crate::core::build_info::{self, BuildInfoSet};
use crate::core::outcome::BatchReport;
use crate::core::registry::VersionRegistry;
use crate::util::context::GlobalContext;
use crate::util::fs::write_string;
use crate::util::process::{ProcessExecutor, SystemExecutor};
use crate::util::shell::{Shell, Status};

/// Options for the create command.
#[derive(Debug, Clone)]
pub struct CreateOptions {
    /// Global build-info table (required)
    pub build_info: PathBuf,

    /// Local override table (optional on disk)
    pub local_build_info: PathBuf,

    /// Version registry file
    pub versions: PathBuf,

    /// Databases are written to `<database_dir>/<project>`
    pub database_dir: PathBuf,

    /// Sources are read from `<sources_dir>/<project>`
    pub sources_dir: PathBuf,

    /// Database-creation tool settings
    pub codeql: CodeqlSettings,

    /// Only attempt this project
    pub project: Option<String>,

    /// Projects attempted concurrently
    pub jobs: usize,

    /// Write the batch report as JSON here
    pub report: Option<PathBuf>,
}

impl CreateOptions {
    /// Options from the merged configuration, with paths resolved against the
    /// working directory.
    pub fn from_context(gctx: &GlobalContext) -> Self {
        let config = gctx.config();
        let defaults = CodeqlSettings::default();

        CreateOptions {
            build_info: gctx.resolve(&config.build_info()),
            local_build_info: gctx.resolve(&config.local_build_info()),
            versions: gctx.resolve(&config.versions()),
            database_dir: gctx.resolve(&config.database_dir()),
            sources_dir: gctx.resolve(&config.sources_dir()),
            codeql: CodeqlSettings {
                program: gctx.resolve_program(
                    config.codeql.program.as_deref().unwrap_or(&defaults.program),
                ),
                language: config.codeql.language.clone().unwrap_or(defaults.language),
            },
            project: None,
            jobs: config.jobs(),
            report: None,
        }
    }
}

/// Load and merge the local and global build-info tables.
pub fn load_projects(options: &CreateOptions) -> Result<BuildInfoSet> {
    let projects = build_info::merge(&options.local_build_info, &options.build_info)
        .context("could not load build info")?;
    tracing::debug!(
        "{} eligible project(s) from {} and {}",
        projects.len(),
        options.local_build_info.display(),
        options.build_info.display()
    );
    Ok(projects)
}

/// Create databases with real processes.
pub fn create(options: &CreateOptions, shell: Arc<Shell>) -> Result<BatchReport> {
    create_with(options, shell, Arc::new(SystemExecutor))
}

/// Create databases, running processes through `executor`.
///
/// Only setup problems are errors: a missing registry or global build-info
/// table, or a report file that cannot be written. Per-project failures are
/// in the returned report.
pub fn create_with(
    options: &CreateOptions,
    shell: Arc<Shell>,
    executor: Arc<dyn ProcessExecutor>,
) -> Result<BatchReport> {
    let registry = VersionRegistry::load(&options.versions)?;
    shell.status(
        Status::Loading,
        format!(
            "{} toolchain(s) from {}",
            registry.len(),
            options.versions.display()
        ),
    );

    let projects = load_projects(options)?;
    shell.status(Status::Loading, format!("{} project(s)", projects.len()));

    let ctx = BuildContext::new(registry, &options.database_dir, &options.sources_dir)
        .with_codeql(options.codeql.clone())
        .with_executor(executor);

    let batch = BatchExecutor::new(&ctx)
        .jobs(options.jobs)
        .shell(Arc::clone(&shell));
    let report = match &options.project {
        Some(project) => batch.run_single(&projects, project),
        None => batch.run(&projects),
    };

    if let Some(path) = &options.report {
        write_string(path, &report.to_json_pretty())
            .with_context(|| format!("could not write report to {}", path.display()))?;
        tracing::info!("report written to {}", path.display());
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use tempfile::TempDir;

    use super::*;
    use crate::core::build_info::BuildInfoError;
    use crate::core::outcome::{BuildOutcome, FailureKind};
    use crate::core::registry::RegistryError;
    use crate::test_support::{write_build_info, MockExecutor, MockProcessOutput};

    fn options(dir: &Path) -> CreateOptions {
        std::fs::write(
            dir.join("dep_configs.json"),
            r#"{"jdks": {"8": "/opt/jdk-8", "17": "/opt/jdk-17"}, "mvn": {}, "gradle": {}}"#,
        )
        .unwrap();

        CreateOptions {
            build_info: dir.join("build_info.csv"),
            local_build_info: dir.join("build_info_local.csv"),
            versions: dir.join("dep_configs.json"),
            database_dir: dir.join("dbs"),
            sources_dir: dir.join("sources"),
            codeql: CodeqlSettings::default(),
            project: None,
            jobs: 1,
            report: None,
        }
    }

    fn quiet() -> Arc<Shell> {
        Arc::new(Shell::json())
    }

    #[test]
    fn test_missing_global_build_info_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let opts = options(tmp.path());
        let exec = Arc::new(MockExecutor::new());

        let err = create_with(&opts, quiet(), exec.clone()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildInfoError>(),
            Some(BuildInfoError::SourceMissing { .. })
        ));
        assert!(exec.calls().is_empty());
    }

    #[test]
    fn test_missing_registry_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let mut opts = options(tmp.path());
        opts.versions = tmp.path().join("nope.json");

        let err = create_with(&opts, quiet(), Arc::new(MockExecutor::new())).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RegistryError>(),
            Some(RegistryError::Missing { .. })
        ));
    }

    #[test]
    fn test_local_override_and_report() {
        let tmp = TempDir::new().unwrap();
        let mut opts = options(tmp.path());
        opts.report = Some(tmp.path().join("out").join("report.json"));

        write_build_info(
            tmp.path(),
            "build_info.csv",
            &[
                ("alpha", "success", "21", "n/a", "n/a"),
                ("beta", "success", "8", "n/a", "n/a"),
                ("gamma", "failed", "8", "n/a", "n/a"),
            ],
        );
        write_build_info(
            tmp.path(),
            "build_info_local.csv",
            &[("alpha", "success", "17", "n/a", "n/a")],
        );

        let exec = Arc::new(MockExecutor::new());
        exec.set_default(MockProcessOutput::success(""));

        let report = create_with(&opts, quiet(), exec.clone()).unwrap();
        let ids: Vec<_> = report.outcomes().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["alpha", "beta"]);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(exec.envs()[0]["JAVA_HOME"], "/opt/jdk-17");

        let written = std::fs::read_to_string(tmp.path().join("out").join("report.json")).unwrap();
        assert!(written.contains("\"project\": \"alpha\""));
        assert!(!written.contains("gamma"));
    }

    #[test]
    fn test_single_unknown_project() {
        let tmp = TempDir::new().unwrap();
        let mut opts = options(tmp.path());
        opts.project = Some("gamma".to_string());
        write_build_info(
            tmp.path(),
            "build_info.csv",
            &[
                ("alpha", "success", "17", "n/a", "n/a"),
                ("gamma", "failed", "8", "n/a", "n/a"),
            ],
        );

        let exec = Arc::new(MockExecutor::new());
        let report = create_with(&opts, quiet(), exec.clone()).unwrap();
        assert_eq!(
            report.outcome("gamma").and_then(BuildOutcome::kind),
            Some(FailureKind::ProjectNotFound)
        );
        assert!(exec.calls().is_empty());
    }

    #[test]
    fn test_options_from_context() {
        let tmp = TempDir::new().unwrap();
        let gctx = GlobalContext::with_cwd(tmp.path().to_path_buf())
            .with_config(crate::util::Config::default());

        let opts = CreateOptions::from_context(&gctx);
        assert_eq!(opts.build_info, tmp.path().join("data/build-info/build_info.csv"));
        assert_eq!(opts.versions, tmp.path().join("dep_configs.json"));
        assert_eq!(opts.codeql, CodeqlSettings::default());
        assert_eq!(opts.jobs, 1);
    }
}
