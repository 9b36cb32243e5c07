//! Single-project database creation.
//!
//! One attempt is: resolve the environment, check that `java` runs in it,
//! prepare the output directory, run `codeql database create`. Every error
//! along the way becomes a [`BuildOutcome`]; nothing propagates. Declared
//! Maven or Gradle versions that are not installed come back as warnings
//! next to the outcome.

use std::path::Path;

use miette::Diagnostic as _;

use crate::builder::context::BuildContext;
use crate::builder::environment::{resolve, ResolvedEnvironment};
use crate::core::build_info::BuildInfoRecord;
use crate::core::outcome::{BuildOutcome, Failure, FailureKind};
use crate::util::fs::ensure_dir;
use crate::util::process::ProcessBuilder;

/// What one attempt produced.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub outcome: BuildOutcome,
    pub warnings: Vec<String>,
}

/// Runs one project attempt against a shared [`BuildContext`].
pub struct DatabaseBuilder<'a> {
    ctx: &'a BuildContext,
}

impl<'a> DatabaseBuilder<'a> {
    pub fn new(ctx: &'a BuildContext) -> Self {
        DatabaseBuilder { ctx }
    }

    /// Build the database for one project.
    pub fn build(&self, record: &BuildInfoRecord) -> Attempt {
        let mut warnings = Vec::new();
        let outcome = match self.try_build(record, &mut warnings) {
            Ok(()) => BuildOutcome::Success,
            Err(failure) => BuildOutcome::Failed(failure),
        };
        Attempt { outcome, warnings }
    }

    fn try_build(
        &self,
        record: &BuildInfoRecord,
        warnings: &mut Vec<String>,
    ) -> Result<(), Failure> {
        let project = record.project_slug.as_str();

        let env = resolve(record, &self.ctx.base_env, &self.ctx.registry).map_err(|e| {
            let failure = Failure::new(FailureKind::ToolchainNotFound, e.to_string());
            match e.help() {
                Some(help) => failure.with_help(help.to_string()),
                None => failure,
            }
        })?;
        warnings.extend(env.misses().iter().map(ToString::to_string));

        self.verify_toolchain(project, &env)?;

        let database_path = self.ctx.database_path(project);
        let source_path = self.ctx.source_path(project);

        if let Some(parent) = database_path.parent() {
            ensure_dir(parent)
                .map_err(|e| Failure::new(FailureKind::FilesystemError, format!("{:#}", e)))?;
        }

        self.create_database(project, &env, &database_path, &source_path)
    }

    /// Run `java -version` in the resolved environment.
    fn verify_toolchain(&self, project: &str, env: &ResolvedEnvironment) -> Result<(), Failure> {
        let check = ProcessBuilder::new("java")
            .arg("-version")
            .env_snapshot(env.env().iter());

        let output = self.ctx.executor.exec(&check).map_err(|e| {
            Failure::new(
                FailureKind::ToolchainVerificationFailed,
                format!("error checking Java version: {:#}", e),
            )
        })?;

        if !output.success() {
            return Err(Failure::new(
                FailureKind::ToolchainVerificationFailed,
                format!(
                    "`java -version` failed with exit code {:?} (JAVA_HOME={})",
                    output.code,
                    env.java_home().display()
                ),
            )
            .with_exit_code(output.code)
            .with_output(output.stdout, output.stderr));
        }

        // java prints its banner on stderr
        let banner = output.combined();
        tracing::debug!(
            "{}: {}",
            project,
            banner.lines().next().unwrap_or("java -version ok")
        );
        Ok(())
    }

    fn create_database(
        &self,
        project: &str,
        env: &ResolvedEnvironment,
        database_path: &Path,
        source_path: &Path,
    ) -> Result<(), Failure> {
        let command = ProcessBuilder::new(&self.ctx.codeql.program)
            .args(["database", "create"])
            .arg(database_path)
            .arg("--source-root")
            .arg(source_path)
            .arg("--language")
            .arg(&self.ctx.codeql.language)
            .arg("--overwrite")
            .env_snapshot(env.env().iter());

        tracing::info!("{}: creating database at {}", project, database_path.display());
        tracing::debug!("{}: using source path {}", project, source_path.display());

        let output = self.ctx.executor.exec(&command).map_err(|e| {
            Failure::new(
                FailureKind::ExternalCommandNonzeroExit,
                format!("could not run `{}`: {:#}", command.display_command(), e),
            )
        })?;

        if !output.success() {
            return Err(Failure::new(
                FailureKind::ExternalCommandNonzeroExit,
                format!(
                    "`{}` failed with exit code {:?}",
                    self.ctx.codeql.program.display(),
                    output.code
                ),
            )
            .with_exit_code(output.code)
            .with_output(output.stdout, output.stderr));
        }

        tracing::info!("{}: database created", project);
        Ok(())
    }
}
