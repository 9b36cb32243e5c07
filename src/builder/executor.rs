//! Batch executor with progress reporting.

use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;

use crate::builder::context::BuildContext;
use crate::builder::database::DatabaseBuilder;
use crate::builder::events::BuildEvent;
use crate::core::build_info::{BuildInfoRecord, BuildInfoSet};
use crate::core::outcome::{BatchReport, BuildOutcome, FailureKind, ProjectReport};
use crate::core::registry::ToolCategory;
use crate::util::shell::{format_duration, Progress, Shell, Status};

/// Runs database creation over a project set.
///
/// Projects are independent: a failure is recorded and the next project is
/// attempted. With `jobs > 1` attempts run on a dedicated thread pool;
/// reports always come back in batch order.
pub struct BatchExecutor<'a> {
    ctx: &'a BuildContext,
    jobs: usize,
    shell: Option<Arc<Shell>>,
}

impl<'a> BatchExecutor<'a> {
    /// Create a sequential executor.
    pub fn new(ctx: &'a BuildContext) -> Self {
        BatchExecutor {
            ctx,
            jobs: 1,
            shell: None,
        }
    }

    /// Number of projects attempted concurrently (at least 1).
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Report progress and events through `shell`.
    pub fn shell(mut self, shell: Arc<Shell>) -> Self {
        self.shell = Some(shell);
        self
    }

    /// Attempt every project in the set.
    pub fn run(&self, projects: &BuildInfoSet) -> BatchReport {
        self.run_records(projects.iter().collect())
    }

    /// Attempt only `project`.
    ///
    /// An id that is not in the set yields a `project-not-found` outcome and
    /// nothing is run.
    pub fn run_single(&self, projects: &BuildInfoSet, project: &str) -> BatchReport {
        match projects.get(project) {
            Some(record) => self.run_records(vec![record]),
            None => {
                tracing::debug!("project `{}` not in merged build info", project);
                BatchReport {
                    projects: vec![ProjectReport::new(
                        project,
                        BuildOutcome::failed(
                            FailureKind::ProjectNotFound,
                            format!("Project {} not found in build info", project),
                        ),
                        Default::default(),
                    )],
                    duration: Default::default(),
                }
            }
        }
    }

    fn run_records(&self, records: Vec<&BuildInfoRecord>) -> BatchReport {
        let start = Instant::now();
        tracing::info!(
            "creating {} database(s) with {} job(s)",
            records.len(),
            self.jobs
        );
        self.emit(&BuildEvent::batch_started(records.len(), self.jobs));

        let progress = self
            .shell
            .as_ref()
            .map(|shell| shell.progress(records.len() as u64, "Creating databases"));
        let progress = progress.as_ref();

        let reports: Vec<ProjectReport> = if self.jobs > 1 && records.len() > 1 {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(self.jobs)
                .build()
            {
                Ok(pool) => pool.install(|| {
                    records
                        .par_iter()
                        .map(|record| self.attempt(record, progress))
                        .collect()
                }),
                Err(e) => {
                    tracing::warn!("could not start {} workers ({}), running sequentially", self.jobs, e);
                    records.iter().map(|record| self.attempt(record, progress)).collect()
                }
            }
        } else {
            records.iter().map(|record| self.attempt(record, progress)).collect()
        };

        if let Some(progress) = progress {
            progress.finish();
        }

        let report = BatchReport {
            projects: reports,
            duration: start.elapsed(),
        };

        self.emit(&BuildEvent::batch_finished(
            report.succeeded(),
            report.failed(),
            report.duration.as_millis() as u64,
        ));
        tracing::info!(
            "batch finished: {} succeeded, {} failed",
            report.succeeded(),
            report.failed()
        );

        report
    }

    fn attempt(&self, record: &BuildInfoRecord, progress: Option<&Progress>) -> ProjectReport {
        let project = record.project_slug.as_str();
        let jdk = record.declared_version(ToolCategory::Jdk);
        self.emit(&BuildEvent::project_started(project, jdk));
        if let Some(progress) = progress {
            progress.println(
                Status::Creating,
                format!("{} (JDK {})", project, jdk.unwrap_or("?")),
            );
        }

        let start = Instant::now();
        let attempt = DatabaseBuilder::new(self.ctx).build(record);
        let report = ProjectReport::new(project, attempt.outcome, start.elapsed())
            .with_warnings(attempt.warnings);

        if let Some(failure) = report.outcome.failure() {
            tracing::debug!("{}: {} ({})", project, failure.message, failure.kind);
        }

        if let Some(progress) = progress {
            for warning in &report.warnings {
                progress.println(Status::Warning, format!("{}: {}", project, warning));
            }
            match report.outcome.failure() {
                None => progress.println(
                    Status::Created,
                    format!("{} in {}", project, format_duration(report.duration)),
                ),
                Some(failure) => progress.println(
                    Status::Failed,
                    format!("{}: {}", project, failure.message),
                ),
            }
            progress.inc(1);
        }
        self.emit(&BuildEvent::project_finished(&report));

        report
    }

    fn emit(&self, event: &BuildEvent) {
        if let Some(shell) = &self.shell {
            shell.json_event(event);
        }
    }
}
