//! Per-project build outcomes.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// Why a project attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    /// A required toolchain version is not in the registry.
    ToolchainNotFound,
    /// `java -version` could not be run or exited non-zero.
    ToolchainVerificationFailed,
    /// The database output directory could not be prepared.
    FilesystemError,
    /// The database-creation command could not be run or exited non-zero.
    ExternalCommandNonzeroExit,
    /// Single-project mode asked for an id with no eligible record.
    ProjectNotFound,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::ToolchainNotFound => "toolchain-not-found",
            FailureKind::ToolchainVerificationFailed => "toolchain-verification-failed",
            FailureKind::FilesystemError => "filesystem-error",
            FailureKind::ExternalCommandNonzeroExit => "external-command-nonzero-exit",
            FailureKind::ProjectNotFound => "project-not-found",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnostic payload of a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub kind: FailureKind,
    /// One-line summary
    pub message: String,
    /// Exit code of the failing process, if one ran to completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stdout: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stderr: String,
    /// Fix hint specific to this failure, when the cause knows one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Failure {
            kind,
            message: message.into(),
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            help: None,
        }
    }

    pub fn with_exit_code(mut self, code: Option<i32>) -> Self {
        self.exit_code = code;
        self
    }

    pub fn with_output(mut self, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self.stderr = stderr.into();
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// Result of one project attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BuildOutcome {
    Success,
    Failed(Failure),
}

impl BuildOutcome {
    pub fn failed(kind: FailureKind, message: impl Into<String>) -> Self {
        BuildOutcome::Failed(Failure::new(kind, message))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, BuildOutcome::Success)
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            BuildOutcome::Success => None,
            BuildOutcome::Failed(f) => Some(f),
        }
    }

    pub fn kind(&self) -> Option<FailureKind> {
        self.failure().map(|f| f.kind)
    }
}

/// Outcome of one project together with its id and timing.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectReport {
    pub project: String,
    pub outcome: BuildOutcome,
    /// Declared build tools that were not installed
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
}

impl ProjectReport {
    pub fn new(project: impl Into<String>, outcome: BuildOutcome, duration: Duration) -> Self {
        ProjectReport {
            project: project.into(),
            outcome,
            warnings: Vec::new(),
            duration,
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }
}

/// All outcomes of a batch, in batch order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub projects: Vec<ProjectReport>,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.projects.iter().filter(|p| p.outcome.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.projects.len() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &Failure)> {
        self.projects
            .iter()
            .filter_map(|p| p.outcome.failure().map(|f| (p.project.as_str(), f)))
    }

    /// Outcome for a project id.
    pub fn outcome(&self, project: &str) -> Option<&BuildOutcome> {
        self.projects
            .iter()
            .find(|p| p.project == project)
            .map(|p| &p.outcome)
    }

    /// `(id, outcome)` pairs in batch order.
    pub fn outcomes(&self) -> Vec<(&str, &BuildOutcome)> {
        self.projects
            .iter()
            .map(|p| (p.project.as_str(), &p.outcome))
            .collect()
    }

    /// Serialize the report as pretty JSON.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}
