//! Build event types for JSON output.
//!
//! These events are emitted, one JSON object per line, when running
//! `dbforge create --message-format json`.
//!
//! # Event Types
//!
//! - `batch-started`: the project set was resolved
//! - `project-started`: an attempt for one project began
//! - `project-finished`: an attempt ended (success or failure)
//! - `batch-finished`: every attempt ended
//!
//! # Stability
//!
//! New fields may be added, but existing fields should not be removed or renamed.

use serde::Serialize;

use crate::core::outcome::{BuildOutcome, FailureKind, ProjectReport};

/// An event emitted while a batch runs.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "reason")]
pub enum BuildEvent {
    /// The batch is about to start.
    #[serde(rename = "batch-started")]
    BatchStarted {
        /// Number of projects in the batch
        projects: u64,
        /// Worker count
        jobs: usize,
    },

    /// An attempt for one project started.
    #[serde(rename = "project-started")]
    ProjectStarted {
        project: String,
        /// Declared JDK version, if any
        #[serde(skip_serializing_if = "Option::is_none")]
        jdk: Option<String>,
    },

    /// An attempt for one project finished.
    #[serde(rename = "project-finished")]
    ProjectFinished {
        project: String,
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        kind: Option<FailureKind>,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        /// Declared build tools that fell back to PATH
        #[serde(skip_serializing_if = "Vec::is_empty")]
        warnings: Vec<String>,
        duration_ms: u64,
    },

    /// The batch completed.
    #[serde(rename = "batch-finished")]
    BatchFinished {
        succeeded: u64,
        failed: u64,
        duration_ms: u64,
    },
}

impl BuildEvent {
    /// Create a batch started event.
    pub fn batch_started(projects: usize, jobs: usize) -> Self {
        BuildEvent::BatchStarted {
            projects: projects as u64,
            jobs,
        }
    }

    /// Create a project started event.
    pub fn project_started(project: impl Into<String>, jdk: Option<&str>) -> Self {
        BuildEvent::ProjectStarted {
            project: project.into(),
            jdk: jdk.map(str::to_string),
        }
    }

    /// Create a project finished event from its report.
    pub fn project_finished(report: &ProjectReport) -> Self {
        let failure = match &report.outcome {
            BuildOutcome::Success => None,
            BuildOutcome::Failed(f) => Some(f),
        };
        BuildEvent::ProjectFinished {
            project: report.project.clone(),
            success: failure.is_none(),
            kind: failure.map(|f| f.kind),
            message: failure.map(|f| f.message.clone()),
            warnings: report.warnings.clone(),
            duration_ms: report.duration.as_millis() as u64,
        }
    }

    /// Create a batch finished event.
    pub fn batch_finished(succeeded: usize, failed: usize, duration_ms: u64) -> Self {
        BuildEvent::BatchFinished {
            succeeded: succeeded as u64,
            failed: failed as u64,
            duration_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_batch_started_serialization() {
        let json = serde_json::to_string(&BuildEvent::batch_started(3, 1)).unwrap();
        assert!(json.contains("\"reason\":\"batch-started\""));
        assert!(json.contains("\"projects\":3"));
    }

    #[test]
    fn test_project_finished_failure() {
        let report = ProjectReport::new(
            "alpha",
            BuildOutcome::failed(FailureKind::ToolchainNotFound, "Java version 21 not found"),
            Duration::from_millis(7),
        );
        let json = serde_json::to_string(&BuildEvent::project_finished(&report)).unwrap();
        assert!(json.contains("\"reason\":\"project-finished\""));
        assert!(json.contains("\"success\":false"));
        assert!(json.contains("\"kind\":\"toolchain-not-found\""));
        assert!(json.contains("\"duration_ms\":7"));
    }

    #[test]
    fn test_project_finished_success_omits_kind() {
        let report = ProjectReport::new("alpha", BuildOutcome::Success, Duration::ZERO);
        let json = serde_json::to_string(&BuildEvent::project_finished(&report)).unwrap();
        assert!(json.contains("\"success\":true"));
        assert!(!json.contains("kind"));
        assert!(!json.contains("warnings"));
    }

    #[test]
    fn test_project_finished_carries_warnings() {
        let report = ProjectReport::new("alpha", BuildOutcome::Success, Duration::ZERO)
            .with_warnings(vec!["Maven 3.9.6 is not installed, using the default on PATH".to_string()]);
        let json = serde_json::to_string(&BuildEvent::project_finished(&report)).unwrap();
        assert!(json.contains("\"warnings\":[\"Maven 3.9.6 is not installed"));
    }
}
