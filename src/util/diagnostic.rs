//! Per-project failure reports for the terminal.
//!
//! A failed attempt prints as a compiler-style block: the cause, then
//! `= ` notes (failure kind, exit code, the tail of the tool's output), then
//! a `help:` line naming the usual fix.

use std::fmt;

use crate::core::outcome::{Failure, FailureKind};

/// Fix hints, one per failure kind.
pub mod suggestions {
    pub const REGISTER_JDK: &str =
        "Add the JDK install root under `jdks` in the version registry (dep_configs.json)";

    pub const CHECK_JDK: &str = "Run `dbforge toolchain check` to validate registered install roots";

    pub const CHECK_CODEQL: &str =
        "Check the project sources and run `dbforge create --project <id> --verbose`";

    pub const LIST_PROJECTS: &str = "Run `dbforge projects` to see eligible project ids";

    pub const CHECK_DB_PATH: &str = "Check permissions on the database directory or pass --db-path";
}

/// Trailing non-blank lines kept from each output stream.
const OUTPUT_TAIL: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub notes: Vec<String>,
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            notes: Vec::new(),
            help: None,
        }
    }

    /// Describe a failed project attempt.
    pub fn from_failure(project: &str, failure: &Failure) -> Self {
        let mut diag = Diagnostic::error(format!("{}: {}", project, failure.message))
            .with_note(format!("kind: {}", failure.kind));

        if let Some(code) = failure.exit_code {
            diag = diag.with_note(format!("exit code: {}", code));
        }
        for (stream, text) in [("stderr", &failure.stderr), ("stdout", &failure.stdout)] {
            diag.notes.extend(
                tail(text, OUTPUT_TAIL)
                    .into_iter()
                    .map(|line| format!("{}: {}", stream, line)),
            );
        }

        let fallback = match failure.kind {
            FailureKind::ToolchainNotFound => suggestions::REGISTER_JDK,
            FailureKind::ToolchainVerificationFailed => suggestions::CHECK_JDK,
            FailureKind::FilesystemError => suggestions::CHECK_DB_PATH,
            FailureKind::ExternalCommandNonzeroExit => suggestions::CHECK_CODEQL,
            FailureKind::ProjectNotFound => suggestions::LIST_PROJECTS,
        };
        diag.help = Some(failure.help.clone().unwrap_or_else(|| fallback.to_string()));
        diag
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Render for stderr, with ANSI colors when `color` is set.
    pub fn format(&self, color: bool) -> String {
        let paint = |code: &str, text: &str| {
            if color {
                format!("\x1b[{}m{}\x1b[0m", code, text)
            } else {
                text.to_string()
            }
        };

        let mut out = format!("{}: {}\n", paint("1;31", "error"), self.message);
        for note in &self.notes {
            out.push_str("  = ");
            out.push_str(note);
            out.push('\n');
        }
        if let Some(help) = &self.help {
            out.push_str(&format!("{}: {}\n", paint("1;32", "help"), help));
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(false))
    }
}

fn tail(text: &str, n: usize) -> Vec<&str> {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    lines[lines.len().saturating_sub(n)..].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_failure_keeps_output_tail() {
        let stderr: String = (1..=8).map(|i| format!("line {}\n\n", i)).collect();
        let failure = Failure::new(FailureKind::ExternalCommandNonzeroExit, "`codeql` failed")
            .with_exit_code(Some(2))
            .with_output("", stderr);

        let output = Diagnostic::from_failure("alpha", &failure).format(false);
        assert!(output.starts_with("error: alpha: `codeql` failed\n"));
        assert!(output.contains("  = kind: external-command-nonzero-exit\n"));
        assert!(output.contains("  = exit code: 2\n"));
        assert!(output.contains("stderr: line 4"));
        assert!(output.contains("stderr: line 8"));
        assert!(!output.contains("stderr: line 3"));
        assert!(output.ends_with(&format!("help: {}\n", suggestions::CHECK_CODEQL)));
    }

    #[test]
    fn test_from_failure_suggests_registry() {
        let failure = Failure::new(
            FailureKind::ToolchainNotFound,
            "Java version 21 not found in available installations",
        );
        let diag = Diagnostic::from_failure("alpha", &failure);
        assert_eq!(diag.help.as_deref(), Some(suggestions::REGISTER_JDK));
        assert_eq!(diag.notes, vec!["kind: toolchain-not-found".to_string()]);
    }

    #[test]
    fn test_failure_help_overrides_kind_default() {
        let failure = Failure::new(FailureKind::ToolchainNotFound, "no jdk_version declared")
            .with_help("Fill in the jdk_version column for this project");
        let diag = Diagnostic::from_failure("alpha", &failure);
        assert_eq!(
            diag.help.as_deref(),
            Some("Fill in the jdk_version column for this project")
        );
    }

    #[test]
    fn test_color_wraps_labels() {
        let out = Diagnostic::error("boom").format(true);
        assert!(out.starts_with("\x1b[1;31merror\x1b[0m: boom"));
    }
}
