//! Test doubles for code that spawns `java` and `codeql`.
//!
//! ```rust,ignore
//! let exec = Arc::new(MockExecutor::new());
//! exec.expect("java -version", MockProcessOutput::success(""));
//! exec.expect_prefix("codeql database create", MockProcessOutput::failure(2, "boom"));
//! ```

pub mod fixtures;

use std::collections::BTreeMap;
use std::sync::Mutex;

use anyhow::{bail, Result};

use crate::builder::environment::{JAVA_HOME_VAR, PATH_VAR};
use crate::util::process::{ProcessBuilder, ProcessExecutor, ProcessOutput};

pub use fixtures::*;

/// Canned result of a mocked command.
#[derive(Debug, Clone)]
pub struct MockProcessOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl MockProcessOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self::with_output(0, stdout, "")
    }

    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self::with_output(code, "", stderr)
    }

    pub fn with_output(code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }
}

impl From<MockProcessOutput> for ProcessOutput {
    fn from(mock: MockProcessOutput) -> Self {
        ProcessOutput {
            code: Some(mock.code),
            stdout: mock.stdout,
            stderr: mock.stderr,
        }
    }
}

#[derive(Debug)]
enum Matcher {
    Exact(String),
    Prefix(String),
}

impl Matcher {
    fn matches(&self, command: &str) -> bool {
        match self {
            Matcher::Exact(expected) => command == expected,
            Matcher::Prefix(prefix) => command.starts_with(prefix.as_str()),
        }
    }
}

/// A command as the mock saw it.
#[derive(Debug, Clone)]
struct RecordedCall {
    command: String,
    env: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
struct MockState {
    rules: Vec<(Matcher, MockProcessOutput)>,
    fallback: Option<MockProcessOutput>,
    calls: Vec<RecordedCall>,
}

/// `ProcessExecutor` that answers from canned outputs.
///
/// Every command is recorded with its `PATH` and `JAVA_HOME`. The first
/// matching rule answers; with no match and no fallback the spawn fails, the
/// same way a missing program would.
#[derive(Debug, Default)]
pub struct MockExecutor {
    state: Mutex<MockState>,
}

impl MockExecutor {
    pub fn new() -> Self {
        MockExecutor::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Answer `command` (program and args joined by spaces) with `output`.
    pub fn expect(&self, command: &str, output: MockProcessOutput) -> &Self {
        self.lock().rules.push((Matcher::Exact(command.to_string()), output));
        self
    }

    /// Answer any command starting with `prefix` with `output`.
    pub fn expect_prefix(&self, prefix: &str, output: MockProcessOutput) -> &Self {
        self.lock().rules.push((Matcher::Prefix(prefix.to_string()), output));
        self
    }

    /// Answer unmatched commands with `output` instead of failing to spawn.
    pub fn set_default(&self, output: MockProcessOutput) -> &Self {
        self.lock().fallback = Some(output);
        self
    }

    /// Commands run so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.iter().map(|c| c.command.clone()).collect()
    }

    /// `PATH` and `JAVA_HOME` of each call, in order.
    pub fn envs(&self) -> Vec<BTreeMap<String, String>> {
        self.lock().calls.iter().map(|c| c.env.clone()).collect()
    }
}

impl ProcessExecutor for MockExecutor {
    fn exec(&self, process: &ProcessBuilder) -> Result<ProcessOutput> {
        let command = process.display_command();
        let env = [PATH_VAR, JAVA_HOME_VAR]
            .into_iter()
            .filter_map(|key| {
                process
                    .get_env(key)
                    .map(|v| (key.to_string(), v.to_string_lossy().into_owned()))
            })
            .collect();

        let mut state = self.lock();
        state.calls.push(RecordedCall {
            command: command.clone(),
            env,
        });

        let reply = state
            .rules
            .iter()
            .find(|(matcher, _)| matcher.matches(&command))
            .map(|(_, output)| output.clone())
            .or_else(|| state.fallback.clone());

        match reply {
            Some(output) => Ok(output.into()),
            None => bail!("failed to spawn `{}`: no such command", command),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_matching_rule_answers() {
        let exec = MockExecutor::new();
        exec.expect("java -version", MockProcessOutput::success("openjdk 17"));
        exec.expect_prefix("codeql", MockProcessOutput::failure(2, "boom"));
        exec.expect_prefix("codeql database", MockProcessOutput::success("never used"));

        let out = exec.exec(&ProcessBuilder::new("java").arg("-version")).unwrap();
        assert!(out.success());
        assert_eq!(out.stdout, "openjdk 17");

        let out = exec
            .exec(&ProcessBuilder::new("codeql").args(["database", "create"]))
            .unwrap();
        assert_eq!(out.code, Some(2));
        assert_eq!(out.stderr, "boom");
    }

    #[test]
    fn test_unmatched_command_fails_to_spawn() {
        let exec = MockExecutor::new();
        assert!(exec.exec(&ProcessBuilder::new("mvn")).is_err());
        assert_eq!(exec.calls(), vec!["mvn".to_string()]);

        exec.set_default(MockProcessOutput::success(""));
        assert!(exec.exec(&ProcessBuilder::new("mvn")).unwrap().success());
    }

    #[test]
    fn test_records_java_env() {
        let exec = MockExecutor::new();
        exec.set_default(MockProcessOutput::success(""));
        exec.exec(
            &ProcessBuilder::new("java")
                .env(JAVA_HOME_VAR, "/opt/jdk-17")
                .env("UNRELATED", "x"),
        )
        .unwrap();

        let envs = exec.envs();
        assert_eq!(envs[0][JAVA_HOME_VAR], "/opt/jdk-17");
        assert!(!envs[0].contains_key("UNRELATED"));
    }
}
