//! Version registry listing and install checks.
//!
//! ```bash
//! dbforge toolchain show       # registered versions by category
//! dbforge toolchain check      # validate install roots
//! dbforge -v toolchain check   # also print the resolved paths
//! ```
//!
//! A registered JDK whose root is missing or has no `bin/java` makes
//! `check` fail, since every project pinned to it would fail verification.
//! Maven, Gradle and the CodeQL CLI are reported but never fail the check.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use crate::core::registry::{ToolCategory, VersionRegistry};
use crate::util::process::{find_executable, find_executable_in};

/// Outcome of checking one install or program.
#[derive(Debug, Clone)]
pub struct InstallCheck {
    /// `JDK 17`, `Maven 3.9.6`, `CodeQL`.
    pub subject: String,
    pub required: bool,
    /// Located launcher, or why it could not be found.
    pub result: Result<PathBuf, String>,
}

impl InstallCheck {
    pub fn passed(&self) -> bool {
        self.result.is_ok()
    }
}

/// All checks from one `toolchain check` run, in registry order.
#[derive(Debug, Clone, Default)]
pub struct ToolchainReport {
    pub checks: Vec<InstallCheck>,
}

impl ToolchainReport {
    /// Required checks that failed.
    pub fn broken(&self) -> impl Iterator<Item = &InstallCheck> {
        self.checks.iter().filter(|c| c.required && !c.passed())
    }

    /// True when every registered JDK is usable.
    pub fn is_usable(&self) -> bool {
        self.broken().next().is_none()
    }
}

/// Check every registered install and the CodeQL CLI.
pub fn check_toolchains(registry: &VersionRegistry, codeql_program: &Path, cwd: &Path) -> ToolchainReport {
    let mut checks: Vec<InstallCheck> = ToolCategory::ALL
        .into_iter()
        .flat_map(|category| {
            registry
                .versions(category)
                .map(move |(version, root)| InstallCheck {
                    subject: format!("{} {}", category.display_name(), version),
                    required: category == ToolCategory::Jdk,
                    result: locate_launcher(category, root, cwd),
                })
        })
        .collect();

    checks.push(InstallCheck {
        subject: "CodeQL".to_string(),
        required: false,
        result: locate_codeql(codeql_program),
    });

    ToolchainReport { checks }
}

fn locate_launcher(category: ToolCategory, root: &Path, cwd: &Path) -> Result<PathBuf, String> {
    if !root.is_dir() {
        return Err(format!("install root {} does not exist", root.display()));
    }
    let bin = root.join("bin");
    find_executable_in(category.launcher(), Some(bin.to_string_lossy().as_ref()), cwd)
        .ok_or_else(|| format!("no `{}` in {}", category.launcher(), bin.display()))
}

fn locate_codeql(program: &Path) -> Result<PathBuf, String> {
    let found = if program.components().count() > 1 {
        program.is_file().then(|| program.to_path_buf())
    } else {
        find_executable(program)
    };
    found.ok_or_else(|| {
        format!(
            "`{}` not found (set [codeql] program in .dbforge/config.toml)",
            program.display()
        )
    })
}

/// Registry contents, one block per category.
pub fn format_registry(registry: &VersionRegistry) -> String {
    let mut out = String::new();
    for category in ToolCategory::ALL {
        let _ = writeln!(out, "{}:", category.display_name());
        let mut versions = registry.versions(category).peekable();
        if versions.peek().is_none() {
            let _ = writeln!(out, "  (none)");
        }
        for (version, root) in versions {
            let _ = writeln!(out, "  {:<10} {}", version, root.display());
        }
    }
    out
}

/// Check results as printed by `toolchain check`.
pub fn format_report(report: &ToolchainReport, verbose: bool) -> String {
    let mut out = String::from("Toolchains:\n");
    for check in &report.checks {
        let mark = if check.passed() { "[OK]" } else { "[!!]" };
        let optional = if check.required { "" } else { " (optional)" };
        let _ = writeln!(out, "  {} {}{}", mark, check.subject, optional);
        match &check.result {
            Err(reason) => {
                let _ = writeln!(out, "      {}", reason);
            }
            Ok(path) if verbose => {
                let _ = writeln!(out, "      {}", path.display());
            }
            Ok(_) => {}
        }
    }

    let failed = report.checks.iter().filter(|c| !c.passed()).count();
    let _ = writeln!(
        out,
        "\n{} passed, {} failed",
        report.checks.len() - failed,
        failed
    );

    let broken = report.broken().count();
    if broken > 0 {
        let _ = writeln!(
            out,
            "{} JDK install(s) are broken; projects pinned to them will fail verification.",
            broken
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::test_support::fake_install;

    #[test]
    fn test_missing_jdk_root_is_broken() {
        let tmp = TempDir::new().unwrap();
        let registry = VersionRegistry::new()
            .with_entry(ToolCategory::Jdk, "21", tmp.path().join("jdk-21"))
            .with_entry(ToolCategory::Maven, "3.9.6", tmp.path().join("maven"));

        let report = check_toolchains(&registry, Path::new("codeql"), tmp.path());
        assert!(!report.is_usable());
        assert_eq!(report.broken().count(), 1);
        assert!(report.checks[0]
            .result
            .as_ref()
            .unwrap_err()
            .contains("does not exist"));
        // maven and codeql never fail the check
        assert!(report.checks[1..].iter().all(|c| !c.required));
    }

    #[test]
    fn test_root_without_launcher() {
        let tmp = TempDir::new().unwrap();
        let root = fake_install(tmp.path(), "jdk-17");
        let registry = VersionRegistry::new().with_entry(ToolCategory::Jdk, "17", &root);

        let report = check_toolchains(&registry, Path::new("codeql"), tmp.path());
        assert!(!report.checks[0].passed());
        assert!(report.checks[0].result.as_ref().unwrap_err().contains("no `java`"));
    }

    #[cfg(unix)]
    #[test]
    fn test_root_with_launcher_passes() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let root = fake_install(tmp.path(), "jdk-17");
        let java = root.join("bin").join("java");
        std::fs::write(&java, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&java, std::fs::Permissions::from_mode(0o755)).unwrap();

        let registry = VersionRegistry::new().with_entry(ToolCategory::Jdk, "17", &root);
        let report = check_toolchains(&registry, Path::new("codeql"), tmp.path());
        assert!(report.is_usable());
        assert_eq!(report.checks[0].result.as_deref(), Ok(java.as_path()));

        let text = format_report(&report, true);
        assert!(text.contains("[OK] JDK 17\n"));
        assert!(text.contains(&java.display().to_string()));
    }

    #[test]
    fn test_codeql_explicit_path_must_exist() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("codeql").join("codeql");
        assert!(locate_codeql(&missing).is_err());
    }

    #[test]
    fn test_format_report_marks_optional() {
        let report = ToolchainReport {
            checks: vec![
                InstallCheck {
                    subject: "JDK 17".to_string(),
                    required: true,
                    result: Ok(PathBuf::from("/opt/jdk-17/bin/java")),
                },
                InstallCheck {
                    subject: "Gradle 7.6".to_string(),
                    required: false,
                    result: Err("install root /opt/gradle does not exist".to_string()),
                },
            ],
        };

        let text = format_report(&report, false);
        assert!(text.contains("[!!] Gradle 7.6 (optional)"));
        assert!(text.contains("      install root /opt/gradle does not exist"));
        assert!(!text.contains("/opt/jdk-17/bin/java"));
        assert!(text.contains("1 passed, 1 failed"));
        assert!(!text.contains("broken"));
    }

    #[test]
    fn test_format_registry() {
        let registry = VersionRegistry::new()
            .with_entry(ToolCategory::Jdk, "11", "/opt/jdk-11")
            .with_entry(ToolCategory::Jdk, "17", "/opt/jdk-17");

        let output = format_registry(&registry);
        assert!(output.contains("  11         /opt/jdk-11"));
        assert!(output.contains("/opt/jdk-17"));
        assert!(output.contains("Maven:\n  (none)"));
    }
}
