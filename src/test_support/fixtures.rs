//! On-disk fixtures: build-info tables, registries and fake installs.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::build_info::{BuildInfoRecord, BuildInfoSet};
use crate::core::registry::{ToolCategory, VersionRegistry};

/// Header used by [`build_info_csv`].
pub const BUILD_INFO_HEADER: &str = "project_slug,status,jdk_version,mvn_version,gradle_version";

/// Render `(slug, status, jdk, mvn, gradle)` rows as a build-info CSV.
pub fn build_info_csv(rows: &[(&str, &str, &str, &str, &str)]) -> String {
    let mut out = String::from(BUILD_INFO_HEADER);
    out.push('\n');
    for (slug, status, jdk, mvn, gradle) in rows {
        out.push_str(&format!("{},{},{},{},{}\n", slug, status, jdk, mvn, gradle));
    }
    out
}

/// Write a build-info CSV into `dir` and return its path.
pub fn write_build_info(dir: &Path, name: &str, rows: &[(&str, &str, &str, &str, &str)]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, build_info_csv(rows)).unwrap();
    path
}

/// Create `<dir>/<name>/bin` and return `<dir>/<name>`.
pub fn fake_install(dir: &Path, name: &str) -> PathBuf {
    let root = dir.join(name);
    fs::create_dir_all(root.join("bin")).unwrap();
    root
}

/// A registry with JDK 8, 11 and 17 under made-up roots.
pub fn sample_registry() -> VersionRegistry {
    VersionRegistry::new()
        .with_entry(ToolCategory::Jdk, "8", "/opt/jdk-8")
        .with_entry(ToolCategory::Jdk, "11", "/opt/jdk-11")
        .with_entry(ToolCategory::Jdk, "17", "/opt/jdk-17")
        .with_entry(ToolCategory::Maven, "3.9.6", "/opt/maven-3.9.6")
        .with_entry(ToolCategory::Gradle, "7.6", "/opt/gradle-7.6")
}

/// A merged set built from global-only records.
pub fn project_set(records: Vec<BuildInfoRecord>) -> BuildInfoSet {
    BuildInfoSet::from_sources(Vec::new(), records)
}
