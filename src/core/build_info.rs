//! Build-info records and the local/global merge.
//!
//! Each project in the corpus has a row in a global `build_info.csv`
//! describing the JDK and build tool versions it was last built with.
//! Developers may keep a `build_info_local.csv` next to it with corrected
//! rows. Local rows take precedence over global rows for the same
//! `project_slug`; rows whose `status` is anything other than `success`
//! are dropped from both files. A file without a `status` column treats
//! every row as successful, but a row that ends before its `status` cell
//! is dropped.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

use crate::core::registry::ToolCategory;

/// Sentinel used in build-info files for "no version declared".
pub const NOT_APPLICABLE: &str = "n/a";

/// Status value that makes a row eligible for building.
pub const STATUS_SUCCESS: &str = "success";

const COL_PROJECT: &str = "project_slug";
const COL_STATUS: &str = "status";
const COL_JDK: &str = "jdk_version";
const COL_MVN: &str = "mvn_version";
const COL_GRADLE: &str = "gradle_version";

/// Which file a record was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordOrigin {
    Local,
    Global,
}

impl RecordOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordOrigin::Local => "local",
            RecordOrigin::Global => "global",
        }
    }
}

/// Errors raised while reading build-info files.
#[derive(Debug, Error, Diagnostic)]
pub enum BuildInfoError {
    #[error("build info file not found: {}", path.display())]
    #[diagnostic(
        code(dbforge::build_info::missing),
        help("The global build info is required; set `paths.build_info` or pass --build-info")
    )]
    SourceMissing { path: PathBuf },

    #[error("failed to read build info {}", path.display())]
    #[diagnostic(code(dbforge::build_info::csv))]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("build info {} has no `{column}` column", path.display())]
    #[diagnostic(
        code(dbforge::build_info::missing_column),
        help("The header row must name at least `project_slug` and `jdk_version`")
    )]
    MissingColumn { path: PathBuf, column: &'static str },
}

/// The `status` cell of a row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StatusCell {
    /// The file has no `status` column.
    #[default]
    NoColumn,
    /// The file has a `status` column but this row is too short to reach it.
    Missing,
    Value(String),
}

/// One row of a build-info file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildInfoRecord {
    pub project_slug: String,
    pub status: StatusCell,
    pub jdk_version: Option<String>,
    pub mvn_version: Option<String>,
    pub gradle_version: Option<String>,
    /// Unrecognized columns, passed through untouched.
    pub extra: IndexMap<String, String>,
    #[serde(skip)]
    pub origin: RecordOrigin,
}

impl BuildInfoRecord {
    /// Create a record with only a project id and JDK version.
    pub fn new(project_slug: impl Into<String>, jdk_version: impl Into<String>) -> Self {
        BuildInfoRecord {
            project_slug: project_slug.into(),
            status: StatusCell::NoColumn,
            jdk_version: Some(jdk_version.into()),
            mvn_version: None,
            gradle_version: None,
            extra: IndexMap::new(),
            origin: RecordOrigin::Global,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = StatusCell::Value(status.into());
        self
    }

    pub fn with_maven(mut self, version: impl Into<String>) -> Self {
        self.mvn_version = Some(version.into());
        self
    }

    pub fn with_gradle(mut self, version: impl Into<String>) -> Self {
        self.gradle_version = Some(version.into());
        self
    }

    pub fn with_origin(mut self, origin: RecordOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Whether this row may be built.
    pub fn is_eligible(&self) -> bool {
        match &self.status {
            StatusCell::NoColumn => true,
            StatusCell::Missing => false,
            StatusCell::Value(status) => status == STATUS_SUCCESS,
        }
    }

    /// The declared version for a category, exactly as written. Empty and
    /// `n/a` cells count as undeclared.
    pub fn declared_version(&self, category: ToolCategory) -> Option<&str> {
        let raw = match category {
            ToolCategory::Jdk => self.jdk_version.as_deref(),
            ToolCategory::Maven => self.mvn_version.as_deref(),
            ToolCategory::Gradle => self.gradle_version.as_deref(),
        };
        raw.filter(|v| !v.is_empty() && *v != NOT_APPLICABLE)
    }
}

/// Read every row of a build-info CSV.
///
/// The header decides column meaning; column order is irrelevant. Rows with
/// an empty `project_slug` are skipped.
pub fn read_records(path: &Path, origin: RecordOrigin) -> Result<Vec<BuildInfoRecord>, BuildInfoError> {
    if !path.exists() {
        return Err(BuildInfoError::SourceMissing {
            path: path.to_path_buf(),
        });
    }

    let csv_err = |source| BuildInfoError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;

    let headers = reader.headers().map_err(csv_err)?.clone();
    if !headers.iter().any(|h| h == COL_PROJECT) {
        return Err(BuildInfoError::MissingColumn {
            path: path.to_path_buf(),
            column: COL_PROJECT,
        });
    }

    let status = if headers.iter().any(|h| h == COL_STATUS) {
        StatusCell::Missing
    } else {
        StatusCell::NoColumn
    };

    let mut records = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row.map_err(csv_err)?;

        let mut project_slug = None;
        let mut record = BuildInfoRecord {
            project_slug: String::new(),
            status: status.clone(),
            jdk_version: None,
            mvn_version: None,
            gradle_version: None,
            extra: IndexMap::new(),
            origin,
        };

        // Fields past the end of a short row stay `None`
        for (header, value) in headers.iter().zip(row.iter()) {
            let value = value.to_string();
            match header {
                COL_PROJECT => project_slug = Some(value),
                COL_STATUS => record.status = StatusCell::Value(value),
                COL_JDK => record.jdk_version = Some(value),
                COL_MVN => record.mvn_version = Some(value),
                COL_GRADLE => record.gradle_version = Some(value),
                other => {
                    record.extra.insert(other.to_string(), value);
                }
            }
        }

        match project_slug.filter(|s| !s.trim().is_empty()) {
            Some(slug) => {
                record.project_slug = slug;
                records.push(record);
            }
            None => {
                // +2: header line plus 1-based numbering
                tracing::warn!(
                    "{}:{}: row has no project_slug, skipping",
                    path.display(),
                    line + 2
                );
            }
        }
    }

    Ok(records)
}

/// The merged, ordered set of buildable projects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildInfoSet {
    records: IndexMap<String, BuildInfoRecord>,
}

impl BuildInfoSet {
    pub fn new() -> Self {
        BuildInfoSet::default()
    }

    /// Merge already-parsed local and global rows.
    ///
    /// Eligible local rows are inserted first (a repeated id keeps its
    /// position but takes the later value). Eligible global rows are then
    /// inserted only for ids not yet present.
    pub fn from_sources(
        local: impl IntoIterator<Item = BuildInfoRecord>,
        global: impl IntoIterator<Item = BuildInfoRecord>,
    ) -> Self {
        let mut records: IndexMap<String, BuildInfoRecord> = IndexMap::new();

        for record in local {
            if !record.is_eligible() {
                tracing::debug!(
                    "dropping local record `{}` with status {:?}",
                    record.project_slug,
                    record.status
                );
                continue;
            }
            records.insert(record.project_slug.clone(), record);
        }

        for record in global {
            if !record.is_eligible() {
                tracing::debug!(
                    "dropping global record `{}` with status {:?}",
                    record.project_slug,
                    record.status
                );
                continue;
            }
            if records.contains_key(&record.project_slug) {
                tracing::debug!(
                    "global record `{}` shadowed by local override",
                    record.project_slug
                );
                continue;
            }
            records.insert(record.project_slug.clone(), record);
        }

        BuildInfoSet { records }
    }

    pub fn get(&self, project: &str) -> Option<&BuildInfoRecord> {
        self.records.get(project)
    }

    pub fn contains(&self, project: &str) -> bool {
        self.records.contains_key(project)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in merge order.
    pub fn iter(&self) -> impl Iterator<Item = &BuildInfoRecord> {
        self.records.values()
    }

    /// Project ids in merge order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }
}

/// Merge the local override file (optional) with the global file (required).
pub fn merge(local: &Path, global: &Path) -> Result<BuildInfoSet, BuildInfoError> {
    let local_records = if local.exists() {
        read_records(local, RecordOrigin::Local)?
    } else {
        tracing::debug!("no local build info at {}", local.display());
        Vec::new()
    };

    let global_records = read_records(global, RecordOrigin::Global)?;

    let set = BuildInfoSet::from_sources(local_records, global_records);
    tracing::info!("{} project(s) eligible for database creation", set.len());
    Ok(set)
}
