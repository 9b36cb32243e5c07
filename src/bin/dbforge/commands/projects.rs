//! `dbforge projects` command

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::ProjectsArgs;
use dbforge::core::{BuildInfoRecord, ToolCategory};
use dbforge::ops::{load_projects, CreateOptions};
use dbforge::util::GlobalContext;

/// One listed project.
#[derive(Serialize)]
struct ProjectRow<'a> {
    id: &'a str,
    jdk: Option<&'a str>,
    mvn: Option<&'a str>,
    gradle: Option<&'a str>,
    origin: &'static str,
}

impl<'a> From<&'a BuildInfoRecord> for ProjectRow<'a> {
    fn from(record: &'a BuildInfoRecord) -> Self {
        ProjectRow {
            id: &record.project_slug,
            jdk: record.declared_version(ToolCategory::Jdk),
            mvn: record.declared_version(ToolCategory::Maven),
            gradle: record.declared_version(ToolCategory::Gradle),
            origin: record.origin.as_str(),
        }
    }
}

pub fn execute(args: ProjectsArgs) -> Result<()> {
    let gctx = GlobalContext::new()?;
    let mut options = CreateOptions::from_context(&gctx);
    super::apply_inputs(&gctx, &args.inputs, &mut options);

    let projects = load_projects(&options)?;
    let rows: Vec<ProjectRow<'_>> = projects.iter().map(ProjectRow::from).collect();

    if args.json {
        let json = serde_json::to_string_pretty(&rows).context("failed to serialize projects")?;
        println!("{}", json);
        return Ok(());
    }

    if rows.is_empty() {
        eprintln!("No eligible projects.");
        return Ok(());
    }

    let width = rows.iter().map(|r| r.id.len()).max().unwrap_or(0).max(7);
    println!(
        "{:<width$}  {:<6}  {:<8}  {:<8}  origin",
        "project",
        "jdk",
        "mvn",
        "gradle",
        width = width
    );
    for row in &rows {
        println!(
            "{:<width$}  {:<6}  {:<8}  {:<8}  {}",
            row.id,
            row.jdk.unwrap_or("-"),
            row.mvn.unwrap_or("-"),
            row.gradle.unwrap_or("-"),
            row.origin,
            width = width
        );
    }

    Ok(())
}
