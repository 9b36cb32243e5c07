//! `dbforge create` command

use anyhow::{bail, Result};

use crate::cli::{CreateArgs, GlobalArgs, MessageFormat};
use dbforge::core::FailureKind;
use dbforge::ops::{create, CreateOptions};
use dbforge::util::shell::{format_duration, Status};
use dbforge::util::{Diagnostic, GlobalContext};

pub fn execute(args: CreateArgs, global: &GlobalArgs) -> Result<()> {
    let gctx = GlobalContext::new()?;
    let shell = global.shell(args.message_format == MessageFormat::Json);

    // CLI > project config > global config > defaults
    let mut options = CreateOptions::from_context(&gctx);
    super::apply_inputs(&gctx, &args.inputs, &mut options);
    super::apply_registry(&gctx, &args.registry, &mut options);
    if let Some(path) = &args.db_path {
        options.database_dir = gctx.resolve(path);
    }
    if let Some(path) = &args.sources_path {
        options.sources_dir = gctx.resolve(path);
    }
    if let Some(jobs) = args.jobs {
        options.jobs = jobs.max(1);
    }
    options.project = args.project;
    options.report = args.report.map(|path| gctx.resolve(&path));

    let report = create(&options, shell.clone())?;

    if let Some(project) = &options.project {
        if report
            .outcome(project)
            .and_then(|outcome| outcome.kind())
            == Some(FailureKind::ProjectNotFound)
        {
            bail!(
                "project `{}` not found in build info\n\
                 hint: run `dbforge projects` to list eligible projects",
                project
            );
        }
    }

    for (project, failure) in report.failures() {
        shell.print_block(Diagnostic::from_failure(project, failure).format(shell.use_color()));
    }

    let summary = format!(
        "{} succeeded, {} failed in {}",
        report.succeeded(),
        report.failed(),
        format_duration(report.duration)
    );
    if report.failed() == 0 {
        shell.status(Status::Finished, summary);
    } else {
        shell.status(Status::Warning, summary);
    }

    Ok(())
}
