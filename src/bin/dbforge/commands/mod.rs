//! Command implementations

pub mod completions;
pub mod create;
pub mod projects;
pub mod toolchain;

use dbforge::ops::CreateOptions;
use dbforge::util::GlobalContext;

use crate::cli::{BuildInfoArgs, RegistryArgs};

/// Apply build-info flags over configured paths.
pub(crate) fn apply_inputs(gctx: &GlobalContext, args: &BuildInfoArgs, options: &mut CreateOptions) {
    if let Some(path) = &args.build_info {
        options.build_info = gctx.resolve(path);
    }
    if let Some(path) = &args.local_build_info {
        options.local_build_info = gctx.resolve(path);
    }
}

/// Apply registry and CodeQL flags over configured values.
pub(crate) fn apply_registry(gctx: &GlobalContext, args: &RegistryArgs, options: &mut CreateOptions) {
    if let Some(path) = &args.versions {
        options.versions = gctx.resolve(path);
    }
    if let Some(program) = &args.codeql {
        options.codeql.program = gctx.resolve_program(program);
    }
}
