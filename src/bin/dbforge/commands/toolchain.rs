//! `dbforge toolchain` command

use anyhow::Result;

use crate::cli::{GlobalArgs, RegistryArgs, ToolchainArgs, ToolchainCommands};
use dbforge::core::VersionRegistry;
use dbforge::ops::{check_toolchains, format_registry, format_report, CreateOptions};
use dbforge::util::GlobalContext;

pub fn execute(args: ToolchainArgs, global: &GlobalArgs) -> Result<()> {
    match args.command {
        ToolchainCommands::Show(registry) => show(&registry),
        ToolchainCommands::Check(registry) => check(&registry, global.verbose),
    }
}

fn options(gctx: &GlobalContext, args: &RegistryArgs) -> CreateOptions {
    let mut options = CreateOptions::from_context(gctx);
    super::apply_registry(gctx, args, &mut options);
    options
}

fn show(args: &RegistryArgs) -> Result<()> {
    let gctx = GlobalContext::new()?;
    let options = options(&gctx, args);
    let registry = VersionRegistry::load(&options.versions)?;

    println!("Registry: {}", options.versions.display());
    println!();
    print!("{}", format_registry(&registry));
    println!();
    println!("CodeQL:   {}", options.codeql.program.display());
    println!("Language: {}", options.codeql.language);

    Ok(())
}

fn check(args: &RegistryArgs, verbose: bool) -> Result<()> {
    let gctx = GlobalContext::new()?;
    let options = options(&gctx, args);
    let registry = VersionRegistry::load(&options.versions)?;

    let report = check_toolchains(&registry, &options.codeql.program, gctx.cwd());
    print!("{}", format_report(&report, verbose));

    if !report.is_usable() {
        std::process::exit(1);
    }

    Ok(())
}
