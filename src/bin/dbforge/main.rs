//! dbforge CLI - batch CodeQL database creation

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging; stdout is reserved for JSON and listings
    let filter = if cli.global.verbose {
        EnvFilter::new("dbforge=debug")
    } else if cli.global.quiet {
        EnvFilter::new("dbforge=error")
    } else {
        EnvFilter::new("dbforge=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    // Execute command
    match cli.command {
        Commands::Create(args) => commands::create::execute(args, &cli.global),
        Commands::Projects(args) => commands::projects::execute(args),
        Commands::Toolchain(args) => commands::toolchain::execute(args, &cli.global),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
