//! CLI definitions using clap.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};

use dbforge::util::shell::{ColorChoice, Shell};

/// dbforge - batch CodeQL database creation for Java projects
#[derive(Parser)]
#[command(name = "dbforge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags accepted by every subcommand.
#[derive(Args)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,
}

impl GlobalArgs {
    /// Build the output shell for a command.
    pub fn shell(&self, json: bool) -> Arc<Shell> {
        Arc::new(Shell::from_flags(self.quiet, self.verbose, self.color, json))
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create CodeQL databases for eligible projects
    Create(CreateArgs),

    /// List the merged, eligible project set
    Projects(ProjectsArgs),

    /// Inspect the toolchain version registry
    Toolchain(ToolchainArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Output format for `create`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MessageFormat {
    /// Status lines and a summary on stderr
    Human,
    /// Newline-delimited JSON events on stdout
    Json,
}

/// Where the build-info tables live.
#[derive(Args)]
pub struct BuildInfoArgs {
    /// Global build-info CSV (required to exist)
    #[arg(long, env = "DBFORGE_BUILD_INFO")]
    pub build_info: Option<PathBuf>,

    /// Local override CSV (may be absent)
    #[arg(long, env = "DBFORGE_LOCAL_BUILD_INFO")]
    pub local_build_info: Option<PathBuf>,
}

/// Where the version registry and the CodeQL CLI live.
#[derive(Args)]
pub struct RegistryArgs {
    /// Version registry file (JSON, or TOML by extension)
    #[arg(long, env = "DBFORGE_VERSIONS")]
    pub versions: Option<PathBuf>,

    /// CodeQL CLI program
    #[arg(long, env = "DBFORGE_CODEQL")]
    pub codeql: Option<PathBuf>,
}

#[derive(Args)]
pub struct CreateArgs {
    /// Only create the database for this project id
    #[arg(short, long)]
    pub project: Option<String>,

    #[command(flatten)]
    pub inputs: BuildInfoArgs,

    #[command(flatten)]
    pub registry: RegistryArgs,

    /// Database output directory
    #[arg(long, env = "DBFORGE_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Project sources directory
    #[arg(long, env = "DBFORGE_SOURCES_PATH")]
    pub sources_path: Option<PathBuf>,

    /// Number of projects to build concurrently
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value_t = MessageFormat::Human)]
    pub message_format: MessageFormat,

    /// Write the batch report as JSON to this file
    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(Args)]
pub struct ProjectsArgs {
    #[command(flatten)]
    pub inputs: BuildInfoArgs,

    /// Print the project set as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ToolchainArgs {
    #[command(subcommand)]
    pub command: ToolchainCommands,
}

#[derive(Subcommand)]
pub enum ToolchainCommands {
    /// Show registered versions by category
    Show(RegistryArgs),

    /// Check that registered install roots are usable
    Check(RegistryArgs),
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
