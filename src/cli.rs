//! Command-line interface definition.
use clap::{Parser, Subcommand};

use crate::config::Mode;

/// Top-level CLI entry point for the site build runner.
#[derive(Parser, Debug)]
#[command(
    name = "sitebuild",
    about = "Build runner for static front-end projects",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Preview work without writing files or spawning tools
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Override the project root directory
    #[arg(long, global = true)]
    pub root: Option<std::path::PathBuf>,

    /// Run parallel groups one member at a time (parallel is enabled by default)
    #[arg(long = "no-parallel", global = true, action = clap::ArgAction::SetFalse)]
    pub parallel: bool,

    /// Bundle mode (defaults to development when NODE_ENV=development, else production)
    #[arg(long, global = true, value_enum)]
    pub mode: Option<Mode>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one or more named tasks in order
    Run(RunOpts),
    /// List the available tasks
    List,
    /// Print version information
    Version,
}

/// Options for the `run` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct RunOpts {
    /// Task names, e.g. `all` or `clean build:tpl`
    #[arg(required = true)]
    pub tasks: Vec<String>,
}
