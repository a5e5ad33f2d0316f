//! `sitebuild` command-line entry point.
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

mod bundle;
mod cli;
mod commands;
mod config;
mod error;
mod exec;
mod logging;
mod tasks;

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();

    match args.command {
        cli::Command::Run(opts) => {
            logging::init_subscriber(args.verbose, "run", logging::supports_color());
            let log = Arc::new(logging::Logger::new("run"));
            commands::run::run(&args.global, &opts, &log)
        }
        cli::Command::List => commands::list::run(),
        cli::Command::Version => {
            commands::version::run();
            Ok(())
        }
    }
}
