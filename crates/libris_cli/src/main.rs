//! `libris` command-line entry point.
//!
//! # Responsibility
//! - Parse arguments and resolve the archive location.
//! - Start file logging when a log directory is given.

use clap::Parser;

mod cli;
mod commands;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    commands::run_command(cli)
}
