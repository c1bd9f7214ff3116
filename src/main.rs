//! # Offline Configuration CLI
//!
//! This is the binary entry point for the `creaper-offline` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Initialising logging from the global `--log-level` option.
//! - Executing the appropriate command and turning library errors into
//!   user-facing messages and a non-zero exit status.
//!
//! The core logic lives in the `creaper_offline` library crate; the binary is a
//! thin wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
