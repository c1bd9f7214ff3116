//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Creaper Offline - Edit server configuration files without a running server
#[derive(Parser, Debug)]
#[command(name = "creaper-offline")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        default_value = "warn",
        env = "CREAPER_OFFLINE_LOG"
    )]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply an operations file to a configuration file
    Apply(commands::apply::ApplyArgs),

    /// Compare two XML files structurally
    Compare(commands::compare::CompareArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level)?;

        match self.command {
            Commands::Apply(args) => commands::apply::execute(args),
            Commands::Compare(args) => commands::compare::execute(args),
        }
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter: log::LevelFilter = level
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid log level '{}'", level))?;
    env_logger::Builder::new()
        .filter_level(filter)
        .format_timestamp(None)
        .format_target(false)
        .try_init()
        .ok();
    Ok(())
}
