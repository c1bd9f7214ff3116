//! Apply command implementation
//!
//! Reads an operations file, turns every entry into a command and applies all
//! of them to the configuration file in one pass. The configuration file is
//! written only if every operation succeeded; with `--dry-run` the result is
//! printed to stdout instead.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use creaper_offline::client::{OfflineCommand, OfflineManagementClient, OfflineOptions};
use creaper_offline::config;

/// Arguments for the apply command
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Configuration file to modify (standalone.xml or domain.xml)
    #[arg(short, long, value_name = "PATH", env = "CREAPER_OFFLINE_FILE")]
    pub file: PathBuf,

    /// Treat the file as domain.xml and operate on this profile
    #[arg(short = 'p', long, value_name = "NAME")]
    pub domain_profile: Option<String>,

    /// Print the resulting configuration instead of writing it
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,

    /// YAML operations file
    #[arg(value_name = "OPERATIONS")]
    pub operations: PathBuf,
}

/// Execute the apply command
pub fn execute(args: ApplyArgs) -> Result<()> {
    if !args.operations.exists() {
        anyhow::bail!("Operations file not found: {}", args.operations.display());
    }

    let schema = config::from_file(&args.operations).with_context(|| {
        format!(
            "Failed to load operations from {}",
            args.operations.display()
        )
    })?;
    let commands = schema
        .into_iter()
        .map(|operation| operation.into_command())
        .collect::<creaper_offline::error::Result<Vec<_>>>()?;

    let options = match &args.domain_profile {
        Some(profile) => OfflineOptions::domain(profile.as_str()),
        None => OfflineOptions::standalone(),
    }
    .configuration_file(&args.file)
    .build()?;
    let client = OfflineManagementClient::new(options);

    let commands = commands.iter().map(|command| command.as_ref() as &dyn OfflineCommand);
    if args.dry_run {
        let rendered = client.render(commands)?;
        print!("{}", rendered);
        return Ok(());
    }

    client.apply_all(commands)?;
    if !args.quiet {
        println!("Updated {}", args.file.display());
    }
    Ok(())
}
