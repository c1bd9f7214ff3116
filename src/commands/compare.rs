//! # Compare Command Implementation
//!
//! Compares two XML files structurally: element names, attribute sets, text
//! and child order must match, whitespace and attribute order do not matter.
//! Exits with status 0 when the files are identical and fails with the first
//! difference otherwise.

use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;

use creaper_offline::compare::first_difference;

/// Compare two XML files structurally
#[derive(Args, Debug)]
pub struct CompareArgs {
    /// The expected document
    #[arg(value_name = "EXPECTED")]
    pub expected: PathBuf,

    /// The document to check
    #[arg(value_name = "ACTUAL")]
    pub actual: PathBuf,
}

/// Execute the `compare` command.
pub fn execute(args: CompareArgs) -> Result<()> {
    let expected = fs::read_to_string(&args.expected)
        .with_context(|| format!("Failed to read {}", args.expected.display()))?;
    let actual = fs::read_to_string(&args.actual)
        .with_context(|| format!("Failed to read {}", args.actual.display()))?;

    match first_difference(&expected, &actual)? {
        None => {
            println!("Documents are identical.");
            Ok(())
        }
        Some(difference) => Err(anyhow::anyhow!("Documents differ at {}", difference)),
    }
}
