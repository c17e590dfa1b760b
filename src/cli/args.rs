//! CLI argument definitions using clap
//!
//! Commands:
//! - strictrecord check --config <path> --type <Name>
//! - strictrecord list --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// strictrecord - validate JSON documents against declared record types
#[derive(Parser, Debug)]
#[command(name = "strictrecord")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate one JSON document from stdin and print its canonical form
    Check {
        /// Path to configuration file
        #[arg(long, default_value = "./strictrecord.json")]
        config: PathBuf,

        /// Record type to validate against
        #[arg(long = "type", value_name = "NAME")]
        type_name: String,
    },

    /// List declared record types and their fields
    List {
        /// Path to configuration file
        #[arg(long, default_value = "./strictrecord.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
