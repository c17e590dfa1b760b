//! CLI module for strictrecord
//!
//! Provides command-line interface for:
//! - check: Validate a JSON document against a declared record type
//! - list: Show declared record types

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check, check_document, describe_types, list, run, run_command, Config};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, write_error, write_response};
