//! CLI command implementations
//!
//! Every command loads the configuration file, installs logging, loads the
//! schema directory, then does its work against the loaded registry.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use crate::record::RecordType;
use crate::schema::SchemaLoader;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_error, write_response};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory of `*.json` schema declarations (required). Relative paths
    /// resolve against the configuration file's directory.
    pub schema_dir: PathBuf,

    /// tracing filter directive (optional, default "warn"). `RUST_LOG`
    /// takes precedence when set.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String {
    "warn".to_string()
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let mut config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        if config.schema_dir.is_relative() {
            if let Some(base) = path.parent() {
                config.schema_dir = base.join(&config.schema_dir);
            }
        }
        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.schema_dir.as_os_str().is_empty() {
            return Err(CliError::config_error("schema_dir must not be empty"));
        }
        if EnvFilter::try_new(&self.log_filter).is_err() {
            return Err(CliError::config_error(format!(
                "Invalid log_filter: '{}'",
                self.log_filter
            )));
        }
        Ok(())
    }

    /// Build the schema registry from `schema_dir`
    pub fn load_schemas(&self) -> CliResult<SchemaLoader> {
        let mut loader = SchemaLoader::new();
        loader
            .load_dir(&self.schema_dir)
            .map_err(|e| CliError::schema_error(&e))?;
        Ok(loader)
    }
}

/// Install a stderr subscriber. A second call is a no-op.
fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Main CLI entry point
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Check { config, type_name } => check(&config, &type_name),
        Command::List { config } => list(&config),
    }
}

/// Validate one document from stdin against `type_name`.
///
/// Rejections are reported on stdout as an error response carrying the
/// validation code, and also returned so the process exits non-zero.
pub fn check(config_path: &Path, type_name: &str) -> CliResult<()> {
    let config = Config::load(config_path)?;
    init_logging(&config);
    let loader = config.load_schemas()?;

    let document = read_request()?;
    match check_document(&loader, type_name, &document) {
        Ok(canonical) => write_response(canonical),
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}

/// Deserialize `document` as `type_name` and return its canonical plain form.
pub fn check_document(
    loader: &SchemaLoader,
    type_name: &str,
    document: &Value,
) -> CliResult<Value> {
    let record_type = loader
        .get(type_name)
        .ok_or_else(|| CliError::unknown_type(type_name))?;

    let record = record_type.deserialize(document).map_err(|e| {
        warn!(record = type_name, code = e.code().code(), path = e.path(), "document rejected");
        CliError::rejected(&e)
    })?;
    debug!(record = type_name, "document accepted");

    record.serialize().map_err(|e| CliError::rejected(&e))
}

/// Print every declared record type.
pub fn list(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    init_logging(&config);
    let loader = config.load_schemas()?;
    write_response(describe_types(&loader))
}

/// Describe the registry as `[{name, extends, fields: [{name, type, nullable}]}]`.
pub fn describe_types(loader: &SchemaLoader) -> Value {
    let types: Vec<Value> = loader
        .names()
        .filter_map(|name| loader.get(name))
        .map(describe_type)
        .collect();
    Value::Array(types)
}

fn describe_type(record_type: &RecordType) -> Value {
    let fields: Vec<Value> = record_type
        .fields()
        .iter()
        .map(|field| {
            json!({
                "name": field.name(),
                "type": field.descriptor().type_name(),
                "nullable": field.descriptor().is_nullable(),
            })
        })
        .collect();
    json!({
        "name": record_type.name(),
        "description": record_type.description(),
        "extends": record_type.parent().map(RecordType::name),
        "fields": fields,
    })
}
