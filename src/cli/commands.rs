//! CLI command implementations
//!
//! Every command loads the definition documents, finalizes the schema and
//! reports all configuration errors at once when that fails. Output goes to
//! the writer passed in; logs go to stderr.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::core::{Output, RequestContext, ResolverStyle};
use crate::engine::{ExecuteRequest, Executable};
use crate::logging;
use crate::schema::{Schema, SchemaConfig, SchemaError, SchemaLoader, SchemaResult};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{read_json, read_text, write_json, write_text};

/// Configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Settings passed to every schema built by the CLI
    #[serde(flatten)]
    pub schema: SchemaConfig,

    /// Write logs as JSON lines
    pub log_json: bool,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))
    }
}

/// Main CLI entry point
///
/// Parses arguments, installs logging and dispatches to the command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Err(e) = logging::init(cli.log_json || config.log_json) {
        eprintln!("{}", e);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_command(&config, cli.command, &mut out)
}

/// Run the appropriate command based on CLI args
pub fn run_command(config: &Config, cmd: Command, out: &mut impl Write) -> CliResult<()> {
    match cmd {
        Command::Check { schema } => check(config, &schema, out),
        Command::Print { schema } => print(config, &schema, out),
        Command::Execute {
            schema,
            query,
            root,
            variables,
            operation,
        } => execute(
            config,
            &schema,
            &query,
            root.as_deref(),
            variables.as_deref(),
            operation,
            out,
        ),
    }
}

/// Finalize a schema and report the outcome
pub fn check(config: &Config, schema_path: &Path, out: &mut impl Write) -> CliResult<()> {
    let executable = finalize(config, schema_path, out)?;
    let graph = executable.graph();
    write_text(
        out,
        &format!(
            "ok: {} types, {} reachable",
            graph.types().count(),
            graph.reachable().count()
        ),
    )
}

/// Print the schema as SDL
pub fn print(config: &Config, schema_path: &Path, out: &mut impl Write) -> CliResult<()> {
    let executable = finalize(config, schema_path, out)?;
    write_text(out, &executable.sdl())
}

/// Execute one operation with item-style resolvers over a JSON root
pub fn execute(
    config: &Config,
    schema_path: &Path,
    query_path: &Path,
    root_path: Option<&Path>,
    variables_path: Option<&Path>,
    operation: Option<String>,
    out: &mut impl Write,
) -> CliResult<()> {
    let config = Config {
        schema: config
            .schema
            .clone()
            .with_default_resolver(ResolverStyle::Item),
        ..config.clone()
    };
    let executable = finalize(&config, schema_path, out)?;

    let mut request = ExecuteRequest::new(read_text(query_path)?).context(RequestContext::new());
    if let Some(path) = root_path {
        request = request.root(Output::from(read_json(path)?));
    }
    if let Some(path) = variables_path {
        request = request.variables(read_json(path)?);
    }
    if let Some(name) = operation {
        request = request.operation(name);
    }

    let rt = tokio::runtime::Runtime::new().map_err(|e| {
        CliError::execution_failed(format!("Failed to create tokio runtime: {}", e))
    })?;
    let result = rt.block_on(executable.execute(request));
    if !result.is_ok() {
        warn!(errors = result.errors.len(), "operation finished with errors");
    }
    write_json(out, &result)
}

/// Load and finalize the schema at `path`, writing every configuration
/// error to `out` on failure.
fn finalize(config: &Config, path: &Path, out: &mut impl Write) -> CliResult<Arc<Executable>> {
    let result = load_schema(config, path).and_then(|mut schema| schema.finalize());
    match result {
        Ok(executable) => {
            info!(path = %path.display(), "schema finalized");
            Ok(executable)
        }
        Err(err) => {
            let issues: Vec<&SchemaError> = err.iter().collect();
            for issue in &issues {
                error!(code = issue.code(), "{}", issue);
                write_text(out, &format!("{}: {}", issue.code(), issue))?;
            }
            Err(CliError::invalid_schema(issues.len()))
        }
    }
}

fn load_schema(config: &Config, path: &Path) -> SchemaResult<Schema> {
    let loader = SchemaLoader::new(config.schema.clone());
    if path.is_dir() {
        loader.load_dir(path)
    } else {
        loader.load_path(path)
    }
}
