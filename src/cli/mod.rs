//! CLI module for schemaforge
//!
//! Provides command-line interface for:
//! - check: Finalize a schema and list every configuration error
//! - print: Print the schema as SDL
//! - execute: Run one operation against a JSON root value

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check, execute, print, run, run_command, Config};
pub use errors::{CliError, CliErrorCode, CliResult};
