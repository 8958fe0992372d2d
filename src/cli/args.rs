//! CLI argument definitions using clap
//!
//! Commands:
//! - schemaforge check <schema>
//! - schemaforge print <schema>
//! - schemaforge execute <schema> --query <file> [--root <file>] [--variables <file>]
//!
//! `<schema>` is a definition document or a directory of them.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// schemaforge - build, check and run GraphQL schemas from definition documents
#[derive(Parser, Debug)]
#[command(name = "schemaforge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Write logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Finalize a schema and report every configuration error
    Check {
        /// Definition document or directory
        schema: PathBuf,
    },

    /// Print a schema as GraphQL SDL
    Print {
        /// Definition document or directory
        schema: PathBuf,
    },

    /// Execute one operation against a JSON root value
    Execute {
        /// Definition document or directory
        schema: PathBuf,

        /// File holding the GraphQL operation
        #[arg(long)]
        query: PathBuf,

        /// JSON file used as the root value
        #[arg(long)]
        root: Option<PathBuf>,

        /// JSON file holding the operation variables
        #[arg(long)]
        variables: Option<PathBuf>,

        /// Operation to run when the document has several
        #[arg(long)]
        operation: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
