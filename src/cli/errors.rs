//! CLI-specific error types

use std::fmt;
use std::io;

use crate::schema::SchemaError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// File or stdout I/O error
    IoError,
    /// Schema definition could not be built or finalized
    InvalidSchema,
    /// Operation could not be executed
    ExecutionFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "SCHEMAFORGE_CLI_CONFIG_ERROR",
            Self::IoError => "SCHEMAFORGE_CLI_IO_ERROR",
            Self::InvalidSchema => "SCHEMAFORGE_CLI_INVALID_SCHEMA",
            Self::ExecutionFailed => "SCHEMAFORGE_CLI_EXECUTION_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Schema rejected with `count` configuration errors
    pub fn invalid_schema(count: usize) -> Self {
        Self::new(
            CliErrorCode::InvalidSchema,
            format!("schema has {} configuration error(s)", count),
        )
    }

    pub fn execution_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ExecutionFailed, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<SchemaError> for CliError {
    fn from(e: SchemaError) -> Self {
        Self::new(CliErrorCode::InvalidSchema, e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
