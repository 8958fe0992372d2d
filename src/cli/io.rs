//! File and stdout handling for CLI

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Read a UTF-8 text file
pub fn read_text(path: &Path) -> CliResult<String> {
    fs::read_to_string(path)
        .map_err(|e| CliError::io_error(format!("Failed to read {}: {}", path.display(), e)))
}

/// Read a JSON file
pub fn read_json(path: &Path) -> CliResult<Value> {
    let content = read_text(path)?;
    serde_json::from_str(&content)
        .map_err(|e| CliError::io_error(format!("Invalid JSON in {}: {}", path.display(), e)))
}

/// Write a value as pretty JSON followed by a newline
pub fn write_json(out: &mut impl Write, value: &impl Serialize) -> CliResult<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// Write text, adding a trailing newline if missing
pub fn write_text(out: &mut impl Write, text: &str) -> CliResult<()> {
    out.write_all(text.as_bytes())?;
    if !text.ends_with('\n') {
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}
