//! Assertions for executing operations in tests
//!
//! Each helper executes a request and checks the shape of the result,
//! returning the interesting part on success and an [`ExpectError`]
//! describing the mismatch otherwise.

use serde_json::Value;
use thiserror::Error;

use crate::validation::VALIDATION_ERROR_MESSAGE;

use super::executor::{ExecuteRequest, Executable, ExecutionError};

#[derive(Debug, Error)]
pub enum ExpectError {
    #[error("expected no errors, got: {}", messages(.0))]
    UnexpectedErrors(Vec<ExecutionError>),

    #[error("expected errors, got data: {data}")]
    NoErrors { data: Value },

    #[error("expected exactly one error, got {count}: {}", messages(.errors))]
    ErrorCount {
        count: usize,
        errors: Vec<ExecutionError>,
    },

    #[error("expected error message '{expected}', got '{actual}'")]
    Message { expected: String, actual: String },

    #[error("expected validation errors {expected}, got {}", optional(.actual))]
    Extensions {
        expected: Value,
        actual: Option<Value>,
    },
}

fn messages(errors: &[ExecutionError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

fn optional(value: &Option<Value>) -> String {
    value
        .as_ref()
        .map(Value::to_string)
        .unwrap_or_else(|| "none".to_string())
}

/// Execute and return the data, failing on any error.
pub async fn expect_data(
    executable: &Executable,
    request: ExecuteRequest,
) -> Result<Value, ExpectError> {
    let result = executable.execute(request).await;
    if !result.errors.is_empty() {
        return Err(ExpectError::UnexpectedErrors(result.errors));
    }
    Ok(result.data)
}

/// Execute and return the errors, failing if there were none.
pub async fn expect_errors(
    executable: &Executable,
    request: ExecuteRequest,
) -> Result<Vec<ExecutionError>, ExpectError> {
    let result = executable.execute(request).await;
    if result.errors.is_empty() {
        return Err(ExpectError::NoErrors { data: result.data });
    }
    Ok(result.errors)
}

/// Execute and expect a single error with the given message.
pub async fn expect_error(
    executable: &Executable,
    request: ExecuteRequest,
    message: &str,
) -> Result<ExecutionError, ExpectError> {
    let mut errors = expect_errors(executable, request).await?;
    if errors.len() != 1 {
        return Err(ExpectError::ErrorCount {
            count: errors.len(),
            errors,
        });
    }
    let error = errors.remove(0);
    if error.message != message {
        return Err(ExpectError::Message {
            expected: message.to_string(),
            actual: error.message,
        });
    }
    Ok(error)
}

/// Execute and expect a single validation failure carrying `expected` as its
/// error tree.
pub async fn expect_validation_error(
    executable: &Executable,
    request: ExecuteRequest,
    expected: Value,
) -> Result<(), ExpectError> {
    let error = expect_error(executable, request, VALIDATION_ERROR_MESSAGE).await?;
    if error.extensions.as_ref() != Some(&expected) {
        return Err(ExpectError::Extensions {
            expected,
            actual: error.extensions,
        });
    }
    Ok(())
}
