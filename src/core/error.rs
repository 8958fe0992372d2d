//! Field Error Types
//!
//! Errors raised while a single field runs through its pipeline.

use serde_json::Value;
use thiserror::Error;

use crate::schema::SchemaError;
use crate::validation::{ErrorMap, ValidationError, VALIDATION_ERROR_MESSAGE};

/// Field resolution result type
pub type FieldResult<T> = Result<T, FieldError>;

/// Error produced by one field's pipeline
#[derive(Debug, Clone, Error)]
pub enum FieldError {
    /// Aggregated validation or pre-check failure for the field's input
    #[error("{}", VALIDATION_ERROR_MESSAGE)]
    Validation(ErrorMap),

    /// Schema misconfiguration only detectable with a concrete value
    #[error(transparent)]
    Config(#[from] SchemaError),

    /// Any other failure raised by a pre-check or resolver
    #[error("{message}")]
    Resolver {
        message: String,
        extensions: Option<Value>,
    },
}

impl FieldError {
    /// Create a resolver error
    pub fn new(message: impl Into<String>) -> Self {
        Self::Resolver {
            message: message.into(),
            extensions: None,
        }
    }

    /// Attach a structured payload to a resolver error
    pub fn with_extensions(self, extensions: Value) -> Self {
        match self {
            Self::Resolver { message, .. } => Self::Resolver {
                message,
                extensions: Some(extensions),
            },
            other => other,
        }
    }

    /// Get error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::Config(err) => err.code(),
            Self::Resolver { .. } => "RESOLVER_ERROR",
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Structured payload surfaced next to the message
    pub fn payload(&self) -> Option<Value> {
        match self {
            Self::Validation(errors) => Some(crate::validation::to_json(errors)),
            Self::Config(_) => None,
            Self::Resolver { extensions, .. } => extensions.clone(),
        }
    }
}

impl From<ValidationError> for FieldError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.into_map())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validation_error_payload_uses_empty_key() {
        let err = FieldError::from(ValidationError::new("Not allowed."));
        assert!(err.is_validation());
        assert_eq!(err.to_string(), VALIDATION_ERROR_MESSAGE);
        assert_eq!(err.payload(), Some(json!({"": ["Not allowed."]})));
    }

    #[test]
    fn test_keyed_validation_error_payload() {
        let err = FieldError::from(ValidationError::for_key("second", "required"));
        assert_eq!(err.payload(), Some(json!({"second": ["required"]})));
    }

    #[test]
    fn test_resolver_error() {
        let err = FieldError::new("boom").with_extensions(json!({"retry": false}));
        assert_eq!(err.code(), "RESOLVER_ERROR");
        assert_eq!(err.to_string(), "boom");
        assert_eq!(err.payload(), Some(json!({"retry": false})));
    }
}
