//! Configuration error types
//!
//! Every error here is fatal: it is raised while building or finalizing a
//! schema and never reaches an operation result. Finalization collects all
//! problems it can find before failing so one fix-and-retry cycle suffices.
//!
//! Error codes:
//! - SCHEMA_DUPLICATE_TYPE
//! - SCHEMA_INVALID_NAME
//! - SCHEMA_INVALID_TYPE_EXPRESSION
//! - SCHEMA_UNRESOLVED_TYPES
//! - SCHEMA_KIND_MISMATCH
//! - SCHEMA_VALIDATOR_DEPTH
//! - SCHEMA_LOCKED
//! - SCHEMA_BUILTIN
//! - SCHEMA_UNKNOWN_TYPE
//! - SCHEMA_MALFORMED
//! - SCHEMA_ENGINE_REJECTED
//! - SCHEMA_MULTIPLE

use thiserror::Error;

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Configuration errors raised while building, resolving or locking a schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Two different definitions claim the same name
    #[error("Type '{name}' is defined more than once")]
    DuplicateType { name: String },

    /// Name does not match the GraphQL name grammar
    #[error("'{name}' is not a valid GraphQL name (at {location})")]
    InvalidName { location: String, name: String },

    /// Type expression string could not be parsed
    #[error("Invalid type expression '{expression}' at {location}: {reason}")]
    InvalidTypeExpression {
        location: String,
        expression: String,
        reason: String,
    },

    /// Names referenced somewhere in the graph with no definition
    #[error(
        "Could not find definitions for the following type names: {}. All types must be defined somewhere in the graph, or added to the schema.",
        quote_names(.names)
    )]
    UnresolvedTypes { names: Vec<String> },

    /// A name resolved to a type that cannot be used in that position
    #[error("Type '{name}' at {location} must be {expected}")]
    KindMismatch {
        location: String,
        name: String,
        expected: &'static str,
    },

    /// Validator nesting is deeper than the list nesting it is applied to
    #[error(
        "Validators at {location} are nested {spec_depth} levels deep, but only {list_depth} list levels are available"
    )]
    ValidatorDepth {
        location: String,
        spec_depth: usize,
        list_depth: usize,
    },

    /// Mutation attempted after finalization
    #[error("Cannot {operation}: the schema is finalized and locked")]
    Locked { operation: String },

    /// Built-in scalars cannot be removed or redefined
    #[error("Built-in scalar '{name}' cannot be removed or redefined")]
    Builtin { name: String },

    /// Lookup of a name that is not registered
    #[error("Type '{name}' is not defined in the schema")]
    UnknownType { name: String },

    /// Schema definition document could not be read
    #[error("Malformed schema definition '{origin}': {reason}")]
    Malformed { origin: String, reason: String },

    /// The execution engine refused the exported schema
    #[error("Execution engine rejected the schema: {0}")]
    Engine(String),

    /// Every problem found in one finalization pass
    #[error("{} schema configuration errors:\n{}", .0.len(), list_errors(.0))]
    Multiple(Vec<SchemaError>),
}

impl SchemaError {
    /// Create a locked-schema error for the named operation
    pub fn locked(operation: impl Into<String>) -> Self {
        Self::Locked {
            operation: operation.into(),
        }
    }

    /// Create a malformed-definition error
    pub fn malformed(origin: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            origin: origin.into(),
            reason: reason.into(),
        }
    }

    /// Collapse a list of errors into one, unwrapping the single-error case.
    pub fn from_errors(mut errors: Vec<SchemaError>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Self::Multiple(errors)),
        }
    }

    /// Returns the string code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateType { .. } => "SCHEMA_DUPLICATE_TYPE",
            Self::InvalidName { .. } => "SCHEMA_INVALID_NAME",
            Self::InvalidTypeExpression { .. } => "SCHEMA_INVALID_TYPE_EXPRESSION",
            Self::UnresolvedTypes { .. } => "SCHEMA_UNRESOLVED_TYPES",
            Self::KindMismatch { .. } => "SCHEMA_KIND_MISMATCH",
            Self::ValidatorDepth { .. } => "SCHEMA_VALIDATOR_DEPTH",
            Self::Locked { .. } => "SCHEMA_LOCKED",
            Self::Builtin { .. } => "SCHEMA_BUILTIN",
            Self::UnknownType { .. } => "SCHEMA_UNKNOWN_TYPE",
            Self::Malformed { .. } => "SCHEMA_MALFORMED",
            Self::Engine(_) => "SCHEMA_ENGINE_REJECTED",
            Self::Multiple(_) => "SCHEMA_MULTIPLE",
        }
    }

    /// Iterate over the individual errors, flattening `Multiple`.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &SchemaError> + '_> {
        match self {
            Self::Multiple(errors) => Box::new(errors.iter().flat_map(|e| e.iter())),
            other => Box::new(std::iter::once(other)),
        }
    }

    /// Names reported as unresolved, empty if this error has none.
    pub fn unresolved_names(&self) -> Vec<&str> {
        self.iter()
            .filter_map(|e| match e {
                Self::UnresolvedTypes { names } => Some(names.iter().map(String::as_str)),
                _ => None,
            })
            .flatten()
            .collect()
    }
}

fn quote_names(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("'{}'", n))
        .collect::<Vec<_>>()
        .join(", ")
}

fn list_errors(errors: &[SchemaError]) -> String {
    errors
        .iter()
        .map(|e| format!("  [{}] {}", e.code(), e))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_message_lists_every_name() {
        let err = SchemaError::UnresolvedTypes {
            names: vec!["User".into(), "UserInput".into()],
        };
        assert!(err
            .to_string()
            .contains("type names: 'User', 'UserInput'."));
        assert_eq!(err.code(), "SCHEMA_UNRESOLVED_TYPES");
    }

    #[test]
    fn test_from_errors_unwraps_single() {
        assert!(SchemaError::from_errors(vec![]).is_none());

        let single = SchemaError::from_errors(vec![SchemaError::locked("add type")]).unwrap();
        assert_eq!(single.code(), "SCHEMA_LOCKED");

        let many = SchemaError::from_errors(vec![
            SchemaError::DuplicateType { name: "A".into() },
            SchemaError::UnresolvedTypes {
                names: vec!["Ghost".into()],
            },
        ])
        .unwrap();
        assert_eq!(many.code(), "SCHEMA_MULTIPLE");
        assert_eq!(many.iter().count(), 2);
        assert_eq!(many.unresolved_names(), vec!["Ghost"]);
    }

    #[test]
    fn test_multiple_display_includes_codes() {
        let err = SchemaError::Multiple(vec![
            SchemaError::DuplicateType { name: "A".into() },
            SchemaError::locked("add field"),
        ]);
        let display = err.to_string();
        assert!(display.starts_with("2 schema configuration errors"));
        assert!(display.contains("[SCHEMA_DUPLICATE_TYPE]"));
        assert!(display.contains("[SCHEMA_LOCKED]"));
    }
}
