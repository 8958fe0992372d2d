//! GraphQL name grammar

use std::sync::OnceLock;

use regex::Regex;

use super::errors::SchemaError;

const NAME_PATTERN: &str = "^[_A-Za-z][_0-9A-Za-z]*$";

/// Names the schema owns for its root objects
pub const ROOT_NAMES: [&str; 2] = ["Query", "Mutation"];

fn pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(NAME_PATTERN).ok()).as_ref()
}

/// Whether `name` is a valid, non-reserved GraphQL name.
pub fn is_valid(name: &str) -> bool {
    !name.starts_with("__") && pattern().is_some_and(|re| re.is_match(name))
}

pub fn check(location: &str, name: &str) -> Result<(), SchemaError> {
    if is_valid(name) {
        Ok(())
    } else {
        Err(SchemaError::InvalidName {
            location: location.to_string(),
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert!(is_valid("User"));
        assert!(is_valid("_private"));
        assert!(is_valid("field_2"));
        assert!(!is_valid("2fast"));
        assert!(!is_valid("with-dash"));
        assert!(!is_valid(""));
        assert!(!is_valid("__Type"));
    }

    #[test]
    fn test_check_reports_location() {
        let err = check("User.first-name", "first-name").unwrap_err();
        assert_eq!(err.code(), "SCHEMA_INVALID_NAME");
        assert!(err.to_string().contains("User.first-name"));
    }
}
