//! Validation failures and the error tree they aggregate into.
//!
//! The tree mirrors the validated input:
//! - an object-shaped node is an [`ErrorMap`] keyed by child name, with `""`
//!   holding the node's own messages;
//! - every key maps to the ordered list of entries raised at that position;
//! - a per-element validator group contributes one [`ErrorEntry::Items`]
//!   entry, aligned with the list it checked (`None` for clean elements).
//!
//! Keys with no errors are omitted. On the wire a position whose only entry is
//! a per-element group is rendered as that group's aligned list, so
//! `{"values": [null, "msg", null]}` lines up with `values: [1, -2, 3]`.

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

/// Fixed message of the engine-level error that carries an error tree
pub const VALIDATION_ERROR_MESSAGE: &str = "input validation failed";

/// Errors for one object-shaped node, keyed by child name
pub type ErrorMap = IndexMap<String, Vec<ErrorEntry>>;

/// One entry at a position in the error tree
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorEntry {
    /// A single message
    Message(String),
    /// Several entries raised together for one position
    List(Vec<ErrorEntry>),
    /// Per-element results, same length as the validated list
    Items(Vec<Option<ErrorEntry>>),
    /// Per-child errors of a nested object
    Object(ErrorMap),
}

impl ErrorEntry {
    /// Collapse the entries collected for one list element into a single slot.
    pub fn collapse(mut entries: Vec<ErrorEntry>) -> Option<ErrorEntry> {
        match entries.len() {
            0 => None,
            1 => entries.pop(),
            _ => Some(ErrorEntry::List(entries)),
        }
    }

    /// Wire JSON for this entry.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Message(msg) => Value::String(msg.clone()),
            Self::List(entries) => Value::Array(entries.iter().map(Self::to_json).collect()),
            Self::Items(slots) => Value::Array(
                slots
                    .iter()
                    .map(|slot| slot.as_ref().map_or(Value::Null, Self::to_json))
                    .collect(),
            ),
            Self::Object(map) => to_json(map),
        }
    }
}

impl From<&str> for ErrorEntry {
    fn from(msg: &str) -> Self {
        Self::Message(msg.to_string())
    }
}

impl From<String> for ErrorEntry {
    fn from(msg: String) -> Self {
        Self::Message(msg)
    }
}

/// Failure raised by a value or data validator
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// One message for the current position
    #[error("{0}")]
    Message(String),

    /// Several entries for the current position
    #[error("{} validation errors", .0.len())]
    Entries(Vec<ErrorEntry>),

    /// Messages addressed to named children; `""` is the node itself
    #[error("validation errors for {}", keys(.0))]
    Keyed(ErrorMap),
}

impl ValidationError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self::Message(msg.into())
    }

    pub fn many<I, E>(entries: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<ErrorEntry>,
    {
        Self::Entries(entries.into_iter().map(Into::into).collect())
    }

    /// Start a keyed failure with one message for `key`.
    pub fn for_key(key: impl Into<String>, msg: impl Into<ErrorEntry>) -> Self {
        Self::Keyed(ErrorMap::new()).and(key, msg)
    }

    /// Add a message for `key`. Non-keyed failures are moved under `""` first.
    pub fn and(self, key: impl Into<String>, msg: impl Into<ErrorEntry>) -> Self {
        let mut map = self.into_map();
        map.entry(key.into()).or_default().push(msg.into());
        Self::Keyed(map)
    }

    /// Entries this failure contributes to its own position.
    pub fn into_entries(self) -> Vec<ErrorEntry> {
        match self {
            Self::Message(msg) => vec![ErrorEntry::Message(msg)],
            Self::Entries(entries) => entries,
            Self::Keyed(map) => vec![ErrorEntry::Object(map)],
        }
    }

    /// Normalize into a keyed map, placing positional messages under `""`.
    pub fn into_map(self) -> ErrorMap {
        match self {
            Self::Keyed(map) => map,
            other => {
                let mut map = ErrorMap::new();
                map.insert(String::new(), other.into_entries());
                map
            }
        }
    }
}

impl From<&str> for ValidationError {
    fn from(msg: &str) -> Self {
        Self::new(msg)
    }
}

impl From<String> for ValidationError {
    fn from(msg: String) -> Self {
        Self::Message(msg)
    }
}

/// Merge data-validator output into an object's error map.
pub fn merge_into(errors: &mut ErrorMap, failure: ValidationError) {
    match failure {
        ValidationError::Keyed(map) => {
            for (key, entries) in map {
                errors.entry(key).or_default().extend(entries);
            }
        }
        positional => errors
            .entry(String::new())
            .or_default()
            .extend(positional.into_entries()),
    }
}

/// Render an error map as the wire-visible JSON payload.
pub fn to_json(errors: &ErrorMap) -> Value {
    Value::Object(
        errors
            .iter()
            .map(|(key, entries)| (key.clone(), position_json(entries)))
            .collect(),
    )
}

fn position_json(entries: &[ErrorEntry]) -> Value {
    match entries {
        [group @ ErrorEntry::Items(_)] => group.to_json(),
        entries => Value::Array(entries.iter().map(ErrorEntry::to_json).collect()),
    }
}

fn keys(map: &ErrorMap) -> String {
    map.keys()
        .map(|k| if k.is_empty() { "<self>" } else { k.as_str() })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_items_serialize_aligned() {
        let mut map = ErrorMap::new();
        map.insert(
            "values".into(),
            vec![ErrorEntry::Items(vec![
                None,
                Some("Value must be greater than zero.".into()),
                None,
            ])],
        );
        assert_eq!(
            to_json(&map),
            json!({"values": [null, "Value must be greater than zero.", null]})
        );
    }

    #[test]
    fn test_group_beside_list_message_keeps_list_form() {
        let mut map = ErrorMap::new();
        map.insert(
            "values".into(),
            vec![
                "At most 5 values.".into(),
                ErrorEntry::Items(vec![None, Some("Too small.".into())]),
            ],
        );
        assert_eq!(
            to_json(&map),
            json!({"values": ["At most 5 values.", [null, "Too small."]]})
        );
    }

    #[test]
    fn test_nested_object_positions_render_the_same_way() {
        let mut inner = ErrorMap::new();
        inner.insert("tags".into(), vec![ErrorEntry::Items(vec![Some("Bad tag.".into())])]);
        let mut map = ErrorMap::new();
        map.insert("post".into(), vec![ErrorEntry::Object(inner)]);
        assert_eq!(to_json(&map), json!({"post": [{"tags": ["Bad tag."]}]}));
    }

    #[test]
    fn test_collapse() {
        assert_eq!(ErrorEntry::collapse(vec![]), None);
        assert_eq!(
            ErrorEntry::collapse(vec!["a".into()]),
            Some(ErrorEntry::Message("a".into()))
        );
        assert_eq!(
            ErrorEntry::collapse(vec!["a".into(), "b".into()]),
            Some(ErrorEntry::List(vec!["a".into(), "b".into()]))
        );
    }

    #[test]
    fn test_keyed_builder_moves_positional_under_empty_key() {
        let err = ValidationError::new("whole object is wrong").and("second", "missing");
        let map = err.into_map();
        assert_eq!(map[""], vec![ErrorEntry::from("whole object is wrong")]);
        assert_eq!(map["second"], vec![ErrorEntry::from("missing")]);
    }

    #[test]
    fn test_merge_into_extends_existing_keys() {
        let mut errors = ErrorMap::new();
        errors.insert("name".into(), vec!["too short".into()]);

        merge_into(&mut errors, ValidationError::for_key("name", "taken"));
        merge_into(&mut errors, ValidationError::many(["a", "b"]));

        assert_eq!(
            to_json(&errors),
            json!({"name": ["too short", "taken"], "": ["a", "b"]})
        );
    }
}
