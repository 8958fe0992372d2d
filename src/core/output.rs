//! Resolver output values
//!
//! Resolvers return an [`Output`]: plain JSON, an application object exposing
//! attributes, or a list of either. Nested object fields are resolved against
//! the parent output by the field's resolver.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// JSON key naming the concrete type of an object behind a union or interface
pub const TYPENAME_KEY: &str = "__typename";

/// Attribute-style access to an application object
pub trait Attributes: Send + Sync {
    /// Value of the named attribute, `None` if the object has no such attribute.
    fn attribute(&self, name: &str) -> Option<Output>;

    /// Concrete object type name, used when the field is a union or interface.
    fn type_name(&self) -> Option<&str> {
        None
    }
}

/// Value produced by a resolver
#[derive(Clone, Default)]
pub enum Output {
    #[default]
    Null,
    Value(Value),
    Object(Arc<dyn Attributes>),
    List(Vec<Output>),
}

impl Output {
    pub fn object(object: impl Attributes + 'static) -> Self {
        Self::Object(Arc::new(object))
    }

    pub fn list(items: impl IntoIterator<Item = impl Into<Output>>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null | Self::Value(Value::Null))
    }

    /// Concrete type name for abstract-type resolution.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::Object(object) => object.type_name(),
            Self::Value(Value::Object(map)) => map.get(TYPENAME_KEY).and_then(Value::as_str),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null | Self::Value(Value::Null) => "null",
            Self::Value(Value::Object(_)) => "JSON object",
            Self::Value(Value::Array(_)) => "JSON array",
            Self::Value(_) => "scalar",
            Self::Object(_) => "attribute object",
            Self::List(_) => "list",
        }
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Object(object) => {
                write!(f, "Object({})", object.type_name().unwrap_or("<anonymous>"))
            }
            Self::List(items) => f.debug_tuple("List").field(items).finish(),
        }
    }
}

impl From<Value> for Output {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            other => Self::Value(other),
        }
    }
}

impl From<&str> for Output {
    fn from(value: &str) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<String> for Output {
    fn from(value: String) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<i64> for Output {
    fn from(value: i64) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<f64> for Output {
    fn from(value: f64) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<bool> for Output {
    fn from(value: bool) -> Self {
        Self::Value(Value::from(value))
    }
}

impl<T: Into<Output>> From<Option<T>> for Output {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Post;

    impl Attributes for Post {
        fn attribute(&self, name: &str) -> Option<Output> {
            (name == "title").then(|| Output::from("Hello"))
        }

        fn type_name(&self) -> Option<&str> {
            Some("Post")
        }
    }

    #[test]
    fn test_type_name_from_object_or_json() {
        assert_eq!(Output::object(Post).type_name(), Some("Post"));
        assert_eq!(
            Output::from(json!({"__typename": "User", "id": 1})).type_name(),
            Some("User")
        );
        assert_eq!(Output::from(json!({"id": 1})).type_name(), None);
    }

    #[test]
    fn test_null_conversions() {
        assert!(Output::from(Value::Null).is_null());
        assert!(Output::from(None::<i64>).is_null());
        assert!(!Output::from(Some(1i64)).is_null());
        assert_eq!(Output::list(["a", "b"]).kind(), "list");
    }
}
