//! Built-in and default scalars
//!
//! The five GraphQL scalars are provided by the execution engine and can never
//! be redefined. `DateTime` and `JSON` are registered in every new schema and
//! may be replaced by an application scalar of the same name.

use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;

use super::types::Scalar;

/// Scalars every GraphQL schema has
pub const BUILTIN_SCALARS: [&str; 5] = ["String", "Int", "Float", "Boolean", "ID"];

pub fn is_builtin(name: &str) -> bool {
    BUILTIN_SCALARS.contains(&name)
}

pub fn builtins() -> Vec<Scalar> {
    BUILTIN_SCALARS.iter().map(|name| Scalar::new(*name)).collect()
}

/// Default extra scalars, overridable by the application
pub fn defaults() -> Vec<Scalar> {
    vec![date_time(), json()]
}

/// ISO 8601 date and time. Values without an offset are taken as UTC.
pub fn date_time() -> Scalar {
    Scalar::new("DateTime")
        .description("An ISO 8601 formatted date and time. Values without an offset are UTC.")
        .specified_by("https://datatracker.ietf.org/doc/html/rfc3339")
        .check(accepts_date_time)
}

/// Any JSON value
pub fn json() -> Scalar {
    Scalar::new("JSON").description("An arbitrary JSON value.")
}

fn is_date_time(text: &str) -> bool {
    DateTime::parse_from_rfc3339(text).is_ok()
        || NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f").is_ok()
}

/// Whether `value` is accepted by the default `DateTime` scalar.
pub fn accepts_date_time(value: &Value) -> bool {
    value.as_str().is_some_and(is_date_time)
}
