//! Validator Tree Tests
//!
//! The error tree for a field call must mirror the shape of its input:
//! - value validators collect messages at their own position
//! - per-element groups produce lists aligned with the validated list
//! - data validators address children by name, `""` for the node itself
//! - nested input objects validate before their enclosing data validator

use std::sync::Arc;

use schemaforge::engine::Executable;
use schemaforge::schema::{Field, InputObject, InputValue, Object, Schema, SchemaConfig};
use schemaforge::validation::{to_json, ValidationError, Validator, ValidatorSpec};
use schemaforge::{RequestContext, SchemaError};
use serde_json::{json, Map, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn positive() -> ValidatorSpec {
    ValidatorSpec::from_fn(|_, value, _| match value.as_i64() {
        Some(n) if n <= 0 => Err("Value must be greater than zero.".into()),
        _ => Ok(()),
    })
}

fn at_most_five_items() -> ValidatorSpec {
    ValidatorSpec::from_fn(|_, value, _| match value.as_array() {
        Some(items) if items.len() > 5 => Err("At most 5 values.".into()),
        _ => Ok(()),
    })
}

fn lowercase() -> ValidatorSpec {
    ValidatorSpec::from_fn(|_, value, _| match value.as_str() {
        Some(s) if s.chars().any(char::is_uppercase) => Err("Must be lowercase.".into()),
        _ => Ok(()),
    })
}

fn second_requires_first(
    _: &RequestContext,
    data: &Map<String, Value>,
) -> Result<(), ValidationError> {
    if data.contains_key("first") && !data.contains_key("second") {
        return Err(ValidationError::for_key(
            "second",
            "'second' must be given if 'first' is.",
        ));
    }
    Ok(())
}

fn finalize(types: Vec<InputObject>, query: Object, config: SchemaConfig) -> Arc<Executable> {
    let mut schema = Schema::with_config(config);
    for ty in types {
        schema.add_type(ty).unwrap();
    }
    *schema.query_mut().unwrap() = query;
    schema.finalize().unwrap()
}

fn query_with(field: Field) -> Object {
    Object::new("Query").field("check", field)
}

/// Validate a call to `Query.check` and render the tree as JSON.
fn validate(exec: &Executable, args: Value) -> Result<Value, SchemaError> {
    let graph = exec.graph();
    let field = graph.field("Query", "check").unwrap();
    let args = args.as_object().cloned().unwrap_or_default();
    let errors =
        Validator::new(graph).validate_field(field, &RequestContext::new(), &args, "Query.check")?;
    Ok(to_json(&errors))
}

// =============================================================================
// Value Validator Tests
// =============================================================================

/// A failing value validator reports its message under the argument name.
#[test]
fn test_single_value_validator() {
    let exec = finalize(
        vec![],
        query_with(Field::new("Boolean").arg("username", InputValue::from("String").spec(lowercase()))),
        SchemaConfig::default(),
    );

    assert_eq!(
        validate(&exec, json!({"username": "Bob"})).unwrap(),
        json!({"username": ["Must be lowercase."]})
    );
    assert_eq!(validate(&exec, json!({"username": "bob"})).unwrap(), json!({}));
}

/// A list-level validator and a per-element group both report for the
/// same argument, the group as a list aligned with the input.
#[test]
fn test_per_element_errors_are_aligned() {
    let exec = finalize(
        vec![],
        query_with(
            Field::new("Boolean").arg(
                "values",
                InputValue::from("[Int!]!")
                    .spec(at_most_five_items())
                    .each([positive()]),
            ),
        ),
        SchemaConfig::default(),
    );

    assert_eq!(
        validate(&exec, json!({"values": [1, -2, 3]})).unwrap(),
        json!({"values": [null, "Value must be greater than zero.", null]})
    );
    assert_eq!(
        validate(&exec, json!({"values": [1, 2, 3, 4, 5, 0]})).unwrap(),
        json!({"values": [
            "At most 5 values.",
            [null, null, null, null, null, "Value must be greater than zero."]
        ]})
    );
}

/// A single value given for a list type is checked as a one-element list.
#[test]
fn test_single_value_for_list_is_checked_per_element() {
    let exec = finalize(
        vec![],
        query_with(Field::new("Boolean").arg("values", InputValue::from("[Int!]").each([positive()]))),
        SchemaConfig::default(),
    );

    assert_eq!(
        validate(&exec, json!({"values": -1})).unwrap(),
        json!({"values": ["Value must be greater than zero."]})
    );
    assert_eq!(validate(&exec, json!({"values": 4})).unwrap(), json!({}));
}

/// Groups nest one level per list wrapper.
#[test]
fn test_nested_list_groups() {
    let exec = finalize(
        vec![],
        query_with(
            Field::new("Boolean").arg(
                "matrix",
                InputValue::from("[[Int]]").each([ValidatorSpec::each([positive()])]),
            ),
        ),
        SchemaConfig::default(),
    );

    assert_eq!(
        validate(&exec, json!({"matrix": [[1, -1], [2], null]})).unwrap(),
        json!({"matrix": [[null, "Value must be greater than zero."], null, null]})
    );
}

/// Several failures for one element collapse into a list at that position.
#[test]
fn test_element_with_several_messages() {
    let exec = finalize(
        vec![],
        query_with(
            Field::new("Boolean").arg(
                "names",
                InputValue::from("[String]").each([
                    lowercase(),
                    ValidatorSpec::from_fn(|_, value, _| match value.as_str() {
                        Some(s) if s.len() < 3 => Err("Too short.".into()),
                        _ => Ok(()),
                    }),
                ]),
            ),
        ),
        SchemaConfig::default(),
    );

    assert_eq!(
        validate(&exec, json!({"names": ["ok-name", "AB"]})).unwrap(),
        json!({"names": [null, ["Must be lowercase.", "Too short."]]})
    );
}

// =============================================================================
// Data Validator Tests
// =============================================================================

/// A field data validator addresses the missing argument by name.
#[test]
fn test_field_data_validator_keyed_error() {
    let exec = finalize(
        vec![],
        query_with(
            Field::new("Boolean")
                .arg("first", "Int")
                .arg("second", "Int")
                .validate_with(second_requires_first),
        ),
        SchemaConfig::default(),
    );

    assert_eq!(
        validate(&exec, json!({"first": 1})).unwrap(),
        json!({"second": ["'second' must be given if 'first' is."]})
    );
    assert_eq!(validate(&exec, json!({"first": 1, "second": 2})).unwrap(), json!({}));
}

/// The same data validator on an input object nests under the argument.
#[test]
fn test_input_object_data_validator() {
    let pair = InputObject::new("PairInput")
        .field("first", "Int")
        .field("second", "Int")
        .validate_with(second_requires_first);
    let exec = finalize(
        vec![pair],
        query_with(Field::new("Boolean").arg("pair", "PairInput!")),
        SchemaConfig::default(),
    );

    assert_eq!(
        validate(&exec, json!({"pair": {"first": 1}})).unwrap(),
        json!({"pair": [{"second": ["'second' must be given if 'first' is."]}]})
    );
}

/// Positional failures of a data validator land in the `""` slot, after
/// the children have been validated.
#[test]
fn test_object_level_errors_use_empty_key() {
    let address = InputObject::new("AddressInput")
        .field("city", InputValue::from("String").spec(lowercase()))
        .validator(|_, data| match data.get("city").and_then(Value::as_str) {
            Some("atlantis") => Err("Address does not exist.".into()),
            _ => Ok(()),
        });
    let exec = finalize(
        vec![address],
        query_with(Field::new("Boolean").arg("address", "AddressInput")),
        SchemaConfig::default(),
    );

    assert_eq!(
        validate(&exec, json!({"address": {"city": "Paris"}})).unwrap(),
        json!({"address": [{"city": ["Must be lowercase."]}]})
    );
    assert_eq!(
        validate(&exec, json!({"address": {"city": "atlantis"}})).unwrap(),
        json!({"address": [{"": ["Address does not exist."]}]})
    );
}

/// Lists of input objects are descended into without a group.
#[test]
fn test_list_of_input_objects() {
    let tag = InputObject::new("TagInput").field("name", InputValue::from("String!").spec(lowercase()));
    let exec = finalize(
        vec![tag],
        query_with(Field::new("Boolean").arg("tags", "[TagInput!]")),
        SchemaConfig::default(),
    );

    assert_eq!(
        validate(&exec, json!({"tags": [{"name": "ok"}, {"name": "BAD"}]})).unwrap(),
        json!({"tags": [null, {"name": ["Must be lowercase."]}]})
    );
}

// =============================================================================
// Depth and Determinism Tests
// =============================================================================

/// A group deeper than the value's lists is a configuration error at
/// validation time when the static check is off.
#[test]
fn test_depth_mismatch_at_validation_time() {
    let exec = finalize(
        vec![],
        query_with(Field::new("Boolean").arg("name", InputValue::from("String").each([lowercase()]))),
        SchemaConfig::default().with_validator_depth_check(false),
    );

    let err = validate(&exec, json!({"name": "Bob"})).unwrap_err();
    assert_eq!(
        err,
        SchemaError::ValidatorDepth {
            location: "Query.check(name)".into(),
            spec_depth: 1,
            list_depth: 0,
        }
    );
}

/// The depth error names the argument and its declared depths, not the
/// element where the walk ran out of lists.
#[test]
fn test_nested_depth_mismatch_reports_declared_depths() {
    let exec = finalize(
        vec![],
        query_with(Field::new("Boolean").arg(
            "matrix",
            InputValue::from("[[Int]]").each([ValidatorSpec::each([ValidatorSpec::each([positive()])])]),
        )),
        SchemaConfig::default().with_validator_depth_check(false),
    );

    let err = validate(&exec, json!({"matrix": [[1, 2]]})).unwrap_err();
    assert_eq!(
        err,
        SchemaError::ValidatorDepth {
            location: "Query.check(matrix)".into(),
            spec_depth: 3,
            list_depth: 2,
        }
    );
}

/// With the static check on, the same schema fails to finalize.
#[test]
fn test_depth_mismatch_at_finalize() {
    let mut schema = Schema::new();
    schema.query_mut().unwrap().add_field(
        "check",
        Field::new("Boolean").arg("name", InputValue::from("String").each([lowercase()])),
    );

    let err = schema.finalize().unwrap_err();
    assert!(err.iter().any(|e| e.code() == "SCHEMA_VALIDATOR_DEPTH"));
    assert!(!schema.is_locked());
}

/// Validating the same input twice yields the same tree.
#[test]
fn test_validation_is_idempotent() {
    let exec = finalize(
        vec![],
        query_with(
            Field::new("Boolean")
                .arg("values", InputValue::from("[Int]").each([positive()]))
                .arg("username", InputValue::from("String").spec(lowercase())),
        ),
        SchemaConfig::default(),
    );

    let input = json!({"values": [0, 1, -1], "username": "Eve"});
    let first = validate(&exec, input.clone()).unwrap();
    let second = validate(&exec, input).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first,
        json!({
            "values": ["Value must be greater than zero.", null, "Value must be greater than zero."],
            "username": ["Must be lowercase."]
        })
    );
}

/// Null and absent values are not validated.
#[test]
fn test_null_values_are_skipped() {
    let exec = finalize(
        vec![],
        query_with(Field::new("Boolean").arg("values", InputValue::from("[Int]").each([positive()]))),
        SchemaConfig::default(),
    );

    assert_eq!(validate(&exec, json!({"values": null})).unwrap(), json!({}));
    assert_eq!(validate(&exec, json!({})).unwrap(), json!({}));
}
