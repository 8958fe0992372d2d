//! Validator tree engine
//!
//! Walks a field's arguments (or an input object's fields) together with the
//! validator specs attached to them and builds an [`ErrorMap`] shaped like the
//! input:
//! - nested input objects are validated before the validators of the value
//!   that contains them, and their data validators before the enclosing ones;
//! - an `Each` group is applied to every element of the list at its depth and
//!   produces one aligned entry; a single value given for a list type is
//!   treated as a one-element list, as input coercion does;
//! - null values are not validated.
//!
//! Validation never stops at the first failure. The only hard error is a
//! validator group nested deeper than the declared list type it is applied to.

use serde_json::{Map, Value};

use crate::core::RequestContext;
use crate::schema::{Field, FinalizedSchema, InputObject, InputValue, SchemaError, TypeRef};

use super::errors::{merge_into, ErrorEntry, ErrorMap};
use super::spec::{depth, DataCheck, ValidatorSpec};

/// Validator bound to a finalized schema.
///
/// Holds no state between calls, so one instance may serve concurrent
/// operations.
pub struct Validator<'a> {
    schema: &'a FinalizedSchema,
}

impl<'a> Validator<'a> {
    pub fn new(schema: &'a FinalizedSchema) -> Self {
        Self { schema }
    }

    /// Validate a field's arguments and data validators.
    ///
    /// `location` names the field in configuration errors, e.g. `Query.user`.
    pub fn validate_field(
        &self,
        field: &Field,
        ctx: &RequestContext,
        args: &Map<String, Value>,
        location: &str,
    ) -> Result<ErrorMap, SchemaError> {
        let locate = |name: &str| format!("{}({})", location, name);
        self.validate_data(&field.args, &field.validators, ctx, args, &locate)
    }

    /// Validate one input object value.
    pub fn validate_input_object(
        &self,
        input: &InputObject,
        ctx: &RequestContext,
        data: &Map<String, Value>,
    ) -> Result<ErrorMap, SchemaError> {
        let locate = |name: &str| format!("{}.{}", input.name, name);
        self.validate_data(&input.fields, &input.validators, ctx, data, &locate)
    }

    fn validate_data(
        &self,
        items: &indexmap::IndexMap<String, InputValue>,
        validators: &[DataCheck],
        ctx: &RequestContext,
        data: &Map<String, Value>,
        locate: &dyn Fn(&str) -> String,
    ) -> Result<ErrorMap, SchemaError> {
        let mut errors = ErrorMap::new();
        errors.insert(String::new(), Vec::new());

        for (name, item) in items {
            let Some(value) = data.get(name) else {
                continue;
            };
            let spec_depth = depth(&item.validators);
            let list_depth = item.ty.list_depth().unwrap_or(0);
            if spec_depth > list_depth {
                return Err(SchemaError::ValidatorDepth {
                    location: locate(name),
                    spec_depth,
                    list_depth,
                });
            }
            let entries =
                self.validate_value(&item.ty, &item.validators, ctx, value, data, &locate(name))?;
            if !entries.is_empty() {
                errors.insert(name.clone(), entries);
            }
        }

        for validator in validators {
            if let Err(failure) = validator.validate(ctx, data) {
                merge_into(&mut errors, failure);
            }
        }

        if errors.get("").is_some_and(Vec::is_empty) {
            errors.shift_remove("");
        }
        Ok(errors)
    }

    fn validate_value(
        &self,
        ty: &TypeRef,
        specs: &[ValidatorSpec],
        ctx: &RequestContext,
        value: &Value,
        data: &Map<String, Value>,
        location: &str,
    ) -> Result<Vec<ErrorEntry>, SchemaError> {
        let mut errors = Vec::new();
        if value.is_null() {
            return Ok(errors);
        }

        if let (Some(input), Value::Object(fields)) = (self.schema.input_object(ty), value) {
            let nested = self.validate_input_object(input, ctx, fields)?;
            if !nested.is_empty() {
                errors.push(ErrorEntry::Object(nested));
            }
        }

        let element_ty = ty.element().unwrap_or(ty);
        let single;
        let items = match value {
            Value::Array(items) => Some(items.as_slice()),
            other if ty.element().is_some() => {
                single = [other.clone()];
                Some(&single[..])
            }
            _ => None,
        };

        let has_group = specs.iter().any(|s| matches!(s, ValidatorSpec::Each(_)));
        if !has_group && self.holds_input_objects(ty) {
            if let Some(items) = items {
                if let Some(entry) = self.validate_items(element_ty, &[], ctx, items, data, location)? {
                    errors.push(entry);
                }
            }
        }

        for spec in specs {
            match spec {
                ValidatorSpec::Leaf(validator) => {
                    if let Err(failure) = validator.validate(ctx, value, data) {
                        errors.extend(failure.into_entries());
                    }
                }
                ValidatorSpec::Each(group) => {
                    let Some(items) = items else {
                        return Err(SchemaError::ValidatorDepth {
                            location: location.to_string(),
                            spec_depth: depth(specs),
                            list_depth: ty.list_depth().unwrap_or(0),
                        });
                    };
                    if let Some(entry) =
                        self.validate_items(element_ty, group, ctx, items, data, location)?
                    {
                        errors.push(entry);
                    }
                }
            }
        }

        Ok(errors)
    }

    /// Apply `specs` to each element; `None` when every element passed.
    fn validate_items(
        &self,
        element_ty: &TypeRef,
        specs: &[ValidatorSpec],
        ctx: &RequestContext,
        items: &[Value],
        data: &Map<String, Value>,
        location: &str,
    ) -> Result<Option<ErrorEntry>, SchemaError> {
        let mut results = Vec::with_capacity(items.len());
        let mut failed = false;
        for (i, item) in items.iter().enumerate() {
            let item_location = format!("{}[{}]", location, i);
            let entries = self.validate_value(element_ty, specs, ctx, item, data, &item_location)?;
            let slot = ErrorEntry::collapse(entries);
            failed |= slot.is_some();
            results.push(slot);
        }
        Ok(failed.then_some(ErrorEntry::Items(results)))
    }

    /// Whether `ty` is a list whose innermost type is an input object.
    fn holds_input_objects(&self, ty: &TypeRef) -> bool {
        ty.element().is_some()
            && ty
                .resolved_id()
                .and_then(|id| self.schema.get(id))
                .is_some_and(|named| named.as_input_object().is_some())
    }
}
