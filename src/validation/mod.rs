//! Input validation
//!
//! Value validators check one argument or input field value; data validators
//! check the whole input dict of a field or input object. A [`ValidatorSpec`]
//! places value validators at a list depth, and the [`Validator`] engine turns
//! all failures for one field call into a single [`ErrorMap`].

pub mod engine;
pub mod errors;
pub mod spec;
pub mod validators;

pub use engine::Validator;
pub use errors::{
    merge_into, to_json, ErrorEntry, ErrorMap, ValidationError, VALIDATION_ERROR_MESSAGE,
};
pub use spec::{depth, DataCheck, DataValidator, ValidatorSpec, ValueValidator};
pub use validators::{Confirm, Length, NumberRange};
