//! schemaforge - GraphQL schemas assembled at runtime
//!
//! Types are registered incrementally and may reference each other by name
//! before they exist. Finalizing a schema resolves every reference, reports
//! all problems at once, locks the schema and hands it to the execution
//! engine. Field arguments are checked by a validator tree whose errors
//! mirror the shape of the input.

pub mod cli;
pub mod core;
pub mod engine;
pub mod logging;
pub mod schema;
pub mod validation;

pub use crate::core::{
    Attributes, FieldCall, FieldError, FieldResult, Output, RequestContext, Resolver,
    ResolverStyle,
};
pub use crate::engine::{ExecuteRequest, Executable, ExecutionError, ExecutionResult};
pub use crate::schema::{
    Enum, Field, InputObject, InputValue, NamedType, Object, Scalar, Schema, SchemaConfig,
    SchemaError, SchemaResult, TypeRef, Union,
};
pub use crate::validation::{ErrorMap, ValidationError, ValidatorSpec};
