//! # Schema Graph
//!
//! Building blocks for a GraphQL schema assembled at runtime:
//!
//! - named types and the references between them (`types`)
//! - the type-expression grammar used for references by name (`type_expr`)
//! - the `Schema` builder and its lock (`registry`)
//! - reference resolution at finalization (`resolver`)
//! - the resolved, read-only graph (`finalized`)
//! - JSON schema definition documents (`loader`)
//!
//! References may point forward or form cycles; they are only resolved when
//! the schema is finalized, and all missing names are reported together.

pub mod config;
pub mod errors;
pub mod finalized;
pub mod loader;
pub mod names;
pub mod registry;
pub mod resolver;
pub mod scalars;
pub mod type_expr;
pub mod types;

pub use config::SchemaConfig;
pub use errors::{SchemaError, SchemaResult};
pub use finalized::FinalizedSchema;
pub use loader::{SchemaDocument, SchemaLoader};
pub use registry::Schema;
pub use type_expr::{TypeExpr, TypeExprError};
pub use types::{
    Argument, Enum, EnumValue, Field, InputField, InputObject, InputValue, NamedType, Object,
    Position, Scalar, TypeId, TypeKind, TypeRef, Union,
};
