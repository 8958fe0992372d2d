//! # Execution Engine Hand-off
//!
//! A finalized schema is exported to the async-graphql dynamic schema, which
//! parses, validates and executes operations. Every exported field resolver
//! runs the field's pipeline, so pre-checks and input validation apply to
//! every field visit.

mod export;
pub mod executor;
pub mod testing;

pub use executor::{ExecuteRequest, Executable, ExecutionError, ExecutionResult};
