//! # Resolution Pipeline
//!
//! Every field visit runs through the same ordered stages:
//!
//! - pre-check: may refuse the call before any input is looked at
//! - validate: runs the validator tree over the field's arguments
//! - resolve: produces the field's value
//!
//! The pipeline holds no per-operation state; everything an operation needs
//! travels in its [`RequestContext`].

pub mod context;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod resolve;

pub use context::RequestContext;
pub use error::{FieldError, FieldResult};
pub use output::{Attributes, Output, TYPENAME_KEY};
pub use pipeline::{FieldPipeline, Next, PreCheckStage, Stage, ValidateStage};
pub use resolve::{FieldCall, PreCheck, Resolve, Resolver, ResolverStyle};
