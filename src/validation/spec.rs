//! Validator capabilities and the recursive specification that places them.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::core::RequestContext;

use super::errors::ValidationError;

/// Checks a single input value.
///
/// `data` is the full input dict the value was taken from, so a validator can
/// compare against sibling values.
pub trait ValueValidator: Send + Sync {
    fn validate(
        &self,
        ctx: &RequestContext,
        value: &Value,
        data: &Map<String, Value>,
    ) -> Result<(), ValidationError>;
}

impl<F> ValueValidator for F
where
    F: Fn(&RequestContext, &Value, &Map<String, Value>) -> Result<(), ValidationError>
        + Send
        + Sync,
{
    fn validate(
        &self,
        ctx: &RequestContext,
        value: &Value,
        data: &Map<String, Value>,
    ) -> Result<(), ValidationError> {
        self(ctx, value, data)
    }
}

/// Checks the whole input dict of a field or input object.
pub trait DataValidator: Send + Sync {
    fn validate(&self, ctx: &RequestContext, data: &Map<String, Value>)
        -> Result<(), ValidationError>;
}

impl<F> DataValidator for F
where
    F: Fn(&RequestContext, &Map<String, Value>) -> Result<(), ValidationError> + Send + Sync,
{
    fn validate(
        &self,
        ctx: &RequestContext,
        data: &Map<String, Value>,
    ) -> Result<(), ValidationError> {
        self(ctx, data)
    }
}

/// Shared handle to a data validator
#[derive(Clone)]
pub struct DataCheck(Arc<dyn DataValidator>);

impl DataCheck {
    pub fn new(validator: impl DataValidator + 'static) -> Self {
        Self(Arc::new(validator))
    }

    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&RequestContext, &Map<String, Value>) -> Result<(), ValidationError>
            + Send
            + Sync
            + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn validate(
        &self,
        ctx: &RequestContext,
        data: &Map<String, Value>,
    ) -> Result<(), ValidationError> {
        self.0.validate(ctx, data)
    }
}

impl fmt::Debug for DataCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DataCheck(..)")
    }
}

/// Where a value validator applies.
///
/// A `Leaf` runs on the value at the current depth. An `Each` group runs its
/// entries on every element of the list value at the current depth, one list
/// level down.
#[derive(Clone)]
pub enum ValidatorSpec {
    Leaf(Arc<dyn ValueValidator>),
    Each(Vec<ValidatorSpec>),
}

impl ValidatorSpec {
    pub fn leaf(validator: impl ValueValidator + 'static) -> Self {
        Self::Leaf(Arc::new(validator))
    }

    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&RequestContext, &Value, &Map<String, Value>) -> Result<(), ValidationError>
            + Send
            + Sync
            + 'static,
    {
        Self::Leaf(Arc::new(f))
    }

    pub fn each(specs: impl IntoIterator<Item = ValidatorSpec>) -> Self {
        Self::Each(specs.into_iter().collect())
    }

    /// List levels this entry reaches into.
    pub fn depth(&self) -> usize {
        match self {
            Self::Leaf(_) => 0,
            Self::Each(specs) => 1 + depth(specs),
        }
    }
}

impl fmt::Debug for ValidatorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(_) => f.write_str("Leaf(..)"),
            Self::Each(specs) => f.debug_tuple("Each").field(specs).finish(),
        }
    }
}

/// Deepest list level any entry in `specs` reaches into.
pub fn depth(specs: &[ValidatorSpec]) -> usize {
    specs.iter().map(ValidatorSpec::depth).max().unwrap_or(0)
}
