//! Field calls, resolvers and pre-checks

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::{self, BoxFuture};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::context::RequestContext;
use super::error::{FieldError, FieldResult};
use super::output::Output;

/// One visit of a field by the execution engine
#[derive(Debug, Clone)]
pub struct FieldCall {
    /// Value the parent field resolved to
    pub parent: Output,
    /// Per-operation context
    pub context: Arc<RequestContext>,
    /// Arguments after engine coercion
    pub args: Map<String, Value>,
    pub field_name: String,
    pub parent_type: String,
}

impl FieldCall {
    pub fn new(parent_type: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            parent: Output::Null,
            context: Arc::new(RequestContext::new()),
            args: Map::new(),
            field_name: field_name.into(),
            parent_type: parent_type.into(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<Output>) -> Self {
        self.parent = parent.into();
        self
    }

    pub fn with_args(mut self, args: Map<String, Value>) -> Self {
        self.args = args;
        self
    }

    pub fn with_context(mut self, context: Arc<RequestContext>) -> Self {
        self.context = context;
        self
    }

    pub fn arg(&self, name: &str) -> Option<&Value> {
        self.args.get(name)
    }

    /// `Type.field` for logs and errors
    pub fn path(&self) -> String {
        format!("{}.{}", self.parent_type, self.field_name)
    }
}

/// Produces a field's output value
pub trait Resolve: Send + Sync {
    fn resolve<'a>(&'a self, call: &'a FieldCall) -> BoxFuture<'a, FieldResult<Output>>;
}

struct SyncResolver<F>(F);

impl<F> Resolve for SyncResolver<F>
where
    F: Fn(&FieldCall) -> FieldResult<Output> + Send + Sync,
{
    fn resolve<'a>(&'a self, call: &'a FieldCall) -> BoxFuture<'a, FieldResult<Output>> {
        Box::pin(future::ready((self.0)(call)))
    }
}

struct AsyncResolver<F>(F);

impl<F, Fut> Resolve for AsyncResolver<F>
where
    F: Fn(FieldCall) -> Fut + Send + Sync,
    Fut: Future<Output = FieldResult<Output>> + Send + 'static,
{
    fn resolve<'a>(&'a self, call: &'a FieldCall) -> BoxFuture<'a, FieldResult<Output>> {
        Box::pin((self.0)(call.clone()))
    }
}

/// Default resolution strategy for fields without their own resolver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverStyle {
    /// Read the same-named attribute of an [`Attributes`](super::Attributes) parent
    #[default]
    Attribute,
    /// Read the same-named key of a JSON object parent
    Item,
}

/// How a field produces its value
#[derive(Clone)]
pub enum Resolver {
    Attribute,
    Item,
    Custom(Arc<dyn Resolve>),
}

impl Resolver {
    /// Resolver from a synchronous function
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&FieldCall) -> FieldResult<Output> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(SyncResolver(f)))
    }

    /// Resolver from an async function taking an owned call
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(FieldCall) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = FieldResult<Output>> + Send + 'static,
    {
        Self::Custom(Arc::new(AsyncResolver(f)))
    }

    pub fn resolve<'a>(&'a self, call: &'a FieldCall) -> BoxFuture<'a, FieldResult<Output>> {
        match self {
            Self::Attribute => Box::pin(future::ready(read_attribute(call))),
            Self::Item => Box::pin(future::ready(read_item(call))),
            Self::Custom(resolver) => resolver.resolve(call),
        }
    }
}

impl From<ResolverStyle> for Resolver {
    fn from(style: ResolverStyle) -> Self {
        match style {
            ResolverStyle::Attribute => Self::Attribute,
            ResolverStyle::Item => Self::Item,
        }
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attribute => f.write_str("Attribute"),
            Self::Item => f.write_str("Item"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

fn read_attribute(call: &FieldCall) -> FieldResult<Output> {
    match &call.parent {
        Output::Object(object) => Ok(object.attribute(&call.field_name).unwrap_or_default()),
        parent if parent.is_null() => Ok(Output::Null),
        parent => Err(FieldError::new(format!(
            "Cannot read attribute '{}' of {} parent at {}",
            call.field_name,
            parent.kind(),
            call.path()
        ))),
    }
}

fn read_item(call: &FieldCall) -> FieldResult<Output> {
    match &call.parent {
        Output::Value(Value::Object(map)) => Ok(map
            .get(&call.field_name)
            .cloned()
            .map(Output::from)
            .unwrap_or_default()),
        parent if parent.is_null() => Ok(Output::Null),
        parent => Err(FieldError::new(format!(
            "Cannot read key '{}' of {} parent at {}",
            call.field_name,
            parent.kind(),
            call.path()
        ))),
    }
}

/// Runs before validation; an error short-circuits the field.
pub trait PreCheck: Send + Sync {
    fn check(&self, call: &FieldCall) -> FieldResult<()>;
}

impl<F> PreCheck for F
where
    F: Fn(&FieldCall) -> FieldResult<()> + Send + Sync,
{
    fn check(&self, call: &FieldCall) -> FieldResult<()> {
        self(call)
    }
}
