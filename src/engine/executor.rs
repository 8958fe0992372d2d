//! Executable schema and operation execution

use std::fmt;
use std::sync::Arc;

use async_graphql::dynamic;
use async_graphql::{Request, Response, Variables};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::core::{Output, RequestContext};
use crate::schema::{FinalizedSchema, SchemaResult};
use crate::validation::VALIDATION_ERROR_MESSAGE;

use super::export::{self, RootValue};

/// A finalized schema handed off to the execution engine
pub struct Executable {
    graph: Arc<FinalizedSchema>,
    schema: dynamic::Schema,
}

impl Executable {
    /// Export `graph` to the engine.
    pub fn new(graph: Arc<FinalizedSchema>) -> SchemaResult<Self> {
        let schema = export::build(&graph)?;
        Ok(Self { graph, schema })
    }

    pub fn graph(&self) -> &Arc<FinalizedSchema> {
        &self.graph
    }

    /// Schema document in GraphQL SDL.
    pub fn sdl(&self) -> String {
        let sdl = self.schema.sdl();
        match &self.graph.config().description {
            Some(description) => {
                let mut out: String = description
                    .lines()
                    .map(|line| format!("# {}\n", line))
                    .collect();
                out.push('\n');
                out.push_str(&sdl);
                out
            }
            None => sdl,
        }
    }

    /// Execute one operation.
    pub async fn execute(&self, request: ExecuteRequest) -> ExecutionResult {
        let context = Arc::new(request.context);
        debug!(request_id = %context.request_id, "executing operation");

        let mut engine_request = Request::new(request.source)
            .variables(Variables::from_json(request.variables))
            .data(RootValue(request.root))
            .data(Arc::clone(&context));
        if let Some(name) = request.operation_name {
            engine_request = engine_request.operation_name(name);
        }

        let result = ExecutionResult::from(self.schema.execute(engine_request).await);
        debug!(
            request_id = %context.request_id,
            errors = result.errors.len(),
            elapsed_ms = context.elapsed_ms(),
            "operation finished"
        );
        result
    }
}

impl fmt::Debug for Executable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executable")
            .field("graph", &self.graph)
            .finish_non_exhaustive()
    }
}

/// One operation to execute
#[derive(Debug, Default)]
pub struct ExecuteRequest {
    pub source: String,
    pub root: Output,
    pub context: RequestContext,
    pub variables: Value,
    pub operation_name: Option<String>,
}

impl ExecuteRequest {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            variables: Value::Object(Map::new()),
            ..Self::default()
        }
    }

    /// Parent value for the root fields
    pub fn root(mut self, root: impl Into<Output>) -> Self {
        self.root = root.into();
        self
    }

    pub fn context(mut self, context: RequestContext) -> Self {
        self.context = context;
        self
    }

    pub fn variables(mut self, variables: Value) -> Self {
        self.variables = variables;
        self
    }

    pub fn operation(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }
}

/// One error reported by the engine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionError {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl ExecutionError {
    /// True for input validation failures, whose extensions hold the error tree.
    pub fn is_validation(&self) -> bool {
        self.message == VALIDATION_ERROR_MESSAGE
    }

    /// Path rendered as `a.0.b`.
    pub fn path_string(&self) -> String {
        self.path
            .iter()
            .map(|segment| match segment {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Result of executing one operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResult {
    pub data: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ExecutionError>,
}

impl ExecutionResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors raised by input validation
    pub fn validation_errors(&self) -> impl Iterator<Item = &ExecutionError> {
        self.errors.iter().filter(|e| e.is_validation())
    }
}

impl From<Response> for ExecutionResult {
    fn from(response: Response) -> Self {
        let errors = response
            .errors
            .iter()
            .map(|err| ExecutionError {
                message: err.message.clone(),
                path: err
                    .path
                    .iter()
                    .filter_map(|segment| serde_json::to_value(segment).ok())
                    .collect(),
                extensions: err
                    .extensions
                    .as_ref()
                    .and_then(|ext| serde_json::to_value(ext).ok()),
            })
            .collect();
        Self {
            data: response.data.into_json().unwrap_or(Value::Null),
            errors,
        }
    }
}
