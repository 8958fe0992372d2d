//! Field Pipeline
//!
//! Deterministic stage chain for one field: PreCheck → Validate → Resolve.
//! Stages run in that order for every call; a stage that fails ends the
//! chain and the resolver is not invoked.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use tracing::{debug, warn};

use crate::schema::FinalizedSchema;
use crate::validation::Validator;

use super::error::{FieldError, FieldResult};
use super::output::Output;
use super::resolve::{FieldCall, PreCheck, Resolver};

/// One step of the field pipeline
pub trait Stage: Send + Sync {
    /// Stage name for logs
    fn name(&self) -> &'static str;

    /// Run this stage, calling `next` to continue the chain
    fn process<'a>(&'a self, call: &'a FieldCall, next: Next<'a>)
        -> BoxFuture<'a, FieldResult<Output>>;
}

/// Next stage in chain
pub struct Next<'a> {
    stages: &'a [Arc<dyn Stage>],
    resolver: &'a Resolver,
}

impl<'a> Next<'a> {
    /// Run the next stage or the resolver
    pub fn run(self, call: &'a FieldCall) -> BoxFuture<'a, FieldResult<Output>> {
        match self.stages.split_first() {
            Some((first, rest)) => first.process(
                call,
                Next {
                    stages: rest,
                    resolver: self.resolver,
                },
            ),
            // End of stage chain, resolve the field
            None => self.resolver.resolve(call),
        }
    }
}

/// Runs a field's pre-check
pub struct PreCheckStage {
    check: Arc<dyn PreCheck>,
}

impl PreCheckStage {
    pub fn new(check: Arc<dyn PreCheck>) -> Self {
        Self { check }
    }
}

impl Stage for PreCheckStage {
    fn name(&self) -> &'static str {
        "pre_check"
    }

    fn process<'a>(
        &'a self,
        call: &'a FieldCall,
        next: Next<'a>,
    ) -> BoxFuture<'a, FieldResult<Output>> {
        Box::pin(async move {
            if let Err(err) = self.check.check(call) {
                debug!(field = %call.path(), code = err.code(), "pre-check refused call");
                return Err(err);
            }
            next.run(call).await
        })
    }
}

/// Runs the validator tree over a field's arguments
pub struct ValidateStage {
    schema: Arc<FinalizedSchema>,
}

impl ValidateStage {
    pub fn new(schema: Arc<FinalizedSchema>) -> Self {
        Self { schema }
    }

    fn validate(&self, call: &FieldCall) -> FieldResult<()> {
        let Some(field) = self.schema.field(&call.parent_type, &call.field_name) else {
            return Ok(());
        };
        let errors = Validator::new(&self.schema).validate_field(
            field,
            &call.context,
            &call.args,
            &call.path(),
        )?;
        if errors.is_empty() {
            return Ok(());
        }
        warn!(
            field = %call.path(),
            request_id = %call.context.request_id,
            positions = errors.len(),
            "input validation failed"
        );
        Err(FieldError::Validation(errors))
    }
}

impl Stage for ValidateStage {
    fn name(&self) -> &'static str {
        "validate"
    }

    fn process<'a>(
        &'a self,
        call: &'a FieldCall,
        next: Next<'a>,
    ) -> BoxFuture<'a, FieldResult<Output>> {
        Box::pin(async move {
            self.validate(call)?;
            next.run(call).await
        })
    }
}

/// Composed pipeline for one field
pub struct FieldPipeline {
    stages: Vec<Arc<dyn Stage>>,
    resolver: Resolver,
}

impl FieldPipeline {
    /// Create a pipeline that only resolves
    pub fn new(resolver: Resolver) -> Self {
        Self {
            stages: Vec::new(),
            resolver,
        }
    }

    /// Add a stage after the existing ones
    pub fn with_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    /// Build the standard pipeline for a field of a finalized schema
    pub fn for_field(schema: &Arc<FinalizedSchema>, type_name: &str, field_name: &str) -> Self {
        let field = schema.field(type_name, field_name);
        let resolver = field
            .and_then(|f| f.resolver.clone())
            .unwrap_or_else(|| schema.config().default_resolver.into());

        let mut pipeline = Self::new(resolver);
        if let Some(check) = field.and_then(|f| f.pre_check.clone()) {
            pipeline = pipeline.with_stage(PreCheckStage::new(check));
        }
        if field.is_some_and(|f| f.has_validation()) {
            pipeline = pipeline.with_stage(ValidateStage::new(Arc::clone(schema)));
        }
        pipeline
    }

    /// Stage names in execution order
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run one field call through every stage
    pub async fn run(&self, call: &FieldCall) -> FieldResult<Output> {
        let next = Next {
            stages: &self.stages,
            resolver: &self.resolver,
        };
        next.run(call).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Field, InputValue, Schema};
    use crate::validation::ValidationError;
    use serde_json::{json, Map, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_resolver(calls: Arc<AtomicUsize>) -> Resolver {
        Resolver::from_fn(move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(Output::from("resolved"))
        })
    }

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn test_pipeline_with_no_stages() {
        let calls = Arc::new(AtomicUsize::new(0));
        let pipeline = FieldPipeline::new(counting_resolver(calls.clone()));
        let output = pipeline.run(&FieldCall::new("Query", "a")).await.unwrap();
        assert!(matches!(output, Output::Value(Value::String(s)) if s == "resolved"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stage_order_and_short_circuit() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut schema = Schema::new();
        schema.query_mut().unwrap().add_field(
            "greet",
            Field::new("String")
                .arg(
                    "name",
                    InputValue::from("String").validator(|_, value, _| {
                        if value.as_str().is_some_and(|s| s.is_empty()) {
                            Err(ValidationError::new("Must not be empty."))
                        } else {
                            Ok(())
                        }
                    }),
                )
                .pre_check(|call| match call.arg("name").and_then(Value::as_str) {
                    Some("root") => Err(ValidationError::new("Not allowed.").into()),
                    _ => Ok(()),
                })
                .resolver(counting_resolver(calls.clone())),
        );
        let exec = schema.finalize().unwrap();
        let pipeline = FieldPipeline::for_field(exec.graph(), "Query", "greet");
        assert_eq!(pipeline.stage_names(), vec!["pre_check", "validate"]);

        let refused = FieldCall::new("Query", "greet").with_args(args(json!({"name": "root"})));
        let err = pipeline.run(&refused).await.unwrap_err();
        assert_eq!(err.payload(), Some(json!({"": ["Not allowed."]})));

        let invalid = FieldCall::new("Query", "greet").with_args(args(json!({"name": ""})));
        let err = pipeline.run(&invalid).await.unwrap_err();
        assert_eq!(err.payload(), Some(json!({"name": ["Must not be empty."]})));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let valid = FieldCall::new("Query", "greet").with_args(args(json!({"name": "ada"})));
        assert!(pipeline.run(&valid).await.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_default_resolver_follows_config() {
        let mut schema = Schema::new();
        schema.config_mut().unwrap().default_resolver = crate::core::ResolverStyle::Item;
        schema.query_mut().unwrap().add_field("name", "String");
        let exec = schema.finalize().unwrap();

        let pipeline = FieldPipeline::for_field(exec.graph(), "Query", "name");
        assert!(pipeline.stage_names().is_empty());
        let call = FieldCall::new("Query", "name").with_parent(json!({"name": "ada"}));
        let output = pipeline.run(&call).await.unwrap();
        assert!(matches!(output, Output::Value(Value::String(s)) if s == "ada"));
    }
}
