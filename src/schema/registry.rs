//! Schema builder
//!
//! Owns the name table and the two root objects while the application
//! assembles its graph. `finalize` resolves everything, exports it to the
//! execution engine and locks the builder; from then on every mutating call
//! fails with [`SchemaError::Locked`].

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info};

use crate::core::{Output, RequestContext};
use crate::engine::{ExecuteRequest, Executable, ExecutionResult};

use super::config::SchemaConfig;
use super::errors::{SchemaError, SchemaResult};
use super::names;
use super::resolver::{self, Unresolved};
use super::scalars;
use super::types::{NamedType, Object};

/// Schema under construction
#[derive(Debug)]
pub struct Schema {
    query: Object,
    mutation: Object,
    types: IndexMap<String, NamedType>,
    overridable: HashSet<String>,
    config: SchemaConfig,
    finalized: Option<Arc<Executable>>,
}

impl Schema {
    /// Create a schema with the default scalars registered
    pub fn new() -> Self {
        Self::with_config(SchemaConfig::default())
    }

    pub fn with_config(config: SchemaConfig) -> Self {
        let mut types = IndexMap::new();
        for scalar in scalars::builtins() {
            types.insert(scalar.name.clone(), NamedType::Scalar(scalar));
        }
        let mut overridable = HashSet::new();
        for scalar in scalars::defaults() {
            overridable.insert(scalar.name.clone());
            types.insert(scalar.name.clone(), NamedType::Scalar(scalar));
        }

        Self {
            query: Object::new("Query"),
            mutation: Object::new("Mutation"),
            types,
            overridable,
            config,
            finalized: None,
        }
    }

    /// Create a schema and register every type in `types`.
    ///
    /// All registration problems are reported together.
    pub fn with_types<I, T>(types: I) -> SchemaResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<NamedType>,
    {
        let mut schema = Self::new();
        let errors: Vec<SchemaError> = types
            .into_iter()
            .filter_map(|ty| schema.add_type(ty).err())
            .collect();
        match SchemaError::from_errors(errors) {
            Some(err) => Err(err),
            None => Ok(schema),
        }
    }

    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> SchemaResult<&mut SchemaConfig> {
        self.ensure_unlocked("change configuration")?;
        Ok(&mut self.config)
    }

    pub fn is_locked(&self) -> bool {
        self.finalized.is_some()
    }

    pub fn query(&self) -> &Object {
        &self.query
    }

    pub fn query_mut(&mut self) -> SchemaResult<&mut Object> {
        self.ensure_unlocked("modify Query")?;
        Ok(&mut self.query)
    }

    pub fn mutation(&self) -> &Object {
        &self.mutation
    }

    pub fn mutation_mut(&mut self) -> SchemaResult<&mut Object> {
        self.ensure_unlocked("modify Mutation")?;
        Ok(&mut self.mutation)
    }

    /// Register a named type.
    ///
    /// Fails if the name is taken, except for a default scalar which may be
    /// replaced once.
    pub fn add_type(&mut self, ty: impl Into<NamedType>) -> SchemaResult<()> {
        let ty = ty.into();
        self.ensure_unlocked(&format!("add type '{}'", ty.name()))?;
        names::check(ty.name(), ty.name())?;
        debug!(name = ty.name(), kind = ty.kind().as_str(), "registering type");
        resolver::register(&mut self.types, &mut self.overridable, ty)
    }

    /// Remove a registered type. Built-in scalars cannot be removed.
    pub fn remove_type(&mut self, name: &str) -> SchemaResult<Option<NamedType>> {
        self.ensure_unlocked(&format!("remove type '{}'", name))?;
        if scalars::is_builtin(name) {
            return Err(SchemaError::Builtin {
                name: name.to_string(),
            });
        }
        self.overridable.remove(name);
        Ok(self.types.shift_remove(name))
    }

    pub fn get_type(&self, name: &str) -> Option<&NamedType> {
        self.types.get(name)
    }

    pub fn type_mut(&mut self, name: &str) -> SchemaResult<&mut NamedType> {
        self.ensure_unlocked(&format!("modify type '{}'", name))?;
        self.types.get_mut(name).ok_or_else(|| SchemaError::UnknownType {
            name: name.to_string(),
        })
    }

    /// Names of all registered types, built-ins included.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Resolve, export and lock.
    ///
    /// On failure nothing is locked and every problem found is returned. Once
    /// locked, further calls return the same executable without traversing
    /// the graph again.
    pub fn finalize(&mut self) -> SchemaResult<Arc<Executable>> {
        if let Some(executable) = &self.finalized {
            debug!("schema already finalized");
            return Ok(Arc::clone(executable));
        }

        let graph = resolver::resolve(Unresolved {
            query: &self.query,
            mutation: &self.mutation,
            types: &self.types,
            overridable: &self.overridable,
            config: &self.config,
        })?;
        let executable = Arc::new(Executable::new(Arc::new(graph))?);

        info!(
            types = executable.graph().types().count(),
            exported = executable.graph().reachable().count(),
            has_mutation = executable.graph().mutation().is_some(),
            "schema finalized"
        );
        self.finalized = Some(Arc::clone(&executable));
        Ok(executable)
    }

    /// Finalize and print the exported schema as SDL.
    pub fn to_document(&mut self) -> SchemaResult<String> {
        Ok(self.finalize()?.sdl())
    }

    /// Finalize and run one operation.
    pub async fn execute(
        &mut self,
        source: &str,
        root: impl Into<Output>,
        context: RequestContext,
        variables: Value,
    ) -> SchemaResult<ExecutionResult> {
        let executable = self.finalize()?;
        let request = ExecuteRequest::new(source)
            .root(root)
            .context(context)
            .variables(variables);
        Ok(executable.execute(request).await)
    }

    fn ensure_unlocked(&self, operation: &str) -> SchemaResult<()> {
        if self.is_locked() {
            return Err(SchemaError::locked(operation));
        }
        Ok(())
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::Scalar;

    fn hello_schema() -> Schema {
        let mut schema = Schema::new();
        schema
            .query_mut()
            .unwrap()
            .add_field("hello", "String");
        schema
    }

    #[test]
    fn test_duplicate_registration() {
        let mut schema = Schema::new();
        schema.add_type(Object::new("User")).unwrap();
        let err = schema.add_type(Object::new("User")).unwrap_err();
        assert_eq!(err.code(), "SCHEMA_DUPLICATE_TYPE");
    }

    #[test]
    fn test_builtin_scalars_cannot_be_replaced() {
        let mut schema = Schema::new();
        assert!(schema.add_type(Scalar::new("Int")).is_err());
        assert!(schema.remove_type("String").is_err());
    }

    #[test]
    fn test_default_scalars_can_be_replaced_once() {
        let mut schema = Schema::new();
        schema
            .add_type(Scalar::new("DateTime").description("epoch seconds"))
            .unwrap();
        assert_eq!(
            schema.get_type("DateTime").and_then(NamedType::description),
            Some("epoch seconds")
        );
        assert!(schema.add_type(Scalar::new("DateTime")).is_err());
    }

    #[test]
    fn test_invalid_type_name() {
        let mut schema = Schema::new();
        let err = schema.add_type(Object::new("my-type")).unwrap_err();
        assert_eq!(err.code(), "SCHEMA_INVALID_NAME");
    }

    #[test]
    fn test_with_types_reports_every_problem() {
        let err = Schema::with_types([
            Object::new("A"),
            Object::new("A"),
            Object::new("bad name"),
        ])
        .unwrap_err();
        assert_eq!(err.iter().count(), 2);
    }

    #[test]
    fn test_locked_after_finalize() {
        let mut schema = hello_schema();
        let first = schema.finalize().unwrap();
        assert!(schema.is_locked());

        assert!(matches!(
            schema.query_mut(),
            Err(SchemaError::Locked { .. })
        ));
        assert!(matches!(
            schema.add_type(Object::new("Late")),
            Err(SchemaError::Locked { .. })
        ));
        assert!(schema.type_mut("String").is_err());
        assert!(schema.config_mut().is_err());

        let second = schema.finalize().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_failed_finalize_does_not_lock() {
        let mut schema = Schema::new();
        schema.query_mut().unwrap().add_field("ghost", "Ghost");
        assert!(schema.finalize().is_err());
        assert!(!schema.is_locked());

        schema.add_type(Object::new("Ghost").field("id", "ID")).unwrap();
        assert!(schema.finalize().is_ok());
    }

    #[test]
    fn test_type_mut_unknown() {
        let mut schema = Schema::new();
        assert_eq!(
            schema.type_mut("Nope").unwrap_err(),
            SchemaError::UnknownType {
                name: "Nope".into()
            }
        );
    }
}
