//! Finalized schema graph
//!
//! Produced once by finalization and shared read-only between operations.
//! Every [`TypeRef`] inside is `Resolved`, so lookups never go by string.

use std::collections::HashMap;

use super::config::SchemaConfig;
use super::types::{Field, InputObject, NamedType, Object, TypeId, TypeRef};

/// Locked, fully resolved schema graph
#[derive(Debug)]
pub struct FinalizedSchema {
    types: Vec<NamedType>,
    index: HashMap<String, TypeId>,
    query: Object,
    mutation: Option<Object>,
    reachable: Vec<TypeId>,
    config: SchemaConfig,
}

impl FinalizedSchema {
    pub(crate) fn new(
        types: Vec<NamedType>,
        query: Object,
        mutation: Option<Object>,
        reachable: Vec<TypeId>,
        config: SchemaConfig,
    ) -> Self {
        let index = types
            .iter()
            .enumerate()
            .map(|(i, ty)| (ty.name().to_string(), TypeId(i)))
            .collect();
        Self {
            types,
            index,
            query,
            mutation,
            reachable,
            config,
        }
    }

    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    pub fn query(&self) -> &Object {
        &self.query
    }

    /// Mutation root, `None` when it has no fields.
    pub fn mutation(&self) -> Option<&Object> {
        self.mutation.as_ref()
    }

    pub fn get(&self, id: TypeId) -> Option<&NamedType> {
        self.types.get(id.0)
    }

    pub fn type_id(&self, name: &str) -> Option<TypeId> {
        self.index.get(name).copied()
    }

    pub fn lookup(&self, name: &str) -> Option<&NamedType> {
        self.type_id(name).and_then(|id| self.get(id))
    }

    /// All registered types, reachable or not.
    pub fn types(&self) -> impl Iterator<Item = &NamedType> {
        self.types.iter()
    }

    /// Types reachable from the roots, in registration order.
    pub fn reachable(&self) -> impl Iterator<Item = &NamedType> {
        self.reachable.iter().filter_map(|id| self.get(*id))
    }

    pub fn is_reachable(&self, name: &str) -> bool {
        self.type_id(name)
            .is_some_and(|id| self.reachable.binary_search(&id).is_ok())
    }

    /// Object, interface or root object by name.
    pub fn object(&self, name: &str) -> Option<&Object> {
        match name {
            "Query" => Some(&self.query),
            "Mutation" => self.mutation.as_ref(),
            other => self.lookup(other).and_then(NamedType::as_object),
        }
    }

    pub fn field(&self, type_name: &str, field_name: &str) -> Option<&Field> {
        self.object(type_name)
            .and_then(|object| object.fields.get(field_name))
    }

    /// Named type at the current depth, after removing a non-null wrapper.
    pub fn named(&self, ty: &TypeRef) -> Option<&NamedType> {
        match ty.strip_non_null() {
            TypeRef::Resolved(id) => self.get(*id),
            _ => None,
        }
    }

    pub fn input_object(&self, ty: &TypeRef) -> Option<&InputObject> {
        self.named(ty).and_then(NamedType::as_input_object)
    }

    /// Render a reference back into type-expression syntax.
    pub fn render(&self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Resolved(id) => self
                .get(*id)
                .map(|t| t.name().to_string())
                .unwrap_or_else(|| format!("#{}", id.0)),
            TypeRef::Pending(expr) => expr.clone(),
            TypeRef::Inline(ty) => ty.name().to_string(),
            TypeRef::List(inner) => format!("[{}]", self.render(inner)),
            TypeRef::NonNull(inner) => format!("{}!", self.render(inner)),
        }
    }
}
