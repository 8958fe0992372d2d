//! Type reference resolution
//!
//! One pass over a copy of the builder state:
//! 1. hoist inline definitions into the name table (each type visited once)
//! 2. check names
//! 3. replace every pending expression with resolved handles
//! 4. optionally check validator nesting against list depth
//! 5. compute the set of types reachable from the roots
//!
//! Every problem is collected; the caller only gets a graph if there are none.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use indexmap::IndexMap;
use tracing::debug;

use super::config::SchemaConfig;
use super::errors::{SchemaError, SchemaResult};
use super::finalized::FinalizedSchema;
use super::names;
use super::scalars;
use super::type_expr::TypeExpr;
use super::types::{NamedType, Object, RefSite, TypeId, TypeKind, TypeRef};
use crate::validation;

/// Builder state handed to resolution
pub(crate) struct Unresolved<'a> {
    pub query: &'a Object,
    pub mutation: &'a Object,
    pub types: &'a IndexMap<String, NamedType>,
    /// Default scalars that have not been replaced yet
    pub overridable: &'a HashSet<String>,
    pub config: &'a SchemaConfig,
}

pub(crate) fn resolve(input: Unresolved<'_>) -> SchemaResult<FinalizedSchema> {
    let mut query = input.query.clone();
    let mut mutation = input.mutation.clone();
    let mut table = input.types.clone();
    let mut overridable = input.overridable.clone();
    let mut errors = Vec::new();

    hoist_inline_types(&mut query, &mut mutation, &mut table, &mut overridable, &mut errors);
    check_names(&query, &mutation, &table, &mut errors);

    let index: HashMap<String, TypeId> = table
        .keys()
        .enumerate()
        .map(|(i, name)| (name.clone(), TypeId(i)))
        .collect();
    let kinds: Vec<TypeKind> = table.values().map(NamedType::kind).collect();

    let mut refs = RefResolver {
        index: &index,
        kinds: &kinds,
        unresolved: BTreeSet::new(),
        errors: Vec::new(),
    };
    query.visit_refs_mut(&mut |site, r| refs.resolve(&site, r));
    mutation.visit_refs_mut(&mut |site, r| refs.resolve(&site, r));
    for ty in table.values_mut() {
        ty.visit_refs_mut(&mut |site, r| refs.resolve(&site, r));
    }
    errors.append(&mut refs.errors);
    if !refs.unresolved.is_empty() {
        errors.push(SchemaError::UnresolvedTypes {
            names: refs.unresolved.into_iter().collect(),
        });
    }

    if input.config.check_validator_depth {
        check_validator_depth(&query, &mutation, &table, &mut errors);
    }

    if let Some(err) = SchemaError::from_errors(errors) {
        debug!(code = err.code(), "schema resolution failed");
        return Err(err);
    }

    let types: Vec<NamedType> = table.into_values().collect();
    let mutation = (!mutation.fields.is_empty()).then_some(mutation);
    let reachable = reachable_types(&types, &query, mutation.as_ref());
    debug!(
        types = types.len(),
        reachable = reachable.len(),
        "schema references resolved"
    );

    Ok(FinalizedSchema::new(
        types,
        query,
        mutation,
        reachable,
        input.config.clone(),
    ))
}

/// Add a type to the name table.
///
/// Built-in scalars and root names are never replaceable; a default scalar
/// can be replaced once.
pub(crate) fn register(
    table: &mut IndexMap<String, NamedType>,
    overridable: &mut HashSet<String>,
    ty: NamedType,
) -> SchemaResult<()> {
    let name = ty.name().to_string();
    if scalars::is_builtin(&name) || names::ROOT_NAMES.contains(&name.as_str()) {
        return Err(SchemaError::DuplicateType { name });
    }
    if table.contains_key(&name) && !overridable.remove(&name) {
        return Err(SchemaError::DuplicateType { name });
    }
    table.insert(name, ty);
    Ok(())
}

fn hoist(r: &mut TypeRef, found: &mut Vec<NamedType>) {
    match r {
        TypeRef::Inline(ty) => {
            let name = ty.name().to_string();
            if let TypeRef::Inline(ty) = std::mem::replace(r, TypeRef::Pending(name)) {
                found.push(*ty);
            }
        }
        TypeRef::List(inner) | TypeRef::NonNull(inner) => hoist(inner, found),
        TypeRef::Pending(_) | TypeRef::Resolved(_) => {}
    }
}

fn hoist_inline_types(
    query: &mut Object,
    mutation: &mut Object,
    table: &mut IndexMap<String, NamedType>,
    overridable: &mut HashSet<String>,
    errors: &mut Vec<SchemaError>,
) {
    let mut found = Vec::new();
    query.visit_refs_mut(&mut |_, r| hoist(r, &mut found));
    mutation.visit_refs_mut(&mut |_, r| hoist(r, &mut found));

    let mut queue: VecDeque<String> = table.keys().cloned().collect();
    loop {
        for ty in found.drain(..) {
            let name = ty.name().to_string();
            match register(table, overridable, ty) {
                Ok(()) => queue.push_back(name),
                Err(err) => errors.push(err),
            }
        }
        let Some(name) = queue.pop_front() else {
            break;
        };
        if let Some(ty) = table.get_mut(&name) {
            ty.visit_refs_mut(&mut |_, r| hoist(r, &mut found));
        }
    }
}

fn check_names(
    query: &Object,
    mutation: &Object,
    table: &IndexMap<String, NamedType>,
    errors: &mut Vec<SchemaError>,
) {
    let mut check = |location: &str, name: &str| {
        if let Err(err) = names::check(location, name) {
            errors.push(err);
        }
    };

    for ty in table.values() {
        check(ty.name(), ty.name());
        match ty {
            NamedType::Enum(e) => {
                for value in e.values.keys() {
                    check(&format!("{}.{}", e.name, value), value);
                }
            }
            NamedType::InputObject(input) => {
                for field in input.fields.keys() {
                    check(&format!("{}.{}", input.name, field), field);
                }
            }
            _ => {}
        }
    }

    let objects = table
        .values()
        .filter_map(NamedType::as_object)
        .chain([query, mutation]);
    for object in objects {
        for (field_name, field) in &object.fields {
            let location = format!("{}.{}", object.name, field_name);
            check(&location, field_name);
            for arg in field.args.keys() {
                check(&format!("{}({})", location, arg), arg);
            }
        }
    }
}

struct RefResolver<'a> {
    index: &'a HashMap<String, TypeId>,
    kinds: &'a [TypeKind],
    unresolved: BTreeSet<String>,
    errors: Vec<SchemaError>,
}

impl RefResolver<'_> {
    fn resolve(&mut self, site: &RefSite, r: &mut TypeRef) {
        match r {
            TypeRef::Pending(expression) => match TypeExpr::parse(expression) {
                Ok(expr) => {
                    if let Some(resolved) = self.build(site, &expr) {
                        *r = resolved;
                    }
                }
                Err(err) => self.errors.push(SchemaError::InvalidTypeExpression {
                    location: site.location.clone(),
                    expression: expression.clone(),
                    reason: err.to_string(),
                }),
            },
            TypeRef::List(inner) | TypeRef::NonNull(inner) => self.resolve(site, inner),
            TypeRef::Inline(_) | TypeRef::Resolved(_) => {}
        }
    }

    fn build(&mut self, site: &RefSite, expr: &TypeExpr) -> Option<TypeRef> {
        match expr {
            TypeExpr::Named(name) => {
                let Some(&id) = self.index.get(name) else {
                    self.unresolved.insert(name.clone());
                    return None;
                };
                if !site.position.accepts(self.kinds[id.0]) {
                    self.errors.push(SchemaError::KindMismatch {
                        location: site.location.clone(),
                        name: name.clone(),
                        expected: site.position.expected(),
                    });
                    return None;
                }
                Some(TypeRef::Resolved(id))
            }
            TypeExpr::List(inner) => self.build(site, inner).map(TypeRef::list),
            TypeExpr::NonNull(inner) => self.build(site, inner).map(TypeRef::non_null),
        }
    }
}

fn check_validator_depth(
    query: &Object,
    mutation: &Object,
    table: &IndexMap<String, NamedType>,
    errors: &mut Vec<SchemaError>,
) {
    let mut visit = |location: &str, input: &super::types::InputValue| {
        let spec_depth = validation::depth(&input.validators);
        let list_depth = input.ty.list_depth().unwrap_or(0);
        if spec_depth > list_depth {
            errors.push(SchemaError::ValidatorDepth {
                location: location.to_string(),
                spec_depth,
                list_depth,
            });
        }
    };
    query.visit_inputs(&mut visit);
    mutation.visit_inputs(&mut visit);
    for ty in table.values() {
        ty.visit_inputs(&mut visit);
    }
}

/// Types reachable from the roots, plus objects implementing a reachable
/// interface. Sorted by id.
fn reachable_types(types: &[NamedType], query: &Object, mutation: Option<&Object>) -> Vec<TypeId> {
    let mut seen: HashSet<TypeId> = HashSet::new();
    let mut queue: VecDeque<TypeId> = VecDeque::new();
    let enqueue = |r: &TypeRef, seen: &mut HashSet<TypeId>, queue: &mut VecDeque<TypeId>| {
        if let Some(id) = r.resolved_id() {
            if seen.insert(id) {
                queue.push_back(id);
            }
        }
    };

    let roots = std::iter::once(query).chain(mutation);
    for root in roots {
        root.visit_refs(&mut |r| enqueue(r, &mut seen, &mut queue));
    }

    loop {
        while let Some(id) = queue.pop_front() {
            if let Some(ty) = types.get(id.0) {
                ty.visit_refs(&mut |r| enqueue(r, &mut seen, &mut queue));
            }
        }

        let implementors: Vec<TypeId> = types
            .iter()
            .enumerate()
            .filter(|(i, _)| !seen.contains(&TypeId(*i)))
            .filter_map(|(i, ty)| match ty {
                NamedType::Object(object)
                    if object
                        .interfaces
                        .iter()
                        .filter_map(TypeRef::resolved_id)
                        .any(|iface| seen.contains(&iface)) =>
                {
                    Some(TypeId(i))
                }
                _ => None,
            })
            .collect();
        if implementors.is_empty() {
            break;
        }
        for id in implementors {
            seen.insert(id);
            queue.push_back(id);
        }
    }

    let mut reachable: Vec<TypeId> = seen.into_iter().collect();
    reachable.sort();
    reachable
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::{Field, InputObject, InputValue, Union};
    use crate::validation::ValidatorSpec;

    fn run(query: Object, types: Vec<NamedType>) -> SchemaResult<FinalizedSchema> {
        run_with(query, Object::new("Mutation"), types, &SchemaConfig::default())
    }

    fn run_with(
        query: Object,
        mutation: Object,
        types: Vec<NamedType>,
        config: &SchemaConfig,
    ) -> SchemaResult<FinalizedSchema> {
        let mut table = IndexMap::new();
        let mut overridable = HashSet::new();
        for scalar in scalars::builtins() {
            table.insert(scalar.name.clone(), NamedType::Scalar(scalar));
        }
        for ty in types {
            register(&mut table, &mut overridable, ty)?;
        }
        resolve(Unresolved {
            query: &query,
            mutation: &mutation,
            types: &table,
            overridable: &overridable,
            config,
        })
    }

    #[test]
    fn test_cycles_resolve() {
        let user = Object::new("User")
            .field("name", "String!")
            .field("friend", "User")
            .field("friends", "[User!]!");
        let schema = run(Object::new("Query").field("me", "User"), vec![user.into()]).unwrap();

        let user_id = schema.type_id("User").unwrap();
        let friend = schema.field("User", "friend").unwrap();
        assert_eq!(friend.ty.resolved_id(), Some(user_id));
        assert_eq!(
            schema.render(&schema.field("User", "friends").unwrap().ty),
            "[User!]!"
        );
        assert!(schema.is_reachable("User"));
        assert!(schema.mutation().is_none());
    }

    #[test]
    fn test_inline_definitions_are_hoisted() {
        let address = Object::new("Address").field("city", "String");
        let query = Object::new("Query").field(
            "me",
            Object::new("User").field("address", Field::new(address)),
        );
        let schema = run(query, vec![]).unwrap();
        assert!(schema.lookup("User").is_some());
        assert!(schema.lookup("Address").is_some());
        assert!(schema.is_reachable("Address"));
    }

    #[test]
    fn test_all_unresolved_names_reported_sorted() {
        let query = Object::new("Query")
            .field("ghost", "Ghost")
            .field("user", Field::new("User").arg("filter", "[UserFilter!]"));
        let err = run(query, vec![]).unwrap_err();
        assert_eq!(err.unresolved_names(), vec!["Ghost", "User", "UserFilter"]);
    }

    #[test]
    fn test_unresolved_in_unreachable_type_is_reported() {
        let orphan = Object::new("Orphan").field("ghost", "Ghost");
        let err = run(Object::new("Query").field("a", "Int"), vec![orphan.into()]).unwrap_err();
        assert_eq!(err.unresolved_names(), vec!["Ghost"]);
    }

    #[test]
    fn test_invalid_expression_names_location() {
        let query = Object::new("Query").field("user", Field::new("Int").arg("id", "[ID!"));
        let err = run(query, vec![]).unwrap_err();
        match err {
            SchemaError::InvalidTypeExpression {
                location,
                expression,
                ..
            } => {
                assert_eq!(location, "Query.user(id)");
                assert_eq!(expression, "[ID!");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_kind_mismatch() {
        let input = InputObject::new("UserInput").field("name", "String");
        let query = Object::new("Query").field("user", "UserInput");
        let err = run(query, vec![input.into()]).unwrap_err();
        assert_eq!(err.code(), "SCHEMA_KIND_MISMATCH");

        let union = Union::new("Result").member("String");
        let query = Object::new("Query").field("result", "Result");
        let err = run(query, vec![union.into()]).unwrap_err();
        assert_eq!(err.code(), "SCHEMA_KIND_MISMATCH");
    }

    #[test]
    fn test_duplicate_inline_definition() {
        let query = Object::new("Query")
            .field("a", Object::new("Thing").field("x", "Int"))
            .field("b", Object::new("Thing").field("y", "Int"));
        let err = run(query, vec![]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateType {
                name: "Thing".into()
            }
        );
    }

    #[test]
    fn test_errors_are_collected_together() {
        let query = Object::new("Query")
            .field("bad-name", "Int")
            .field("ghost", "Ghost");
        let err = run(query, vec![]).unwrap_err();
        let codes: Vec<_> = err.iter().map(SchemaError::code).collect();
        assert_eq!(codes, vec!["SCHEMA_INVALID_NAME", "SCHEMA_UNRESOLVED_TYPES"]);
    }

    #[test]
    fn test_static_validator_depth_check() {
        let noop = || ValidatorSpec::from_fn(|_, _, _| Ok(()));
        let arg = InputValue::from("[Int!]!").each([ValidatorSpec::each([noop()])]);
        let query = Object::new("Query").field("values", Field::new("Int").arg("values", arg));

        let err = run(query.clone(), vec![]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::ValidatorDepth {
                location: "Query.values(values)".into(),
                spec_depth: 2,
                list_depth: 1,
            }
        );

        let relaxed = SchemaConfig::default().with_validator_depth_check(false);
        assert!(run_with(query, Object::new("Mutation"), vec![], &relaxed).is_ok());
    }

    #[test]
    fn test_interface_implementors_are_reachable() {
        let node = Object::new("Node").field("id", "ID!").into_interface();
        let user = Object::new("User").implements("Node").field("id", "ID!");
        let unused = Object::new("Unused").field("id", "ID!");
        let schema = run(
            Object::new("Query").field("node", "Node"),
            vec![node, user.into(), unused.into()],
        )
        .unwrap();

        assert!(schema.is_reachable("Node"));
        assert!(schema.is_reachable("User"));
        assert!(!schema.is_reachable("Unused"));
        assert!(schema.lookup("Unused").is_some());
    }

    #[test]
    fn test_root_names_cannot_be_registered() {
        let mut table = IndexMap::new();
        let mut overridable = HashSet::new();
        let err = register(
            &mut table,
            &mut overridable,
            Object::new("Query").into(),
        )
        .unwrap_err();
        assert_eq!(err.code(), "SCHEMA_DUPLICATE_TYPE");
    }
}
