//! Export of a finalized graph to the async-graphql dynamic schema
//!
//! Only types reachable from the roots are registered. Every field resolver
//! is the field's [`FieldPipeline`], adapted to the engine's calling
//! convention: arguments arrive as engine values and are converted to JSON
//! (enum names become their internal values), outputs are converted back
//! using the field's declared type.
//!
//! A failing nullable field is reported with its response path and resolves
//! to null, leaving its siblings untouched. A failing non-null field is
//! returned to the engine, which propagates the null to the parent.

use std::sync::Arc;

use async_graphql::dynamic::{
    self, FieldFuture, FieldValue, InterfaceField, ResolverContext, TypeRef as EngineTypeRef,
};
use async_graphql::{
    ErrorExtensionValues, Name, PathSegment, QueryPathSegment, Value as ConstValue,
};
use serde_json::{Map, Value};

use crate::core::{FieldCall, FieldError, FieldPipeline, Output, RequestContext};
use crate::schema::{
    scalars, Field, FinalizedSchema, InputValue, NamedType, Object, SchemaError, SchemaResult,
    TypeRef,
};

/// Root value of an operation, carried in request data
pub(crate) struct RootValue(pub Output);

/// Build the engine schema for a finalized graph.
pub(crate) fn build(graph: &Arc<FinalizedSchema>) -> SchemaResult<dynamic::Schema> {
    let mutation_name = graph.mutation().map(|m| m.name.as_str());
    let mut builder = dynamic::Schema::build(&graph.query().name, mutation_name, None);

    builder = builder.register(engine_object(graph, graph.query()));
    if let Some(mutation) = graph.mutation() {
        builder = builder.register(engine_object(graph, mutation));
    }

    for ty in graph.reachable() {
        builder = match ty {
            NamedType::Scalar(scalar) if scalars::is_builtin(&scalar.name) => builder,
            NamedType::Scalar(scalar) => {
                let mut engine = dynamic::Scalar::new(scalar.name.as_str());
                if let Some(description) = &scalar.description {
                    engine = engine.description(description.as_str());
                }
                if let Some(url) = &scalar.specified_by {
                    engine = engine.specified_by_url(url.as_str());
                }
                if let Some(check) = scalar.check.clone() {
                    engine = engine.validator(move |value: &ConstValue| {
                        value
                            .clone()
                            .into_json()
                            .map(|json| check(&json))
                            .unwrap_or(false)
                    });
                }
                builder.register(engine)
            }
            NamedType::Enum(e) => {
                let mut engine = dynamic::Enum::new(e.name.as_str());
                if let Some(description) = &e.description {
                    engine = engine.description(description.as_str());
                }
                for (name, value) in &e.values {
                    let mut item = dynamic::EnumItem::new(name.as_str());
                    if let Some(description) = &value.description {
                        item = item.description(description.as_str());
                    }
                    if let Some(reason) = &value.deprecation {
                        item = item.deprecation(Some(reason.as_str()));
                    }
                    engine = engine.item(item);
                }
                builder.register(engine)
            }
            NamedType::Object(object) => builder.register(engine_object(graph, object)),
            NamedType::Interface(object) => builder.register(engine_interface(graph, object)),
            NamedType::Union(union) => {
                let mut engine = dynamic::Union::new(union.name.as_str());
                if let Some(description) = &union.description {
                    engine = engine.description(description.as_str());
                }
                for member in &union.types {
                    engine = engine.possible_type(graph.render(member));
                }
                builder.register(engine)
            }
            NamedType::InputObject(input) => {
                let mut engine = dynamic::InputObject::new(input.name.as_str());
                if let Some(description) = &input.description {
                    engine = engine.description(description.as_str());
                }
                for (name, field) in &input.fields {
                    engine = engine.field(engine_input(graph, name, field));
                }
                builder.register(engine)
            }
        };
    }

    builder
        .finish()
        .map_err(|err| SchemaError::Engine(err.to_string()))
}

fn engine_type(graph: &FinalizedSchema, ty: &TypeRef) -> EngineTypeRef {
    match ty {
        TypeRef::List(inner) => EngineTypeRef::List(Box::new(engine_type(graph, inner))),
        TypeRef::NonNull(inner) => EngineTypeRef::NonNull(Box::new(engine_type(graph, inner))),
        other => EngineTypeRef::named(graph.render(other)),
    }
}

fn engine_object(graph: &Arc<FinalizedSchema>, object: &Object) -> dynamic::Object {
    let mut engine = dynamic::Object::new(object.name.as_str());
    if let Some(description) = &object.description {
        engine = engine.description(description.as_str());
    }
    for interface in &object.interfaces {
        engine = engine.implement(graph.render(interface));
    }
    for (name, field) in &object.fields {
        engine = engine.field(engine_field(graph, &object.name, name, field));
    }
    engine
}

fn engine_interface(graph: &Arc<FinalizedSchema>, object: &Object) -> dynamic::Interface {
    let mut engine = dynamic::Interface::new(object.name.as_str());
    if let Some(description) = &object.description {
        engine = engine.description(description.as_str());
    }
    for (name, field) in &object.fields {
        let mut engine_field = InterfaceField::new(name.as_str(), engine_type(graph, &field.ty));
        if let Some(description) = &field.description {
            engine_field = engine_field.description(description.as_str());
        }
        if let Some(reason) = &field.deprecation {
            engine_field = engine_field.deprecation(Some(reason.as_str()));
        }
        for (arg_name, arg) in &field.args {
            engine_field = engine_field.argument(engine_input(graph, arg_name, arg));
        }
        engine = engine.field(engine_field);
    }
    engine
}

fn engine_input(graph: &FinalizedSchema, name: &str, input: &InputValue) -> dynamic::InputValue {
    let mut engine = dynamic::InputValue::new(name, engine_type(graph, &input.ty));
    if let Some(default) = &input.default {
        engine = engine.default_value(to_engine_input(graph, &input.ty, default));
    }
    if let Some(description) = &input.description {
        engine = engine.description(description.as_str());
    }
    engine
}

/// Everything one field resolver needs, shared by all its calls
struct FieldBinding {
    graph: Arc<FinalizedSchema>,
    pipeline: FieldPipeline,
    parent_type: String,
    field_name: String,
    output_ty: TypeRef,
    nullable: bool,
    args: Vec<(String, TypeRef)>,
}

fn engine_field(
    graph: &Arc<FinalizedSchema>,
    parent_type: &str,
    name: &str,
    field: &Field,
) -> dynamic::Field {
    let binding = Arc::new(FieldBinding {
        graph: Arc::clone(graph),
        pipeline: FieldPipeline::for_field(graph, parent_type, name),
        parent_type: parent_type.to_string(),
        field_name: name.to_string(),
        output_ty: field.ty.clone(),
        nullable: !matches!(field.ty, TypeRef::NonNull(_)),
        args: field
            .args
            .iter()
            .map(|(name, arg)| (name.clone(), arg.ty.clone()))
            .collect(),
    });

    let mut engine = dynamic::Field::new(name, engine_type(graph, &field.ty), move |ctx| {
        let binding = Arc::clone(&binding);
        FieldFuture::new(async move {
            let call = field_call(&ctx, &binding)?;
            let result = match binding.pipeline.run(&call).await {
                Ok(output) => to_field_value(&binding.graph, &binding.output_ty, output),
                Err(err) => Err(to_engine_error(err)),
            };
            match result {
                Err(err) if binding.nullable => {
                    ctx.add_error(
                        err.into_server_error(ctx.item.pos)
                            .with_path(response_path(&ctx)),
                    );
                    Ok(None)
                }
                other => other,
            }
        })
    });

    for (arg_name, arg) in &field.args {
        engine = engine.argument(engine_input(graph, arg_name, arg));
    }
    if let Some(description) = &field.description {
        engine = engine.description(description.as_str());
    }
    if let Some(reason) = &field.deprecation {
        engine = engine.deprecation(Some(reason.as_str()));
    }
    engine
}

fn field_call(ctx: &ResolverContext<'_>, binding: &FieldBinding) -> async_graphql::Result<FieldCall> {
    let parent = match ctx.parent_value.try_downcast_ref::<Output>() {
        Ok(parent) => parent.clone(),
        Err(_) => ctx
            .data_opt::<RootValue>()
            .map(|root| root.0.clone())
            .unwrap_or_default(),
    };
    let context = ctx
        .data_opt::<Arc<RequestContext>>()
        .cloned()
        .unwrap_or_default();

    let mut args = Map::new();
    for (name, value) in ctx.args.as_index_map() {
        let json = value.clone().into_json()?;
        let json = match binding.args.iter().find(|(arg, _)| arg == name.as_str()) {
            Some((_, ty)) => to_internal(&binding.graph, ty, json),
            None => json,
        };
        args.insert(name.to_string(), json);
    }

    Ok(FieldCall {
        parent,
        context,
        args,
        field_name: binding.field_name.clone(),
        parent_type: binding.parent_type.clone(),
    })
}

/// Response path of the field being resolved, from the root.
fn response_path(ctx: &ResolverContext<'_>) -> Vec<PathSegment> {
    let Some(node) = ctx.path_node.as_ref() else {
        return Vec::new();
    };
    let mut path: Vec<PathSegment> = std::iter::once(node)
        .chain(node.parents())
        .map(|node| match &node.segment {
            QueryPathSegment::Name(name) => PathSegment::Field(name.to_string()),
            QueryPathSegment::Index(index) => PathSegment::Index(*index),
        })
        .collect();
    path.reverse();
    path
}

/// Map enum names in an incoming value to their internal values.
///
/// A single value given for a list type becomes a one-element list.
fn to_internal(graph: &FinalizedSchema, ty: &TypeRef, value: Value) -> Value {
    if value.is_null() {
        return value;
    }
    if let Some(element) = ty.element() {
        return match value {
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(|item| to_internal(graph, element, item))
                    .collect(),
            ),
            other => Value::Array(vec![to_internal(graph, element, other)]),
        };
    }
    match (graph.named(ty), value) {
        (Some(NamedType::Enum(e)), value) => {
            let mapped = value
                .as_str()
                .and_then(|name| e.values.get(name))
                .map(|v| v.value.clone());
            mapped.unwrap_or(value)
        }
        (Some(NamedType::InputObject(input)), Value::Object(fields)) => Value::Object(
            fields
                .into_iter()
                .map(|(name, value)| {
                    let value = match input.fields.get(&name) {
                        Some(field) => to_internal(graph, &field.ty, value),
                        None => value,
                    };
                    (name, value)
                })
                .collect(),
        ),
        (_, value) => value,
    }
}

/// Convert an internal value (e.g. a default) to an engine input value.
fn to_engine_input(graph: &FinalizedSchema, ty: &TypeRef, value: &Value) -> ConstValue {
    if value.is_null() {
        return ConstValue::Null;
    }
    if let Some(element) = ty.element() {
        return match value {
            Value::Array(items) => ConstValue::List(
                items
                    .iter()
                    .map(|item| to_engine_input(graph, element, item))
                    .collect(),
            ),
            other => to_engine_input(graph, element, other),
        };
    }
    match (graph.named(ty), value) {
        (Some(NamedType::Enum(e)), value) => match e.name_of(value) {
            Some(name) => ConstValue::Enum(Name::new(name)),
            None => ConstValue::from_json(value.clone()).unwrap_or(ConstValue::Null),
        },
        (Some(NamedType::InputObject(input)), Value::Object(fields)) => ConstValue::Object(
            fields
                .iter()
                .map(|(name, value)| {
                    let converted = match input.fields.get(name) {
                        Some(field) => to_engine_input(graph, &field.ty, value),
                        None => ConstValue::from_json(value.clone()).unwrap_or(ConstValue::Null),
                    };
                    (Name::new(name), converted)
                })
                .collect(),
        ),
        (_, value) => ConstValue::from_json(value.clone()).unwrap_or(ConstValue::Null),
    }
}

/// Convert a resolver output to the engine's field value for `ty`.
fn to_field_value<'a>(
    graph: &FinalizedSchema,
    ty: &TypeRef,
    output: Output,
) -> async_graphql::Result<Option<FieldValue<'a>>> {
    if output.is_null() {
        return Ok(None);
    }

    if let Some(element) = ty.element() {
        let items: Vec<Output> = match output {
            Output::List(items) => items,
            Output::Value(Value::Array(items)) => items.into_iter().map(Output::from).collect(),
            other => {
                return Err(async_graphql::Error::new(format!(
                    "Expected a list for '{}', got {}",
                    graph.render(ty),
                    other.kind()
                )))
            }
        };
        let values = items
            .into_iter()
            .map(|item| Ok(to_field_value(graph, element, item)?.unwrap_or(FieldValue::NULL)))
            .collect::<async_graphql::Result<Vec<_>>>()?;
        return Ok(Some(FieldValue::list(values)));
    }

    let Some(named) = graph.named(ty) else {
        return Err(async_graphql::Error::new(format!(
            "Unresolved output type '{}'",
            graph.render(ty)
        )));
    };
    match (named, output) {
        (NamedType::Scalar(_), Output::Value(value)) => {
            Ok(Some(FieldValue::value(ConstValue::from_json(value)?)))
        }
        (NamedType::Enum(e), Output::Value(value)) => {
            let name = e
                .name_of(&value)
                .or_else(|| value.as_str().filter(|name| e.values.contains_key(*name)))
                .ok_or_else(|| {
                    async_graphql::Error::new(format!(
                        "{} is not a value of enum '{}'",
                        value, e.name
                    ))
                })?;
            Ok(Some(FieldValue::value(ConstValue::Enum(Name::new(name)))))
        }
        (NamedType::Object(_), output @ (Output::Object(_) | Output::Value(Value::Object(_)))) => {
            Ok(Some(FieldValue::owned_any(output)))
        }
        (
            NamedType::Interface(_) | NamedType::Union(_),
            output @ (Output::Object(_) | Output::Value(Value::Object(_))),
        ) => {
            let type_name = output.type_name().map(str::to_string).ok_or_else(|| {
                async_graphql::Error::new(format!(
                    "Cannot determine the object type for abstract type '{}'",
                    named.name()
                ))
            })?;
            Ok(Some(FieldValue::owned_any(output).with_type(type_name)))
        }
        (named, output) => Err(async_graphql::Error::new(format!(
            "Cannot return {} for {} '{}'",
            output.kind(),
            named.kind().as_str(),
            named.name()
        ))),
    }
}

/// Engine-level error for a failed field pipeline.
///
/// Validation failures carry the error tree as extensions, one entry per
/// top-level key.
fn to_engine_error(err: FieldError) -> async_graphql::Error {
    let mut engine = async_graphql::Error::new(err.to_string());
    let mut extensions = ErrorExtensionValues::default();
    match err.payload() {
        Some(Value::Object(payload)) => {
            for (key, value) in payload {
                if let Ok(value) = ConstValue::from_json(value) {
                    extensions.set(key, value);
                }
            }
        }
        Some(other) => {
            if let Ok(value) = ConstValue::from_json(other) {
                extensions.set("data", value);
            }
        }
        None => return engine,
    }
    engine.extensions = Some(extensions);
    engine
}
