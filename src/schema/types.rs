//! Schema graph node types
//!
//! Named types:
//! - Scalar: leaf value, optionally with an input check
//! - Enum: named values mapped to internal values
//! - Object / Interface: output types with fields
//! - Union: one of several object types
//! - InputObject: input types with fields and data validators
//!
//! Types refer to each other through [`TypeRef`]: a type-expression string
//! resolved by name at finalization, an inline definition registered at
//! finalization, or (after finalization) a direct handle into the schema.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::core::{FieldCall, FieldResult, Output, PreCheck, RequestContext, Resolver};
use crate::validation::{DataCheck, DataValidator, ValidationError, ValidatorSpec, ValueValidator};

use super::type_expr::TypeExpr;

/// Handle to a named type inside a finalized schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub(crate) usize);

impl TypeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Possibly unresolved reference to a type
#[derive(Debug, Clone)]
pub enum TypeRef {
    /// Type expression such as `[User!]!`, resolved by name later
    Pending(String),
    /// Definition given in place, registered under its own name
    Inline(Box<NamedType>),
    /// Resolved named type
    Resolved(TypeId),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    /// Reference by type expression
    pub fn named(expression: impl Into<String>) -> Self {
        Self::Pending(expression.into())
    }

    pub fn list(self) -> Self {
        Self::List(Box::new(self))
    }

    pub fn non_null(self) -> Self {
        Self::NonNull(Box::new(self))
    }

    pub fn strip_non_null(&self) -> &TypeRef {
        match self {
            Self::NonNull(inner) => inner.strip_non_null(),
            other => other,
        }
    }

    /// Element type when this is a (possibly non-null) list.
    pub fn element(&self) -> Option<&TypeRef> {
        match self.strip_non_null() {
            Self::List(inner) => Some(inner),
            _ => None,
        }
    }

    /// The reference with every wrapper removed.
    pub fn innermost(&self) -> &TypeRef {
        match self {
            Self::List(inner) | Self::NonNull(inner) => inner.innermost(),
            other => other,
        }
    }

    pub fn resolved_id(&self) -> Option<TypeId> {
        match self.innermost() {
            Self::Resolved(id) => Some(*id),
            _ => None,
        }
    }

    /// Number of list wrappers, `None` if a pending expression does not parse.
    pub fn list_depth(&self) -> Option<usize> {
        match self {
            Self::Pending(expr) => TypeExpr::parse(expr).ok().map(|e| e.list_depth()),
            Self::Inline(_) | Self::Resolved(_) => Some(0),
            Self::List(inner) => inner.list_depth().map(|depth| depth + 1),
            Self::NonNull(inner) => inner.list_depth(),
        }
    }

    /// Whether the outermost wrapper is non-null.
    pub fn is_non_null(&self) -> bool {
        match self {
            Self::NonNull(_) => true,
            Self::Pending(expr) => TypeExpr::parse(expr).is_ok_and(|e| e.is_non_null()),
            _ => false,
        }
    }
}

impl From<&str> for TypeRef {
    fn from(expression: &str) -> Self {
        Self::Pending(expression.to_string())
    }
}

impl From<String> for TypeRef {
    fn from(expression: String) -> Self {
        Self::Pending(expression)
    }
}

impl From<NamedType> for TypeRef {
    fn from(ty: NamedType) -> Self {
        Self::Inline(Box::new(ty))
    }
}

/// Kind of a named type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Scalar,
    Enum,
    Object,
    Interface,
    Union,
    InputObject,
}

impl TypeKind {
    pub fn is_input(self) -> bool {
        matches!(self, Self::Scalar | Self::Enum | Self::InputObject)
    }

    pub fn is_output(self) -> bool {
        !matches!(self, Self::InputObject)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Enum => "enum",
            Self::Object => "object",
            Self::Interface => "interface",
            Self::Union => "union",
            Self::InputObject => "input object",
        }
    }
}

/// A uniquely named schema type
#[derive(Debug, Clone)]
pub enum NamedType {
    Scalar(Scalar),
    Enum(Enum),
    Object(Object),
    Interface(Object),
    Union(Union),
    InputObject(InputObject),
}

impl NamedType {
    pub fn interface(object: Object) -> Self {
        Self::Interface(object)
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Scalar(t) => &t.name,
            Self::Enum(t) => &t.name,
            Self::Object(t) | Self::Interface(t) => &t.name,
            Self::Union(t) => &t.name,
            Self::InputObject(t) => &t.name,
        }
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            Self::Scalar(_) => TypeKind::Scalar,
            Self::Enum(_) => TypeKind::Enum,
            Self::Object(_) => TypeKind::Object,
            Self::Interface(_) => TypeKind::Interface,
            Self::Union(_) => TypeKind::Union,
            Self::InputObject(_) => TypeKind::InputObject,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Scalar(t) => t.description.as_deref(),
            Self::Enum(t) => t.description.as_deref(),
            Self::Object(t) | Self::Interface(t) => t.description.as_deref(),
            Self::Union(t) => t.description.as_deref(),
            Self::InputObject(t) => t.description.as_deref(),
        }
    }

    /// Object or interface fields
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(t) | Self::Interface(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut Object> {
        match self {
            Self::Object(t) | Self::Interface(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_input_object(&self) -> Option<&InputObject> {
        match self {
            Self::InputObject(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_input_object_mut(&mut self) -> Option<&mut InputObject> {
        match self {
            Self::InputObject(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&Enum> {
        match self {
            Self::Enum(t) => Some(t),
            _ => None,
        }
    }

    /// Name-based non-null reference to this type.
    pub fn non_null(&self) -> TypeRef {
        TypeRef::named(self.name()).non_null()
    }

    /// Name-based list reference to this type.
    pub fn list(&self) -> TypeRef {
        TypeRef::named(self.name()).list()
    }

    /// Visit every reference held by this type.
    pub(crate) fn visit_refs_mut(&mut self, visit: &mut dyn FnMut(RefSite, &mut TypeRef)) {
        match self {
            Self::Object(object) | Self::Interface(object) => object.visit_refs_mut(visit),
            Self::Union(union) => {
                for member in &mut union.types {
                    visit(RefSite::new(&union.name, Position::UnionMember), member);
                }
            }
            Self::InputObject(input) => {
                for (name, field) in &mut input.fields {
                    let location = format!("{}.{}", input.name, name);
                    visit(RefSite::new(location, Position::Input), &mut field.ty);
                }
            }
            Self::Scalar(_) | Self::Enum(_) => {}
        }
    }

    pub(crate) fn visit_refs(&self, visit: &mut dyn FnMut(&TypeRef)) {
        match self {
            Self::Object(object) | Self::Interface(object) => object.visit_refs(visit),
            Self::Union(union) => union.types.iter().for_each(|member| visit(member)),
            Self::InputObject(input) => input.fields.values().for_each(|f| visit(&f.ty)),
            Self::Scalar(_) | Self::Enum(_) => {}
        }
    }

    /// Visit every argument and input field with its location.
    pub(crate) fn visit_inputs(&self, visit: &mut dyn FnMut(&str, &InputValue)) {
        match self {
            Self::Object(object) | Self::Interface(object) => object.visit_inputs(visit),
            Self::InputObject(input) => {
                for (name, field) in &input.fields {
                    visit(&format!("{}.{}", input.name, name), field);
                }
            }
            _ => {}
        }
    }
}

/// What a reference is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Field output type
    Output,
    /// Argument or input field type
    Input,
    /// Interface implemented by an object
    Interface,
    /// Union member
    UnionMember,
}

impl Position {
    pub fn accepts(self, kind: TypeKind) -> bool {
        match self {
            Self::Output => kind.is_output(),
            Self::Input => kind.is_input(),
            Self::Interface => kind == TypeKind::Interface,
            Self::UnionMember => kind == TypeKind::Object,
        }
    }

    pub fn expected(self) -> &'static str {
        match self {
            Self::Output => "an output type",
            Self::Input => "an input type",
            Self::Interface => "an interface",
            Self::UnionMember => "an object type",
        }
    }
}

/// Where a reference sits in the graph, for error messages
#[derive(Debug, Clone)]
pub struct RefSite {
    pub location: String,
    pub position: Position,
}

impl RefSite {
    fn new(location: impl Into<String>, position: Position) -> Self {
        Self {
            location: location.into(),
            position,
        }
    }
}

macro_rules! named_type_conversions {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for NamedType {
                fn from(ty: $ty) -> Self {
                    Self::$variant(ty)
                }
            }

            impl From<$ty> for TypeRef {
                fn from(ty: $ty) -> Self {
                    Self::Inline(Box::new(NamedType::$variant(ty)))
                }
            }

            impl $ty {
                /// Name-based non-null reference to this type.
                pub fn non_null(&self) -> TypeRef {
                    TypeRef::named(self.name.as_str()).non_null()
                }

                /// Name-based list reference to this type.
                pub fn list(&self) -> TypeRef {
                    TypeRef::named(self.name.as_str()).list()
                }
            }
        )*
    };
}

named_type_conversions! {
    Scalar => Scalar,
    Enum => Enum,
    Object => Object,
    Union => Union,
    InputObject => InputObject,
}

/// Check applied to incoming scalar values
pub type ScalarCheck = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Custom scalar type
#[derive(Clone)]
pub struct Scalar {
    pub name: String,
    pub description: Option<String>,
    pub specified_by: Option<String>,
    pub check: Option<ScalarCheck>,
}

impl Scalar {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            specified_by: None,
            check: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn specified_by(mut self, url: impl Into<String>) -> Self {
        self.specified_by = Some(url.into());
        self
    }

    /// Reject input values for which `check` returns false.
    pub fn check<F>(mut self, check: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.check = Some(Arc::new(check));
        self
    }
}

impl fmt::Debug for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scalar")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("specified_by", &self.specified_by)
            .field("check", &self.check.is_some())
            .finish()
    }
}

/// One enum value
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    /// Internal value resolvers see and return
    pub value: Value,
    pub description: Option<String>,
    pub deprecation: Option<String>,
}

/// Enum type mapping names to internal values
#[derive(Debug, Clone)]
pub struct Enum {
    pub name: String,
    pub values: IndexMap<String, EnumValue>,
    pub description: Option<String>,
}

impl Enum {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: IndexMap::new(),
            description: None,
        }
    }

    /// Enum whose internal values equal their names
    pub fn with_values<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        values
            .into_iter()
            .fold(Self::new(name), |e, value| e.value(value))
    }

    pub fn value(self, name: impl Into<String>) -> Self {
        let name = name.into();
        let value = Value::String(name.clone());
        self.value_with(name, value)
    }

    pub fn value_with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.values.insert(
            name.into(),
            EnumValue {
                value,
                description: None,
                deprecation: None,
            },
        );
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Name of the enum value mapped to `value`.
    pub fn name_of(&self, value: &Value) -> Option<&str> {
        self.values
            .iter()
            .find(|(_, v)| &v.value == value)
            .map(|(name, _)| name.as_str())
    }
}

/// Union of object types
#[derive(Debug, Clone)]
pub struct Union {
    pub name: String,
    pub types: Vec<TypeRef>,
    pub description: Option<String>,
}

impl Union {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: Vec::new(),
            description: None,
        }
    }

    pub fn member(mut self, ty: impl Into<TypeRef>) -> Self {
        self.types.push(ty.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Object or interface type
#[derive(Debug, Clone)]
pub struct Object {
    pub name: String,
    pub fields: IndexMap<String, Field>,
    pub interfaces: Vec<TypeRef>,
    pub description: Option<String>,
}

impl Object {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
            interfaces: Vec::new(),
            description: None,
        }
    }

    /// Add a field. Accepts a full [`Field`], a type expression or a type.
    pub fn field(mut self, name: impl Into<String>, field: impl Into<Field>) -> Self {
        self.fields.insert(name.into(), field.into());
        self
    }

    /// Add a field with its own resolver function.
    pub fn field_with<F>(self, name: impl Into<String>, ty: impl Into<TypeRef>, resolve: F) -> Self
    where
        F: Fn(&FieldCall) -> FieldResult<Output> + Send + Sync + 'static,
    {
        self.field(name, Field::new(ty).resolve_with(resolve))
    }

    pub fn implements(mut self, interface: impl Into<TypeRef>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn add_field(&mut self, name: impl Into<String>, field: impl Into<Field>) {
        self.fields.insert(name.into(), field.into());
    }

    pub fn remove_field(&mut self, name: &str) -> Option<Field> {
        self.fields.shift_remove(name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.get_mut(name)
    }

    pub fn into_interface(self) -> NamedType {
        NamedType::Interface(self)
    }

    pub(crate) fn visit_refs_mut(&mut self, visit: &mut dyn FnMut(RefSite, &mut TypeRef)) {
        for interface in &mut self.interfaces {
            visit(RefSite::new(&self.name, Position::Interface), interface);
        }
        for (field_name, field) in &mut self.fields {
            let location = format!("{}.{}", self.name, field_name);
            for (arg_name, arg) in &mut field.args {
                let site = RefSite::new(format!("{}({})", location, arg_name), Position::Input);
                visit(site, &mut arg.ty);
            }
            visit(RefSite::new(location, Position::Output), &mut field.ty);
        }
    }

    pub(crate) fn visit_refs(&self, visit: &mut dyn FnMut(&TypeRef)) {
        self.interfaces.iter().for_each(|i| visit(i));
        for field in self.fields.values() {
            field.args.values().for_each(|arg| visit(&arg.ty));
            visit(&field.ty);
        }
    }

    pub(crate) fn visit_inputs(&self, visit: &mut dyn FnMut(&str, &InputValue)) {
        for (field_name, field) in &self.fields {
            for (arg_name, arg) in &field.args {
                visit(&format!("{}.{}({})", self.name, field_name, arg_name), arg);
            }
        }
    }
}

/// Field on an object or interface
#[derive(Clone)]
pub struct Field {
    pub ty: TypeRef,
    pub args: IndexMap<String, Argument>,
    /// Data validators over the whole argument dict
    pub validators: Vec<DataCheck>,
    /// `None` uses the schema's default resolver style
    pub resolver: Option<Resolver>,
    pub pre_check: Option<Arc<dyn PreCheck>>,
    pub description: Option<String>,
    pub deprecation: Option<String>,
}

impl Field {
    pub fn new(ty: impl Into<TypeRef>) -> Self {
        Self {
            ty: ty.into(),
            args: IndexMap::new(),
            validators: Vec::new(),
            resolver: None,
            pre_check: None,
            description: None,
            deprecation: None,
        }
    }

    /// Add an argument. Accepts a full [`InputValue`], a type expression or a type.
    pub fn arg(mut self, name: impl Into<String>, arg: impl Into<Argument>) -> Self {
        self.args.insert(name.into(), arg.into());
        self
    }

    /// Add a data validator over the argument dict.
    pub fn validator<F>(self, validate: F) -> Self
    where
        F: Fn(&RequestContext, &Map<String, Value>) -> Result<(), ValidationError>
            + Send
            + Sync
            + 'static,
    {
        self.validate_with(validate)
    }

    pub fn validate_with(mut self, validator: impl DataValidator + 'static) -> Self {
        self.validators.push(DataCheck::new(validator));
        self
    }

    pub fn resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn resolve_with<F>(self, resolve: F) -> Self
    where
        F: Fn(&FieldCall) -> FieldResult<Output> + Send + Sync + 'static,
    {
        self.resolver(Resolver::from_fn(resolve))
    }

    pub fn pre_check<F>(mut self, check: F) -> Self
    where
        F: Fn(&FieldCall) -> FieldResult<()> + Send + Sync + 'static,
    {
        self.pre_check = Some(Arc::new(check));
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn deprecated(mut self, reason: impl Into<String>) -> Self {
        self.deprecation = Some(reason.into());
        self
    }

    /// Whether any validation work is attached to this field's input.
    pub fn has_validation(&self) -> bool {
        !self.validators.is_empty() || !self.args.is_empty()
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("ty", &self.ty)
            .field("args", &self.args)
            .field("validators", &self.validators.len())
            .field("resolver", &self.resolver)
            .field("pre_check", &self.pre_check.is_some())
            .field("description", &self.description)
            .field("deprecation", &self.deprecation)
            .finish()
    }
}

/// Argument of a field, or field of an input object
#[derive(Debug, Clone)]
pub struct InputValue {
    pub ty: TypeRef,
    pub default: Option<Value>,
    pub validators: Vec<ValidatorSpec>,
    pub description: Option<String>,
    pub deprecation: Option<String>,
}

pub type Argument = InputValue;
pub type InputField = InputValue;

impl InputValue {
    pub fn new(ty: impl Into<TypeRef>) -> Self {
        Self {
            ty: ty.into(),
            default: None,
            validators: Vec::new(),
            description: None,
            deprecation: None,
        }
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Add a value validator for the value at this depth.
    pub fn validator<F>(self, validate: F) -> Self
    where
        F: Fn(&RequestContext, &Value, &Map<String, Value>) -> Result<(), ValidationError>
            + Send
            + Sync
            + 'static,
    {
        self.validate_with(validate)
    }

    pub fn validate_with(mut self, validator: impl ValueValidator + 'static) -> Self {
        self.validators.push(ValidatorSpec::leaf(validator));
        self
    }

    /// Add a group applied to each element of the list value.
    pub fn each(mut self, specs: impl IntoIterator<Item = ValidatorSpec>) -> Self {
        self.validators.push(ValidatorSpec::each(specs));
        self
    }

    pub fn spec(mut self, spec: ValidatorSpec) -> Self {
        self.validators.push(spec);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn deprecated(mut self, reason: impl Into<String>) -> Self {
        self.deprecation = Some(reason.into());
        self
    }

    /// Non-null without a default value.
    pub fn is_required(&self) -> bool {
        self.ty.is_non_null() && self.default.is_none()
    }
}

/// Input object type
#[derive(Debug, Clone)]
pub struct InputObject {
    pub name: String,
    pub fields: IndexMap<String, InputField>,
    /// Data validators over the whole input dict
    pub validators: Vec<DataCheck>,
    pub description: Option<String>,
}

impl InputObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
            validators: Vec::new(),
            description: None,
        }
    }

    pub fn field(mut self, name: impl Into<String>, field: impl Into<InputField>) -> Self {
        self.fields.insert(name.into(), field.into());
        self
    }

    pub fn validator<F>(self, validate: F) -> Self
    where
        F: Fn(&RequestContext, &Map<String, Value>) -> Result<(), ValidationError>
            + Send
            + Sync
            + 'static,
    {
        self.validate_with(validate)
    }

    pub fn validate_with(mut self, validator: impl DataValidator + 'static) -> Self {
        self.validators.push(DataCheck::new(validator));
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn add_field(&mut self, name: impl Into<String>, field: impl Into<InputField>) {
        self.fields.insert(name.into(), field.into());
    }

    pub fn remove_field(&mut self, name: &str) -> Option<InputField> {
        self.fields.shift_remove(name)
    }
}

macro_rules! shortcut_conversions {
    ($target:ident: $($source:ty),* $(,)?) => {
        $(
            impl From<$source> for $target {
                fn from(source: $source) -> Self {
                    $target::new(TypeRef::from(source))
                }
            }
        )*
    };
}

shortcut_conversions!(Field: &str, String, TypeRef, NamedType, Scalar, Enum, Object, Union);
shortcut_conversions!(InputValue: &str, String, TypeRef, NamedType, Scalar, Enum, InputObject);
