//! Schema definition documents
//!
//! A JSON document declaring named types and the fields of the two roots.
//! Type references are type-expression strings resolved at finalization, so
//! documents may reference types declared later or in another file.
//!
//! ```json
//! {
//!   "types": [
//!     { "kind": "object", "name": "User", "fields": { "name": "String!" } }
//!   ],
//!   "query": { "user": { "type": "User", "args": { "id": "ID!" } } }
//! }
//! ```

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::validation::{Confirm, Length, NumberRange, ValidatorSpec};

use super::config::SchemaConfig;
use super::errors::{SchemaError, SchemaResult};
use super::registry::Schema;
use super::types::{
    Enum, EnumValue, Field, InputObject, InputValue, NamedType, Object, Scalar, Union,
};

/// Parsed schema definition document
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    #[serde(default)]
    pub types: Vec<TypeDef>,
    #[serde(default)]
    pub query: IndexMap<String, FieldDef>,
    #[serde(default)]
    pub mutation: IndexMap<String, FieldDef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDef {
    Scalar {
        name: String,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        specified_by: Option<String>,
    },
    Enum {
        name: String,
        values: EnumValuesDef,
        #[serde(default)]
        description: Option<String>,
    },
    Object(ObjectDef),
    Interface(ObjectDef),
    Union {
        name: String,
        types: Vec<String>,
        #[serde(default)]
        description: Option<String>,
    },
    InputObject {
        name: String,
        fields: IndexMap<String, InputDef>,
        #[serde(default)]
        description: Option<String>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectDef {
    pub name: String,
    #[serde(default)]
    pub fields: IndexMap<String, FieldDef>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Enum values as a list of names, or names mapped to their definitions
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EnumValuesDef {
    Names(Vec<String>),
    Values(IndexMap<String, EnumValueDef>),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnumValueDef {
    /// Internal value, defaults to the name
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub deprecation: Option<String>,
}

/// A field, either a bare type expression or a full definition
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FieldDef {
    Type(String),
    Full {
        #[serde(rename = "type")]
        ty: String,
        #[serde(default)]
        args: IndexMap<String, InputDef>,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        deprecation: Option<String>,
    },
}

/// An argument or input field
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InputDef {
    Type(String),
    Full {
        #[serde(rename = "type")]
        ty: String,
        #[serde(default)]
        default: Option<Value>,
        #[serde(default)]
        validators: Vec<ValidatorDef>,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        deprecation: Option<String>,
    },
}

/// A value validator; a nested array applies its validators to each element
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ValidatorDef {
    Each(Vec<ValidatorDef>),
    Builtin(BuiltinValidator),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum BuiltinValidator {
    Length(Length),
    Range(NumberRange),
    Confirm(String),
}

impl SchemaDocument {
    /// Parse a document, naming `origin` in errors.
    pub fn parse(origin: &str, text: &str) -> SchemaResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| SchemaError::malformed(origin, format!("Invalid JSON: {}", e)))
    }

    /// Register the document's types and root fields on `schema`.
    ///
    /// Every registration error is collected.
    pub fn apply(self, schema: &mut Schema) -> SchemaResult<()> {
        let mut errors = Vec::new();
        for def in self.types {
            if let Err(err) = schema.add_type(def.into_named()) {
                errors.push(err);
            }
        }

        let query = schema.query_mut()?;
        for (name, def) in self.query {
            query.add_field(name, def.into_field());
        }
        let mutation = schema.mutation_mut()?;
        for (name, def) in self.mutation {
            mutation.add_field(name, def.into_field());
        }

        match SchemaError::from_errors(errors) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl TypeDef {
    pub fn name(&self) -> &str {
        match self {
            Self::Scalar { name, .. }
            | Self::Enum { name, .. }
            | Self::Union { name, .. }
            | Self::InputObject { name, .. } => name,
            Self::Object(def) | Self::Interface(def) => &def.name,
        }
    }

    fn into_named(self) -> NamedType {
        match self {
            Self::Scalar {
                name,
                description,
                specified_by,
            } => NamedType::Scalar(Scalar {
                description,
                specified_by,
                ..Scalar::new(name)
            }),
            Self::Enum {
                name,
                values,
                description,
            } => {
                let mut e = Enum::new(name);
                e.description = description;
                match values {
                    EnumValuesDef::Names(names) => {
                        for name in names {
                            e = e.value(name);
                        }
                    }
                    EnumValuesDef::Values(values) => {
                        for (name, def) in values {
                            let value = def.value.unwrap_or_else(|| Value::from(name.clone()));
                            e.values.insert(
                                name,
                                EnumValue {
                                    value,
                                    description: def.description,
                                    deprecation: def.deprecation,
                                },
                            );
                        }
                    }
                }
                NamedType::Enum(e)
            }
            Self::Object(def) => NamedType::Object(def.into_object()),
            Self::Interface(def) => NamedType::interface(def.into_object()),
            Self::Union {
                name,
                types,
                description,
            } => {
                let mut union = types.into_iter().fold(Union::new(name), Union::member);
                union.description = description;
                NamedType::Union(union)
            }
            Self::InputObject {
                name,
                fields,
                description,
            } => {
                let mut input = InputObject::new(name);
                input.description = description;
                for (name, def) in fields {
                    input.add_field(name, def.into_input());
                }
                NamedType::InputObject(input)
            }
        }
    }
}

impl ObjectDef {
    fn into_object(self) -> Object {
        let mut object = self
            .interfaces
            .into_iter()
            .fold(Object::new(self.name), Object::implements);
        object.description = self.description;
        for (name, def) in self.fields {
            object.add_field(name, def.into_field());
        }
        object
    }
}

impl FieldDef {
    fn into_field(self) -> Field {
        match self {
            Self::Type(ty) => Field::new(ty),
            Self::Full {
                ty,
                args,
                description,
                deprecation,
            } => {
                let mut field = args
                    .into_iter()
                    .fold(Field::new(ty), |field, (name, def)| {
                        field.arg(name, def.into_input())
                    });
                field.description = description;
                field.deprecation = deprecation;
                field
            }
        }
    }
}

impl InputDef {
    fn into_input(self) -> InputValue {
        match self {
            Self::Type(ty) => InputValue::new(ty),
            Self::Full {
                ty,
                default,
                validators,
                description,
                deprecation,
            } => InputValue {
                default,
                validators: validators.into_iter().map(ValidatorDef::into_spec).collect(),
                description,
                deprecation,
                ..InputValue::new(ty)
            },
        }
    }
}

impl ValidatorDef {
    fn into_spec(self) -> ValidatorSpec {
        match self {
            Self::Each(inner) => ValidatorSpec::each(inner.into_iter().map(Self::into_spec)),
            Self::Builtin(BuiltinValidator::Length(v)) => ValidatorSpec::leaf(v),
            Self::Builtin(BuiltinValidator::Range(v)) => ValidatorSpec::leaf(v),
            Self::Builtin(BuiltinValidator::Confirm(other)) => {
                ValidatorSpec::leaf(Confirm::new(other))
            }
        }
    }
}

/// Builds schemas from definition documents on disk or in memory
#[derive(Debug, Clone, Default)]
pub struct SchemaLoader {
    config: SchemaConfig,
}

impl SchemaLoader {
    pub fn new(config: SchemaConfig) -> Self {
        Self { config }
    }

    /// Build a schema from one document held in memory.
    pub fn load_str(&self, text: &str) -> SchemaResult<Schema> {
        self.build([SchemaDocument::parse("<string>", text)?])
    }

    /// Build a schema from one document file.
    pub fn load_path(&self, path: &Path) -> SchemaResult<Schema> {
        self.build([read_document(path)?])
    }

    /// Build one schema from every `.json` document in `dir`, in file name
    /// order.
    pub fn load_dir(&self, dir: &Path) -> SchemaResult<Schema> {
        let origin = dir.display().to_string();
        let entries = fs::read_dir(dir).map_err(|e| {
            SchemaError::malformed(&origin, format!("Failed to read schema directory: {}", e))
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed(&origin, format!("Failed to read directory entry: {}", e))
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let documents = paths
            .iter()
            .map(|path| read_document(path))
            .collect::<SchemaResult<Vec<_>>>()?;
        self.build(documents)
    }

    fn build(&self, documents: impl IntoIterator<Item = SchemaDocument>) -> SchemaResult<Schema> {
        let mut schema = Schema::with_config(self.config.clone());
        let mut errors = Vec::new();
        for document in documents {
            debug!(types = document.types.len(), "applying schema document");
            if let Err(err) = document.apply(&mut schema) {
                errors.push(err);
            }
        }
        match SchemaError::from_errors(errors) {
            Some(err) => Err(err),
            None => Ok(schema),
        }
    }
}

fn read_document(path: &Path) -> SchemaResult<SchemaDocument> {
    let origin = path.display().to_string();
    let text = fs::read_to_string(path)
        .map_err(|e| SchemaError::malformed(&origin, format!("Failed to read file: {}", e)))?;
    SchemaDocument::parse(&origin, &text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    const USERS: &str = r#"{
        "types": [
            { "kind": "object", "name": "User", "fields": {
                "name": "String!",
                "friends": { "type": "[User!]!", "description": "Accepted friends" }
            } },
            { "kind": "enum", "name": "Role", "values": ["ADMIN", "MEMBER"] },
            { "kind": "input_object", "name": "SignupInput", "fields": {
                "username": { "type": "String!", "validators": [{ "length": { "min": 3 } }] },
                "tags": { "type": "[String]", "validators": [[{ "length": { "max": 5 } }]] }
            } }
        ],
        "query": { "user": { "type": "User", "args": { "id": "ID!" } } },
        "mutation": { "signup": { "type": "User", "args": { "input": "SignupInput!" } } }
    }"#;

    #[test]
    fn test_load_document() {
        let schema = SchemaLoader::default().load_str(USERS).unwrap();

        assert!(schema.get_type("User").and_then(NamedType::as_object).is_some());
        let role = schema.get_type("Role").and_then(NamedType::as_enum).unwrap();
        assert_eq!(role.values["ADMIN"].value, json!("ADMIN"));

        let input = schema
            .get_type("SignupInput")
            .and_then(NamedType::as_input_object)
            .unwrap();
        assert_eq!(input.fields["username"].validators.len(), 1);
        assert_eq!(input.fields["tags"].validators[0].depth(), 1);

        assert!(schema.query().fields.contains_key("user"));
        assert!(schema.mutation().fields.contains_key("signup"));
    }

    #[test]
    fn test_enum_values_with_definitions() {
        let doc = r#"{ "types": [{ "kind": "enum", "name": "Color", "values": {
            "RED": { "value": 1 },
            "GREEN": { "deprecation": "Use RED" }
        } }] }"#;
        let schema = SchemaLoader::default().load_str(doc).unwrap();
        let color = schema.get_type("Color").and_then(NamedType::as_enum).unwrap();
        assert_eq!(color.values["RED"].value, json!(1));
        assert_eq!(color.values["GREEN"].value, json!("GREEN"));
        assert_eq!(color.values["GREEN"].deprecation.as_deref(), Some("Use RED"));
    }

    #[test]
    fn test_loaded_schema_finalizes() {
        let mut schema = SchemaLoader::default().load_str(USERS).unwrap();
        assert!(schema.finalize().is_ok());
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let err = SchemaLoader::default().load_str("{ not json").unwrap_err();
        assert_eq!(err.code(), "SCHEMA_MALFORMED");
    }

    #[test]
    fn test_unknown_kind_is_malformed() {
        let err = SchemaLoader::default()
            .load_str(r#"{ "types": [{ "kind": "table", "name": "T" }] }"#)
            .unwrap_err();
        assert_eq!(err.code(), "SCHEMA_MALFORMED");
    }

    #[test]
    fn test_registration_errors_are_collected() {
        let doc = r#"{ "types": [
            { "kind": "scalar", "name": "String" },
            { "kind": "object", "name": "bad-name" }
        ] }"#;
        let err = SchemaLoader::default().load_str(doc).unwrap_err();
        assert_eq!(err.iter().count(), 2);
    }

    #[test]
    fn test_load_dir_merges_documents() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("a_query.json"),
            r#"{ "query": { "post": "Post" } }"#,
        )
        .unwrap();
        fs::write(
            temp.path().join("b_types.json"),
            r#"{ "types": [{ "kind": "object", "name": "Post", "fields": { "title": "String" } }] }"#,
        )
        .unwrap();
        fs::write(temp.path().join("notes.txt"), "ignored").unwrap();

        let mut schema = SchemaLoader::default().load_dir(temp.path()).unwrap();
        let executable = schema.finalize().unwrap();
        assert!(executable.graph().is_reachable("Post"));
    }

    #[test]
    fn test_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = SchemaLoader::default()
            .load_path(&temp.path().join("missing.json"))
            .unwrap_err();
        assert!(matches!(err, SchemaError::Malformed { .. }));
    }
}
