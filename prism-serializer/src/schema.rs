// prism_serializer/src/schema.rs
//
// Serde-loadable serializer declarations. A schema names its fields and
// their kinds; nested fields refer to other serializers by name, resolved
// when the schema is compiled.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SerializeError};
use crate::field::Field;
use crate::getter::MethodTable;
use crate::serializer::{Serializer, SerializerBuilder};

/// Field kinds a schema can declare
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaFieldKind {
    #[default]
    Generic,
    Str,
    Bool,
    Int,
    Float,
    Datetime,
    Method,
    Nested,
}

fn default_required() -> bool {
    true
}

/// Declaration of one field
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// The declared field name
    pub name: String,
    #[serde(default)]
    pub kind: SchemaFieldKind,
    /// Attribute to read instead of `name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attr: Option<String>,
    /// Output key instead of `name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub call: bool,
    #[serde(default = "default_required")]
    pub required: bool,
    /// strftime template, datetime fields only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Method name, method fields only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Referenced serializer, nested fields only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serializer: Option<String>,
    #[serde(default)]
    pub many: bool,
}

impl FieldSchema {
    pub fn new(name: &str, kind: SchemaFieldKind) -> Self {
        FieldSchema {
            name: name.to_string(),
            kind,
            attr: None,
            label: None,
            call: false,
            required: true,
            format: None,
            method: None,
            serializer: None,
            many: false,
        }
    }

    pub fn string(name: &str) -> Self {
        FieldSchema::new(name, SchemaFieldKind::Str)
    }

    pub fn integer(name: &str) -> Self {
        FieldSchema::new(name, SchemaFieldKind::Int)
    }

    pub fn float(name: &str) -> Self {
        FieldSchema::new(name, SchemaFieldKind::Float)
    }

    pub fn boolean(name: &str) -> Self {
        FieldSchema::new(name, SchemaFieldKind::Bool)
    }

    pub fn datetime(name: &str, format: Option<&str>) -> Self {
        FieldSchema {
            format: format.map(str::to_string),
            ..FieldSchema::new(name, SchemaFieldKind::Datetime)
        }
    }

    pub fn method(name: &str, method: Option<&str>) -> Self {
        FieldSchema {
            method: method.map(str::to_string),
            ..FieldSchema::new(name, SchemaFieldKind::Method)
        }
    }

    pub fn nested(name: &str, serializer: &str, many: bool) -> Self {
        FieldSchema {
            serializer: Some(serializer.to_string()),
            many,
            ..FieldSchema::new(name, SchemaFieldKind::Nested)
        }
    }

    fn invalid(&self, option: &str) -> SerializeError {
        SerializeError::Schema(format!(
            "field '{}' of kind {:?} does not accept '{}'",
            self.name, self.kind, option
        ))
    }

    /// Turn the declaration into a [`Field`], resolving nested serializers
    /// through `resolve`.
    pub fn to_field<R>(&self, resolve: R) -> Result<Field>
    where
        R: Fn(&str) -> Option<Arc<Serializer>>,
    {
        if self.format.is_some() && self.kind != SchemaFieldKind::Datetime {
            return Err(self.invalid("format"));
        }
        if self.method.is_some() && self.kind != SchemaFieldKind::Method {
            return Err(self.invalid("method"));
        }
        if (self.serializer.is_some() || self.many) && self.kind != SchemaFieldKind::Nested {
            return Err(self.invalid(if self.many { "many" } else { "serializer" }));
        }

        let field = match self.kind {
            SchemaFieldKind::Generic => Field::generic(),
            SchemaFieldKind::Str => Field::str(),
            SchemaFieldKind::Bool => Field::bool(),
            SchemaFieldKind::Int => Field::int(),
            SchemaFieldKind::Float => Field::float(),
            SchemaFieldKind::Datetime => match &self.format {
                Some(format) => Field::datetime_format(format.clone()),
                None => Field::datetime(),
            },
            SchemaFieldKind::Method => match &self.method {
                Some(method) => Field::method_named(method.clone()),
                None => Field::method(),
            },
            SchemaFieldKind::Nested => {
                let name = self.serializer.as_deref().ok_or_else(|| {
                    SerializeError::Schema(format!(
                        "nested field '{}' does not name a serializer",
                        self.name
                    ))
                })?;
                let serializer =
                    resolve(name).ok_or_else(|| SerializeError::UnknownSerializer(name.to_string()))?;
                if self.many {
                    Field::many(serializer)
                } else {
                    Field::serializer(serializer)
                }
            }
        };

        let mut field = field.with_call(self.call).with_required(self.required);
        if let Some(attr) = &self.attr {
            field = field.with_attr(attr.clone());
        }
        if let Some(label) = &self.label {
            field = field.with_label(label.clone());
        }
        Ok(field)
    }
}

/// Declaration of a whole serializer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerializerSchema {
    pub name: String,
    pub fields: Vec<FieldSchema>,
}

impl SerializerSchema {
    pub fn new(name: &str, fields: Vec<FieldSchema>) -> Self {
        Self {
            name: name.to_string(),
            fields,
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Several schemas from one JSON array, in order.
    pub fn list_from_json(text: &str) -> Result<Vec<Self>> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Compile with `methods` backing any method fields.
    pub fn compile<R>(&self, methods: MethodTable, resolve: R) -> Result<Arc<Serializer>>
    where
        R: Fn(&str) -> Option<Arc<Serializer>>,
    {
        let mut builder = SerializerBuilder::new(self.name.clone()).with_methods(methods);
        for field in &self.fields {
            builder = builder.field(field.name.clone(), field.to_field(&resolve)?);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_deserializing() {
        let schema = SerializerSchema::from_json(r#"{"name": "S", "fields": [{"name": "a"}]}"#)
            .unwrap();
        let field = &schema.fields[0];
        assert_eq!(field.kind, SchemaFieldKind::Generic);
        assert!(field.required);
        assert!(!field.call);
        assert!(!field.many);
    }

    #[test]
    fn test_rejects_options_for_wrong_kind() {
        let mut field = FieldSchema::integer("a");
        field.format = Some("%Y".to_string());
        assert!(matches!(
            field.to_field(|_| None),
            Err(SerializeError::Schema(_))
        ));
    }

    #[test]
    fn test_unknown_nested_reference() {
        let field = FieldSchema::nested("sub", "Missing", false);
        assert!(matches!(
            field.to_field(|_| None),
            Err(SerializeError::UnknownSerializer(name)) if name == "Missing"
        ));
    }

    #[test]
    fn test_unknown_kind_is_a_schema_error() {
        let result =
            SerializerSchema::from_json(r#"{"name": "S", "fields": [{"name": "a", "kind": "blob"}]}"#);
        assert!(matches!(result, Err(SerializeError::Schema(_))));
    }
}
