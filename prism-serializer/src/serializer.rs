//! Compiled serializers and the builder that declares them.

use std::sync::Arc;

use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::compiler::{compile, CompiledField};
use crate::error::{Result, SerializeError};
use crate::field::Field;
use crate::getter::{Getter, MethodTable};
use crate::log_trace;
use crate::logging::{Component, Logger};
use crate::value::Value;

/// A compiled serializer.
///
/// Immutable once built; share it through `Arc` and serialize from as many
/// threads as needed.
#[derive(Debug)]
pub struct Serializer {
    name: String,
    fields: Vec<CompiledField>,
    logger: Logger,
}

impl Serializer {
    pub fn builder(name: impl Into<String>) -> SerializerBuilder {
        SerializerBuilder::new(name)
    }

    pub(crate) fn from_compiled(name: &str, fields: Vec<CompiledField>) -> Self {
        Self {
            name: name.to_string(),
            fields,
            logger: Logger::new(Component::Serializer, name),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Compiled fields in declaration order.
    pub fn fields(&self) -> &[CompiledField] {
        &self.fields
    }

    /// Serialize one source object into an ordered mapping.
    pub fn serialize(&self, source: &Value) -> Result<JsonValue> {
        self.serialize_object(source).map(JsonValue::Object)
    }

    /// Serialize every element of a `Value::List`, keeping order and length.
    pub fn serialize_many(&self, source: &Value) -> Result<JsonValue> {
        let Value::List(items) = source else {
            return Err(SerializeError::NotASequence {
                found: source.kind_name(),
            });
        };
        log_trace!(self.logger, "serializing {} items", items.len());
        items
            .iter()
            .map(|item| self.serialize(item))
            .collect::<Result<Vec<_>>>()
            .map(JsonValue::Array)
    }

    pub fn serialize_with(&self, source: &Value, many: bool) -> Result<JsonValue> {
        if many {
            self.serialize_many(source)
        } else {
            self.serialize(source)
        }
    }

    fn serialize_object(&self, source: &Value) -> Result<JsonMap<String, JsonValue>> {
        let mut output = JsonMap::with_capacity(self.fields.len());
        for compiled in &self.fields {
            let raw = match compiled.getter.raw_value_of(source) {
                Ok(raw) => raw,
                // only a plain attribute lookup may be absent; method and
                // custom getter failures always propagate
                Err(SerializeError::MissingAttribute { .. })
                    if !compiled.required && matches!(compiled.getter, Getter::Attribute(_)) =>
                {
                    continue
                }
                Err(err) => return Err(err),
            };
            let value = if !compiled.required && raw.is_null() {
                JsonValue::Null
            } else {
                let raw = if compiled.call { raw.invoke()? } else { raw };
                if compiled.convert {
                    compiled.field.to_value(raw)?
                } else {
                    raw.into_json()?
                }
            };
            output.insert(compiled.label.clone(), value);
        }
        Ok(output)
    }
}

/// Declares a serializer: named fields in order plus the methods that
/// method fields bind to. `build` runs the compiler once.
///
/// ```
/// use prism_serializer::{record, Field, Serializer, Value};
/// use serde_json::json;
///
/// let sub = Serializer::builder("Sub")
///     .field("y", Field::str())
///     .field("x", Field::method())
///     .method("get_x", |obj| Ok(Value::Int(obj.attribute("x")?.as_i64().unwrap_or(0) + 10)))
///     .build()
///     .unwrap();
///
/// let out = sub.serialize(&record! { "x" => 1, "y" => "hello" }).unwrap();
/// assert_eq!(out, json!({"y": "hello", "x": 11}));
/// ```
pub struct SerializerBuilder {
    name: String,
    fields: Vec<(String, Field)>,
    methods: MethodTable,
}

impl SerializerBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            methods: MethodTable::new(name.clone()),
            name,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, field: Field) -> Self {
        self.fields.push((name.into(), field));
        self
    }

    pub fn method<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.methods.insert(name, f);
        self
    }

    /// Replace the method table wholesale.
    pub fn with_methods(mut self, methods: MethodTable) -> Self {
        self.methods = methods;
        self
    }

    pub fn build(self) -> Result<Arc<Serializer>> {
        compile(&self.name, self.fields, &self.methods).map(Arc::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record;
    use serde_json::json;

    #[test]
    fn test_serialize_many_requires_list() {
        let serializer = Serializer::builder("S")
            .field("a", Field::int())
            .build()
            .unwrap();
        assert!(matches!(
            serializer.serialize_many(&record! { "a" => 1 }),
            Err(SerializeError::NotASequence { found: "map" })
        ));
        assert_eq!(
            serializer
                .serialize_many(&Value::List(Vec::new()))
                .unwrap(),
            json!([])
        );
    }

    #[test]
    fn test_missing_attribute_aborts_call() {
        let serializer = Serializer::builder("S")
            .field("a", Field::int())
            .field("b", Field::int())
            .build()
            .unwrap();
        assert!(matches!(
            serializer.serialize(&record! { "a" => 1 }),
            Err(SerializeError::MissingAttribute { .. })
        ));
    }

    #[test]
    fn test_optional_field() {
        let serializer = Serializer::builder("S")
            .field("a", Field::int().with_required(false))
            .field("b", Field::int().with_required(false))
            .field("c", Field::int())
            .build()
            .unwrap();
        let out = serializer
            .serialize(&record! { "b" => Value::Null, "c" => "3" })
            .unwrap();
        assert_eq!(out, json!({"b": null, "c": 3}));
    }

    #[test]
    fn test_optional_method_field_propagates_errors() {
        let serializer = Serializer::builder("S")
            .field("x", Field::method().with_required(false))
            .method("get_x", |obj| obj.attribute("nope"))
            .build()
            .unwrap();
        assert!(matches!(
            serializer.serialize(&record! { "a" => 1 }),
            Err(SerializeError::MissingAttribute { name, .. }) if name == "nope"
        ));
    }

    #[test]
    fn test_optional_custom_getter_propagates_errors() {
        struct Lookup;

        impl crate::field::CustomField for Lookup {
            fn to_value(&self, value: Value) -> Result<JsonValue> {
                value.into_json()
            }

            fn as_getter(
                &self,
                _source_name: &str,
                _owner: &dyn crate::getter::MethodResolver,
            ) -> Result<Option<Getter>> {
                Ok(Some(Getter::custom(|obj: &Value| obj.attribute("missing"))))
            }
        }

        let serializer = Serializer::builder("S")
            .field("a", Field::custom(Lookup).with_required(false))
            .build()
            .unwrap();
        assert!(matches!(
            serializer.serialize(&record! { "a" => 1 }),
            Err(SerializeError::MissingAttribute { .. })
        ));
    }

    #[test]
    fn test_serializer_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Serializer>();
        assert_send_sync::<Value>();
    }
}
