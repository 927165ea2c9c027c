//! Field declarations and their value conversions.
//!
//! A [`Field`] describes how to pull one value out of a source object and
//! turn it into a primitive. Built-in kinds cover strings, numbers, booleans,
//! datetimes, serializer methods and nested serializers; anything else goes
//! through [`CustomField`].

use std::fmt;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::datetime;
use crate::error::{Result, SerializeError};
use crate::getter::{Getter, MethodResolver};
use crate::serializer::Serializer;
use crate::value::{float_json, Value};

/// User-defined conversion (and optionally getter) for a field.
///
/// A custom field always counts as overriding the identity conversion.
pub trait CustomField: Send + Sync {
    fn to_value(&self, raw: Value) -> Result<JsonValue>;

    /// Specialized getter; `None` falls back to attribute lookup.
    fn as_getter(&self, _source_name: &str, _owner: &dyn MethodResolver) -> Result<Option<Getter>> {
        Ok(None)
    }

    fn kind_name(&self) -> &'static str {
        "custom"
    }
}

#[derive(Clone)]
pub enum FieldKind {
    Generic,
    Str,
    Bool,
    Int,
    Float,
    Datetime { format: Option<String> },
    /// Bound to `method`, or `get_<source name>` when unset.
    Method { method: Option<String> },
    Serializer { serializer: Arc<Serializer>, many: bool },
    Custom(Arc<dyn CustomField>),
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Generic => "generic",
            FieldKind::Str => "str",
            FieldKind::Bool => "bool",
            FieldKind::Int => "int",
            FieldKind::Float => "float",
            FieldKind::Datetime { .. } => "datetime",
            FieldKind::Method { .. } => "method",
            FieldKind::Serializer { .. } => "nested",
            FieldKind::Custom(custom) => custom.kind_name(),
        }
    }
}

impl fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Datetime { format } => f
                .debug_struct("Datetime")
                .field("format", format)
                .finish(),
            FieldKind::Method { method } => {
                f.debug_struct("Method").field("method", method).finish()
            }
            FieldKind::Serializer { serializer, many } => f
                .debug_struct("Serializer")
                .field("serializer", &serializer.name())
                .field("many", many)
                .finish(),
            other => f.write_str(other.name()),
        }
    }
}

/// An immutable field declaration.
#[derive(Clone, Debug)]
pub struct Field {
    kind: FieldKind,
    attr: Option<String>,
    label: Option<String>,
    call: bool,
    required: bool,
}

impl Field {
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            attr: None,
            label: None,
            call: false,
            required: true,
        }
    }

    pub fn generic() -> Self {
        Self::new(FieldKind::Generic)
    }

    pub fn str() -> Self {
        Self::new(FieldKind::Str)
    }

    pub fn bool() -> Self {
        Self::new(FieldKind::Bool)
    }

    pub fn int() -> Self {
        Self::new(FieldKind::Int)
    }

    pub fn float() -> Self {
        Self::new(FieldKind::Float)
    }

    pub fn datetime() -> Self {
        Self::new(FieldKind::Datetime { format: None })
    }

    /// Datetime rendered with a strftime template, e.g. `"%m/%d/%Y %I:%M %p"`.
    pub fn datetime_format(format: impl Into<String>) -> Self {
        Self::new(FieldKind::Datetime {
            format: Some(format.into()),
        })
    }

    /// Reads `get_<field name>` from the owning serializer.
    pub fn method() -> Self {
        Self::new(FieldKind::Method { method: None })
    }

    pub fn method_named(method: impl Into<String>) -> Self {
        Self::new(FieldKind::Method {
            method: Some(method.into()),
        })
    }

    /// Single nested object serialized by `serializer`.
    pub fn serializer(serializer: Arc<Serializer>) -> Self {
        Self::new(FieldKind::Serializer {
            serializer,
            many: false,
        })
    }

    /// Sequence of nested objects, each serialized by `serializer`.
    pub fn many(serializer: Arc<Serializer>) -> Self {
        Self::new(FieldKind::Serializer {
            serializer,
            many: true,
        })
    }

    pub fn custom<C>(custom: C) -> Self
    where
        C: CustomField + 'static,
    {
        Self::new(FieldKind::Custom(Arc::new(custom)))
    }

    /// Read from `attr` instead of the declared field name.
    pub fn with_attr(mut self, attr: impl Into<String>) -> Self {
        self.attr = Some(attr.into());
        self
    }

    /// Output key to use instead of the declared field name.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Invoke the raw value with no arguments before converting it.
    pub fn with_call(mut self, call: bool) -> Self {
        self.call = call;
        self
    }

    /// Optional fields drop missing attributes from the output and emit
    /// `null` without converting it.
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn attr(&self) -> Option<&str> {
        self.attr.as_deref()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn call(&self) -> bool {
        self.call
    }

    pub fn required(&self) -> bool {
        self.required
    }

    /// Whether `to_value` does anything beyond the identity conversion.
    /// When it does not, the serializer skips the call.
    pub fn overrides_to_value(&self) -> bool {
        !matches!(self.kind, FieldKind::Generic | FieldKind::Method { .. })
    }

    /// Declaration checks run once at compile time.
    pub fn validate(&self) -> Result<()> {
        match &self.kind {
            FieldKind::Datetime {
                format: Some(format),
            } => datetime::validate_format(format),
            _ => Ok(()),
        }
    }

    pub fn to_value(&self, raw: Value) -> Result<JsonValue> {
        match &self.kind {
            FieldKind::Generic | FieldKind::Method { .. } => raw.into_json(),
            FieldKind::Str => to_str(raw).map(JsonValue::String),
            FieldKind::Bool => Ok(JsonValue::Bool(raw.is_truthy())),
            FieldKind::Int => to_int(raw).map(JsonValue::from),
            FieldKind::Float => to_float(raw).map(float_json),
            FieldKind::Datetime { format } => datetime::to_value(raw, format.as_deref()),
            FieldKind::Serializer { serializer, many } => serializer.serialize_with(&raw, *many),
            FieldKind::Custom(custom) => custom.to_value(raw),
        }
    }

    /// Specialized getter for this field, or `None` for plain attribute lookup.
    pub fn as_getter(
        &self,
        source_name: &str,
        owner: &dyn MethodResolver,
    ) -> Result<Option<Getter>> {
        match &self.kind {
            FieldKind::Method { method } => {
                let name = match method {
                    Some(name) => name.clone(),
                    None => format!("get_{source_name}"),
                };
                let method =
                    owner
                        .resolve_method(&name)
                        .ok_or_else(|| SerializeError::UnknownMethod {
                            serializer: owner.owner_name().to_string(),
                            method: name.clone(),
                        })?;
                Ok(Some(Getter::Method { name, method }))
            }
            FieldKind::Custom(custom) => custom.as_getter(source_name, owner),
            _ => Ok(None),
        }
    }
}

/// String conversion renders the value's identity (`into_json`) form as
/// compact JSON text, with one exception: a string result is emitted without
/// quotes. So `true`, `null`, `5`, `5.0`, `1e16`, `[1,2]` and `{"a":1}`, dates
/// as ISO-8601, and non-finite floats as `null`. Opaque objects and callables
/// have no string form.
fn to_str(raw: Value) -> Result<String> {
    if let Value::Object(_) | Value::Callable(_) = raw {
        return Err(SerializeError::conversion(
            "str",
            raw.kind_name(),
            "value has no string form",
        ));
    }
    let found = raw.kind_name();
    match raw.into_json()? {
        JsonValue::String(s) => Ok(s),
        json => serde_json::to_string(&json)
            .map_err(|e| SerializeError::conversion("str", found, e.to_string())),
    }
}

fn to_int(raw: Value) -> Result<i64> {
    match raw {
        Value::Int(i) => Ok(i),
        Value::Bool(b) => Ok(i64::from(b)),
        Value::Float(f) => {
            let truncated = f.trunc();
            if !truncated.is_finite() || truncated < i64::MIN as f64 || truncated >= i64::MAX as f64
            {
                return Err(SerializeError::conversion(
                    "int",
                    "float",
                    format!("{f} is out of integer range"),
                ));
            }
            Ok(truncated as i64)
        }
        Value::Str(s) => parse_int(&s).ok_or_else(|| {
            SerializeError::conversion("int", "str", format!("invalid literal for int: '{s}'"))
        }),
        other => Err(SerializeError::conversion(
            "int",
            other.kind_name(),
            "expected a number or a numeric string",
        )),
    }
}

fn parse_int(text: &str) -> Option<i64> {
    let text = text.trim();
    let digits = text.trim_start_matches(['+', '-']);
    if digits.starts_with('_') || digits.ends_with('_') || digits.contains("__") {
        return None;
    }
    text.replace('_', "").parse().ok()
}

fn to_float(raw: Value) -> Result<f64> {
    match raw {
        Value::Float(f) => Ok(f),
        Value::Int(i) => Ok(i as f64),
        Value::Bool(b) => Ok(if b { 1.0 } else { 0.0 }),
        Value::Str(s) => s.trim().parse().map_err(|_| {
            SerializeError::conversion(
                "float",
                "str",
                format!("could not convert string to float: '{s}'"),
            )
        }),
        other => Err(SerializeError::conversion(
            "float",
            other.kind_name(),
            "expected a number or a numeric string",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int_edge_cases() {
        assert_eq!(parse_int(" 42 "), Some(42));
        assert_eq!(parse_int("-1_000"), Some(-1000));
        assert_eq!(parse_int("+7"), Some(7));
        assert_eq!(parse_int("1__0"), None);
        assert_eq!(parse_int("_1"), None);
        assert_eq!(parse_int("5.5"), None);
    }

    #[test]
    fn test_int_rejects_non_finite_float() {
        assert!(to_int(Value::Float(f64::INFINITY)).is_err());
        assert!(to_int(Value::Float(f64::NAN)).is_err());
        assert_eq!(to_int(Value::Float(-5.9)).unwrap(), -5);
    }

    #[test]
    fn test_str_of_floats_and_lists() {
        assert_eq!(to_str(Value::Float(5.0)).unwrap(), "5.0");
        assert_eq!(to_str(Value::Float(5.25)).unwrap(), "5.25");
        assert_eq!(to_str(Value::Float(1e16)).unwrap(), "1e16");
        assert_eq!(to_str(Value::Float(f64::NAN)).unwrap(), "null");
        assert_eq!(to_str(Value::from(vec![1, 2])).unwrap(), "[1,2]");
        assert_eq!(to_str(Value::from(vec!["a"])).unwrap(), r#"["a"]"#);
        assert!(to_str(Value::callable(|| Ok(Value::Null))).is_err());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Field::datetime().kind().name(), "datetime");
        assert_eq!(Field::method_named("x").kind().name(), "method");
    }
}
