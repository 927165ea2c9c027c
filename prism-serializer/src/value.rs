//! Raw source values and the attribute-lookup seam.
//!
//! A [`Value`] is what a getter pulls out of a source object before any
//! field conversion runs. Source objects are either [`Record`]s (ordered
//! attribute bags) or anything implementing [`Attributes`].

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Number, Value as JsonValue};

use crate::datetime;
use crate::error::{Result, SerializeError};

/// Named attribute lookup on a source object.
///
/// Implemented by hand or through `#[derive(Attributes)]`.
pub trait Attributes: Send + Sync {
    /// Return the attribute called `name`, or `None` when it does not exist.
    fn attribute(&self, name: &str) -> Option<Value>;

    /// Name used in attribute-not-found errors.
    fn type_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

type ThunkFn = dyn Fn() -> Result<Value> + Send + Sync;

/// A zero-argument callable stored as a value.
#[derive(Clone)]
pub struct Thunk(Arc<ThunkFn>);

impl Thunk {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> Result<Value> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn invoke(&self) -> Result<Value> {
        (self.0)()
    }
}

impl fmt::Debug for Thunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Thunk(<fn>)")
    }
}

impl PartialEq for Thunk {
    fn eq(&self, other: &Self) -> bool {
        Arc::as_ptr(&self.0) as *const () == Arc::as_ptr(&other.0) as *const ()
    }
}

/// Ordered attribute bag.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    fields: IndexMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: IndexMap::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }
}

impl Attributes for Record {
    fn attribute(&self, name: &str) -> Option<Value> {
        self.fields.get(name).cloned()
    }

    fn type_name(&self) -> &str {
        "Record"
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A raw, unconverted value.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Timezone-aware date and time
    DateTime(DateTime<FixedOffset>),
    NaiveDateTime(NaiveDateTime),
    Date(NaiveDate),
    List(Vec<Value>),
    Map(Record),
    Object(Arc<dyn Attributes>),
    Callable(Thunk),
}

impl Value {
    /// Wrap an attribute source as an object value.
    pub fn object<T>(source: T) -> Self
    where
        T: Attributes + 'static,
    {
        Value::Object(Arc::new(source))
    }

    /// Wrap a zero-argument callable.
    pub fn callable<F>(f: F) -> Self
    where
        F: Fn() -> Result<Value> + Send + Sync + 'static,
    {
        Value::Callable(Thunk::new(f))
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::DateTime(_) => "datetime",
            Value::NaiveDateTime(_) => "naive datetime",
            Value::Date(_) => "date",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Object(_) => "object",
            Value::Callable(_) => "callable",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Default attribute lookup used by every field without a specialized getter.
    pub fn attribute(&self, name: &str) -> Result<Value> {
        match self {
            Value::Map(record) => {
                record
                    .get(name)
                    .cloned()
                    .ok_or_else(|| SerializeError::MissingAttribute {
                        name: name.to_string(),
                        type_name: record.type_name().to_string(),
                    })
            }
            Value::Object(source) => {
                source
                    .attribute(name)
                    .ok_or_else(|| SerializeError::MissingAttribute {
                        name: name.to_string(),
                        type_name: source.type_name().to_string(),
                    })
            }
            other => Err(SerializeError::NotAnObject {
                name: name.to_string(),
                found: other.kind_name(),
            }),
        }
    }

    /// Call a stored zero-argument callable.
    pub fn invoke(self) -> Result<Value> {
        match self {
            Value::Callable(thunk) => thunk.invoke(),
            other => Err(SerializeError::NotCallable {
                found: other.kind_name(),
            }),
        }
    }

    /// Truthiness: null, false, zero and empty values are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Map(record) => !record.is_empty(),
            Value::DateTime(_)
            | Value::NaiveDateTime(_)
            | Value::Date(_)
            | Value::Object(_)
            | Value::Callable(_) => true,
        }
    }

    /// Identity conversion into a JSON-safe primitive.
    ///
    /// Dates render as ISO-8601 strings and non-finite floats become `null`.
    /// Opaque objects and callables have no primitive form.
    pub fn into_json(self) -> Result<JsonValue> {
        match self {
            Value::Null => Ok(JsonValue::Null),
            Value::Bool(b) => Ok(JsonValue::Bool(b)),
            Value::Int(i) => Ok(JsonValue::from(i)),
            Value::Float(f) => Ok(float_json(f)),
            Value::Str(s) => Ok(JsonValue::String(s)),
            Value::DateTime(_) | Value::NaiveDateTime(_) | Value::Date(_) => {
                Ok(datetime::isoformat(&self).map_or(JsonValue::Null, JsonValue::String))
            }
            Value::List(items) => items
                .into_iter()
                .map(Value::into_json)
                .collect::<Result<Vec<_>>>()
                .map(JsonValue::Array),
            Value::Map(record) => {
                let mut map = JsonMap::with_capacity(record.len());
                for (name, value) in record.fields {
                    map.insert(name, value.into_json()?);
                }
                Ok(JsonValue::Object(map))
            }
            Value::Object(source) => Err(SerializeError::NotSerializable {
                found: source.type_name().to_string(),
            }),
            Value::Callable(_) => Err(SerializeError::NotSerializable {
                found: "callable".to_string(),
            }),
        }
    }
}

pub(crate) fn float_json(f: f64) -> JsonValue {
    Number::from_f64(f).map_or(JsonValue::Null, JsonValue::Number)
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Int(i) => f.debug_tuple("Int").field(i).finish(),
            Value::Float(x) => f.debug_tuple("Float").field(x).finish(),
            Value::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Value::DateTime(dt) => f.debug_tuple("DateTime").field(dt).finish(),
            Value::NaiveDateTime(dt) => f.debug_tuple("NaiveDateTime").field(dt).finish(),
            Value::Date(d) => f.debug_tuple("Date").field(d).finish(),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
            Value::Map(record) => f.debug_tuple("Map").field(record).finish(),
            Value::Object(source) => write!(f, "Object(<{}>)", source.type_name()),
            Value::Callable(thunk) => thunk.fmt(f),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::NaiveDateTime(a), Value::NaiveDateTime(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            // Objects compare by identity
            (Value::Object(a), Value::Object(b)) => {
                Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
            }
            (Value::Callable(a), Value::Callable(b)) => a == b,
            _ => false,
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Value::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

// Wider integers stay exact while they fit in `i64`, past that they widen
// to `Float` and lose precision.
macro_rules! impl_from_wide_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    i64::try_from(value).map_or(Value::Float(value as f64), Value::Int)
                }
            }
        )*
    };
}

impl_from_wide_int!(isize, u64, usize);

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Value::DateTime(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::DateTime(value.fixed_offset())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::NaiveDateTime(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::Map(value)
    }
}

impl From<Thunk> for Value {
    fn from(value: Thunk) -> Self {
        Value::Callable(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<JsonValue> for Value {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::String(s) => Value::Str(s),
            JsonValue::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            JsonValue::Object(map) => Value::Map(map.into_iter().collect()),
        }
    }
}
