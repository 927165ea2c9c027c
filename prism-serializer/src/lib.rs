//! Declarative object-to-primitive serialization
//!
//! This crate provides:
//! - Field declarations with per-kind value conversions
//! - A compiler that binds every field to a getter once, per serializer
//! - Serializers producing ordered `serde_json` values, with nested and
//!   many-mode fields
//! - Serde-loadable schemas and a named registry
//! - `#[derive(Attributes)]` for exposing plain structs as source objects

// Lets the derive macro's `::prism_serializer` paths resolve inside this crate
extern crate self as prism_serializer;

mod macros;

pub mod compiler;
pub mod datetime;
pub mod error;
pub mod field;
pub mod getter;
pub mod logging;
pub mod registry;
pub mod schema;
pub mod serializer;
pub mod value;

pub use compiler::{compile, CompiledField};
pub use error::{Result, SerializeError};
pub use field::{CustomField, Field, FieldKind};
pub use getter::{Getter, Method, MethodResolver, MethodTable};
pub use logging::{Component, Logger};
pub use registry::SerializerRegistry;
pub use schema::{FieldSchema, SchemaFieldKind, SerializerSchema};
pub use serializer::{Serializer, SerializerBuilder};
pub use value::{Attributes, Record, Thunk, Value};

// Re-export macros
pub use prism_serializer_macros::*;
