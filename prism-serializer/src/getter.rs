//! Compiled getters and the method seam used by method fields.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::Result;
use crate::value::Value;

/// A serializer-side method: receives the source object, returns the raw value.
pub type Method = Arc<dyn Fn(&Value) -> Result<Value> + Send + Sync>;

/// Getter supplied by a custom field.
pub type GetterFn = Arc<dyn Fn(&Value) -> Result<Value> + Send + Sync>;

/// A bound function from source object to raw value.
///
/// Resolved once when a serializer is compiled and stored as data, so the
/// serialize path never inspects field kinds.
#[derive(Clone)]
pub enum Getter {
    /// Attribute lookup by name on the source object.
    Attribute(String),
    /// Method of the owning serializer.
    Method { name: String, method: Method },
    Custom(GetterFn),
}

impl Getter {
    pub fn attribute(name: impl Into<String>) -> Self {
        Getter::Attribute(name.into())
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    {
        Getter::Custom(Arc::new(f))
    }

    #[inline]
    pub fn raw_value_of(&self, source: &Value) -> Result<Value> {
        match self {
            Getter::Attribute(name) => source.attribute(name),
            Getter::Method { method, .. } => method(source),
            Getter::Custom(f) => f(source),
        }
    }
}

impl fmt::Debug for Getter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Getter::Attribute(name) => write!(f, "Attribute({name})"),
            Getter::Method { name, .. } => write!(f, "Method({name})"),
            Getter::Custom(_) => f.write_str("Custom(<fn>)"),
        }
    }
}

/// Resolves method names for method fields at compile time.
pub trait MethodResolver {
    fn resolve_method(&self, name: &str) -> Option<Method>;

    /// Owner name reported in unknown-method errors.
    fn owner_name(&self) -> &str {
        "<anonymous>"
    }
}

/// No methods at all.
impl MethodResolver for () {
    fn resolve_method(&self, _name: &str) -> Option<Method> {
        None
    }
}

/// Named methods declared alongside a serializer's fields.
#[derive(Clone, Default)]
pub struct MethodTable {
    owner: String,
    methods: IndexMap<String, Method>,
}

impl MethodTable {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            methods: IndexMap::new(),
        }
    }

    pub fn with_method<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.insert(name, f);
        self
    }

    pub fn insert<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Arc::new(f));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl MethodResolver for MethodTable {
    fn resolve_method(&self, name: &str) -> Option<Method> {
        self.methods.get(name).cloned()
    }

    fn owner_name(&self) -> &str {
        &self.owner
    }
}

impl fmt::Debug for MethodTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodTable")
            .field("owner", &self.owner)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}
