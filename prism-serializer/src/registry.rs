//! Named serializer registry.
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value as JsonValue;

use crate::error::{Result, SerializeError};
use crate::getter::MethodTable;
use crate::logging::{Component, Logger};
use crate::schema::SerializerSchema;
use crate::serializer::Serializer;
use crate::value::Value;
use crate::{log_debug, log_info};

/// Thread-safe map: serializer name -> compiled serializer.
///
/// Schemas compiled through the registry resolve their nested references
/// against serializers registered earlier.
pub struct SerializerRegistry {
    serializers: DashMap<String, Arc<Serializer>>,
    logger: Logger,
}

impl Default for SerializerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SerializerRegistry {
    pub fn new() -> Self {
        Self {
            serializers: DashMap::new(),
            logger: Logger::new(Component::Registry, "registry"),
        }
    }

    pub fn register(&self, serializer: Arc<Serializer>) -> Result<()> {
        match self.serializers.entry(serializer.name().to_string()) {
            Entry::Occupied(entry) => Err(SerializeError::AlreadyRegistered(entry.key().clone())),
            Entry::Vacant(entry) => {
                log_debug!(
                    self.logger,
                    "registered '{}' ({} fields)",
                    serializer.name(),
                    serializer.fields().len()
                );
                entry.insert(serializer);
                Ok(())
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<Serializer>> {
        self.serializers.get(name).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.serializers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.serializers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.serializers.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.serializers.iter().map(|kv| kv.key().clone()).collect()
    }

    /// Compile `schema` and register the result under its name.
    pub fn compile_schema(
        &self,
        schema: &SerializerSchema,
        methods: MethodTable,
    ) -> Result<Arc<Serializer>> {
        if self.contains(&schema.name) {
            return Err(SerializeError::AlreadyRegistered(schema.name.clone()));
        }
        let serializer = schema.compile(methods, |name| self.get(name))?;
        self.register(serializer.clone())?;
        Ok(serializer)
    }

    /// Load a JSON array of schemas, compiling them in order. `methods`
    /// supplies the method table for each schema by name.
    pub fn load_json<M>(&self, text: &str, methods: M) -> Result<Vec<Arc<Serializer>>>
    where
        M: Fn(&str) -> MethodTable,
    {
        let schemas = SerializerSchema::list_from_json(text)?;
        let compiled = schemas
            .iter()
            .map(|schema| self.compile_schema(schema, methods(&schema.name)))
            .collect::<Result<Vec<_>>>()?;
        log_info!(self.logger, "loaded {} serializers", compiled.len());
        Ok(compiled)
    }

    /// Look up `name` and serialize `source` with it.
    pub fn serialize(&self, name: &str, source: &Value, many: bool) -> Result<JsonValue> {
        let serializer = self
            .get(name)
            .ok_or_else(|| SerializeError::UnknownSerializer(name.to_string()))?;
        serializer.serialize_with(source, many)
    }
}
