//! One-time compilation of field declarations into getter triples.

use std::collections::HashSet;

use crate::error::{Result, SerializeError};
use crate::field::Field;
use crate::getter::{Getter, MethodResolver};
use crate::log_debug;
use crate::logging::{Component, Logger};
use crate::serializer::Serializer;

/// A field bound to its serializer: output label, getter and conversion.
#[derive(Clone, Debug)]
pub struct CompiledField {
    pub(crate) name: String,
    pub(crate) label: String,
    pub(crate) getter: Getter,
    pub(crate) field: Field,
    pub(crate) convert: bool,
    pub(crate) call: bool,
    pub(crate) required: bool,
}

impl CompiledField {
    /// Declared field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key used in the output mapping.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn getter(&self) -> &Getter {
        &self.getter
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    /// `false` when `to_value` is the identity and is skipped.
    pub fn converts(&self) -> bool {
        self.convert
    }
}

/// Compile `fields`, in declaration order, into a serializer named `name`.
///
/// Method fields resolve against `owner`. Fails on duplicate field names,
/// duplicate output labels, unknown methods and invalid datetime formats.
pub fn compile(
    name: &str,
    fields: Vec<(String, Field)>,
    owner: &dyn MethodResolver,
) -> Result<Serializer> {
    let logger = Logger::new(Component::Compiler, name);
    let mut names = HashSet::with_capacity(fields.len());
    let mut labels = HashSet::with_capacity(fields.len());
    let mut compiled = Vec::with_capacity(fields.len());

    for (field_name, field) in fields {
        if !names.insert(field_name.clone()) {
            return Err(SerializeError::DuplicateField {
                serializer: name.to_string(),
                field: field_name,
            });
        }
        field.validate()?;

        let source_name = field.attr().unwrap_or(&field_name).to_string();
        let getter = match field.as_getter(&source_name, owner)? {
            Some(getter) => getter,
            None => Getter::Attribute(source_name),
        };

        let label = field.label().unwrap_or(&field_name).to_string();
        if !labels.insert(label.clone()) {
            return Err(SerializeError::DuplicateLabel {
                serializer: name.to_string(),
                label,
            });
        }

        let convert = field.overrides_to_value();
        log_debug!(
            logger,
            "field '{}' -> '{}' ({}, {:?}, convert={})",
            field_name,
            label,
            field.kind().name(),
            getter,
            convert
        );

        compiled.push(CompiledField {
            name: field_name,
            label,
            getter,
            convert,
            call: field.call(),
            required: field.required(),
            field,
        });
    }

    log_debug!(logger, "compiled {} fields", compiled.len());
    Ok(Serializer::from_compiled(name, compiled))
}
