// Logging utilities for prism-serializer
//
// Component-scoped wrapper over the `log` facade. Every message is prefixed
// with the component and the serializer (or registry) it concerns, so output
// from nested serializers can be told apart.

use log::{debug, info, trace};
use std::fmt::Arguments;

/// Predefined components for logging categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Compiler,
    Serializer,
    Registry,
}

impl Component {
    /// Get the string representation of the component
    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Compiler => "Compiler",
            Component::Serializer => "Serializer",
            Component::Registry => "Registry",
        }
    }
}

/// A component logger bound to one serializer (or registry) scope
#[derive(Clone, Debug)]
pub struct Logger {
    component: Component,
    scope: String,
}

impl Logger {
    pub fn new(component: Component, scope: impl Into<String>) -> Self {
        Self {
            component,
            scope: scope.into(),
        }
    }

    pub fn component(&self) -> Component {
        self.component
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn trace_args(&self, args: Arguments) {
        if log::log_enabled!(log::Level::Trace) {
            trace!("[{}][{}] {}", self.component.as_str(), self.scope, args);
        }
    }

    pub fn debug_args(&self, args: Arguments) {
        if log::log_enabled!(log::Level::Debug) {
            debug!("[{}][{}] {}", self.component.as_str(), self.scope, args);
        }
    }

    pub fn info_args(&self, args: Arguments) {
        if log::log_enabled!(log::Level::Info) {
            info!("[{}][{}] {}", self.component.as_str(), self.scope, args);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_names() {
        assert_eq!(Component::Compiler.as_str(), "Compiler");
        assert_eq!(Component::Registry.as_str(), "Registry");
    }

    #[test]
    fn test_logger_scope() {
        let logger = Logger::new(Component::Serializer, "ComplexS");
        assert_eq!(logger.scope(), "ComplexS");
        assert_eq!(logger.component(), Component::Serializer);
    }
}
