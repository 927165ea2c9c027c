use thiserror::Error;

/// Error types for the prism-serializer crate
#[derive(Error, Debug)]
pub enum SerializeError {
    /// The default getter could not find the attribute on the source object.
    #[error("'{type_name}' object has no attribute '{name}'")]
    MissingAttribute { name: String, type_name: String },

    /// Attribute lookup was attempted on a value that is not an object.
    #[error("cannot read attribute '{name}' from a {found} value")]
    NotAnObject { name: String, found: &'static str },

    #[error("{field} field cannot convert {found} value: {reason}")]
    Conversion {
        field: &'static str,
        found: &'static str,
        reason: String,
    },

    #[error("'{found}' value is not callable")]
    NotCallable { found: &'static str },

    #[error("{found} value is not serializable to a primitive")]
    NotSerializable { found: String },

    #[error("expected a sequence for many-mode serialization, found {found}")]
    NotASequence { found: &'static str },

    #[error("serializer '{serializer}' has no method '{method}'")]
    UnknownMethod { serializer: String, method: String },

    #[error("serializer '{serializer}' declares field '{field}' more than once")]
    DuplicateField { serializer: String, field: String },

    #[error("serializer '{serializer}' uses output label '{label}' more than once")]
    DuplicateLabel { serializer: String, label: String },

    #[error("invalid datetime format '{0}'")]
    InvalidFormat(String),

    #[error("unknown serializer '{0}'")]
    UnknownSerializer(String),

    #[error("serializer '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error(transparent)]
    Custom(#[from] anyhow::Error),
}

impl SerializeError {
    pub(crate) fn conversion(
        field: &'static str,
        found: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        SerializeError::Conversion {
            field,
            found,
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for SerializeError {
    fn from(err: serde_json::Error) -> Self {
        SerializeError::Schema(err.to_string())
    }
}

/// Result type for prism-serializer operations
pub type Result<T> = std::result::Result<T, SerializeError>;
