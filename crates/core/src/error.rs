//! Error model for entities and the storage boundary.

use thiserror::Error;

/// Result type used across the model layer.
pub type ModelResult<T> = Result<T, ModelError>;

/// Model-level error.
///
/// Registry-backed construction never returns these: malformed input degrades
/// to a warning plus a fallback value. They surface from the explicit helpers
/// (timestamp parsing, typed attribute access, attribute mutation) and from
/// `Entity::from_dict` when the stored dictionary has no id.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A timestamp string did not match the storage format.
    #[error("invalid timestamp for '{key}': {reason}")]
    InvalidTimestamp { key: String, reason: String },

    /// An attempt was made to set one of the reserved keys as an extension.
    #[error("'{0}' is reserved and cannot be set as an extension attribute")]
    ReservedAttribute(String),

    /// A stored dictionary lacks a key it must carry.
    #[error("stored dictionary has no '{0}'")]
    MissingAttribute(String),

    /// An extension value could not be decoded into the requested type.
    #[error("attribute '{key}' has an unexpected type: {reason}")]
    AttributeType { key: String, reason: String },
}

impl ModelError {
    pub fn invalid_timestamp(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTimestamp {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn reserved(key: impl Into<String>) -> Self {
        Self::ReservedAttribute(key.into())
    }

    pub fn missing(key: impl Into<String>) -> Self {
        Self::MissingAttribute(key.into())
    }

    pub fn attribute_type(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::AttributeType {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Storage registry error.
///
/// These are infrastructure failures raised by a registry's persist step.
/// `Entity::save` logs and swallows them; `Entity::try_save` returns them.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage lock poisoned")]
    Poisoned,

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}
