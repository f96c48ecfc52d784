//! Error types for hashkv core.

use hashkv_codec::CodecError;
use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while converting, resolving or storing entities.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] hashkv_storage::StorageError),

    /// Scalar codec error without path context.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A stored leaf could not be decoded into its declared type.
    #[error("conversion failed at {path:?} for {raw:?}: {source}")]
    Conversion {
        /// Path of the offending entry.
        path: String,
        /// The raw stored value, decoded lossily as UTF-8.
        raw: String,
        /// The underlying codec failure.
        #[source]
        source: CodecError,
    },

    /// A type hint names an unknown type or one not assignable to the declared type.
    #[error("cannot resolve type {type_name:?} at {path:?}")]
    TypeResolution {
        /// The type name found in the hint.
        type_name: String,
        /// Path of the type hint entry.
        path: String,
    },

    /// A property or value has a shape the converter cannot represent.
    #[error("unsupported descriptor at {path:?}: {message}")]
    UnsupportedDescriptor {
        /// Path (or `Type.property`) where the problem was found.
        path: String,
        /// Description of the problem.
        message: String,
    },

    /// No metadata is registered for the type.
    #[error("unknown type: {type_name}")]
    UnknownType {
        /// The unregistered type name.
        type_name: String,
    },

    /// A referenced entity has no identifier.
    #[error("referenced entity of type {type_name} has no id")]
    MissingId {
        /// Type of the referenced entity.
        type_name: String,
    },

    /// A stored reference pointer is not of the form `keyspace:id`.
    #[error("invalid reference {pointer:?} at {path:?}")]
    InvalidReference {
        /// Path of the pointer entry.
        path: String,
        /// The stored pointer text.
        pointer: String,
    },

    /// Schema or converter configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem.
        message: String,
    },
}

impl CoreError {
    /// Creates a conversion error for the entry at `path`.
    pub fn conversion(path: impl Into<String>, raw: &[u8], source: CodecError) -> Self {
        Self::Conversion {
            path: path.into(),
            raw: String::from_utf8_lossy(raw).into_owned(),
            source,
        }
    }

    /// Creates a type resolution error.
    pub fn type_resolution(type_name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::TypeResolution {
            type_name: type_name.into(),
            path: path.into(),
        }
    }

    /// Creates an unsupported descriptor error.
    pub fn unsupported(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnsupportedDescriptor {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates an unknown type error.
    pub fn unknown_type(type_name: impl Into<String>) -> Self {
        Self::UnknownType {
            type_name: type_name.into(),
        }
    }

    /// Creates a missing id error.
    pub fn missing_id(type_name: impl Into<String>) -> Self {
        Self::MissingId {
            type_name: type_name.into(),
        }
    }

    /// Creates an invalid reference error.
    pub fn invalid_reference(path: impl Into<String>, pointer: impl Into<String>) -> Self {
        Self::InvalidReference {
            path: path.into(),
            pointer: pointer.into(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
