//! Error types for storage operations.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The key holds a structure of a different kind than the operation expects.
    #[error("wrong type at key {key:?}: expected {expected}")]
    WrongType {
        /// The offending key, decoded lossily as UTF-8.
        key: String,
        /// The structure the operation expected.
        expected: &'static str,
    },

    /// The store is closed.
    #[error("store is closed")]
    Closed,
}

impl StorageError {
    /// Creates a wrong-type error.
    pub fn wrong_type(key: &[u8], expected: &'static str) -> Self {
        Self::WrongType {
            key: String::from_utf8_lossy(key).into_owned(),
            expected,
        }
    }
}
