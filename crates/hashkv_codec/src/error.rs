//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while converting scalars to or from bytes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The raw bytes could not be parsed as the target type.
    #[error("cannot convert {raw:?} to {target}: {message}")]
    Conversion {
        /// Name of the target scalar type.
        target: String,
        /// The offending input, decoded lossily as UTF-8.
        raw: String,
        /// Description of the failure.
        message: String,
    },

    /// A composite value was handed to the scalar codec.
    #[error("value of kind {kind} is not a scalar")]
    NotScalar {
        /// Kind of the offending value.
        kind: &'static str,
    },
}

impl CodecError {
    /// Create a conversion error.
    pub fn conversion(
        target: impl Into<String>,
        raw: &[u8],
        message: impl Into<String>,
    ) -> Self {
        Self::Conversion {
            target: target.into(),
            raw: String::from_utf8_lossy(raw).into_owned(),
            message: message.into(),
        }
    }

    /// Create a not-a-scalar error.
    pub fn not_scalar(kind: &'static str) -> Self {
        Self::NotScalar { kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_message_includes_raw_input() {
        let err = CodecError::conversion("int32", b"abc", "invalid digit");
        assert_eq!(
            err.to_string(),
            "cannot convert \"abc\" to int32: invalid digit"
        );
    }

    #[test]
    fn conversion_is_lossy_for_invalid_utf8() {
        let err = CodecError::conversion("text", &[0xff, b'a'], "invalid utf-8");
        match err {
            CodecError::Conversion { raw, .. } => assert!(raw.ends_with('a')),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
