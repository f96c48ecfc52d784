//! # hashkv Codec
//!
//! Object model and scalar byte codec for hashkv.
//!
//! This crate provides:
//! - [`Value`] / [`Object`]: a dynamic object graph (scalars, lists, maps,
//!   nested entity instances)
//! - [`ScalarType`]: declared scalar types, including enums
//! - [`to_bytes`] / [`from_bytes`]: the canonical scalar byte form used as
//!   hash field values
//! - [`to_bytes_as`]: encoding checked against a declared [`ScalarType`]
//!
//! ## Canonical Scalar Rules
//!
//! - Text is UTF-8, raw bytes pass through unchanged
//! - Numbers use their decimal string form; `float32` values keep 32-bit
//!   precision only
//! - Booleans are `"1"` and `"0"`; `"true"` (any case) also decodes as true
//! - Enums use the exact variant name
//! - Dates are decimal milliseconds since the Unix epoch
//! - An empty byte sequence is "no value"
//!
//! ## Usage
//!
//! ```
//! use hashkv_codec::{from_bytes, to_bytes, ScalarType, Value};
//!
//! let bytes = to_bytes(&Value::Integer(42)).unwrap();
//! assert_eq!(bytes, b"42");
//!
//! let decoded = from_bytes(&bytes, &ScalarType::Int32).unwrap();
//! assert_eq!(decoded, Some(Value::Integer(42)));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod encoder;
mod error;
mod scalar;
mod value;

pub use decoder::from_bytes;
pub use encoder::{to_bytes, to_bytes_as, to_text, FALSE_BYTES, TRUE_BYTES};
pub use error::{CodecError, CodecResult};
pub use scalar::{EnumType, ScalarType};
pub use value::{Object, Value};
