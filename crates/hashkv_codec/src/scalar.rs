//! Declared scalar types.

use serde::{Deserialize, Serialize};

/// The declared type of a scalar property, map key, or collection element.
///
/// The decoder needs the declared type to turn raw bytes back into a value;
/// the encoder works from the runtime value alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    /// UTF-8 text.
    Text,
    /// 8-bit signed integer.
    Int8,
    /// 16-bit signed integer.
    Int16,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 32-bit float.
    Float32,
    /// 64-bit float.
    Float64,
    /// Boolean.
    Bool,
    /// Point in time.
    Date,
    /// Raw bytes, passed through unchanged.
    Bytes,
    /// Enumeration with a closed set of variant names.
    Enum(EnumType),
}

impl ScalarType {
    /// Canonical name of this type, used in error messages.
    pub fn name(&self) -> &str {
        match self {
            ScalarType::Text => "text",
            ScalarType::Int8 => "int8",
            ScalarType::Int16 => "int16",
            ScalarType::Int32 => "int32",
            ScalarType::Int64 => "int64",
            ScalarType::Float32 => "float32",
            ScalarType::Float64 => "float64",
            ScalarType::Bool => "bool",
            ScalarType::Date => "date",
            ScalarType::Bytes => "bytes",
            ScalarType::Enum(e) => &e.name,
        }
    }

    /// Shorthand for an enum type.
    pub fn enumeration<I, S>(name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScalarType::Enum(EnumType::new(name, variants))
    }
}

/// An enumeration type: its name and the exact variant names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumType {
    /// Fully qualified enum name.
    pub name: String,
    /// Variant names, case-sensitive.
    pub variants: Vec<String>,
}

impl EnumType {
    /// Creates an enum type.
    pub fn new<I, S>(name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }

    /// Looks up a variant by exact name.
    pub fn variant(&self, name: &str) -> Option<&str> {
        self.variants
            .iter()
            .find(|v| v.as_str() == name)
            .map(String::as_str)
    }
}
