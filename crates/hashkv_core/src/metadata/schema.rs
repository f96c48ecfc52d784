//! Serializable schema files.
//!
//! A schema lists enums and entities in JSON. Property types are names:
//! either a built-in scalar (`text`, `int8`, `int16`, `int32`, `int64`,
//! `float32`, `float64`, `bool`, `date`, `bytes`), an enum declared in the
//! same schema, or an entity type.
//!
//! ```json
//! {
//!   "enums": [{ "name": "Gender", "variants": ["MALE", "FEMALE"] }],
//!   "entities": [{
//!     "name": "Person",
//!     "keyspace": "persons",
//!     "properties": [
//!       { "name": "id", "type": "text", "id": true },
//!       { "name": "firstname", "type": "text", "indexed": true },
//!       { "name": "nicknames", "type": "text", "shape": "list" },
//!       { "name": "physicalAttributes", "type": "text", "shape": "map" }
//!     ]
//!   }]
//! }
//! ```

use crate::error::{CoreError, CoreResult};
use hashkv_codec::{EnumType, ScalarType};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A set of enum and entity declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Schema {
    /// Enum types.
    pub enums: Vec<EnumType>,
    /// Entity types. Parents may appear after their subtypes.
    pub entities: Vec<EntitySchema>,
}

/// Declaration of one entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySchema {
    /// Type name.
    pub name: String,
    /// Keyspace; inherited from the parent or defaulting to the type name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyspace: Option<String>,
    /// Parent type name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Own properties, in declaration order.
    #[serde(default)]
    pub properties: Vec<PropertySchema>,
}

/// How a declared property holds its values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeSchema {
    /// One value.
    #[default]
    Single,
    /// An ordered collection.
    List,
    /// A map with scalar keys.
    Map,
}

/// Declaration of one property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySchema {
    /// Property name.
    pub name: String,
    /// Value (or element) type name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Value shape.
    #[serde(default)]
    pub shape: ShapeSchema,
    /// Map key type name. Defaults to `text`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Whether this is the id property.
    #[serde(default)]
    pub id: bool,
    /// Whether entity values are stored as pointers.
    #[serde(default)]
    pub reference: bool,
    /// Whether the property carries an equality index.
    #[serde(default)]
    pub indexed: bool,
    /// Whether the property is supplied at instantiation time.
    #[serde(default)]
    pub constructor: bool,
}

impl Schema {
    /// Parses a schema from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid schema document.
    pub fn from_json(text: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Loads a schema from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Looks up an enum declaration.
    pub fn find_enum(&self, name: &str) -> Option<&EnumType> {
        self.enums.iter().find(|e| e.name == name)
    }
}

/// Resolves a built-in scalar type name.
pub fn builtin_scalar(name: &str) -> Option<ScalarType> {
    let ty = match name {
        "text" | "string" => ScalarType::Text,
        "int8" => ScalarType::Int8,
        "int16" => ScalarType::Int16,
        "int32" => ScalarType::Int32,
        "int64" => ScalarType::Int64,
        "float32" => ScalarType::Float32,
        "float64" => ScalarType::Float64,
        "bool" => ScalarType::Bool,
        "date" => ScalarType::Date,
        "bytes" => ScalarType::Bytes,
        _ => return None,
    };
    Some(ty)
}

/// Resolves a scalar type name against the built-ins and the schema's enums.
pub(crate) fn resolve_scalar(schema: &Schema, name: &str) -> Option<ScalarType> {
    builtin_scalar(name).or_else(|| schema.find_enum(name).cloned().map(ScalarType::Enum))
}

/// Resolves a map key type name; keys must be scalars.
pub(crate) fn resolve_key(schema: &Schema, owner: &str, property: &PropertySchema) -> CoreResult<ScalarType> {
    let name = property.key.as_deref().unwrap_or("text");
    resolve_scalar(schema, name).ok_or_else(|| {
        CoreError::unsupported(
            format!("{owner}.{}", property.name),
            format!("map key type {name} is not a scalar"),
        )
    })
}
