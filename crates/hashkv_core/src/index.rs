//! Secondary index definitions.
//!
//! Only equality indexes exist. An indexed scalar property contributes the
//! fragment `property:value` to the record; the adapter stores the entity
//! id in the set `keyspace.property:value`.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Kind of secondary index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexType {
    /// Equality match on the scalar text of the value.
    #[default]
    Simple,
}

/// An index on one property of one keyspace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexDefinition {
    /// Keyspace of the root entity.
    pub keyspace: String,
    /// Property name.
    pub path: String,
    /// Index kind.
    #[serde(default)]
    pub index_type: IndexType,
}

impl IndexDefinition {
    /// Creates an equality index definition.
    pub fn simple(keyspace: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            keyspace: keyspace.into(),
            path: path.into(),
            index_type: IndexType::Simple,
        }
    }
}

/// Registry of index definitions.
///
/// Pre-seeded from configuration and grown lazily by the writer the first
/// time it meets an annotated property.
///
/// # Thread Safety
///
/// Lookup and insertion are atomic with respect to each other. Inserting an
/// existing `(keyspace, path)` pair is a no-op, so the first writer wins.
#[derive(Debug, Default)]
pub struct IndexConfiguration {
    definitions: RwLock<Vec<IndexDefinition>>,
}

impl IndexConfiguration {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration seeded with `definitions`. Duplicates are dropped.
    pub fn with_definitions<I>(definitions: I) -> Self
    where
        I: IntoIterator<Item = IndexDefinition>,
    {
        let config = Self::new();
        for definition in definitions {
            config.add_index_definition(definition);
        }
        config
    }

    /// Adds a definition unless one exists for the same keyspace and path.
    ///
    /// Returns `true` if the definition was added.
    pub fn add_index_definition(&self, definition: IndexDefinition) -> bool {
        let mut definitions = self.definitions.write();
        let exists = definitions
            .iter()
            .any(|d| d.keyspace == definition.keyspace && d.path == definition.path);
        if exists {
            return false;
        }
        definitions.push(definition);
        true
    }

    /// Returns true if an index is defined for the property in the keyspace.
    pub fn has_index_for(&self, keyspace: &str, path: &str) -> bool {
        self.definitions
            .read()
            .iter()
            .any(|d| d.keyspace == keyspace && d.path == path)
    }

    /// Definitions for one keyspace, in registration order.
    pub fn definitions_for(&self, keyspace: &str) -> Vec<IndexDefinition> {
        self.definitions
            .read()
            .iter()
            .filter(|d| d.keyspace == keyspace)
            .cloned()
            .collect()
    }

    /// All definitions, in registration order.
    pub fn definitions(&self) -> Vec<IndexDefinition> {
        self.definitions.read().clone()
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.definitions.read().len()
    }

    /// Returns true if no definitions exist.
    pub fn is_empty(&self) -> bool {
        self.definitions.read().is_empty()
    }
}
