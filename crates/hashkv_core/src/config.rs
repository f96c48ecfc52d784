//! Converter and adapter configuration.

use crate::error::{CoreError, CoreResult};
use crate::index::{IndexConfiguration, IndexDefinition};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a converter and the adapter built on it.
///
/// Loaded from JSON or built in code:
///
/// ```
/// use hashkv_core::{ConverterConfig, IndexDefinition};
///
/// let config = ConverterConfig::new()
///     .index(IndexDefinition::simple("persons", "firstname"))
///     .generate_ids(false);
/// assert_eq!(config.indexes.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Index definitions that apply before any annotation is seen.
    pub indexes: Vec<IndexDefinition>,

    /// Whether the adapter assigns a random id to entities stored without one.
    pub generate_ids: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            indexes: Vec::new(),
            generate_ids: true,
        }
    }
}

impl ConverterConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a pre-seeded index definition.
    #[must_use]
    pub fn index(mut self, definition: IndexDefinition) -> Self {
        self.indexes.push(definition);
        self
    }

    /// Sets whether missing ids are generated on store.
    #[must_use]
    pub const fn generate_ids(mut self, value: bool) -> Self {
        self.generate_ids = value;
        self
    }

    /// Parses and validates a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is malformed or a definition is invalid.
    pub fn from_json(text: &str) -> CoreResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is malformed, or holds
    /// an invalid definition.
    pub fn from_path(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading converter configuration");
        Self::from_json(&text)
    }

    /// Checks that every index definition names a keyspace and a property.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] for the first invalid definition.
    pub fn validate(&self) -> CoreResult<()> {
        for definition in &self.indexes {
            if definition.keyspace.is_empty() || definition.path.is_empty() {
                return Err(CoreError::invalid_config(format!(
                    "index definition needs a keyspace and a path: {definition:?}"
                )));
            }
            if definition.keyspace.contains(['.', ':']) {
                return Err(CoreError::invalid_config(format!(
                    "keyspace {:?} must not contain '.' or ':'",
                    definition.keyspace
                )));
            }
        }
        Ok(())
    }

    /// Builds the index registry seeded with this configuration.
    pub fn index_configuration(&self) -> IndexConfiguration {
        IndexConfiguration::with_definitions(self.indexes.iter().cloned())
    }
}
