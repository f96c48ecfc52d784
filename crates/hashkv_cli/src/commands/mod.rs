//! CLI command implementations.

pub mod document;
pub mod flatten;
pub mod indexes;
pub mod read;

use hashkv_core::{ConverterConfig, EntityAccessor, MappingConverter, Schema, TypeRegistry};
use std::path::Path;
use std::sync::Arc;

/// Schema, configuration and converter shared by the commands.
pub struct Context {
    /// Registered entity types.
    pub registry: Arc<TypeRegistry>,
    /// Converter configuration (defaults when no file is given).
    pub config: ConverterConfig,
    /// Converter over the registry.
    pub converter: MappingConverter,
}

impl Context {
    /// Loads the schema and optional configuration.
    pub fn load(schema: &Path, config: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let schema = Schema::from_path(schema)?;
        let registry = Arc::new(TypeRegistry::from_schema(&schema)?);
        let config = match config {
            Some(path) => ConverterConfig::from_path(path)?,
            None => ConverterConfig::default(),
        };

        let accessor: Arc<dyn EntityAccessor> = registry.clone();
        let converter = MappingConverter::from_config(accessor, &config);
        tracing::debug!(types = registry.len(), indexes = config.indexes.len(), "loaded schema");

        Ok(Self {
            registry,
            config,
            converter,
        })
    }
}

/// Reads and parses a JSON file.
pub fn read_json(path: &Path) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SCHEMA: &str = r#"{ "entities": [
        { "name": "Person", "keyspace": "persons", "properties": [
            { "name": "id", "type": "text", "id": true },
            { "name": "firstname", "type": "text" }
        ] }
    ] }"#;

    #[test]
    fn load_with_and_without_config() {
        let dir = TempDir::new().unwrap();
        let schema = dir.path().join("schema.json");
        let config = dir.path().join("config.json");
        fs::write(&schema, SCHEMA).unwrap();
        fs::write(&config, r#"{ "indexes": [{ "keyspace": "persons", "path": "firstname" }] }"#)
            .unwrap();

        let plain = Context::load(&schema, None).unwrap();
        assert!(plain.registry.contains("Person"));
        assert!(plain.converter.index_configuration().is_empty());

        let configured = Context::load(&schema, Some(config.as_path())).unwrap();
        assert!(configured
            .converter
            .index_configuration()
            .has_index_for("persons", "firstname"));
    }

    #[test]
    fn read_json_reports_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = read_json(&dir.path().join("absent.json")).unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }
}
