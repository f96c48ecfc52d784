//! Indexes command implementation.

use super::Context;
use hashkv_core::{EntityAccessor, IndexDefinition, IndexType, TypeRegistry};
use serde::Serialize;
use std::path::Path;

/// Where an index definition comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexSource {
    /// Listed in the converter configuration.
    Config,
    /// Declared on a schema property; registered on first write.
    Annotation,
}

/// One row of the index listing.
#[derive(Debug, Serialize)]
pub struct IndexRow {
    /// Keyspace.
    pub keyspace: String,
    /// Property name.
    pub path: String,
    /// Index kind.
    pub index_type: IndexType,
    /// Origin of the definition.
    pub source: IndexSource,
}

/// Runs the indexes command.
pub fn run(schema: &Path, config: Option<&Path>, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let context = Context::load(schema, config)?;
    let rows = collect(&context.registry, &context.config.indexes)?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&rows)?),
        _ => print_text_output(&rows),
    }
    Ok(())
}

/// Configured definitions first, then annotated properties not already covered.
pub fn collect(
    registry: &TypeRegistry,
    configured: &[IndexDefinition],
) -> Result<Vec<IndexRow>, Box<dyn std::error::Error>> {
    let mut rows: Vec<IndexRow> = configured
        .iter()
        .map(|d| IndexRow {
            keyspace: d.keyspace.clone(),
            path: d.path.clone(),
            index_type: d.index_type,
            source: IndexSource::Config,
        })
        .collect();

    for type_name in registry.type_names() {
        let descriptor = registry.descriptor(&type_name)?;
        for property in descriptor.properties().iter().filter(|p| p.is_indexed()) {
            let keyspace = descriptor.keyspace_name();
            let known = rows
                .iter()
                .any(|r| r.keyspace == keyspace && r.path == property.name());
            if !known {
                rows.push(IndexRow {
                    keyspace: keyspace.to_string(),
                    path: property.name().to_string(),
                    index_type: IndexType::Simple,
                    source: IndexSource::Annotation,
                });
            }
        }
    }
    Ok(rows)
}

fn print_text_output(rows: &[IndexRow]) {
    if rows.is_empty() {
        println!("No index definitions.");
        return;
    }
    println!("{:<20} {:<24} {:<8} SOURCE", "KEYSPACE", "PATH", "TYPE");
    for row in rows {
        let source = match row.source {
            IndexSource::Config => "config",
            IndexSource::Annotation => "annotation",
        };
        println!(
            "{:<20} {:<24} {:<8} {source}",
            row.keyspace, row.path, "simple"
        );
    }
}
