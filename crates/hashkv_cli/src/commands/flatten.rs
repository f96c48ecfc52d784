//! Flatten command implementation.

use super::{document, read_json, Context};
use hashkv_core::FlatRecord;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// A flattened document.
#[derive(Debug, Serialize)]
pub struct FlattenResult {
    /// Storage key of the root entity, if it has an id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Keyspace of the root entity.
    pub keyspace: Option<String>,
    /// Hash entries, sorted by path.
    pub data: BTreeMap<String, String>,
    /// Index sets the entity belongs to.
    pub index_keys: Vec<String>,
}

impl FlattenResult {
    fn from_record(record: &FlatRecord) -> Self {
        Self {
            key: record.root_key(),
            keyspace: record.keyspace().map(str::to_string),
            data: record.to_string_map(),
            index_keys: record.index_keys(),
        }
    }
}

/// Runs the flatten command.
pub fn run(
    schema: &Path,
    config: Option<&Path>,
    input: &Path,
    type_name: Option<&str>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let context = Context::load(schema, config)?;
    let json = read_json(input)?;

    let type_name = match type_name {
        Some(name) => name.to_string(),
        None => json
            .get(hashkv_core::path::TYPE_HINT_KEY)
            .and_then(serde_json::Value::as_str)
            .ok_or("document has no _class member; pass --type")?
            .to_string(),
    };

    let object = document::to_object(context.registry.as_ref(), &json, &type_name)?;
    let record = context.converter.write(&object)?;

    match format {
        "json" => {
            let result = FlattenResult::from_record(&record);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => print_text_output(&record),
    }

    Ok(())
}

fn print_text_output(record: &FlatRecord) {
    println!("hashkv Flat Record");
    println!("==================");
    println!();
    match record.root_key() {
        Some(key) => println!("Key:      {key}"),
        None => println!("Key:      (no id)"),
    }
    println!("Keyspace: {}", record.keyspace().unwrap_or("-"));
    println!("Entries:  {}", record.len());
    println!();

    let width = record.entries().map(|(k, _)| k.len()).max().unwrap_or(0);
    for (key, value) in record.entries() {
        println!("  {key:<width$} = {}", String::from_utf8_lossy(value));
    }

    let index_keys = record.index_keys();
    if !index_keys.is_empty() {
        println!();
        println!("Index keys:");
        for key in index_keys {
            println!("  {key}");
        }
    }
}
