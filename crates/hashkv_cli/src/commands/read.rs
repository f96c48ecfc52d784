//! Read command implementation.

use super::{document, read_json, Context};
use hashkv_codec::Value;
use std::path::Path;

/// Runs the read command.
///
/// References are not resolved; they read as unset.
pub fn run(
    schema: &Path,
    config: Option<&Path>,
    input: &Path,
    type_name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let context = Context::load(schema, config)?;
    let record = document::record_from_json(&read_json(input)?)?;

    match context.converter.read(type_name, &record)? {
        Some(object) => {
            let json = document::to_json(&Value::Object(object));
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        None => println!("null"),
    }

    Ok(())
}
