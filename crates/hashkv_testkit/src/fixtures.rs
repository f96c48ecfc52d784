//! Test fixtures: the `Person` domain and helpers around it.
//!
//! The schema models a small cast of characters:
//!
//! - `Person` (keyspace `persons`) with scalars, an enum, collections, maps,
//!   a nested `Address` and references to `Location`
//! - `TaVeren`, a subtype of `Person`
//! - `Address` and its subtype `AddressWithPostcode`
//! - `Measurements`, nested in `Person`, covering the numeric and byte types
//! - `Location` (keyspace `locations`), only ever referenced

use chrono::{DateTime, TimeZone, Utc};
use hashkv_codec::{Object, Value};
use hashkv_core::{
    ConverterConfig, EntityAccessor, KeyValueAdapter, MappingConverter, ReferenceResolver, Schema,
    TypeRegistry,
};
use hashkv_storage::InMemoryStore;
use std::sync::Arc;

/// Schema of the `Person` domain, as loaded from a schema file.
pub const PERSON_SCHEMA: &str = r#"{
    "enums": [
        { "name": "Gender", "variants": ["MALE", "FEMALE"] }
    ],
    "entities": [
        {
            "name": "Person",
            "keyspace": "persons",
            "properties": [
                { "name": "id", "type": "text", "id": true },
                { "name": "firstname", "type": "text", "indexed": true },
                { "name": "lastname", "type": "text" },
                { "name": "gender", "type": "Gender" },
                { "name": "age", "type": "int32" },
                { "name": "alive", "type": "bool" },
                { "name": "birthdate", "type": "date" },
                { "name": "nicknames", "type": "text", "shape": "list" },
                { "name": "coworkers", "type": "Person", "shape": "list" },
                { "name": "address", "type": "Address" },
                { "name": "measurements", "type": "Measurements" },
                { "name": "physicalAttributes", "type": "text", "shape": "map" },
                { "name": "relatives", "type": "Person", "shape": "map" },
                { "name": "location", "type": "Location", "reference": true },
                { "name": "visited", "type": "Location", "shape": "list", "reference": true }
            ]
        },
        {
            "name": "TaVeren",
            "parent": "Person",
            "properties": [
                { "name": "feature", "type": "text" }
            ]
        },
        {
            "name": "Address",
            "properties": [
                { "name": "city", "type": "text" },
                { "name": "country", "type": "text" }
            ]
        },
        {
            "name": "AddressWithPostcode",
            "parent": "Address",
            "properties": [
                { "name": "postcode", "type": "text" }
            ]
        },
        {
            "name": "Measurements",
            "properties": [
                { "name": "height", "type": "int16" },
                { "name": "shoeSize", "type": "int8" },
                { "name": "heartbeats", "type": "int64" },
                { "name": "weight", "type": "float32" },
                { "name": "bodyFat", "type": "float64" },
                { "name": "signature", "type": "bytes" },
                { "name": "splits", "type": "float32", "shape": "list" },
                { "name": "laps", "type": "float32", "shape": "map", "key": "int16" }
            ]
        },
        {
            "name": "Location",
            "keyspace": "locations",
            "properties": [
                { "name": "id", "type": "text", "id": true },
                { "name": "name", "type": "text" }
            ]
        }
    ]
}"#;

/// Parses [`PERSON_SCHEMA`].
pub fn person_schema() -> Schema {
    Schema::from_json(PERSON_SCHEMA).expect("Person schema should parse")
}

/// Registry of the `Person` domain.
pub fn person_registry() -> Arc<TypeRegistry> {
    Arc::new(TypeRegistry::from_schema(&person_schema()).expect("Person schema should register"))
}

/// A converter over the `Person` domain with no index definitions and no
/// reference resolution.
pub fn converter() -> MappingConverter {
    MappingConverter::new(accessor())
}

/// A converter over the `Person` domain, configured from `config`.
pub fn converter_with_config(config: &ConverterConfig) -> MappingConverter {
    MappingConverter::from_config(accessor(), config)
}

/// A converter over the `Person` domain that resolves references with `resolver`.
pub fn converter_with_resolver(resolver: Arc<dyn ReferenceResolver>) -> MappingConverter {
    converter().with_resolver(resolver)
}

/// An adapter over a fresh in-memory store.
pub fn adapter() -> KeyValueAdapter<InMemoryStore> {
    KeyValueAdapter::new(Arc::new(InMemoryStore::new()), converter())
}

fn accessor() -> Arc<dyn EntityAccessor> {
    person_registry()
}

/// A `Person` with an id and a first name.
pub fn person(id: &str, firstname: &str) -> Object {
    Object::new("Person").with("id", id).with("firstname", firstname)
}

/// `Person` `1`, rand al'thor.
pub fn rand() -> Object {
    person("1", "rand").with("lastname", "al'thor")
}

/// `TaVeren` `2`, mat cauthon.
pub fn mat() -> Object {
    Object::new("TaVeren")
        .with("id", "2")
        .with("firstname", "mat")
        .with("lastname", "cauthon")
        .with("feature", "foxhead medallion")
}

/// `Person` `3`, egwene al'vere.
pub fn egwene() -> Object {
    person("3", "egwene")
        .with("lastname", "al'vere")
        .with("gender", Value::Enum("FEMALE".into()))
}

/// An `Address`.
pub fn address(city: &str, country: &str) -> Object {
    Object::new("Address")
        .with("city", city)
        .with("country", country)
}

/// An `AddressWithPostcode`.
pub fn address_with_postcode(city: &str, country: &str, postcode: &str) -> Object {
    Object::new("AddressWithPostcode")
        .with("city", city)
        .with("country", country)
        .with("postcode", postcode)
}

/// `Measurements` with every numeric and byte property set.
pub fn measurements() -> Object {
    Object::new("Measurements")
        .with("height", 183)
        .with("shoeSize", 45)
        .with("heartbeats", 3_000_000_000i64)
        .with("weight", 84.5)
        .with("bodyFat", 0.125)
        .with("signature", vec![0u8, 159, 146, 150])
        .with("splits", list([61.25, 59.5]))
        .with(
            "laps",
            Value::Map(vec![
                (Value::Integer(1), Value::Float(61.25)),
                (Value::Integer(-2), Value::Float(0.5)),
            ]),
        )
}

/// A `Location`.
pub fn location(id: &str, name: &str) -> Object {
    Object::new("Location").with("id", id).with("name", name)
}

/// The birth date used by the fixtures: 1978-11-25 10:30 UTC.
pub fn birthdate() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1978, 11, 25, 10, 30, 0)
        .single()
        .expect("fixture date should be valid")
}

/// A list value.
pub fn list<I, V>(items: I) -> Value
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    Value::List(items.into_iter().map(Into::into).collect())
}

/// A map value with text keys, in the given order.
pub fn text_map<I, K, V>(entries: I) -> Value
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    Value::Map(
        entries
            .into_iter()
            .map(|(k, v)| (Value::Text(k.into()), v.into()))
            .collect(),
    )
}
