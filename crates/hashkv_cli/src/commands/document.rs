//! JSON documents ⇄ object model.
//!
//! Documents are JSON objects whose members are property names. An optional
//! `_class` member selects a subtype of the declared type. Scalars are read
//! through the scalar codec, so `"20"` and `20` are both valid for an
//! `int32` property. References may be given as a nested object or as the
//! referenced id.

use hashkv_codec::{from_bytes, to_text, Object, ScalarType, Value};
use hashkv_core::path;
use hashkv_core::{
    CoreError, CoreResult, EntityAccessor, FlatRecord, PropertyDescriptor, PropertyShape, TypeRef,
};
use serde_json::{Map, Number, Value as Json};

/// Converts a JSON document into an object of (a subtype of) `declared`.
pub fn to_object(accessor: &dyn EntityAccessor, json: &Json, declared: &str) -> CoreResult<Object> {
    object_at(accessor, json, declared, "")
}

/// Converts an object graph value into JSON. Objects carry their `_class`.
pub fn to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Integer(n) => Json::from(*n),
        Value::Float(f) => Number::from_f64(*f).map_or(Json::Null, Json::Number),
        Value::Text(s) | Value::Enum(s) => Json::String(s.clone()),
        Value::Bytes(bytes) => Json::String(String::from_utf8_lossy(bytes).into_owned()),
        Value::Date(date) => Json::String(date.to_rfc3339()),
        Value::List(items) => Json::Array(items.iter().map(to_json).collect()),
        Value::Map(entries) => Json::Object(
            entries
                .iter()
                .map(|(k, v)| (to_text(k).unwrap_or_default(), to_json(v)))
                .collect(),
        ),
        Value::Object(object) => {
            let mut members = Map::new();
            members.insert(
                path::TYPE_HINT_KEY.to_string(),
                Json::String(object.type_name().to_string()),
            );
            for (name, field) in object.fields().filter(|(_, v)| !v.is_null()) {
                members.insert(name.to_string(), to_json(field));
            }
            Json::Object(members)
        }
    }
}

/// Builds a flat record from a JSON object of path keys to scalar values.
pub fn record_from_json(json: &Json) -> CoreResult<FlatRecord> {
    let Json::Object(members) = json else {
        return Err(CoreError::unsupported("", "flat record must be a JSON object"));
    };
    let mut record = FlatRecord::new();
    for (key, value) in members {
        record.put(key.as_str(), scalar_text(key, value)?);
    }
    Ok(record)
}

fn object_at(accessor: &dyn EntityAccessor, json: &Json, declared: &str, at: &str) -> CoreResult<Object> {
    let Json::Object(members) = json else {
        return Err(CoreError::unsupported(
            at,
            format!("expected an object for {declared}, found {}", json_kind(json)),
        ));
    };

    let type_name = match members.get(path::TYPE_HINT_KEY) {
        Some(Json::String(name)) => {
            if !accessor.is_assignable(name, declared) {
                return Err(CoreError::type_resolution(name.as_str(), path::type_hint(at)));
            }
            name.as_str()
        }
        Some(other) => {
            return Err(CoreError::unsupported(
                path::type_hint(at),
                format!("type hint must be a string, found {}", json_kind(other)),
            ));
        }
        None => declared,
    };
    let descriptor = accessor.descriptor(type_name)?;

    for name in members.keys() {
        if name != path::TYPE_HINT_KEY && descriptor.find_property(name).is_none() {
            tracing::warn!(path = %path::join(at, name), type_name, "ignoring unknown member");
        }
    }

    let mut object = Object::new(type_name);
    for property in descriptor.properties() {
        let Some(member) = members.get(property.name()).filter(|m| !m.is_null()) else {
            continue;
        };
        let member_path = path::join(at, property.name());
        let value = property_value(accessor, property, member, &member_path)?;
        accessor.set_property(&mut object, property, value);
    }
    Ok(object)
}

fn property_value(
    accessor: &dyn EntityAccessor,
    property: &PropertyDescriptor,
    json: &Json,
    at: &str,
) -> CoreResult<Value> {
    let reference = property.is_reference();
    match property.shape() {
        PropertyShape::Single(declared) => element_value(accessor, declared, reference, json, at),
        PropertyShape::Collection(element) => {
            let Json::Array(items) = json else {
                return Err(CoreError::unsupported(
                    at,
                    format!("expected an array, found {}", json_kind(json)),
                ));
            };
            items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    element_value(accessor, element, reference, item, &path::element(at, &i.to_string()))
                })
                .collect::<CoreResult<Vec<_>>>()
                .map(Value::List)
        }
        PropertyShape::Map {
            key: key_type,
            value: value_type,
        } => {
            let Json::Object(entries) = json else {
                return Err(CoreError::unsupported(
                    at,
                    format!("expected an object, found {}", json_kind(json)),
                ));
            };
            entries
                .iter()
                .map(|(k, v)| {
                    let entry_path = path::element(at, k);
                    let key = scalar_value(key_type, &Json::String(k.clone()), &entry_path)?;
                    let value = element_value(accessor, value_type, reference, v, &entry_path)?;
                    Ok((key, value))
                })
                .collect::<CoreResult<Vec<_>>>()
                .map(Value::Map)
        }
    }
}

fn element_value(
    accessor: &dyn EntityAccessor,
    declared: &TypeRef,
    reference: bool,
    json: &Json,
    at: &str,
) -> CoreResult<Value> {
    if json.is_null() {
        return Ok(Value::Null);
    }
    match declared {
        TypeRef::Entity(type_name) if reference => match json {
            Json::String(id) => {
                let descriptor = accessor.descriptor(type_name)?;
                let id_property = descriptor
                    .id_property()
                    .ok_or_else(|| CoreError::missing_id(type_name.as_str()))?;
                let mut target = Object::new(type_name.as_str());
                accessor.set_property(&mut target, id_property, Value::Text(id.clone()));
                Ok(Value::Object(target))
            }
            other => object_at(accessor, other, type_name, at).map(Value::Object),
        },
        TypeRef::Entity(type_name) => object_at(accessor, json, type_name, at).map(Value::Object),
        TypeRef::Scalar(ty) => scalar_value(ty, json, at),
    }
}

fn scalar_value(ty: &ScalarType, json: &Json, at: &str) -> CoreResult<Value> {
    let text = scalar_text(at, json)?;
    let value = from_bytes(text.as_bytes(), ty)
        .map_err(|source| CoreError::conversion(at, text.as_bytes(), source))?;
    Ok(value.unwrap_or(Value::Null))
}

fn scalar_text(at: &str, json: &Json) -> CoreResult<String> {
    match json {
        Json::String(s) => Ok(s.clone()),
        Json::Number(n) => Ok(n.to_string()),
        Json::Bool(b) => Ok(b.to_string()),
        other => Err(CoreError::unsupported(
            at,
            format!("expected a scalar, found {}", json_kind(other)),
        )),
    }
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashkv_core::{Schema, TypeRegistry};
    use serde_json::json;

    fn registry() -> TypeRegistry {
        let schema = Schema::from_json(
            r#"{
                "enums": [{ "name": "Gender", "variants": ["MALE", "FEMALE"] }],
                "entities": [
                    { "name": "Address", "properties": [{ "name": "city", "type": "text" }] },
                    { "name": "AddressWithPostcode", "parent": "Address",
                      "properties": [{ "name": "postcode", "type": "text" }] },
                    { "name": "Location", "keyspace": "locations",
                      "properties": [{ "name": "id", "type": "text", "id": true }] },
                    { "name": "Person", "keyspace": "persons", "properties": [
                        { "name": "id", "type": "text", "id": true },
                        { "name": "age", "type": "int32" },
                        { "name": "alive", "type": "bool" },
                        { "name": "gender", "type": "Gender" },
                        { "name": "nicknames", "type": "text", "shape": "list" },
                        { "name": "address", "type": "Address" },
                        { "name": "location", "type": "Location", "reference": true },
                        { "name": "physicalAttributes", "type": "text", "shape": "map" }
                    ] }
                ]
            }"#,
        )
        .unwrap();
        TypeRegistry::from_schema(&schema).unwrap()
    }

    #[test]
    fn document_to_object() {
        let registry = registry();
        let doc = json!({
            "id": "1",
            "age": "20",
            "alive": true,
            "gender": "MALE",
            "nicknames": ["dragon reborn"],
            "address": { "_class": "AddressWithPostcode", "postcode": "1234" },
            "location": "tr",
            "physicalAttributes": { "hair-color": "red" }
        });

        let object = to_object(&registry, &doc, "Person").unwrap();
        assert_eq!(object.get("age"), Some(&Value::Integer(20)));
        assert_eq!(object.get("alive"), Some(&Value::Bool(true)));
        assert_eq!(object.get("gender"), Some(&Value::Enum("MALE".into())));
        assert_eq!(
            object.get("address").and_then(Value::as_object).map(Object::type_name),
            Some("AddressWithPostcode")
        );
        assert_eq!(
            object.get("location"),
            Some(&Value::Object(Object::new("Location").with("id", "tr")))
        );
        assert_eq!(object.get("physicalAttributes").and_then(|m| m.get("hair-color")), Some(&Value::from("red")));
    }

    #[test]
    fn unknown_enum_variant_is_conversion_error() {
        let result = to_object(&registry(), &json!({ "gender": "DRAGON" }), "Person");
        assert!(matches!(result, Err(CoreError::Conversion { path, .. }) if path == "gender"));
    }

    #[test]
    fn unassignable_hint_is_rejected() {
        let doc = json!({ "address": { "_class": "Person" } });
        assert!(matches!(
            to_object(&registry(), &doc, "Person"),
            Err(CoreError::TypeResolution { .. })
        ));
    }

    #[test]
    fn object_to_json_carries_class() {
        let object = Object::new("Person")
            .with("id", "1")
            .with("nicknames", Value::List(vec!["lews therin".into()]));
        assert_eq!(
            to_json(&Value::Object(object)),
            json!({ "_class": "Person", "id": "1", "nicknames": ["lews therin"] })
        );
    }

    #[test]
    fn flat_record_from_json() {
        let record = record_from_json(&json!({ "_class": "Person", "age": 20, "alive": true })).unwrap();
        assert_eq!(record.get("age"), Some(&b"20"[..]));
        assert_eq!(record.get("alive"), Some(&b"true"[..]));
        assert!(record_from_json(&json!({ "nested": { "a": 1 } })).is_err());
    }
}
