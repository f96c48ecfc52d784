//! Conversion scenarios over the `Person` domain.

use hashkv_codec::{Object, Value};
use hashkv_core::{ConverterConfig, CoreError, FlatRecord, IndexDefinition};
use hashkv_testkit::prelude::*;
use std::sync::Arc;

fn read_person(record: &FlatRecord) -> Object {
    converter()
        .read("Person", record)
        .unwrap()
        .expect("record should not be empty")
}

// ============================================================================
// Writing
// ============================================================================

#[test]
fn write_simple_person() {
    let record = converter().write(&rand()).unwrap();

    assert_eq!(record.keyspace(), Some("persons"));
    assert_eq!(record.id(), Some("1"));
    assert_eq!(record.root_key().as_deref(), Some("persons:1"));
    assert_eq!(record.get("_class"), Some(&b"Person"[..]));
    assert_eq!(record.get("id"), Some(&b"1"[..]));
    assert_eq!(record.get("firstname"), Some(&b"rand"[..]));
    assert_eq!(record.get("lastname"), Some(&b"al'thor"[..]));
    assert_eq!(record.len(), 4);
}

#[test]
fn write_scalar_collection() {
    let person = rand().with("nicknames", list(["dragon reborn", "lews therin"]));
    let record = converter().write(&person).unwrap();

    assert_eq!(record.get("nicknames.[0]"), Some(&b"dragon reborn"[..]));
    assert_eq!(record.get("nicknames.[1]"), Some(&b"lews therin"[..]));
    assert!(!record.contains_key("nicknames"));
}

#[test]
fn write_scalar_map() {
    let person = rand().with("physicalAttributes", text_map([("hair-color", "red")]));
    let record = converter().write(&person).unwrap();

    assert_eq!(record.get("physicalAttributes.[hair-color]"), Some(&b"red"[..]));
}

#[test]
fn write_scalars_with_wire_encodings() {
    let person = rand()
        .with("gender", Value::Enum("MALE".into()))
        .with("age", 24)
        .with("alive", true)
        .with("birthdate", birthdate());
    let record = converter().write(&person).unwrap();

    assert_eq!(record.get("gender"), Some(&b"MALE"[..]));
    assert_eq!(record.get("age"), Some(&b"24"[..]));
    assert_eq!(record.get("alive"), Some(&b"1"[..]));
    assert_eq!(record.get("birthdate"), Some(&b"280837800000"[..]));

    let dead = converter().write(&rand().with("alive", false)).unwrap();
    assert_eq!(dead.get("alive"), Some(&b"0"[..]));
}

#[test]
fn write_numeric_and_byte_scalars() {
    let person = rand().with("measurements", measurements());
    let record = converter().write(&person).unwrap();

    assert_eq!(record.get("measurements.height"), Some(&b"183"[..]));
    assert_eq!(record.get("measurements.shoeSize"), Some(&b"45"[..]));
    assert_eq!(record.get("measurements.heartbeats"), Some(&b"3000000000"[..]));
    assert_eq!(record.get("measurements.weight"), Some(&b"84.5"[..]));
    assert_eq!(record.get("measurements.bodyFat"), Some(&b"0.125"[..]));
    assert_eq!(record.get("measurements.signature"), Some(&[0u8, 159, 146, 150][..]));
    assert_eq!(record.get("measurements.splits.[1]"), Some(&b"59.5"[..]));
    assert_eq!(record.get("measurements.laps.[-2]"), Some(&b"0.5"[..]));
    assert!(!record.contains_key("measurements._class"));

    assert_eq!(read_person(&record), person);
}

#[test]
fn float32_keeps_single_precision() {
    let person = rand().with(
        "measurements",
        Object::new("Measurements")
            .with("weight", 0.1)
            .with("bodyFat", 0.1)
            .with("splits", list([0.123_456_789])),
    );
    let record = converter().write(&person).unwrap();

    assert_eq!(record.get("measurements.weight"), Some(&b"0.1"[..]));
    assert_eq!(record.get("measurements.splits.[0]"), Some(&b"0.12345679"[..]));

    let measurements = match read_person(&record).get("measurements") {
        Some(Value::Object(m)) => m.clone(),
        other => panic!("unexpected measurements: {other:?}"),
    };
    assert_eq!(measurements.get("weight"), Some(&Value::Float(0.1)));
    assert_eq!(measurements.get("bodyFat"), Some(&Value::Float(0.1)));
    assert_eq!(measurements.get("splits"), Some(&list([0.123_456_79])));
}

#[test]
fn write_rejects_values_that_do_not_fit_the_declared_type() {
    let cases = [
        (rand().with("age", "old"), "age"),
        (rand().with("gender", Value::Enum("PURPLE".into())), "gender"),
        (rand().with("alive", 1), "alive"),
        (rand().with("birthdate", 280_837_800_000i64), "birthdate"),
        (
            rand().with("measurements", Object::new("Measurements").with("shoeSize", 300)),
            "measurements.shoeSize",
        ),
        (
            rand().with("measurements", Object::new("Measurements").with("weight", 1e39)),
            "measurements.weight",
        ),
        (
            rand().with("coworkers", list([egwene().with("age", i64::MAX)])),
            "coworkers.[0].age",
        ),
        (
            rand().with(
                "measurements",
                Object::new("Measurements")
                    .with("laps", Value::Map(vec![(Value::from("first"), Value::Float(1.0))])),
            ),
            "measurements.laps",
        ),
    ];

    for (person, expected) in cases {
        match converter().write(&person) {
            Err(CoreError::Conversion { path, .. }) => assert_eq!(path, expected),
            other => panic!("{expected}: unexpected {other:?}"),
        }
    }
}

#[test]
fn enum_given_as_text_is_written_as_variant() {
    let record = converter().write(&rand().with("gender", "FEMALE")).unwrap();
    assert_eq!(record.get("gender"), Some(&b"FEMALE"[..]));
    assert_eq!(
        read_person(&record).get("gender"),
        Some(&Value::Enum("FEMALE".into()))
    );
}

#[test]
fn write_nested_entity_of_declared_type_has_no_hint() {
    let person = rand().with("address", address("two rivers", "andor"));
    let record = converter().write(&person).unwrap();

    assert_eq!(record.get("address.city"), Some(&b"two rivers"[..]));
    assert_eq!(record.get("address.country"), Some(&b"andor"[..]));
    assert!(!record.contains_key("address._class"));
}

#[test]
fn write_nested_subtype_carries_hint() {
    let person = rand().with("address", address_with_postcode("two rivers", "andor", "1234"));
    let record = converter().write(&person).unwrap();

    assert_eq!(record.get("address._class"), Some(&b"AddressWithPostcode"[..]));
    assert_eq!(record.get("address.postcode"), Some(&b"1234"[..]));
}

#[test]
fn write_entity_collection_hints_only_subtypes() {
    let person = rand().with("coworkers", list([egwene(), mat()]));
    let record = converter().write(&person).unwrap();

    assert_eq!(record.get("coworkers.[0].firstname"), Some(&b"egwene"[..]));
    assert!(!record.contains_key("coworkers.[0]._class"));
    assert_eq!(record.get("coworkers.[1]._class"), Some(&b"TaVeren"[..]));
    assert_eq!(record.get("coworkers.[1].feature"), Some(&b"foxhead medallion"[..]));
    // Nested entities never set the record id.
    assert_eq!(record.id(), Some("1"));
}

#[test]
fn write_entity_map() {
    let person = rand().with("relatives", text_map([("father", person("4", "tam"))]));
    let record = converter().write(&person).unwrap();

    assert_eq!(record.get("relatives.[father].id"), Some(&b"4"[..]));
    assert_eq!(record.get("relatives.[father].firstname"), Some(&b"tam"[..]));
}

#[test]
fn write_deeply_nested_paths() {
    let coworker = egwene()
        .with("address", address("emond's field", "andor"))
        .with("nicknames", list(["the amyrlin"]));
    let record = converter()
        .write(&rand().with("coworkers", list([coworker])))
        .unwrap();

    assert_eq!(record.get("coworkers.[0].address.city"), Some(&b"emond's field"[..]));
    assert_eq!(record.get("coworkers.[0].nicknames.[0]"), Some(&b"the amyrlin"[..]));
}

#[test]
fn absent_values_write_nothing() {
    let person = rand()
        .with("lastname", Value::Null)
        .with("nicknames", list(Vec::<Value>::new()))
        .with("physicalAttributes", text_map(Vec::<(String, Value)>::new()))
        .with("coworkers", list([Value::Null]))
        .with("address", Value::Null);
    let record = converter().write(&person).unwrap();

    let keys: Vec<&str> = record.entries().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["_class", "id", "firstname"]);
}

#[test]
fn empty_text_writes_nothing() {
    let record = converter().write(&rand().with("lastname", "")).unwrap();
    assert!(!record.contains_key("lastname"));
}

#[test]
fn write_reference_as_pointer() {
    let person = rand().with("location", location("1", "tar valon"));
    let record = converter().write(&person).unwrap();

    assert_eq!(record.get("location"), Some(&b"locations:1"[..]));
    assert!(record.entries_with_prefix("location.").next().is_none());
}

#[test]
fn write_reference_collection() {
    let person = rand().with(
        "visited",
        list([location("1", "tar valon"), location("2", "caemlyn")]),
    );
    let record = converter().write(&person).unwrap();

    assert_eq!(record.get("visited.[0]"), Some(&b"locations:1"[..]));
    assert_eq!(record.get("visited.[1]"), Some(&b"locations:2"[..]));
}

#[test]
fn write_reference_without_id_fails() {
    let person = rand().with("location", Object::new("Location").with("name", "tar valon"));
    let result = converter().write(&person);
    assert!(matches!(result, Err(CoreError::MissingId { type_name }) if type_name == "Location"));
}

#[test]
fn write_unassignable_nested_type_fails() {
    let person = rand().with("address", location("1", "tar valon"));
    assert!(matches!(
        converter().write(&person),
        Err(CoreError::UnsupportedDescriptor { path, .. }) if path == "address"
    ));
}

#[test]
fn write_unknown_type_fails() {
    let result = converter().write(&Object::new("Trolloc"));
    assert!(matches!(result, Err(CoreError::UnknownType { type_name }) if type_name == "Trolloc"));
}

// ============================================================================
// Reading
// ============================================================================

#[test]
fn read_simple_person() {
    let record = FlatRecord::from_string_map([
        ("_class", "Person"),
        ("id", "1"),
        ("firstname", "rand"),
        ("lastname", "al'thor"),
    ]);
    assert_eq!(read_person(&record), rand());
}

#[test]
fn read_scalar_wire_forms() {
    let record = FlatRecord::from_string_map([
        ("_class", "Person"),
        ("gender", "MALE"),
        ("age", "24"),
        ("alive", "1"),
        ("birthdate", "280837800000"),
    ]);
    let person = read_person(&record);

    assert_eq!(person.get("gender"), Some(&Value::Enum("MALE".into())));
    assert_eq!(person.get("age"), Some(&Value::Integer(24)));
    assert_eq!(person.get("alive"), Some(&Value::Bool(true)));
    assert_eq!(person.get("birthdate"), Some(&Value::Date(birthdate())));
}

#[test]
fn read_date_from_text_layout() {
    let record = FlatRecord::from_string_map([("birthdate", "1978-11-25 10:30:00")]);
    assert_eq!(
        read_person(&record).get("birthdate"),
        Some(&Value::Date(birthdate()))
    );
}

#[test]
fn read_collection_in_index_order() {
    let record = FlatRecord::from_string_map([
        ("nicknames.[1]", "lews therin"),
        ("nicknames.[0]", "dragon reborn"),
    ]);
    assert_eq!(
        read_person(&record).get("nicknames"),
        Some(&list(["dragon reborn", "lews therin"]))
    );
}

#[test]
fn read_collection_orders_indexes_numerically() {
    let entries: Vec<(String, String)> = (0..12)
        .rev()
        .map(|i| (format!("nicknames.[{i}]"), format!("n{i}")))
        .collect();
    let record = FlatRecord::from_string_map(entries);

    let expected = list((0..12).map(|i| format!("n{i}")));
    assert_eq!(read_person(&record).get("nicknames"), Some(&expected));
}

#[test]
fn read_scalar_map() {
    let record = FlatRecord::from_string_map([("physicalAttributes.[hair-color]", "red")]);
    assert_eq!(
        read_person(&record).get("physicalAttributes"),
        Some(&text_map([("hair-color", "red")]))
    );
}

#[test]
fn read_nested_subtype_from_hint() {
    let record = FlatRecord::from_string_map([
        ("_class", "Person"),
        ("address._class", "AddressWithPostcode"),
        ("address.city", "two rivers"),
        ("address.postcode", "1234"),
    ]);
    let person = read_person(&record);

    let address = person.get("address").and_then(Value::as_object).unwrap();
    assert_eq!(address.type_name(), "AddressWithPostcode");
    assert_eq!(address.get("city"), Some(&Value::from("two rivers")));
    assert_eq!(address.get("postcode"), Some(&Value::from("1234")));
}

#[test]
fn read_root_subtype_from_hint() {
    let record = converter().write(&mat()).unwrap();
    let read = read_person(&record);
    assert_eq!(read.type_name(), "TaVeren");
    assert_eq!(read, mat());
}

#[test]
fn read_entity_collection_and_map() {
    let person = rand()
        .with("coworkers", list([egwene(), mat()]))
        .with("relatives", text_map([("father", person("4", "tam"))]));
    let record = converter().write(&person).unwrap();

    assert_eq!(read_person(&record), person);
}

#[test]
fn read_empty_record_is_none() {
    assert_eq!(converter().read("Person", &FlatRecord::new()).unwrap(), None);
}

#[test]
fn read_hint_for_unknown_type_fails() {
    let record = FlatRecord::from_string_map([("address._class", "Trolloc"), ("address.city", "x")]);
    assert!(matches!(
        converter().read("Person", &record),
        Err(CoreError::TypeResolution { type_name, path }) if type_name == "Trolloc" && path == "address._class"
    ));
}

#[test]
fn read_hint_for_unassignable_type_fails() {
    let record = FlatRecord::from_string_map([("address._class", "Location"), ("address.name", "x")]);
    assert!(matches!(
        converter().read("Person", &record),
        Err(CoreError::TypeResolution { type_name, .. }) if type_name == "Location"
    ));
}

#[test]
fn read_undecodable_leaf_reports_path_and_raw() {
    let record = FlatRecord::from_string_map([("coworkers.[0].gender", "DRAGON")]);
    match converter().read("Person", &record) {
        Err(CoreError::Conversion { path, raw, .. }) => {
            assert_eq!(path, "coworkers.[0].gender");
            assert_eq!(raw, "DRAGON");
        }
        other => panic!("expected a conversion error, got {other:?}"),
    }
}

#[test]
fn read_ignores_unknown_keys() {
    let record = FlatRecord::from_string_map([("id", "1"), ("firstname", "rand"), ("horn", "valere")]);
    assert_eq!(read_person(&record), person("1", "rand"));
}

// ============================================================================
// References
// ============================================================================

#[test]
fn reference_resolved_exactly_once() {
    let resolver = Arc::new(RecordingResolver::new().with("locations", "1", location("1", "tar valon")));
    let converter = converter_with_resolver(resolver.clone());
    let record = FlatRecord::from_string_map([("id", "1"), ("location", "locations:1")]);

    let person = converter.read("Person", &record).unwrap().unwrap();

    assert_eq!(person.get("location"), Some(&Value::Object(location("1", "tar valon"))));
    assert_eq!(
        resolver.calls(),
        vec![ResolveCall {
            id: "1".into(),
            keyspace: "locations".into(),
            type_name: "Location".into(),
        }]
    );
}

#[test]
fn unresolved_reference_is_left_unset() {
    let resolver = Arc::new(RecordingResolver::new());
    let converter = converter_with_resolver(resolver.clone());
    let record = FlatRecord::from_string_map([("id", "1"), ("location", "locations:404")]);

    let person = converter.read("Person", &record).unwrap().unwrap();

    assert_eq!(person.get("location"), None);
    assert_eq!(resolver.call_count(), 1);
}

#[test]
fn reference_collection_skips_unresolved_elements() {
    let resolver = Arc::new(RecordingResolver::new().with("locations", "2", location("2", "caemlyn")));
    let converter = converter_with_resolver(resolver.clone());
    let record = FlatRecord::from_string_map([
        ("visited.[0]", "locations:1"),
        ("visited.[1]", "locations:2"),
    ]);

    let person = converter.read("Person", &record).unwrap().unwrap();

    assert_eq!(person.get("visited"), Some(&list([location("2", "caemlyn")])));
    assert_eq!(resolver.call_count(), 2);
}

#[test]
fn malformed_pointer_fails() {
    let record = FlatRecord::from_string_map([("location", "tar valon")]);
    assert!(matches!(
        converter().read("Person", &record),
        Err(CoreError::InvalidReference { path, pointer }) if path == "location" && pointer == "tar valon"
    ));
}

#[test]
fn references_round_trip_through_resolver() {
    let tar_valon = location("1", "tar valon");
    let resolver = Arc::new(RecordingResolver::new().with("locations", "1", tar_valon.clone()));
    let converter = converter_with_resolver(resolver);

    let person = rand().with("location", tar_valon);
    let record = converter.write(&person).unwrap();
    assert_eq!(converter.read("Person", &record).unwrap(), Some(person));
}

// ============================================================================
// Indexes
// ============================================================================

#[test]
fn annotated_property_emits_fragment_and_registers_index() {
    let converter = converter();
    assert!(converter.index_configuration().is_empty());

    let record = converter.write(&rand()).unwrap();

    assert_eq!(record.index_fragments().collect::<Vec<_>>(), vec!["firstname:rand"]);
    assert_eq!(record.index_keys(), vec!["persons.firstname:rand"]);
    assert!(converter.index_configuration().has_index_for("persons", "firstname"));
    assert_eq!(converter.index_configuration().len(), 1);

    converter.write(&egwene()).unwrap();
    assert_eq!(converter.index_configuration().len(), 1);
}

#[test]
fn configured_index_emits_fragment() {
    let config = ConverterConfig::new().index(IndexDefinition::simple("persons", "age"));
    let converter = converter_with_config(&config);

    let record = converter.write(&rand().with("age", 20)).unwrap();

    let fragments: Vec<&str> = record.index_fragments().collect();
    assert!(fragments.contains(&"age:20"));
    assert!(fragments.contains(&"firstname:rand"));
}

#[test]
fn indexed_id_emits_fragment() {
    let config = ConverterConfig::new().index(IndexDefinition::simple("persons", "id"));
    let converter = converter_with_config(&config);

    let record = converter.write(&rand()).unwrap();

    assert_eq!(record.id(), Some("1"));
    assert!(record.index_keys().contains(&"persons.id:1".to_string()));
}

#[test]
fn nested_properties_index_under_root_keyspace() {
    let config = ConverterConfig::new().index(IndexDefinition::simple("persons", "city"));
    let converter = converter_with_config(&config);

    let person = rand().with("address", address("two rivers", "andor"));
    let record = converter.write(&person).unwrap();

    assert!(record.index_keys().contains(&"persons.city:two rivers".to_string()));
}

#[test]
fn unindexed_values_emit_no_fragments() {
    let record = converter()
        .write(&Object::new("Person").with("id", "1").with("age", 20))
        .unwrap();
    assert_eq!(record.index_fragments().count(), 0);
}

#[test]
fn lazy_registration_is_safe_across_threads() {
    let converter = Arc::new(converter());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let converter = Arc::clone(&converter);
            std::thread::spawn(move || {
                let record = converter
                    .write(&person(&i.to_string(), &format!("person{i}")))
                    .unwrap();
                record.index_keys()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), vec![format!("persons.firstname:person{i}")]);
    }
    assert_eq!(converter.index_configuration().definitions_for("persons").len(), 1);
}
