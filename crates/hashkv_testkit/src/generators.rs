//! Property-based test generators using proptest.
//!
//! Strategies produce `Person` graphs (see [`crate::fixtures`]) that survive
//! a write/read cycle unchanged: no references, no empty text, no empty
//! collections or maps, and every nested object carries at least one field.

use chrono::DateTime;
use hashkv_codec::{Object, Value};
use proptest::prelude::*;

/// Strategy for non-empty text without leading or trailing blanks.
pub fn text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z]([a-z' ]{0,14}[a-z])?").expect("Invalid regex")
}

/// Strategy for map keys. Keys never contain `]`.
pub fn map_key_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9-]{0,11}").expect("Invalid regex")
}

/// Strategy for entity ids.
pub fn id_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z0-9]{1,12}").expect("Invalid regex")
}

/// Strategy for `Gender` values.
pub fn gender_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![Just("MALE"), Just("FEMALE")].prop_map(|g| Value::Enum(g.to_string()))
}

/// Strategy for dates between 1906 and 2096, at millisecond precision.
pub fn date_strategy() -> impl Strategy<Value = Value> {
    (-2_000_000_000_000i64..4_000_000_000_000i64)
        .prop_map(|millis| DateTime::from_timestamp_millis(millis).map_or(Value::Null, Value::Date))
}

/// Strategy for `Address` and `AddressWithPostcode` objects.
pub fn address_strategy() -> impl Strategy<Value = Object> {
    (
        text_strategy(),
        prop::option::of(text_strategy()),
        prop::option::of(prop::string::string_regex("[0-9]{4}").expect("Invalid regex")),
    )
        .prop_map(|(city, country, postcode)| {
            let type_name = if postcode.is_some() {
                "AddressWithPostcode"
            } else {
                "Address"
            };
            let mut address = Object::new(type_name).with("city", city);
            set_some(&mut address, "country", country);
            set_some(&mut address, "postcode", postcode);
            address
        })
}

/// Strategy for `float32` values, as they read back from a record.
pub fn float32_strategy() -> impl Strategy<Value = Value> {
    (-1.0e6f32..1.0e6f32).prop_map(|f| Value::Float(f.to_string().parse().unwrap_or(f64::from(f))))
}

/// Strategy for `Measurements` objects. `height` is always set.
pub fn measurements_strategy() -> impl Strategy<Value = Object> {
    (
        any::<i16>(),
        prop::option::of(any::<i8>()),
        prop::option::of(any::<i64>()),
        prop::option::of(float32_strategy()),
        prop::option::of(-1.0e9f64..1.0e9f64),
        prop::option::of(prop::collection::vec(any::<u8>(), 1..16)),
        prop::collection::vec(float32_strategy(), 0..4),
        prop::collection::btree_map(any::<i16>(), float32_strategy(), 0..4),
    )
        .prop_map(
            |(height, shoe_size, heartbeats, weight, body_fat, signature, splits, laps)| {
                let mut measurements =
                    Object::new("Measurements").with("height", i64::from(height));
                set_some(&mut measurements, "shoeSize", shoe_size.map(i64::from));
                set_some(&mut measurements, "heartbeats", heartbeats);
                set_some(&mut measurements, "weight", weight);
                set_some(&mut measurements, "bodyFat", body_fat);
                set_some(&mut measurements, "signature", signature);
                if !splits.is_empty() {
                    measurements.set("splits", Value::List(splits));
                }
                if !laps.is_empty() {
                    measurements.set(
                        "laps",
                        Value::Map(
                            laps.into_iter()
                                .map(|(k, v)| (Value::Integer(i64::from(k)), v))
                                .collect(),
                        ),
                    );
                }
                measurements
            },
        )
}

/// Strategy for `Person` and `TaVeren` objects without nested persons.
pub fn leaf_person_strategy() -> impl Strategy<Value = Object> {
    (
        prop::bool::ANY,
        prop::option::of(id_strategy()),
        text_strategy(),
        prop::option::of(text_strategy()),
        prop::option::of(gender_strategy()),
        prop::option::of(any::<i32>()),
        prop::option::of(any::<bool>()),
        prop::option::of(date_strategy()),
        prop::collection::vec(text_strategy(), 0..4),
        prop::option::of(address_strategy()),
        prop::collection::btree_map(map_key_strategy(), text_strategy(), 0..4),
        prop::option::of(text_strategy()),
    )
        .prop_map(
            |(
                taveren,
                id,
                firstname,
                lastname,
                gender,
                age,
                alive,
                birthdate,
                nicknames,
                address,
                attributes,
                feature,
            )| {
                let type_name = if taveren { "TaVeren" } else { "Person" };
                let mut person = Object::new(type_name).with("firstname", firstname);
                set_some(&mut person, "id", id);
                set_some(&mut person, "lastname", lastname);
                set_some(&mut person, "gender", gender);
                set_some(&mut person, "age", age);
                set_some(&mut person, "alive", alive);
                set_some(&mut person, "birthdate", birthdate);
                set_some(&mut person, "address", address);
                if !nicknames.is_empty() {
                    person.set(
                        "nicknames",
                        Value::List(nicknames.into_iter().map(Value::Text).collect()),
                    );
                }
                if !attributes.is_empty() {
                    person.set(
                        "physicalAttributes",
                        Value::Map(
                            attributes
                                .into_iter()
                                .map(|(k, v)| (Value::Text(k), Value::Text(v)))
                                .collect(),
                        ),
                    );
                }
                if taveren {
                    set_some(&mut person, "feature", feature);
                }
                person
            },
        )
}

/// Strategy for a root `Person` (or `TaVeren`) with an id, measurements,
/// coworkers and relatives.
pub fn person_graph_strategy() -> impl Strategy<Value = Object> {
    (
        leaf_person_strategy(),
        id_strategy(),
        prop::option::of(measurements_strategy()),
        prop::collection::vec(leaf_person_strategy(), 0..3),
        prop::collection::btree_map(map_key_strategy(), leaf_person_strategy(), 0..3),
    )
        .prop_map(|(mut root, id, measurements, coworkers, relatives)| {
            root.set("id", id);
            set_some(&mut root, "measurements", measurements);
            if !coworkers.is_empty() {
                root.set(
                    "coworkers",
                    Value::List(coworkers.into_iter().map(Value::Object).collect()),
                );
            }
            if !relatives.is_empty() {
                root.set(
                    "relatives",
                    Value::Map(
                        relatives
                            .into_iter()
                            .map(|(k, v)| (Value::Text(k), Value::Object(v)))
                            .collect(),
                    ),
                );
            }
            root
        })
}

fn set_some<T: Into<Value>>(object: &mut Object, name: &str, value: Option<T>) {
    if let Some(value) = value {
        object.set(name, value);
    }
}

/// Configuration for property tests.
#[derive(Debug, Clone, Copy)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn text_is_trimmed_and_non_empty(text in text_strategy()) {
            prop_assert!(!text.is_empty());
            prop_assert_eq!(text.trim(), text.as_str());
        }

        #[test]
        fn map_keys_have_no_brackets(key in map_key_strategy()) {
            prop_assert!(!key.contains(']'));
        }

        #[test]
        fn float32_values_are_exact_in_f32(value in float32_strategy()) {
            let Value::Float(f) = value else {
                return Err(TestCaseError::fail("float32 strategy produced a non-float"));
            };
            prop_assert_eq!((f as f32).to_string().parse::<f64>().unwrap(), f);
        }

        #[test]
        fn graphs_have_root_ids(person in person_graph_strategy()) {
            prop_assert!(person.get("id").is_some());
            prop_assert!(person.get("firstname").is_some());
        }
    }
}
