//! Scalar encoder.

use crate::error::{CodecError, CodecResult};
use crate::scalar::ScalarType;
use crate::value::Value;

/// Wire form of `true`.
pub const TRUE_BYTES: &[u8] = b"1";
/// Wire form of `false`.
pub const FALSE_BYTES: &[u8] = b"0";

/// Encode a scalar value to its canonical byte form.
///
/// - Text is stored as UTF-8, bytes pass through unchanged
/// - Numbers use their decimal string form
/// - Booleans become `"1"` / `"0"`
/// - Enums use the variant name
/// - Dates become decimal milliseconds since the Unix epoch
///
/// `Null` encodes to an empty byte sequence, which the flat record treats as
/// "no value".
///
/// # Errors
///
/// Returns [`CodecError::NotScalar`] for lists, maps and objects.
pub fn to_bytes(value: &Value) -> CodecResult<Vec<u8>> {
    match value {
        Value::Bytes(b) => Ok(b.clone()),
        Value::Bool(true) => Ok(TRUE_BYTES.to_vec()),
        Value::Bool(false) => Ok(FALSE_BYTES.to_vec()),
        other => to_text(other).map(String::into_bytes),
    }
}

/// Encode a scalar value as the declared type `ty`.
///
/// Unlike [`to_bytes`], the value must fit the declared type, so whatever
/// this returns decodes with [`from_bytes`](crate::from_bytes) against the
/// same type:
///
/// - integer types take an integer within their range
/// - float types take a float or an integer; `float32` values are narrowed
///   to 32-bit precision and written in their shortest form
/// - `bytes` takes raw bytes or text
/// - enums take a variant name (as an enum or as text) that the type declares
/// - every other type takes only its own kind
///
/// `Null` encodes to an empty byte sequence.
///
/// # Errors
///
/// Returns [`CodecError::Conversion`] if the value does not fit `ty`, and
/// [`CodecError::NotScalar`] for lists, maps and objects.
pub fn to_bytes_as(value: &Value, ty: &ScalarType) -> CodecResult<Vec<u8>> {
    if !value.is_scalar() {
        return match value {
            Value::Null => Ok(Vec::new()),
            other => Err(CodecError::not_scalar(other.kind())),
        };
    }

    let mismatch = |message: String| -> CodecResult<Vec<u8>> {
        Err(CodecError::conversion(ty.name(), &to_bytes(value)?, message))
    };

    match (ty, value) {
        (ScalarType::Text, Value::Text(_))
        | (ScalarType::Bool, Value::Bool(_))
        | (ScalarType::Date, Value::Date(_))
        | (ScalarType::Float64, Value::Float(_) | Value::Integer(_))
        | (ScalarType::Bytes, Value::Bytes(_) | Value::Text(_)) => to_bytes(value),
        (ScalarType::Int8, Value::Integer(n)) => in_range::<i8>(*n, ty),
        (ScalarType::Int16, Value::Integer(n)) => in_range::<i16>(*n, ty),
        (ScalarType::Int32, Value::Integer(n)) => in_range::<i32>(*n, ty),
        (ScalarType::Int64, Value::Integer(n)) => Ok(n.to_string().into_bytes()),
        (ScalarType::Float32, Value::Float(f)) => narrow(*f, ty),
        (ScalarType::Float32, Value::Integer(n)) => narrow(*n as f64, ty),
        (ScalarType::Enum(enum_type), Value::Enum(name) | Value::Text(name)) => {
            match enum_type.variant(name) {
                Some(variant) => Ok(variant.as_bytes().to_vec()),
                None => mismatch(format!("{name} is not a variant of {}", enum_type.name)),
            }
        }
        (_, other) => mismatch(format!("a {} value does not fit {}", other.kind(), ty.name())),
    }
}

fn in_range<T>(n: i64, ty: &ScalarType) -> CodecResult<Vec<u8>>
where
    T: TryFrom<i64>,
{
    match T::try_from(n) {
        Ok(_) => Ok(n.to_string().into_bytes()),
        Err(_) => Err(CodecError::conversion(
            ty.name(),
            n.to_string().as_bytes(),
            "out of range",
        )),
    }
}

/// Narrows to `f32` and writes the shortest text that reads back as that `f32`.
fn narrow(f: f64, ty: &ScalarType) -> CodecResult<Vec<u8>> {
    if f.is_finite() && f.abs() > f64::from(f32::MAX) {
        return Err(CodecError::conversion(
            ty.name(),
            f.to_string().as_bytes(),
            "out of range",
        ));
    }
    Ok((f as f32).to_string().into_bytes())
}

/// Encode a scalar value to its canonical string form.
///
/// This is the form used for map key segments and index fragments. Raw
/// bytes are rendered lossily as UTF-8.
///
/// # Errors
///
/// Returns [`CodecError::NotScalar`] for lists, maps and objects.
pub fn to_text(value: &Value) -> CodecResult<String> {
    match value {
        Value::Null => Ok(String::new()),
        Value::Bool(b) => Ok(if *b { "1" } else { "0" }.to_string()),
        Value::Integer(n) => Ok(n.to_string()),
        Value::Float(n) => Ok(n.to_string()),
        Value::Text(s) => Ok(s.clone()),
        Value::Bytes(b) => Ok(String::from_utf8_lossy(b).into_owned()),
        Value::Enum(name) => Ok(name.clone()),
        Value::Date(date) => Ok(date.timestamp_millis().to_string()),
        Value::List(_) | Value::Map(_) | Value::Object(_) => {
            Err(CodecError::not_scalar(value.kind()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Object;
    use chrono::{TimeZone, Utc};

    #[test]
    fn encode_null_is_empty() {
        assert_eq!(to_bytes(&Value::Null).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn encode_text() {
        assert_eq!(to_bytes(&Value::from("nynaeve")).unwrap(), b"nynaeve");
        assert_eq!(to_bytes(&Value::from("")).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn encode_integers() {
        assert_eq!(to_bytes(&Value::Integer(20)).unwrap(), b"20");
        assert_eq!(to_bytes(&Value::Integer(-7)).unwrap(), b"-7");
        assert_eq!(
            to_bytes(&Value::Integer(i64::MAX)).unwrap(),
            b"9223372036854775807"
        );
    }

    #[test]
    fn encode_floats() {
        assert_eq!(to_bytes(&Value::Float(1.5)).unwrap(), b"1.5");
        assert_eq!(to_bytes(&Value::Float(-0.25)).unwrap(), b"-0.25");
    }

    #[test]
    fn encode_bool() {
        assert_eq!(to_bytes(&Value::Bool(true)).unwrap(), b"1");
        assert_eq!(to_bytes(&Value::Bool(false)).unwrap(), b"0");
    }

    #[test]
    fn encode_enum_uses_variant_name() {
        assert_eq!(to_bytes(&Value::Enum("MALE".into())).unwrap(), b"MALE");
    }

    #[test]
    fn encode_date_as_epoch_millis() {
        let date = Utc.with_ymd_and_hms(1978, 11, 25, 0, 0, 0).unwrap();
        assert_eq!(
            to_bytes(&Value::Date(date)).unwrap(),
            date.timestamp_millis().to_string().into_bytes()
        );
        assert_eq!(to_text(&Value::Date(date)).unwrap(), "280800000000");
    }

    #[test]
    fn encode_bytes_is_identity() {
        let raw = vec![0u8, 159, 146, 150];
        assert_eq!(to_bytes(&Value::Bytes(raw.clone())).unwrap(), raw);
    }

    #[test]
    fn typed_encoding_accepts_matching_kinds() {
        let gender = ScalarType::enumeration("Gender", ["MALE", "FEMALE"]);
        assert_eq!(to_bytes_as(&Value::Integer(-128), &ScalarType::Int8).unwrap(), b"-128");
        assert_eq!(to_bytes_as(&Value::Integer(7), &ScalarType::Float64).unwrap(), b"7");
        assert_eq!(to_bytes_as(&Value::from("raw"), &ScalarType::Bytes).unwrap(), b"raw");
        assert_eq!(to_bytes_as(&Value::from("MALE"), &gender).unwrap(), b"MALE");
        assert_eq!(to_bytes_as(&Value::Bool(true), &ScalarType::Bool).unwrap(), b"1");
        assert_eq!(to_bytes_as(&Value::Null, &ScalarType::Int32).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn typed_encoding_rejects_mismatches() {
        let gender = ScalarType::enumeration("Gender", ["MALE", "FEMALE"]);
        let cases = [
            (Value::from("old"), ScalarType::Int32, "int32"),
            (Value::Integer(128), ScalarType::Int8, "int8"),
            (Value::Integer(i64::from(i32::MAX) + 1), ScalarType::Int32, "int32"),
            (Value::Integer(1), ScalarType::Date, "date"),
            (Value::Float(1.5), ScalarType::Int64, "int64"),
            (Value::Integer(1), ScalarType::Text, "text"),
            (Value::Enum("PURPLE".into()), gender, "Gender"),
            (Value::Float(1e39), ScalarType::Float32, "float32"),
        ];
        for (value, ty, expected) in cases {
            match to_bytes_as(&value, &ty) {
                Err(CodecError::Conversion { target, .. }) => assert_eq!(target, expected),
                other => panic!("{value:?} as {}: unexpected {other:?}", ty.name()),
            }
        }
        assert_eq!(
            to_bytes_as(&Value::List(vec![]), &ScalarType::Text),
            Err(CodecError::NotScalar { kind: "list" })
        );
    }

    #[test]
    fn float32_is_narrowed_to_shortest_form() {
        assert_eq!(to_bytes_as(&Value::Float(0.1), &ScalarType::Float32).unwrap(), b"0.1");
        assert_eq!(
            to_bytes_as(&Value::Float(0.123_456_789), &ScalarType::Float32).unwrap(),
            b"0.12345679"
        );
        assert_eq!(to_bytes_as(&Value::Float(0.1), &ScalarType::Float64).unwrap(), b"0.1");
    }

    #[test]
    fn composite_values_are_rejected() {
        assert_eq!(
            to_bytes(&Value::List(vec![])),
            Err(CodecError::NotScalar { kind: "list" })
        );
        assert_eq!(
            to_text(&Value::Object(Object::new("Address"))),
            Err(CodecError::NotScalar { kind: "object" })
        );
    }
}
