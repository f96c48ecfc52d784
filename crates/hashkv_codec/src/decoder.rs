//! Scalar decoder.

use crate::error::{CodecError, CodecResult};
use crate::scalar::ScalarType;
use crate::value::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Date text layouts accepted after the epoch-millis form fails, tried in order.
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%y %I:%M %p",
];

/// Decode bytes into a value of the declared scalar type.
///
/// Returns `Ok(None)` for empty input: an empty payload means "no value" for
/// every type, including booleans.
///
/// # Errors
///
/// Returns [`CodecError::Conversion`] if the bytes are not a valid
/// representation of `ty`.
pub fn from_bytes(bytes: &[u8], ty: &ScalarType) -> CodecResult<Option<Value>> {
    if bytes.is_empty() {
        return Ok(None);
    }

    let value = match ty {
        ScalarType::Bytes => Value::Bytes(bytes.to_vec()),
        _ => {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| CodecError::conversion(ty.name(), bytes, e.to_string()))?;
            decode_text(text, ty, bytes)?
        }
    };

    Ok(Some(value))
}

fn decode_text(text: &str, ty: &ScalarType, raw: &[u8]) -> CodecResult<Value> {
    let value = match ty {
        ScalarType::Text => Value::Text(text.to_string()),
        ScalarType::Int8 => Value::Integer(parse_int::<i8>(text, ty, raw)?),
        ScalarType::Int16 => Value::Integer(parse_int::<i16>(text, ty, raw)?),
        ScalarType::Int32 => Value::Integer(parse_int::<i32>(text, ty, raw)?),
        ScalarType::Int64 => Value::Integer(parse_int::<i64>(text, ty, raw)?),
        ScalarType::Float32 => {
            let n: f32 = text
                .trim()
                .parse()
                .map_err(|e: std::num::ParseFloatError| {
                    CodecError::conversion(ty.name(), raw, e.to_string())
                })?;
            // Widen through the shortest text so `0.1` reads back as `0.1`.
            Value::Float(n.to_string().parse().unwrap_or_else(|_| f64::from(n)))
        }
        ScalarType::Float64 => Value::Float(text.trim().parse().map_err(
            |e: std::num::ParseFloatError| CodecError::conversion(ty.name(), raw, e.to_string()),
        )?),
        ScalarType::Bool => Value::Bool(text == "1" || text.eq_ignore_ascii_case("true")),
        ScalarType::Enum(enum_type) => {
            let variant = enum_type.variant(text.trim()).ok_or_else(|| {
                CodecError::conversion(ty.name(), raw, "no variant with that name")
            })?;
            Value::Enum(variant.to_string())
        }
        ScalarType::Date => Value::Date(parse_date(text, raw)?),
        ScalarType::Bytes => Value::Bytes(raw.to_vec()),
    };
    Ok(value)
}

fn parse_int<T>(text: &str, ty: &ScalarType, raw: &[u8]) -> CodecResult<i64>
where
    T: std::str::FromStr<Err = std::num::ParseIntError> + Into<i64>,
{
    text.trim()
        .parse::<T>()
        .map(Into::into)
        .map_err(|e| CodecError::conversion(ty.name(), raw, e.to_string()))
}

/// Parses epoch milliseconds first, then falls back to date text.
fn parse_date(text: &str, raw: &[u8]) -> CodecResult<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(millis) = text.parse::<i64>() {
        return DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| CodecError::conversion("date", raw, "epoch millis out of range"));
    }

    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Ok(date.with_timezone(&Utc));
    }

    for format in DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Some(midnight) = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc());
    }

    Err(CodecError::conversion(
        "date",
        raw,
        "neither epoch millis nor a recognized date format",
    ))
}
