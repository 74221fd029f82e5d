//! Tolerant field decoders for vendor payloads.
//!
//! The vendor is not consistent about JSON types: ids arrive as numbers,
//! floats or numeric strings depending on the endpoint, and payloads are
//! sometimes `null` instead of absent.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

/// `null` decodes to `T::default()`.
///
/// # Errors
/// Whatever `T` fails with for a non-null value.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Integer from a number, an integral float or a numeric string; `null` and
/// `""` are zero.
///
/// # Errors
/// Fractional numbers, non-numeric strings and booleans.
pub fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(0),
        Some(Scalar::Int(v)) => Ok(v),
        // Display prints integral floats without a fraction, so `12.0` parses.
        Some(Scalar::Float(v)) => v
            .to_string()
            .parse()
            .map_err(|_| D::Error::custom(format!("expected an integer, got {v}"))),
        Some(Scalar::Text(s)) if s.trim().is_empty() => Ok(0),
        Some(Scalar::Text(s)) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("expected an integer, got \"{s}\""))),
        Some(Scalar::Bool(b)) => Err(D::Error::custom(format!(
            "expected an integer, got {b}"
        ))),
    }
}

/// String from a string or any scalar; `null` is empty.
///
/// # Errors
/// Arrays and objects.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        None => String::new(),
        Some(Scalar::Text(s)) => s,
        Some(Scalar::Int(v)) => v.to_string(),
        Some(Scalar::Float(v)) => v.to_string(),
        Some(Scalar::Bool(b)) => b.to_string(),
    })
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "lenient_i64")]
        id: i64,
        #[serde(default, deserialize_with = "lenient_string")]
        name: String,
        #[serde(default, deserialize_with = "null_as_default")]
        tags: Vec<String>,
    }

    fn row(value: serde_json::Value) -> Row {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_id_accepts_number_float_and_string() {
        assert_eq!(row(json!({"id": 7})).id, 7);
        assert_eq!(row(json!({"id": 12.0})).id, 12);
        assert_eq!(row(json!({"id": "42"})).id, 42);
        assert_eq!(row(json!({"id": " 5 "})).id, 5);
        assert_eq!(row(json!({"id": ""})).id, 0);
        assert_eq!(row(json!({"id": null})).id, 0);
        assert_eq!(row(json!({})).id, 0);
    }

    #[test]
    fn test_id_rejects_garbage() {
        assert!(serde_json::from_value::<Row>(json!({"id": 1.5})).is_err());
        assert!(serde_json::from_value::<Row>(json!({"id": "abc"})).is_err());
        assert!(serde_json::from_value::<Row>(json!({"id": true})).is_err());
    }

    #[test]
    fn test_string_accepts_scalars() {
        assert_eq!(row(json!({"name": "x"})).name, "x");
        assert_eq!(row(json!({"name": 3})).name, "3");
        assert_eq!(row(json!({"name": 0.5})).name, "0.5");
        assert_eq!(row(json!({"name": null})).name, "");
    }

    #[test]
    fn test_null_collection_is_default() {
        assert!(row(json!({"tags": null})).tags.is_empty());
        assert_eq!(row(json!({"tags": ["a"]})).tags, ["a"]);
    }
}
