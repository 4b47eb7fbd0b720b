//! # Built-in Leaves
//!
//! Ready-made leaf schemas for JSON scalars. Scalar leaves coerce the
//! obvious textual forms (`"400"` for [`integer`], `12` for [`string`]) so
//! that request payloads written by loosely-typed clients can be narrowed
//! in one pass. All coercions are idempotent: applying a leaf to its own
//! output yields the same value.
//!
//! Composite leaves ([`one_of`], [`enumeration`], [`formatted_string`])
//! build new leaves from existing ones or from literal data.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use regex::Regex;
use serde_json::{Number, Value};

use crate::error::SchemaError;
use crate::failure::ValueKind;
use crate::leaf::{Checked, Leaf, LeafError};

/// Accepts every value unchanged.
pub fn any() -> Leaf {
    Leaf::new("any", |_| Ok(Checked::Accepted))
}

/// Integers. Coerces integral floats and integer text.
pub fn integer() -> Leaf {
    Leaf::new("integer", |value| match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(Checked::Accepted),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
                Ok(Checked::Coerced(Value::from(f as i64)))
            }
            _ => Err(LeafError::invalid_value(format!(
                "{n} is not an integral number"
            ))),
        },
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(|n| Checked::Coerced(Value::from(n)))
            .map_err(|e| LeafError::invalid_value(format!("invalid integer literal {s:?}: {e}"))),
        other => Err(mismatch("an integer", other)),
    })
}

/// Any JSON number. Coerces numeric text.
pub fn number() -> Leaf {
    Leaf::new("number", |value| match value {
        Value::Number(_) => Ok(Checked::Accepted),
        Value::String(s) => parse_number(s.trim())
            .map(|n| Checked::Coerced(Value::Number(n)))
            .ok_or_else(|| LeafError::invalid_value(format!("invalid number literal {s:?}"))),
        other => Err(mismatch("a number", other)),
    })
}

fn parse_number(text: &str) -> Option<Number> {
    if let Ok(n) = text.parse::<i64>() {
        return Some(Number::from(n));
    }
    text.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Strings. Coerces numbers and booleans to their text.
pub fn string() -> Leaf {
    Leaf::new("string", |value| match value {
        Value::String(_) => Ok(Checked::Accepted),
        Value::Number(n) => Ok(Checked::Coerced(Value::String(n.to_string()))),
        Value::Bool(b) => Ok(Checked::Coerced(Value::String(b.to_string()))),
        other => Err(mismatch("a string", other)),
    })
}

/// Booleans. Coerces `"true"` and `"false"`, ignoring ASCII case.
pub fn boolean() -> Leaf {
    Leaf::new("boolean", |value| match value {
        Value::Bool(_) => Ok(Checked::Accepted),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(Checked::Coerced(Value::Bool(true))),
        Value::String(s) if s.eq_ignore_ascii_case("false") => {
            Ok(Checked::Coerced(Value::Bool(false)))
        }
        Value::String(s) => Err(LeafError::invalid_value(format!(
            "invalid boolean literal {s:?}"
        ))),
        other => Err(mismatch("a boolean", other)),
    })
}

/// Only `null`.
pub fn null() -> Leaf {
    Leaf::new("null", |value| match value {
        Value::Null => Ok(Checked::Accepted),
        other => Err(LeafError::invalid_value(format!("expected null, got {other}"))),
    })
}

/// The first of `leaves` that accepts the value decides the outcome.
///
/// Fails with every alternative's message when none accepts.
pub fn one_of<I>(leaves: I) -> Leaf
where
    I: IntoIterator<Item = Leaf>,
{
    let leaves: Vec<Leaf> = leaves.into_iter().collect();
    let names: Vec<&str> = leaves.iter().map(Leaf::name).collect();
    let name = format!("one_of({})", names.join(", "));

    Leaf::new(name, move |value| {
        let mut rejections = Vec::with_capacity(leaves.len());
        for leaf in &leaves {
            match leaf.check(value) {
                Ok(checked) => return Ok(checked),
                Err(err) => rejections.push(format!("{}: {err}", leaf.name())),
            }
        }
        Err(LeafError::invalid_value(format!(
            "{value} matched no alternative ({})",
            rejections.join("; ")
        )))
    })
}

/// Exactly one of the listed values.
pub fn enumeration<I, V>(values: I) -> Leaf
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    let allowed: Vec<Value> = values.into_iter().map(Into::into).collect();
    let listing = allowed
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let name = format!("enum({listing})");

    Leaf::new(name, move |value| {
        if allowed.contains(value) {
            Ok(Checked::Accepted)
        } else {
            Err(LeafError::invalid_value(format!(
                "{value} is not one of {listing}"
            )))
        }
    })
}

/// Text matching `pattern` from its first character.
///
/// Non-string values are rendered to their JSON text first, and the
/// result is always coerced to that text.
///
/// # Errors
///
/// Returns [`SchemaError::InvalidPattern`] if `pattern` does not compile.
pub fn formatted_string(pattern: &str) -> Result<Leaf, SchemaError> {
    let regex = Regex::new(&format!("^(?:{pattern})")).map_err(|e| SchemaError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;
    let expected = pattern.to_string();

    Ok(Leaf::coercing(format!("formatted_string({pattern:?})"), move |value| {
        let text = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        if regex.is_match(&text) {
            Ok(Value::String(text))
        } else {
            Err(LeafError::invalid_value(format!(
                "string not of expected format: expected: {expected}, got: {text}"
            )))
        }
    }))
}

/// Calendar dates written `YYYY-MM-DD`.
pub fn date_string() -> Leaf {
    Leaf::coercing("date_string", |value| {
        let text = expect_text(value)?;
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(|date| Value::String(date.format("%Y-%m-%d").to_string()))
            .map_err(|e| LeafError::invalid_value(format!("invalid date {text:?}: {e}")))
    })
}

/// Local date-times written `YYYY-MM-DD HH:MM:SS.ffffff`.
pub fn datetime_string() -> Leaf {
    Leaf::coercing("datetime_string", |value| {
        let text = expect_text(value)?;
        NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
            .map(|dt| Value::String(dt.format("%Y-%m-%d %H:%M:%S%.6f").to_string()))
            .map_err(|e| LeafError::invalid_value(format!("invalid datetime {text:?}: {e}")))
    })
}

/// RFC 3339 timestamps, normalized to UTC with a `Z` suffix.
pub fn timestamp() -> Leaf {
    Leaf::coercing("timestamp", |value| {
        let text = expect_text(value)?;
        DateTime::parse_from_rfc3339(text)
            .map(|dt| {
                Value::String(
                    dt.with_timezone(&Utc)
                        .to_rfc3339_opts(SecondsFormat::AutoSi, true),
                )
            })
            .map_err(|e| LeafError::invalid_value(format!("invalid RFC 3339 timestamp {text:?}: {e}")))
    })
}

fn expect_text(value: &Value) -> Result<&str, LeafError> {
    value.as_str().ok_or_else(|| mismatch("a string", value))
}

fn mismatch(expected: &str, found: &Value) -> LeafError {
    LeafError::type_mismatch(format!("expected {expected}, got {}", ValueKind::of(found)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn coerce(leaf: &Leaf, value: Value) -> Result<Value, LeafError> {
        leaf.check(&value).map(|c| c.into_value(&value))
    }

    #[test]
    fn test_any_accepts_everything() {
        for v in [json!(null), json!([1, 2]), json!({"a": {}})] {
            assert_eq!(any().check(&v), Ok(Checked::Accepted));
        }
    }

    #[test]
    fn test_integer_accepts_integers() {
        assert_eq!(integer().check(&json!(5)), Ok(Checked::Accepted));
        assert_eq!(integer().check(&json!(-5)), Ok(Checked::Accepted));
        assert_eq!(integer().check(&json!(u64::MAX)), Ok(Checked::Accepted));
    }

    #[test]
    fn test_integer_coerces_text_and_integral_floats() {
        assert_eq!(coerce(&integer(), json!("400")).unwrap(), json!(400));
        assert_eq!(coerce(&integer(), json!(" 7 ")).unwrap(), json!(7));
        assert_eq!(coerce(&integer(), json!(3.0)).unwrap(), json!(3));
    }

    #[test]
    fn test_integer_rejections() {
        let err = integer().check(&json!("hello")).unwrap_err();
        assert_eq!(err.kind(), LeafError::INVALID_VALUE);
        let err = integer().check(&json!(2.5)).unwrap_err();
        assert_eq!(err.kind(), LeafError::INVALID_VALUE);
        let err = integer().check(&json!(true)).unwrap_err();
        assert_eq!(err.kind(), LeafError::TYPE_MISMATCH);
        let err = integer().check(&json!([1])).unwrap_err();
        assert_eq!(err.message(), "expected an integer, got array");
    }

    #[test]
    fn test_number_coerces_text() {
        assert_eq!(number().check(&json!(10.5)), Ok(Checked::Accepted));
        assert_eq!(coerce(&number(), json!("10")).unwrap(), json!(10));
        assert_eq!(coerce(&number(), json!("10.5")).unwrap(), json!(10.5));
        assert!(number().check(&json!("ten")).is_err());
        assert!(number().check(&json!("NaN")).is_err());
    }

    #[test]
    fn test_string_coerces_scalars() {
        assert_eq!(string().check(&json!("hello")), Ok(Checked::Accepted));
        assert_eq!(coerce(&string(), json!(12)).unwrap(), json!("12"));
        assert_eq!(coerce(&string(), json!(false)).unwrap(), json!("false"));
        assert_eq!(
            string().check(&json!(null)).unwrap_err().kind(),
            LeafError::TYPE_MISMATCH
        );
    }

    #[test]
    fn test_boolean() {
        assert_eq!(boolean().check(&json!(true)), Ok(Checked::Accepted));
        assert_eq!(coerce(&boolean(), json!("TRUE")).unwrap(), json!(true));
        assert_eq!(coerce(&boolean(), json!("false")).unwrap(), json!(false));
        assert!(boolean().check(&json!("yes")).is_err());
        assert!(boolean().check(&json!(1)).is_err());
    }

    #[test]
    fn test_null_rejects_string() {
        assert_eq!(null().check(&json!(null)), Ok(Checked::Accepted));
        let err = null().check(&json!("hello")).unwrap_err();
        assert_eq!(err.kind(), LeafError::INVALID_VALUE);
    }

    #[test]
    fn test_one_of_allows_any_alternative() {
        let int_or_float = one_of([integer(), number()]);
        assert_eq!(int_or_float.name(), "one_of(integer, number)");
        assert_eq!(int_or_float.check(&json!(10)), Ok(Checked::Accepted));
        assert_eq!(int_or_float.check(&json!(10.5)), Ok(Checked::Accepted));
        let err = int_or_float.check(&json!("hello")).unwrap_err();
        assert!(err.message().contains("integer:"));
        assert!(err.message().contains("number:"));
    }

    #[test]
    fn test_one_of_first_alternative_coerces() {
        let leaf = one_of([integer(), string()]);
        assert_eq!(coerce(&leaf, json!("42")).unwrap(), json!(42));
    }

    #[test]
    fn test_one_of_empty_rejects() {
        assert!(one_of(Vec::<Leaf>::new()).check(&json!(1)).is_err());
    }

    #[test]
    fn test_enumeration() {
        let leaf = enumeration([json!("Hello"), json!(5)]);
        assert_eq!(leaf.name(), "enum(\"Hello\", 5)");
        assert_eq!(leaf.check(&json!("Hello")), Ok(Checked::Accepted));
        assert_eq!(leaf.check(&json!(5)), Ok(Checked::Accepted));
        assert!(leaf.check(&json!(6)).is_err());
        assert!(leaf.check(&json!("World")).is_err());
    }

    #[test]
    fn test_formatted_string() {
        let digits = formatted_string(r"\d+").unwrap();
        assert_eq!(coerce(&digits, json!("112233")).unwrap(), json!("112233"));
        assert_eq!(coerce(&digits, json!(112233)).unwrap(), json!("112233"));
        let err = digits.check(&json!("not a digit")).unwrap_err();
        assert!(err.message().starts_with("string not of expected format"));
    }

    #[test]
    fn test_formatted_string_anchors_at_start_only() {
        let digits = formatted_string(r"\d+").unwrap();
        assert!(digits.check(&json!("12abc")).is_ok());
        assert!(digits.check(&json!("abc12")).is_err());
    }

    #[test]
    fn test_formatted_string_invalid_pattern() {
        let err = formatted_string("(").unwrap_err();
        assert!(matches!(err, SchemaError::InvalidPattern { .. }));
    }

    #[test]
    fn test_date_string() {
        assert_eq!(coerce(&date_string(), json!("2024-02-29")).unwrap(), json!("2024-02-29"));
        assert!(date_string().check(&json!("2023-02-29")).is_err());
        assert!(date_string().check(&json!("yesterday")).is_err());
        assert_eq!(
            date_string().check(&json!(20240229)).unwrap_err().kind(),
            LeafError::TYPE_MISMATCH
        );
    }

    #[test]
    fn test_datetime_string() {
        let out = coerce(&datetime_string(), json!("2024-01-05 13:45:10.5")).unwrap();
        assert_eq!(out, json!("2024-01-05 13:45:10.500000"));
        assert!(datetime_string().check(&json!("2024-01-05")).is_err());
    }

    #[test]
    fn test_timestamp_normalizes_to_utc() {
        let out = coerce(&timestamp(), json!("2026-01-15T17:30:00+05:00")).unwrap();
        assert_eq!(out, json!("2026-01-15T12:30:00Z"));
        assert!(timestamp().check(&json!("2026-01-15 12:30")).is_err());
    }

    #[test]
    fn test_scalar_coercions_are_idempotent() {
        let cases = [
            (integer(), json!("400")),
            (number(), json!("1.25")),
            (string(), json!(9)),
            (boolean(), json!("True")),
            (date_string(), json!("2024-01-05")),
            (timestamp(), json!("2026-01-15T17:30:00+05:00")),
        ];
        for (leaf, input) in cases {
            let once = coerce(&leaf, input).unwrap();
            let twice = coerce(&leaf, once.clone()).unwrap();
            assert_eq!(once, twice, "{} is not idempotent", leaf.name());
        }
    }
}
