//! # Container Matchers
//!
//! Recursive matching of a candidate value against a [`Schema`]. Each of the
//! five variants has one matcher; container matchers re-enter [`validate`]
//! for every sub-schema, so arbitrarily nested schemas work without any
//! matcher knowing about the others.
//!
//! Matchers always build the coerced image of the candidate. Whether the
//! caller keeps that image or the original is decided by the validator.
//!
//! ## Failure reporting
//!
//! A matcher that detects a problem creates a [`Failure`] with an empty
//! path. Containers add the key or index of the failing child on the
//! way back up, so the outermost caller sees the innermost cause with its
//! full location. Matching stops at the first failure, except for record
//! key presence, where all missing keys are reported together.

use serde_json::{Map, Value};

use crate::failure::{Failure, FailureCause, ValueKind};
use crate::leaf::Leaf;
use crate::schema::Schema;

/// Match `value` against `schema`, returning the coerced image.
///
/// # Errors
///
/// Returns the first [`Failure`] found, carrying the sub-schema, sub-value,
/// cause and path of the rejection.
pub fn validate(schema: &Schema, value: &Value) -> Result<Value, Failure> {
    match schema {
        Schema::Leaf(leaf) => match_leaf(schema, leaf, value),
        Schema::MapTemplate { key, value: item } => match_map_template(schema, key, item, value),
        Schema::Record(fields) => match_record(schema, fields, value),
        Schema::SequenceTemplate(element) => match_sequence_template(schema, element, value),
        Schema::Sequence(items) => match_sequence(schema, items, value),
    }
}

fn match_leaf(schema: &Schema, leaf: &Leaf, value: &Value) -> Result<Value, Failure> {
    match leaf.check(value) {
        Ok(checked) => Ok(checked.into_value(value)),
        Err(err) => {
            tracing::trace!(leaf = leaf.name(), kind = err.kind(), "leaf rejected value");
            Err(Failure::new(schema, value, err))
        }
    }
}

fn match_map_template(
    schema: &Schema,
    key_schema: &Schema,
    value_schema: &Schema,
    value: &Value,
) -> Result<Value, Failure> {
    let entries = expect_object(schema, value)?;
    tracing::trace!(entries = entries.len(), "matching map template");

    let mut out = Map::new();
    for (key, item) in entries {
        let image = validate(key_schema, &Value::String(key.clone()))
            .map_err(|f| f.within(key.as_str()))?;
        let coerced_key = key_image(key_schema, image).map_err(|f| f.within(key.as_str()))?;
        let coerced_item = validate(value_schema, item).map_err(|f| f.within(key.as_str()))?;
        out.insert(coerced_key, coerced_item);
    }
    Ok(Value::Object(out))
}

/// Turn a coerced key back into an object key.
fn key_image(key_schema: &Schema, image: Value) -> Result<String, Failure> {
    match image {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(Failure::new(
            key_schema,
            &other,
            FailureCause::UnrepresentableKey {
                image: other.clone(),
            },
        )),
    }
}

fn match_record(
    schema: &Schema,
    fields: &[(String, Schema)],
    value: &Value,
) -> Result<Value, Failure> {
    if fields.is_empty() {
        return Err(empty(schema, value));
    }
    let entries = expect_object(schema, value)?;

    let missing: Vec<String> = fields
        .iter()
        .filter(|(name, _)| !entries.contains_key(name))
        .map(|(name, _)| name.clone())
        .collect();
    if !missing.is_empty() {
        return Err(Failure::new(
            schema,
            value,
            FailureCause::MissingKeys { keys: missing },
        ));
    }
    tracing::trace!(
        fields = fields.len(),
        extra = entries.len().saturating_sub(fields.len()),
        "matching record"
    );

    // Keys the record does not name pass through untouched.
    let mut out = entries.clone();
    for (name, sub) in fields {
        if let Some(item) = entries.get(name) {
            let coerced = validate(sub, item).map_err(|f| f.within(name.as_str()))?;
            out.insert(name.clone(), coerced);
        }
    }
    Ok(Value::Object(out))
}

fn match_sequence_template(
    schema: &Schema,
    element: &Schema,
    value: &Value,
) -> Result<Value, Failure> {
    let items = expect_array(schema, value)?;
    tracing::trace!(len = items.len(), "matching sequence template");

    items
        .iter()
        .enumerate()
        .map(|(i, item)| validate(element, item).map_err(|f| f.within(i)))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

fn match_sequence(schema: &Schema, subs: &[Schema], value: &Value) -> Result<Value, Failure> {
    if subs.is_empty() {
        return Err(empty(schema, value));
    }
    let items = expect_array(schema, value)?;
    if items.len() != subs.len() {
        return Err(Failure::new(
            schema,
            value,
            FailureCause::LengthMismatch {
                expected: subs.len(),
                found: items.len(),
            },
        ));
    }
    tracing::trace!(len = items.len(), "matching fixed sequence");

    subs.iter()
        .zip(items)
        .enumerate()
        .map(|(i, (sub, item))| validate(sub, item).map_err(|f| f.within(i)))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

fn expect_object<'v>(schema: &Schema, value: &'v Value) -> Result<&'v Map<String, Value>, Failure> {
    value.as_object().ok_or_else(|| {
        Failure::new(
            schema,
            value,
            FailureCause::WrongKind {
                expected: ValueKind::Object,
                found: ValueKind::of(value),
            },
        )
    })
}

fn expect_array<'v>(schema: &Schema, value: &'v Value) -> Result<&'v Vec<Value>, Failure> {
    value.as_array().ok_or_else(|| {
        Failure::new(
            schema,
            value,
            FailureCause::WrongKind {
                expected: ValueKind::Array,
                found: ValueKind::of(value),
            },
        )
    })
}

fn empty(schema: &Schema, value: &Value) -> Failure {
    Failure::new(
        schema,
        value,
        FailureCause::EmptySchema {
            variant: schema.variant(),
        },
    )
}


#[cfg(test)]
mod proptests {
    use super::*;
    use std::collections::BTreeSet;

    use crate::leaves::{any as any_leaf, integer, string};
    use crate::schema::Shape;
    use crate::strategies::json_value;
    use proptest::prelude::*;

    proptest! {
        /// The `any` leaf is the identity at every nesting level.
        #[test]
        fn any_leaf_passes_everything(value in json_value()) {
            let schema = Schema::from(any_leaf());
            prop_assert_eq!(validate(&schema, &value).unwrap(), value);
        }

        /// Validating a coerced result again yields the same result.
        #[test]
        fn coercion_is_idempotent(numbers in prop::collection::vec(any::<i64>(), 0..20)) {
            let schema = Schema::compile(&Shape::list([integer()])).unwrap();
            let text: Vec<Value> = numbers.iter().map(|n| Value::String(n.to_string())).collect();
            let once = validate(&schema, &Value::Array(text)).unwrap();
            let twice = validate(&schema, &once).unwrap();
            prop_assert_eq!(once, twice);
        }

        /// Sequence templates keep element order.
        #[test]
        fn sequence_template_preserves_order(numbers in prop::collection::vec(any::<i64>(), 0..20)) {
            let schema = Schema::compile(&Shape::list([integer()])).unwrap();
            let value = serde_json::json!(numbers);
            prop_assert_eq!(validate(&schema, &value).unwrap(), value);
        }

        /// Keys a record does not name come back untouched.
        #[test]
        fn record_passes_extra_keys_through(
            id in any::<i64>(),
            extras in prop::collection::btree_map("[a-z]{1,6}", json_value(), 0..8),
        ) {
            // Required keys are upper case so generated extras never collide.
            let schema = Schema::compile(&Shape::record([("ID", integer())])).unwrap();
            let mut candidate: Map<String, Value> = extras.clone().into_iter().collect();
            candidate.insert("ID".to_string(), Value::String(id.to_string()));

            let out = validate(&schema, &Value::Object(candidate)).unwrap();
            let out = out.as_object().unwrap();
            prop_assert_eq!(out.len(), extras.len() + 1);
            prop_assert_eq!(&out["ID"], &serde_json::json!(id));
            for (key, value) in &extras {
                prop_assert_eq!(out.get(key), Some(value));
            }
        }

        /// A map template with text keys returns exactly the candidate's keys.
        #[test]
        fn map_template_keeps_text_keys(
            entries in prop::collection::btree_map("[a-zA-Z0-9 _]{0,8}", json_value(), 0..8),
        ) {
            let schema = Schema::compile(&Shape::map_of(string(), any_leaf())).unwrap();
            let candidate = Value::Object(entries.clone().into_iter().collect());
            let out = validate(&schema, &candidate).unwrap();
            let keys: BTreeSet<&String> = out.as_object().unwrap().keys().collect();
            prop_assert_eq!(keys, entries.keys().collect::<BTreeSet<_>>());
        }

        /// A map template's result keys are the coerced images of the candidate keys.
        #[test]
        fn map_template_keys_are_coerced_images(
            numbers in prop::collection::btree_set(any::<u32>(), 0..8),
        ) {
            let schema = Schema::compile(&Shape::map_of(integer(), any_leaf())).unwrap();
            let candidate: Map<String, Value> = numbers
                .iter()
                .map(|n| (format!("{n:010}"), Value::Bool(true)))
                .collect();
            let out = validate(&schema, &Value::Object(candidate)).unwrap();
            let keys: BTreeSet<String> = out.as_object().unwrap().keys().cloned().collect();
            let images: BTreeSet<String> = numbers.iter().map(u32::to_string).collect();
            prop_assert_eq!(keys, images);
        }

        /// A fixed sequence of the wrong length fails regardless of contents.
        #[test]
        fn length_mismatch_ignores_contents(
            expected in 2usize..6,
            items in prop::collection::vec(json_value(), 0..10),
        ) {
            prop_assume!(items.len() != expected);
            let schema = Schema::Sequence(vec![Schema::from(integer()); expected]);
            let failure = validate(&schema, &Value::Array(items.clone())).unwrap_err();
            prop_assert_eq!(
                failure.cause(),
                &FailureCause::LengthMismatch { expected, found: items.len() }
            );
        }
    }
}
