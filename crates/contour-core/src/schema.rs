//! # Schema Model and Dispatcher
//!
//! Schemas are written as [`Shape`] literals: leaves, ordered lists and
//! key/value maps, nested arbitrarily. The dispatcher inspects the shape of
//! each literal, never the candidate value, and selects exactly one of five
//! variants:
//!
//! | Shape | Variant |
//! |---|---|
//! | a leaf | [`SchemaVariant::Leaf`] |
//! | a list with one element | [`SchemaVariant::SequenceTemplate`] |
//! | a list with more than one element | [`SchemaVariant::Sequence`] |
//! | a map with one entry whose key is a schema | [`SchemaVariant::MapTemplate`] |
//! | any other map (literal keys) | [`SchemaVariant::Record`] |
//!
//! Tests run in that priority order. A single-entry map is the only
//! ambiguous literal and is resolved by its key: a schema key makes a map
//! template, a literal key makes a record.
//!
//! Dispatch happens once, in [`Schema::compile`]. The resulting [`Schema`]
//! tree is the memoized, explicit form used by every validation call.

use std::collections::HashSet;
use std::fmt;

use crate::error::SchemaError;
use crate::leaf::Leaf;
use crate::path::PathSegment;

/// The five schema variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaVariant {
    Leaf,
    MapTemplate,
    Record,
    SequenceTemplate,
    Sequence,
}

impl SchemaVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaVariant::Leaf => "leaf",
            SchemaVariant::MapTemplate => "map template",
            SchemaVariant::Record => "record",
            SchemaVariant::SequenceTemplate => "sequence template",
            SchemaVariant::Sequence => "fixed sequence",
        }
    }
}

impl fmt::Display for SchemaVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A schema literal, prior to dispatch.
#[derive(Debug, Clone)]
pub enum Shape {
    /// A checking operation.
    Leaf(Leaf),
    /// An ordered-collection literal.
    List(Vec<Shape>),
    /// A key/value literal, entries in declaration order.
    Map(Vec<(Key, Shape)>),
}

/// The key position of a map literal.
#[derive(Debug, Clone)]
pub enum Key {
    /// A concrete key the candidate must contain.
    Literal(String),
    /// A schema every candidate key must satisfy.
    Schema(Shape),
}

impl Shape {
    /// An ordered-collection literal.
    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Shape>,
    {
        Shape::List(items.into_iter().map(Into::into).collect())
    }

    /// A key/value literal with literal keys.
    pub fn record<I, K, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: Into<Shape>,
    {
        Shape::Map(
            entries
                .into_iter()
                .map(|(k, s)| (Key::Literal(k.into()), s.into()))
                .collect(),
        )
    }

    /// A single-entry key/value literal whose key is a schema.
    pub fn map_of(key: impl Into<Shape>, value: impl Into<Shape>) -> Self {
        Shape::Map(vec![(Key::Schema(key.into()), value.into())])
    }
}

impl From<Leaf> for Shape {
    fn from(leaf: Leaf) -> Self {
        Shape::Leaf(leaf)
    }
}

impl From<Vec<Shape>> for Shape {
    fn from(items: Vec<Shape>) -> Self {
        Shape::List(items)
    }
}

impl From<&str> for Key {
    fn from(key: &str) -> Self {
        Key::Literal(key.to_string())
    }
}

impl From<String> for Key {
    fn from(key: String) -> Self {
        Key::Literal(key)
    }
}

impl From<Leaf> for Key {
    fn from(leaf: Leaf) -> Self {
        Key::Schema(Shape::Leaf(leaf))
    }
}

/// Select the variant for one shape node without recursing.
///
/// # Errors
///
/// Returns [`SchemaError::Empty`] for zero-entry lists and maps, and
/// [`SchemaError::SchemaKeyInRecord`] for multi-entry maps holding a schema
/// key. Errors are reported at the root path; [`Schema::compile`] supplies
/// the real location.
pub fn classify(shape: &Shape) -> Result<SchemaVariant, SchemaError> {
    classify_at(shape, &[])
}

fn classify_at(shape: &Shape, path: &[PathSegment]) -> Result<SchemaVariant, SchemaError> {
    match shape {
        Shape::Leaf(_) => Ok(SchemaVariant::Leaf),
        Shape::List(items) => match items.len() {
            0 => Err(SchemaError::Empty {
                container: "list",
                path: path.to_vec(),
            }),
            1 => Ok(SchemaVariant::SequenceTemplate),
            _ => Ok(SchemaVariant::Sequence),
        },
        Shape::Map(entries) => match entries.as_slice() {
            [] => Err(SchemaError::Empty {
                container: "map",
                path: path.to_vec(),
            }),
            [(Key::Schema(_), _)] => Ok(SchemaVariant::MapTemplate),
            _ if entries.iter().any(|(k, _)| matches!(k, Key::Schema(_))) => {
                Err(SchemaError::SchemaKeyInRecord {
                    entries: entries.len(),
                    path: path.to_vec(),
                })
            }
            _ => Ok(SchemaVariant::Record),
        },
    }
}

/// A dispatched schema tree.
///
/// Variants may be constructed directly by callers that already know the
/// variant they want; [`Schema::compile`] builds them from literals.
#[derive(Debug, Clone)]
pub enum Schema {
    /// Apply the leaf to the candidate.
    Leaf(Leaf),
    /// Every key satisfies `key`, every value satisfies `value`.
    MapTemplate { key: Box<Schema>, value: Box<Schema> },
    /// Each named key must be present and satisfy its sub-schema.
    /// Other candidate keys pass through.
    Record(Vec<(String, Schema)>),
    /// Every element satisfies the one sub-schema.
    SequenceTemplate(Box<Schema>),
    /// Element `i` satisfies sub-schema `i`; lengths must agree.
    ///
    /// A one-element fixed sequence renders as `[s,]` to tell it apart from
    /// the sequence template `[s]`.
    Sequence(Vec<Schema>),
}

impl Schema {
    /// Dispatch a shape literal, recursively, into a schema tree.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] found, with the path of the
    /// offending literal.
    pub fn compile(shape: &Shape) -> Result<Schema, SchemaError> {
        let mut path = Vec::new();
        compile_at(shape, &mut path)
    }

    /// Shorthand for a single-entry map template.
    pub fn map_template(key: Schema, value: Schema) -> Schema {
        Schema::MapTemplate {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Shorthand for a sequence template.
    pub fn sequence_template(element: Schema) -> Schema {
        Schema::SequenceTemplate(Box::new(element))
    }

    pub fn variant(&self) -> SchemaVariant {
        match self {
            Schema::Leaf(_) => SchemaVariant::Leaf,
            Schema::MapTemplate { .. } => SchemaVariant::MapTemplate,
            Schema::Record(_) => SchemaVariant::Record,
            Schema::SequenceTemplate(_) => SchemaVariant::SequenceTemplate,
            Schema::Sequence(_) => SchemaVariant::Sequence,
        }
    }
}

impl From<Leaf> for Schema {
    fn from(leaf: Leaf) -> Self {
        Schema::Leaf(leaf)
    }
}

impl TryFrom<Shape> for Schema {
    type Error = SchemaError;

    fn try_from(shape: Shape) -> Result<Self, Self::Error> {
        Schema::compile(&shape)
    }
}

impl TryFrom<&Shape> for Schema {
    type Error = SchemaError;

    fn try_from(shape: &Shape) -> Result<Self, Self::Error> {
        Schema::compile(shape)
    }
}

fn compile_at(shape: &Shape, path: &mut Vec<PathSegment>) -> Result<Schema, SchemaError> {
    let variant = classify_at(shape, path)?;
    tracing::trace!(%variant, at = %crate::path::render_path(path), "dispatched shape");

    match shape {
        Shape::Leaf(leaf) => Ok(Schema::Leaf(leaf.clone())),
        Shape::List(items) => match items.as_slice() {
            [element] => {
                path.push(PathSegment::Index(0));
                let element = compile_at(element, path);
                path.pop();
                Ok(Schema::sequence_template(element?))
            }
            _ => {
                let mut compiled = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    path.push(PathSegment::Index(i));
                    let sub = compile_at(item, path);
                    path.pop();
                    compiled.push(sub?);
                }
                Ok(Schema::Sequence(compiled))
            }
        },
        Shape::Map(entries) => match entries.as_slice() {
            [(Key::Schema(key), value)] => {
                let key = compile_at(key, path)?;
                let value = compile_at(value, path)?;
                Ok(Schema::map_template(key, value))
            }
            _ => {
                let mut seen = HashSet::with_capacity(entries.len());
                let mut fields = Vec::with_capacity(entries.len());
                for (key, sub) in entries {
                    let name = match key {
                        Key::Literal(name) => name,
                        Key::Schema(_) => {
                            return Err(SchemaError::SchemaKeyInRecord {
                                entries: entries.len(),
                                path: path.clone(),
                            })
                        }
                    };
                    if !seen.insert(name.as_str()) {
                        return Err(SchemaError::DuplicateKey {
                            key: name.clone(),
                            path: path.clone(),
                        });
                    }
                    path.push(PathSegment::Key(name.clone()));
                    let compiled = compile_at(sub, path);
                    path.pop();
                    fields.push((name.clone(), compiled?));
                }
                Ok(Schema::Record(fields))
            }
        },
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schema::Leaf(leaf) => write!(f, "{leaf}"),
            Schema::MapTemplate { key, value } => write!(f, "{{{key}: {value}}}"),
            Schema::Record(fields) => {
                f.write_str("{")?;
                for (i, (name, sub)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name:?}: {sub}")?;
                }
                f.write_str("}")
            }
            Schema::SequenceTemplate(element) => write!(f, "[{element}]"),
            Schema::Sequence(items) => {
                f.write_str("[")?;
                for (i, sub) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{sub}")?;
                }
                if items.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str("]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaves::{integer, string};

    #[test]
    fn test_leaf_wins_first() {
        assert_eq!(classify(&integer().into()).unwrap(), SchemaVariant::Leaf);
    }

    #[test]
    fn test_list_length_selects_variant() {
        let template = Shape::list([integer()]);
        let fixed = Shape::list([integer(), string()]);
        assert_eq!(classify(&template).unwrap(), SchemaVariant::SequenceTemplate);
        assert_eq!(classify(&fixed).unwrap(), SchemaVariant::Sequence);
    }

    #[test]
    fn test_empty_list_is_configuration_error() {
        let err = classify(&Shape::List(vec![])).unwrap_err();
        assert!(matches!(err, SchemaError::Empty { container: "list", .. }));
    }

    #[test]
    fn test_empty_map_is_configuration_error() {
        let err = classify(&Shape::Map(vec![])).unwrap_err();
        assert!(matches!(err, SchemaError::Empty { container: "map", .. }));
    }

    #[test]
    fn test_single_entry_map_with_schema_key_is_template() {
        let shape = Shape::map_of(string(), integer());
        assert_eq!(classify(&shape).unwrap(), SchemaVariant::MapTemplate);
    }

    #[test]
    fn test_single_entry_map_with_literal_key_is_record() {
        let shape = Shape::record([("name", string())]);
        assert_eq!(classify(&shape).unwrap(), SchemaVariant::Record);
    }

    #[test]
    fn test_multi_entry_map_with_schema_key_rejected() {
        let shape = Shape::Map(vec![
            (Key::from("name"), string().into()),
            (Key::from(integer()), string().into()),
        ]);
        let err = classify(&shape).unwrap_err();
        assert!(matches!(err, SchemaError::SchemaKeyInRecord { entries: 2, .. }));
    }

    #[test]
    fn test_dispatch_is_deterministic() {
        let shape = Shape::list([Shape::record([("a", integer())])]);
        let first = classify(&shape).unwrap();
        for _ in 0..10 {
            assert_eq!(classify(&shape).unwrap(), first);
        }
    }

    #[test]
    fn test_compile_nested() {
        let shape = Shape::record([
            ("tags", Shape::list([string()])),
            ("scores", Shape::map_of(string(), integer())),
            ("pair", Shape::list([integer(), string()])),
        ]);
        let schema = Schema::compile(&shape).unwrap();
        let Schema::Record(fields) = &schema else {
            panic!("expected record, got {schema:?}");
        };
        let variants: Vec<SchemaVariant> = fields.iter().map(|(_, s)| s.variant()).collect();
        assert_eq!(
            variants,
            vec![
                SchemaVariant::SequenceTemplate,
                SchemaVariant::MapTemplate,
                SchemaVariant::Sequence
            ]
        );
    }

    #[test]
    fn test_compile_reports_nested_empty_path() {
        let shape = Shape::record([("items", Shape::list([Shape::List(vec![])]))]);
        let err = Schema::compile(&shape).unwrap_err();
        assert_eq!(
            err,
            SchemaError::Empty {
                container: "list",
                path: vec![PathSegment::from("items"), PathSegment::Index(0)],
            }
        );
    }

    #[test]
    fn test_compile_rejects_duplicate_record_key() {
        let shape = Shape::record([("a", integer()), ("a", string())]);
        let err = Schema::compile(&shape).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateKey { ref key, .. } if key == "a"));
    }

    #[test]
    fn test_display_literal_notation() {
        let shape = Shape::record([
            ("name", Shape::from(string())),
            ("tags", Shape::list([string()])),
            ("scores", Shape::map_of(string(), integer())),
            ("pair", Shape::list([integer(), string()])),
        ]);
        let schema = Schema::compile(&shape).unwrap();
        assert_eq!(
            schema.to_string(),
            r#"{"name": string, "tags": [string], "scores": {string: integer}, "pair": [integer, string]}"#
        );
    }

    #[test]
    fn test_single_element_fixed_sequence_renders_apart_from_template() {
        let fixed = Schema::Sequence(vec![integer().into()]);
        let template = Schema::sequence_template(integer().into());
        assert_eq!(fixed.to_string(), "[integer,]");
        assert_eq!(template.to_string(), "[integer]");
    }

    #[test]
    fn test_try_from_shape() {
        let schema = Schema::try_from(Shape::list([integer()])).unwrap();
        assert_eq!(schema.variant(), SchemaVariant::SequenceTemplate);
    }
}
