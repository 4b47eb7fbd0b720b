//! # Failures and Error Composition
//!
//! A [`Failure`] records which sub-schema rejected which sub-value, why, and
//! where. It is created by the matcher that detected the problem with an
//! empty path; every enclosing container matcher then adds its key or index
//! via [`Failure::within`] on the way back up. The innermost cause is
//! never replaced, only annotated.
//!
//! At the top of the recursion a failure is rendered into a
//! [`ValidationError`], which adds the validator name together with the full
//! root schema and the full root value:
//!
//! ```text
//! Bad value provided for <name>. - error: <kind>: <message> at <path> schema: <schema> value: <value>
//! ```

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::leaf::LeafError;
use crate::path::{render_path, PathSegment};
use crate::schema::{Schema, SchemaVariant};

/// Name rendered when a failure did not pass through a named validator.
pub const UNNAMED: &str = "unnamed";

/// Coarse JSON type of a value, used by wrong-kind failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a value was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FailureCause {
    /// A leaf signaled failure.
    #[error("{0}")]
    LeafRejected(LeafError),

    /// The candidate's shape does not fit the schema variant.
    #[error("expected {expected}, found {found}")]
    WrongKind { expected: ValueKind, found: ValueKind },

    /// Record keys absent from the candidate, in schema order.
    #[error("missing keys {keys:?}")]
    MissingKeys { keys: Vec<String> },

    /// A fixed-sequence candidate has the wrong number of elements.
    #[error("expected {expected} elements, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    /// A directly-constructed container schema has no entries.
    #[error("{variant} schema has no entries")]
    EmptySchema { variant: SchemaVariant },

    /// A map-template key coerced to a value that cannot be an object key.
    #[error("key coerced to {image}, which is not a valid object key")]
    UnrepresentableKey { image: Value },
}

impl FailureCause {
    /// Short category name. Leaf rejections report the leaf's own kind.
    pub fn kind(&self) -> &str {
        match self {
            FailureCause::LeafRejected(err) => err.kind(),
            FailureCause::WrongKind { .. } => "WrongKind",
            FailureCause::MissingKeys { .. } => "MissingKey",
            FailureCause::LengthMismatch { .. } => "LengthMismatch",
            FailureCause::EmptySchema { .. } => "EmptySchema",
            FailureCause::UnrepresentableKey { .. } => "UnrepresentableKey",
        }
    }

    /// Human-readable detail, without the kind prefix.
    pub fn message(&self) -> String {
        match self {
            FailureCause::LeafRejected(err) => err.message().to_string(),
            other => other.to_string(),
        }
    }

    pub fn is_leaf_rejection(&self) -> bool {
        matches!(self, FailureCause::LeafRejected(_))
    }
}

impl From<LeafError> for FailureCause {
    fn from(err: LeafError) -> Self {
        FailureCause::LeafRejected(err)
    }
}

/// A rejection with full positional context.
#[derive(Debug, Clone)]
pub struct Failure {
    schema: Schema,
    value: Value,
    cause: FailureCause,
    // Innermost segment first; reversed only when read.
    trail: Vec<PathSegment>,
}

impl Failure {
    /// A failure detected at the current level, with an empty path.
    pub fn new(schema: &Schema, value: &Value, cause: impl Into<FailureCause>) -> Self {
        Self {
            schema: schema.clone(),
            value: value.clone(),
            cause: cause.into(),
            trail: Vec::new(),
        }
    }

    /// Record the enclosing container's key or index. Called once per
    /// level while unwinding, innermost first.
    pub fn within(mut self, segment: impl Into<PathSegment>) -> Self {
        self.trail.push(segment.into());
        self
    }

    /// The sub-schema that rejected the value.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The sub-value that was rejected.
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn cause(&self) -> &FailureCause {
        &self.cause
    }

    /// Keys and indices from the root to the point of failure.
    pub fn path(&self) -> Vec<PathSegment> {
        self.trail.iter().rev().cloned().collect()
    }

    /// Nesting depth of the failure point.
    pub fn depth(&self) -> usize {
        self.trail.len()
    }

    pub fn rendered_path(&self) -> String {
        render_path(&self.path())
    }

    /// Render this failure at the top of the recursion.
    ///
    /// `name` is the validator's display name, or `None` for a bare
    /// validation call.
    pub fn into_error(self, name: Option<&str>, schema: &Schema, value: &Value) -> ValidationError {
        ValidationError {
            name: name.unwrap_or(UNNAMED).to_string(),
            failure: self,
            schema: schema.clone(),
            value: value.clone(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} at {} (schema: {}, value: {})",
            self.cause.kind(),
            self.cause.message(),
            self.rendered_path(),
            self.schema,
            self.value
        )
    }
}

impl std::error::Error for Failure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.cause {
            FailureCause::LeafRejected(err) => Some(err),
            _ => None,
        }
    }
}

/// A named, fully rendered validation failure.
#[derive(Debug, Clone)]
pub struct ValidationError {
    name: String,
    failure: Failure,
    schema: Schema,
    value: Value,
}

impl ValidationError {
    /// Validator name, or [`UNNAMED`].
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The underlying failure with its innermost cause and path.
    pub fn failure(&self) -> &Failure {
        &self.failure
    }

    /// The full root schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The full root candidate value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_failure(self) -> Failure {
        self.failure
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cause = self.failure.cause();
        write!(
            f,
            "Bad value provided for {}. - error: {}: {} at {} schema: {} value: {}",
            self.name,
            cause.kind(),
            cause.message(),
            self.failure.rendered_path(),
            self.schema,
            self.value
        )
    }
}

impl std::error::Error for ValidationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.failure)
    }
}
