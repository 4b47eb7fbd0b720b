//! # Error Types
//!
//! Configuration errors raised while building schemas, plus the crate-level
//! umbrella error. Validation failures live in [`crate::failure`] because
//! they carry structured positional context.

use thiserror::Error;

use crate::failure::ValidationError;
use crate::path::{render_path, PathSegment};

/// A shape literal that cannot be turned into a schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A list or map literal with zero entries selects no variant.
    #[error("empty {container} schema at {} cannot select a variant", render_path(.path))]
    Empty {
        /// `"list"` or `"map"`.
        container: &'static str,
        /// Location of the offending literal inside the shape.
        path: Vec<PathSegment>,
    },

    /// A record literal names the same key twice.
    #[error("record key {key:?} is declared more than once at {}", render_path(.path))]
    DuplicateKey {
        /// The repeated key.
        key: String,
        /// Location of the record inside the shape.
        path: Vec<PathSegment>,
    },

    /// A map literal with several entries holds a schema in key position.
    /// Only a single-entry map may use a schema key (a map template).
    #[error("map literal with {entries} entries uses a schema key at {}; only single-entry map templates may", render_path(.path))]
    SchemaKeyInRecord {
        /// Number of entries in the literal.
        entries: usize,
        /// Location of the map inside the shape.
        path: Vec<PathSegment>,
    },

    /// A pattern leaf was given an invalid regular expression.
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// Reason reported by the regex engine.
        reason: String,
    },
}

/// Top-level error type for contour.
#[derive(Error, Debug)]
pub enum ContourError {
    /// The schema could not be built.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// A value was rejected by a validator.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}
