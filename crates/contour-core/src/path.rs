//! # Positional Paths
//!
//! A path is the ordered list of keys and indices traversed from the root
//! of a schema (or candidate) down to a point of interest. Paths render in
//! a JSONPath-like notation: `$`, `$[0]`, `$["age"][2]`.

use std::fmt;

use serde::Serialize;

/// One step of a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// A key inside a key/value container.
    Key(String),
    /// A position inside an ordered collection.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Debug formatting of a str yields a quoted, escaped literal.
            PathSegment::Key(key) => write!(f, "[{key:?}]"),
            PathSegment::Index(index) => write!(f, "[{index}]"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// Render a path, rooted at `$`.
pub fn render_path(path: &[PathSegment]) -> String {
    let mut out = String::from("$");
    for segment in path {
        out.push_str(&segment.to_string());
    }
    out
}
