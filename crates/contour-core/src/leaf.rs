//! # Leaf Schemas
//!
//! A leaf is a single-argument checking operation over a candidate value and
//! the base case of every recursive match. Leaves have an explicit
//! two-outcome contract:
//!
//! - `Ok(Checked::Accepted)`: the value is acceptable as-is (signal-only check).
//! - `Ok(Checked::Coerced(v))`: the value is acceptable and narrows to `v`.
//! - `Err(LeafError)`: the value is rejected.
//!
//! Coercion is therefore a visible property of the leaf rather than an
//! incidental side effect of calling it.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

/// Successful outcome of applying a leaf to a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Checked {
    /// The value passes unchanged.
    Accepted,
    /// The value passes and converts to the carried value.
    Coerced(Value),
}

impl Checked {
    /// Resolve the outcome into the value the matcher should produce.
    ///
    /// `Accepted` yields a copy of `original`.
    pub fn into_value(self, original: &Value) -> Value {
        match self {
            Checked::Accepted => original.clone(),
            Checked::Coerced(value) => value,
        }
    }
}

/// Rejection raised by a leaf.
///
/// `kind` is a short machine-friendly category (`TypeMismatch`,
/// `InvalidValue`, or anything a custom leaf chooses) and `message` is the
/// human-readable detail. Both appear verbatim in rendered failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct LeafError {
    kind: Cow<'static, str>,
    message: String,
}

impl LeafError {
    /// Kind used when the value has the wrong JSON type for the leaf.
    pub const TYPE_MISMATCH: &'static str = "TypeMismatch";
    /// Kind used when the value has the right type but an unacceptable content.
    pub const INVALID_VALUE: &'static str = "InvalidValue";

    /// Create an error with an arbitrary kind.
    pub fn new(kind: impl Into<Cow<'static, str>>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// The value has the wrong JSON type.
    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::new(Self::TYPE_MISMATCH, message)
    }

    /// The value has an unacceptable content.
    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::new(Self::INVALID_VALUE, message)
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result of applying a leaf.
pub type LeafResult = Result<Checked, LeafError>;

type CheckFn = dyn Fn(&Value) -> LeafResult + Send + Sync;

/// A named checking operation.
///
/// Cloning is cheap: the operation is shared behind an `Arc`, so a leaf can
/// appear in many schemas and be invoked from many threads at once.
#[derive(Clone)]
pub struct Leaf {
    name: Cow<'static, str>,
    check: Arc<CheckFn>,
}

impl Leaf {
    /// Build a leaf from a function honoring the full two-outcome contract.
    pub fn new<F>(name: impl Into<Cow<'static, str>>, check: F) -> Self
    where
        F: Fn(&Value) -> LeafResult + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            check: Arc::new(check),
        }
    }

    /// Build a coercing leaf: every accepted value is replaced by the
    /// function's return value.
    pub fn coercing<F>(name: impl Into<Cow<'static, str>>, convert: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, LeafError> + Send + Sync + 'static,
    {
        Self::new(name, move |value| convert(value).map(Checked::Coerced))
    }

    /// Build a signal-only leaf from a boolean test.
    pub fn predicate<F>(name: impl Into<Cow<'static, str>>, test: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        let name = name.into();
        let label = name.clone();
        Self::new(name, move |value| {
            if test(value) {
                Ok(Checked::Accepted)
            } else {
                Err(LeafError::invalid_value(format!(
                    "{value} does not satisfy {label}"
                )))
            }
        })
    }

    /// Display name used when rendering schemas.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply the leaf to a candidate value.
    pub fn check(&self, value: &Value) -> LeafResult {
        (self.check)(value)
    }
}

impl fmt::Debug for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Leaf").field(&self.name).finish()
    }
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
