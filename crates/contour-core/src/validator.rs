//! # Validator Factory
//!
//! A [`Validator`] binds a compiled schema to a display name, an enable
//! predicate and a coercion flag. It is immutable after construction and
//! may be shared freely across threads.
//!
//! ## Coercion
//!
//! Leaves always run, so a value that no leaf accepts is rejected whatever
//! the flag says. The flag only selects what a successful call returns:
//!
//! - `coerce = true`: the rebuilt value with every leaf conversion applied.
//! - `coerce = false`: the caller's original value, untouched.
//!
//! ## Predicates
//!
//! The predicate is evaluated before every call. When it yields `false` the
//! call returns its input unchanged without inspecting it. Bypassed calls are
//! logged at `debug` so they are never mistaken for successful validations.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::SchemaError;
use crate::failure::ValidationError;
use crate::matchers;
use crate::schema::{Schema, Shape};

type PredicateFn = dyn Fn() -> bool + Send + Sync;

/// Zero-argument gate deciding whether a validator runs.
#[derive(Clone)]
pub struct Predicate(Arc<PredicateFn>);

impl Predicate {
    /// Validate on every call.
    pub fn always() -> Self {
        Self::from_fn(|| true)
    }

    /// Never validate.
    pub fn never() -> Self {
        Self::from_fn(|| false)
    }

    /// Validate only in builds with debug assertions enabled.
    pub fn when_debugging() -> Self {
        Self::from_fn(|| cfg!(debug_assertions))
    }

    /// Validate unless the environment variable `var` is `"false"` or `"0"`.
    ///
    /// The variable is read on every call, so toggling it takes effect
    /// without rebuilding the validator. An unset variable enables
    /// validation.
    pub fn env_flag(var: impl Into<String>) -> Self {
        Self::env_flag_with(var, |name| std::env::var(name).ok())
    }

    /// [`Predicate::env_flag`] with a caller-supplied variable lookup.
    pub fn env_flag_with<L>(var: impl Into<String>, lookup: L) -> Self
    where
        L: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        let var = var.into();
        Self::from_fn(move || {
            lookup(&var)
                .map(|v| {
                    let v = v.trim().to_lowercase();
                    v != "false" && v != "0"
                })
                .unwrap_or(true)
        })
    }

    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn evaluate(&self) -> bool {
        (self.0)()
    }
}

impl Default for Predicate {
    fn default() -> Self {
        Self::always()
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// A named, reusable validation operation.
#[derive(Debug, Clone)]
pub struct Validator {
    schema: Schema,
    name: String,
    predicate: Predicate,
    coerce: bool,
}

impl Validator {
    /// A validator that always runs and returns the original value.
    pub fn new(schema: Schema, name: impl Into<String>) -> Self {
        Self {
            schema,
            name: name.into(),
            predicate: Predicate::always(),
            coerce: false,
        }
    }

    /// Compile `shape` and wrap it.
    ///
    /// # Errors
    ///
    /// Returns the [`SchemaError`] raised by [`Schema::compile`].
    pub fn from_shape(shape: &Shape, name: impl Into<String>) -> Result<Self, SchemaError> {
        Ok(Self::new(Schema::compile(shape)?, name))
    }

    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicate = predicate;
        self
    }

    /// Choose whether successful calls return the coerced value.
    pub fn coerce(mut self, coerce: bool) -> Self {
        self.coerce = coerce;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn is_coercing(&self) -> bool {
        self.coerce
    }

    /// Validate `value`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming this validator when the value
    /// does not satisfy the schema. Never fails while the predicate is off.
    pub fn validate(&self, value: Value) -> Result<Value, ValidationError> {
        if !self.predicate.evaluate() {
            tracing::debug!(validator = %self.name, "validation bypassed by predicate");
            return Ok(value);
        }

        match matchers::validate(&self.schema, &value) {
            Ok(coerced) if self.coerce => Ok(coerced),
            Ok(_) => Ok(value),
            Err(failure) => {
                tracing::debug!(
                    validator = %self.name,
                    kind = failure.cause().kind(),
                    at = %failure.rendered_path(),
                    "validation failed"
                );
                Err(failure.into_error(Some(&self.name), &self.schema, &value))
            }
        }
    }
}

/// Build a validator from its four parts.
///
/// A missing predicate means "always validate".
pub fn make_validator(
    schema: Schema,
    name: impl Into<String>,
    predicate: Option<Predicate>,
    coerce: bool,
) -> Validator {
    Validator::new(schema, name)
        .with_predicate(predicate.unwrap_or_default())
        .coerce(coerce)
}

/// Validate without a named validator, returning the coerced value.
///
/// # Errors
///
/// Returns a [`ValidationError`] rendered with the `unnamed` label.
pub fn check(schema: &Schema, value: &Value) -> Result<Value, ValidationError> {
    matchers::validate(schema, value).map_err(|failure| failure.into_error(None, schema, value))
}
