//! # Validated Functions
//!
//! Wraps a fallible `Value -> Value` function with an input validator and an
//! output validator, so the function body only ever sees data that already
//! satisfies its declared input shape and callers only ever see data that
//! satisfies its declared output shape.
//!
//! The validators are named `"input to <name>"` and `"output from <name>"`;
//! a rendered failure therefore tells the reader which side of the contract
//! was broken.

use serde_json::Value;
use thiserror::Error;

use crate::failure::ValidationError;
use crate::leaves;
use crate::schema::Schema;
use crate::validator::{Predicate, Validator};

/// Policy shared by the two validators of a wrapped function.
#[derive(Debug, Clone)]
pub struct ValidationOptions {
    pub predicate: Predicate,
    pub coerce: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            predicate: Predicate::always(),
            coerce: true,
        }
    }
}

/// The stage at which a wrapped call failed.
#[derive(Error, Debug)]
pub enum CallError<E> {
    /// The argument did not satisfy the input schema.
    #[error(transparent)]
    Input(ValidationError),

    /// The wrapped function itself failed.
    #[error("{0}")]
    Handler(E),

    /// The function returned a value outside its output schema.
    #[error(transparent)]
    Output(ValidationError),
}

/// A function guarded by input and output validators.
#[derive(Debug, Clone)]
pub struct ValidatedFn<F> {
    name: String,
    input: Validator,
    output: Validator,
    func: F,
}

impl<F> ValidatedFn<F> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input(&self) -> &Validator {
        &self.input
    }

    pub fn output(&self) -> &Validator {
        &self.output
    }

    /// Validate `value`, run the function, then validate its result.
    ///
    /// # Errors
    ///
    /// Returns [`CallError`] tagged with the failing stage.
    pub fn call<E>(&self, value: Value) -> Result<Value, CallError<E>>
    where
        F: Fn(Value) -> Result<Value, E>,
    {
        let input = self.input.validate(value).map_err(CallError::Input)?;
        let result = (self.func)(input).map_err(CallError::Handler)?;
        self.output.validate(result).map_err(CallError::Output)
    }
}

/// Wrap `func` under `name`. Absent schemas accept anything.
pub fn validated<F>(
    name: impl Into<String>,
    input: Option<Schema>,
    output: Option<Schema>,
    options: ValidationOptions,
    func: F,
) -> ValidatedFn<F> {
    let name = name.into();
    let guard = |schema: Option<Schema>, label: String| {
        Validator::new(schema.unwrap_or_else(|| leaves::any().into()), label)
            .with_predicate(options.predicate.clone())
            .coerce(options.coerce)
    };
    ValidatedFn {
        input: guard(input, format!("input to {name}")),
        output: guard(output, format!("output from {name}")),
        name,
        func,
    }
}
