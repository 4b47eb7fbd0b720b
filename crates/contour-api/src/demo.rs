//! # Demonstration Services
//!
//! Small services served by the `contour-api` binary, one per schema
//! variant family:
//!
//! - `POST /sum`: `[integer] -> integer`
//! - `POST /greet`: `{"name": string} -> {"greeting": string}`
//! - `POST /tally`: `{string: integer} -> integer`

use contour_core::leaves::{integer, string};
use contour_core::{Schema, SchemaError, Shape, ValidationOptions};
use serde_json::{json, Value};
use thiserror::Error;

use crate::service::{RegistryError, ServiceDefinition, ServiceError, ServiceRegistry};

/// Failure while assembling the demonstration registry.
#[derive(Error, Debug)]
pub enum DemoError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// A registry holding the three demonstration services.
///
/// # Errors
///
/// Returns [`DemoError`] if a schema or route is malformed.
pub fn registry(options: ValidationOptions) -> Result<ServiceRegistry, DemoError> {
    let mut registry = ServiceRegistry::new(options);

    registry.register(
        ServiceDefinition::new("/sum", sum)
            .input(Schema::compile(&Shape::list([integer()]))?)
            .output(integer().into()),
    )?;

    registry.register(
        ServiceDefinition::new("/greet", greet)
            .input(Schema::compile(&Shape::record([("name", string())]))?)
            .output(Schema::compile(&Shape::record([("greeting", string())]))?),
    )?;

    registry.register(
        ServiceDefinition::new("/tally", tally)
            .input(Schema::compile(&Shape::map_of(string(), integer()))?)
            .output(integer().into()),
    )?;

    Ok(registry)
}

fn sum(value: Value) -> Result<Value, ServiceError> {
    let items = value
        .as_array()
        .ok_or_else(|| ServiceError::new("expected a list of integers"))?;
    checked_total(items.iter())
}

fn greet(value: Value) -> Result<Value, ServiceError> {
    let name = value
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| ServiceError::new("expected a name"))?;
    Ok(json!({ "greeting": format!("Hello, {name}!") }))
}

fn tally(value: Value) -> Result<Value, ServiceError> {
    let counts = value
        .as_object()
        .ok_or_else(|| ServiceError::new("expected a map of counts"))?;
    checked_total(counts.values())
}

fn checked_total<'a>(items: impl Iterator<Item = &'a Value>) -> Result<Value, ServiceError> {
    items
        .map(|v| {
            v.as_i64()
                .ok_or_else(|| ServiceError::new(format!("{v} is not a 64-bit integer")))
        })
        .try_fold(0i64, |acc, n| {
            acc.checked_add(n?)
                .ok_or_else(|| ServiceError::new("total overflows a 64-bit integer"))
        })
        .map(Value::from)
}
