//! # Service Registry
//!
//! A service is a JSON-in, JSON-out function published at a route. The
//! registry wraps each handler in an input validator and an output
//! validator and mounts it as a `POST` endpoint:
//!
//! 1. decode the request body as JSON,
//! 2. validate it against the input schema,
//! 3. run the handler on the validated value,
//! 4. validate the handler's result against the output schema,
//! 5. respond with the result.
//!
//! A service without a declared schema accepts anything on that side.

use std::sync::Arc;

use axum::body::Bytes;
use axum::routing::post;
use axum::{Json, Router};
use contour_core::{validated, Schema, ValidatedFn, ValidationOptions};
use serde_json::Value;
use thiserror::Error;

use crate::error::AppError;

/// Failure reported by a service handler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ServiceError(String);

impl ServiceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Registry configuration error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Routes must be absolute, literal paths.
    #[error("route {route:?} {reason}")]
    InvalidRoute { route: String, reason: &'static str },

    /// Each route may be registered once.
    #[error("route {0:?} is already registered")]
    DuplicateRoute(String),
}

type Handler = Box<dyn Fn(Value) -> Result<Value, ServiceError> + Send + Sync>;

/// Everything needed to publish one service.
pub struct ServiceDefinition {
    pub route: String,
    pub input_schema: Option<Schema>,
    pub output_schema: Option<Schema>,
    handler: Handler,
}

impl ServiceDefinition {
    /// A service at `route` with no schemas yet.
    pub fn new<F>(route: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Value) -> Result<Value, ServiceError> + Send + Sync + 'static,
    {
        Self {
            route: route.into(),
            input_schema: None,
            output_schema: None,
            handler: Box::new(handler),
        }
    }

    pub fn input(mut self, schema: Schema) -> Self {
        self.input_schema = Some(schema);
        self
    }

    pub fn output(mut self, schema: Schema) -> Self {
        self.output_schema = Some(schema);
        self
    }
}

impl std::fmt::Debug for ServiceDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceDefinition")
            .field("route", &self.route)
            .field("input_schema", &self.input_schema)
            .field("output_schema", &self.output_schema)
            .finish_non_exhaustive()
    }
}

struct Service {
    route: String,
    call: ValidatedFn<Handler>,
}

/// The set of services an application publishes.
pub struct ServiceRegistry {
    options: ValidationOptions,
    services: Vec<Arc<Service>>,
}

impl ServiceRegistry {
    /// An empty registry whose validators follow `options`.
    pub fn new(options: ValidationOptions) -> Self {
        Self {
            options,
            services: Vec::new(),
        }
    }

    /// Add a service.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the route is not an absolute literal
    /// path or is already taken.
    pub fn register(&mut self, definition: ServiceDefinition) -> Result<(), RegistryError> {
        let ServiceDefinition {
            route,
            input_schema,
            output_schema,
            handler,
        } = definition;

        if let Err(reason) = check_route(&route) {
            return Err(RegistryError::InvalidRoute { route, reason });
        }
        if self.services.iter().any(|s| s.route == route) {
            return Err(RegistryError::DuplicateRoute(route));
        }

        tracing::info!(
            %route,
            input = %describe(&input_schema),
            output = %describe(&output_schema),
            "registered service"
        );
        let call = validated(
            route.clone(),
            input_schema,
            output_schema,
            self.options.clone(),
            handler,
        );
        self.services.push(Arc::new(Service { route, call }));
        Ok(())
    }

    /// Registered routes, in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &str> {
        self.services.iter().map(|s| s.route.as_str())
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Mount every service as a `POST` route.
    pub fn router(&self) -> Router {
        self.services.iter().fold(Router::new(), |router, service| {
            let route = service.route.clone();
            let service = Arc::clone(service);
            router.route(&route, post(move |body: Bytes| invoke(service, body)))
        })
    }
}

impl std::fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("options", &self.options)
            .field("routes", &self.routes().collect::<Vec<_>>())
            .finish()
    }
}

/// Services are published at fixed paths; the router would panic on
/// capture syntax, so it is refused here instead.
fn check_route(route: &str) -> Result<(), &'static str> {
    if !route.starts_with('/') {
        return Err("must start with '/'");
    }
    if route.contains(['{', '}']) {
        return Err("must not contain '{' or '}'");
    }
    if route
        .split('/')
        .any(|segment| segment.starts_with(':') || segment.starts_with('*'))
    {
        return Err("must not have segments starting with ':' or '*'");
    }
    Ok(())
}

fn describe(schema: &Option<Schema>) -> String {
    schema
        .as_ref()
        .map_or_else(|| "any".to_string(), ToString::to_string)
}

async fn invoke(service: Arc<Service>, body: Bytes) -> Result<Json<Value>, AppError> {
    let candidate: Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("request body is not valid JSON: {e}")))?;
    let output = service.call.call(candidate)?;
    tracing::debug!(route = %service.route, "service call succeeded");
    Ok(Json(output))
}
