//! # contour-api: Schema-Checked JSON Services
//!
//! Publishes plain `Value -> Value` functions as HTTP endpoints whose
//! requests and responses are validated against contour schemas. Built on
//! Axum/Tower/Tokio.
//!
//! ## Routes
//!
//! - `POST <route>` for every registered service
//! - `/health/*`: Kubernetes health probes
//!
//! ## Middleware Stack (Tower)
//!
//! TraceLayer → DefaultBodyLimit → service pipeline
//!
//! ## Crate Policy
//!
//! - No validation logic here; every check is delegated to `contour-core`.
//! - All errors map to structured HTTP responses via `AppError`.

pub mod demo;
pub mod error;
pub mod service;
pub mod state;

pub use error::AppError;
pub use service::{RegistryError, ServiceDefinition, ServiceError, ServiceRegistry};
pub use state::{AppConfig, ValidationMode};

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

/// Assemble the application router from a service registry.
///
/// Health probes are mounted outside the body limit so they stay reachable
/// whatever the configured limit.
pub fn app(registry: ServiceRegistry, config: &AppConfig) -> Router {
    let service_count = registry.len();

    let services = registry
        .router()
        .layer(DefaultBodyLimit::max(config.body_limit))
        .layer(TraceLayer::new_for_http());

    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route(
            "/health/readiness",
            get(move || readiness(service_count)),
        );

    Router::new().merge(health).merge(services)
}

/// Liveness probe: the process is up.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: at least one service is published.
async fn readiness(service_count: usize) -> impl IntoResponse {
    if service_count == 0 {
        return (StatusCode::SERVICE_UNAVAILABLE, "no services registered").into_response();
    }
    (StatusCode::OK, "ready").into_response()
}
