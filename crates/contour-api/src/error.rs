//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Each stage of the service pipeline maps to its own status code:
//!
//! | Stage | Status | Code |
//! |---|---|---|
//! | body is not JSON | 400 | `BAD_REQUEST` |
//! | input schema rejected the body | 400 | `INVALID_INPUT` |
//! | handler failed | 500 | `HANDLER_ERROR` |
//! | output schema rejected the result | 500 | `INVALID_OUTPUT` |
//!
//! Server-side failures are logged in full but never described to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use contour_core::{CallError, ValidationError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::service::ServiceError;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "INVALID_INPUT").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Failure location and cause, present only for input failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// The request body could not be decoded (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The request body does not satisfy the service's input schema (400).
    #[error("{0}")]
    InvalidInput(ValidationError),

    /// The service handler failed (500). Never described to clients.
    #[error("handler error: {0}")]
    Handler(ServiceError),

    /// The handler's result does not satisfy the output schema (500).
    /// Never described to clients.
    #[error("{0}")]
    InvalidOutput(ValidationError),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            Self::Handler(_) => (StatusCode::INTERNAL_SERVER_ERROR, "HANDLER_ERROR"),
            Self::InvalidOutput(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INVALID_OUTPUT"),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::InvalidInput(err) => {
                let failure = err.failure();
                Some(serde_json::json!({
                    "validator": err.name(),
                    "path": failure.path(),
                    "rendered_path": failure.rendered_path(),
                    "kind": failure.cause().kind(),
                    "cause": failure.cause().message(),
                }))
            }
            _ => None,
        }
    }
}

impl From<CallError<ServiceError>> for AppError {
    fn from(err: CallError<ServiceError>) -> Self {
        match err {
            CallError::Input(e) => Self::InvalidInput(e),
            CallError::Handler(e) => Self::Handler(e),
            CallError::Output(e) => Self::InvalidOutput(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Handler(_) => "The service failed to process the request".to_string(),
            Self::InvalidOutput(_) => "The service produced an invalid response".to_string(),
            other => other.to_string(),
        };

        match &self {
            Self::Handler(_) => tracing::error!(error = %self, "service handler failed"),
            Self::InvalidOutput(_) => tracing::error!(error = %self, "output contract violated"),
            _ => tracing::warn!(error = %self, "rejected request"),
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: self.details(),
            },
        };

        (status, Json(body)).into_response()
    }
}
