//! # Service Configuration
//!
//! Settings resolved by the binary (flags and environment) and handed to the
//! library. The library never reads the environment itself.

use clap::ValueEnum;
use contour_core::{Predicate, ValidationOptions};

/// Default request body limit: 2 MiB.
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// When service validators run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ValidationMode {
    /// Validate every request and response.
    #[default]
    Always,
    /// Skip validation entirely; payloads pass through unchecked.
    Never,
    /// Validate only in debug builds.
    Debug,
}

impl ValidationMode {
    /// The validator predicate implementing this mode.
    pub fn predicate(self) -> Predicate {
        match self {
            ValidationMode::Always => Predicate::always(),
            ValidationMode::Never => Predicate::never(),
            ValidationMode::Debug => Predicate::when_debugging(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    pub validation: ValidationMode,
    /// Return coerced payloads to handlers and clients.
    pub coerce: bool,
    /// Maximum accepted request body, in bytes.
    pub body_limit: usize,
}

impl AppConfig {
    /// Validator policy for every registered service.
    pub fn validation_options(&self) -> ValidationOptions {
        ValidationOptions {
            predicate: self.validation.predicate(),
            coerce: self.coerce,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            validation: ValidationMode::default(),
            coerce: true,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}
