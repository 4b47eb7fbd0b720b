//! # contour-api Server Entry Point
//!
//! Serves the demonstration services over HTTP.
//!
//! ## Usage
//!
//! ```bash
//! contour-api --port 8080 --validation always
//! CONTOUR_VALIDATION=never contour-api -v
//! ```

use std::net::SocketAddr;

use anyhow::Context;
use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use contour_api::state::{AppConfig, ValidationMode, DEFAULT_BODY_LIMIT};

/// contour-api: schema-checked JSON services.
#[derive(Parser, Debug)]
#[command(name = "contour-api", version, about)]
struct Cli {
    /// Port to bind the HTTP server to.
    #[arg(long, env = "CONTOUR_PORT", default_value_t = 8080)]
    port: u16,

    /// When request and response validation runs.
    #[arg(long, env = "CONTOUR_VALIDATION", value_enum, default_value_t = ValidationMode::Always)]
    validation: ValidationMode,

    /// Validate without converting payloads to their coerced form.
    #[arg(long, env = "CONTOUR_NO_COERCE")]
    no_coerce: bool,

    /// Maximum request body size in bytes.
    #[arg(long, env = "CONTOUR_BODY_LIMIT", default_value_t = DEFAULT_BODY_LIMIT)]
    body_limit: usize,

    /// Enable verbose output. Repeat for more verbosity (-v, -vv).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn config(&self) -> AppConfig {
        AppConfig {
            port: self.port,
            validation: self.validation,
            coerce: !self.no_coerce,
            body_limit: self.body_limit,
        }
    }
}

/// `RUST_LOG` wins when set; otherwise `-v` raises the level.
fn log_filter(verbose: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("info"),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose))
        .init();

    let config = cli.config();
    tracing::info!(?config, "starting contour-api");

    let registry = contour_api::demo::registry(config.validation_options())
        .context("failed to build demonstration services")?;
    let app = contour_api::app(registry, &config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("contour-api listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("contour-api stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
