//! Tracing subscriber setup.

use crate::constants::{DEFAULT_LOG_LEVEL, LOG_FORMAT_JSON};
use crate::errors::{AppError, AppResult};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level is `info`, or `debug` with
/// `verbose`. Output goes to stderr so command output on stdout stays clean.
///
/// # Errors
///
/// Returns `AppError::Config` if a subscriber is already installed.
pub fn init_tracing(format: &str, verbose: bool) -> AppResult<()> {
    let default_level = if verbose { "debug" } else { DEFAULT_LOG_LEVEL };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let result = if format == LOG_FORMAT_JSON {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };

    result.map_err(|e| AppError::Config(format!("Failed to initialize logging: {}", e)))
}
