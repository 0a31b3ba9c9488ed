//! Logging infrastructure for the beamcast SDK
//!
//! Opt-in tracing-subscriber setup for embedding hosts. The default is
//! silent: a library must never contaminate its host's stdout/stderr
//! unless asked to.

use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Logging mode for different environments
#[derive(Debug, Clone, Copy)]
pub enum LoggingMode {
    /// No output - the default for embedding hosts
    Silent,
    /// Compact stderr output for development
    Development,
    /// Verbose diagnostics with source locations
    Debug,
}

/// Logging configuration error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("failed to initialize tracing subscriber: {0}")]
    TracingInit(String),
}

/// Initialize logging with the specified mode
///
/// Call early in the host's lifecycle, before constructing a coordinator.
///
/// # Environment Variables
///
/// - `BEAMCAST_LOG_LEVEL`: override log level (error, warn, info, debug, trace)
/// - `RUST_LOG`: standard fallback filter
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    match mode {
        LoggingMode::Silent => Ok(()),
        LoggingMode::Development => {
            let subscriber = Registry::default()
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_thread_ids(false)
                        .with_file(false)
                        .with_line_number(false)
                        .compact(),
                )
                .with(env_filter("info"));

            subscriber
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
        LoggingMode::Debug => {
            let subscriber = Registry::default()
                .with(
                    fmt::layer()
                        .pretty()
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .with(env_filter("debug"));

            subscriber
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
    }
}

/// Initialize logging from `BEAMCAST_LOG_MODE`
///
/// - "development" -> [`LoggingMode::Development`]
/// - "debug" -> [`LoggingMode::Debug`]
/// - anything else -> [`LoggingMode::Silent`]
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    let mode = match std::env::var("BEAMCAST_LOG_MODE").as_deref() {
        Ok("development") => LoggingMode::Development,
        Ok("debug") => LoggingMode::Debug,
        _ => LoggingMode::Silent,
    };

    init_logging(mode)
}

/// Whether a global subscriber has already been installed
pub fn is_initialized() -> bool {
    tracing::dispatcher::has_been_set()
}

fn env_filter(default_level: &str) -> EnvFilter {
    if let Ok(level) = std::env::var("BEAMCAST_LOG_LEVEL") {
        EnvFilter::new(level)
    } else if let Ok(rust_log) = std::env::var("RUST_LOG") {
        EnvFilter::new(rust_log)
    } else {
        EnvFilter::new(default_level)
    }
}
