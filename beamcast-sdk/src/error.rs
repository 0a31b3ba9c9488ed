use thiserror::Error;

/// Errors that can occur in the route coordinator
///
/// Argument-shape errors are local and immediate; runtime and engine
/// failures are asynchronous and observational, reported through the event
/// channel rather than raised here. Nothing in this crate is fatal to the
/// host: every failure state is recoverable via `stop` followed by `start`.
#[derive(Error, Debug)]
pub enum CoordinatorError {
    /// A command argument was malformed or missing; no state change occurred
    #[error("invalid argument `{what}`: {reason}")]
    InvalidArgument { what: &'static str, reason: String },

    /// The coordinator's worker thread is gone; reads fall back to defaults
    #[error("coordinator worker is unavailable")]
    WorkerUnavailable,

    /// The platform rejected coordinator setup
    #[error("platform setup failed: {0}")]
    Platform(#[from] beamcast_platform::PlatformError),
}

impl CoordinatorError {
    /// Machine-readable kind for the marshaling façade
    pub fn kind(&self) -> &'static str {
        match self {
            CoordinatorError::InvalidArgument { .. } => "invalid_argument",
            CoordinatorError::WorkerUnavailable => "worker_unavailable",
            CoordinatorError::Platform(_) => "platform",
        }
    }
}

/// Result type for coordinator operations
pub type Result<T> = std::result::Result<T, CoordinatorError>;
