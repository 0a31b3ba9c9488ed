use thiserror::Error;

/// Errors surfaced by platform implementations
#[derive(Error, Debug)]
pub enum PlatformError {
    /// The output subsystem rejected the requested session configuration
    #[error("failed to configure output subsystem for external playback: {0}")]
    OutputConfiguration(String),

    /// The platform could not construct a playback engine for the source
    #[error("failed to create playback engine: {0}")]
    EngineCreation(String),
}

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;
