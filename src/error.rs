//! Application error types.

use thiserror::Error;

/// Application-level errors for Kinegraph.
#[derive(Error, Debug)]
pub enum CoreError {
    // Input-source errors
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("initialization failed: {0}")]
    InitializationFailed(String),

    #[error("camera stream error: {0}")]
    StreamError(String),

    /// An initialization attempt was abandoned because a newer one started.
    /// Internal: callers discard the result silently, never surface it.
    #[error("initialization superseded by a newer attempt")]
    Superseded,

    // Pipeline errors
    #[error("frame processing error: {0}")]
    ProcessingError(String),

    // Worker errors
    #[error("{0} worker is gone")]
    WorkerGone(&'static str),

    // Config errors
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl CoreError {
    /// Short machine-readable code, surfaced through controller status.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::PermissionDenied => "PERMISSION_DENIED",
            CoreError::InitializationFailed(_) => "INIT_FAILED",
            CoreError::StreamError(_) => "STREAM_ERROR",
            CoreError::Superseded => "SUPERSEDED",
            CoreError::ProcessingError(_) => "PROCESSING_ERROR",
            CoreError::WorkerGone(_) => "WORKER_GONE",
            CoreError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Whether the error should be shown as a permission problem rather
    /// than a generic failure. Permission refusals are terminal; generic
    /// failures may be retried by calling `initialize` again.
    pub fn is_permission(&self) -> bool {
        matches!(self, CoreError::PermissionDenied)
    }
}
