//! Engine error types.

/// Engine error type.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("engine is already running")]
    AlreadyRunning,
    #[error("engine is not running")]
    NotRunning,
    #[error("storage error: {0}")]
    Storage(String),
}
