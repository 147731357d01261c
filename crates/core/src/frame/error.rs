use thiserror::Error;

/// Errors that can occur when exchanging messages with an embedded frame.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("Malformed frame message: {0}")]
    Malformed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for frame operations.
pub type Result<T> = std::result::Result<T, FrameError>;
