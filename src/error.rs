//! Error types for mjpeg-reader.

use thiserror::Error;

/// Main error type for all reader operations.
#[derive(Debug, Error)]
pub enum MjpegError {
    /// `start()` was called while a byte source is already attached.
    #[error("Reader already started")]
    AlreadyActive,

    /// The frame being accumulated would exceed the configured capacity.
    #[error("Input data is too large: {attempted} bytes exceeds maximum {capacity}")]
    Overflow {
        /// Length the buffer would have reached had the append succeeded.
        attempted: usize,
        /// Configured maximum frame size.
        capacity: usize,
    },

    /// A start marker arrived while the accumulation buffer still held data.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// I/O error reported by the byte source.
    #[error("Source error: {0}")]
    Source(#[from] std::io::Error),

    /// Invalid configuration value.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// JSON configuration could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification of a [`MjpegError`], as carried by error events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// See [`MjpegError::AlreadyActive`].
    AlreadyActive,
    /// See [`MjpegError::Overflow`].
    Overflow,
    /// See [`MjpegError::InvariantViolation`].
    InvariantViolation,
    /// See [`MjpegError::Source`].
    Source,
    /// Configuration errors ([`MjpegError::InvalidConfig`], [`MjpegError::Json`]).
    Config,
}

impl MjpegError {
    /// Get the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MjpegError::AlreadyActive => ErrorKind::AlreadyActive,
            MjpegError::Overflow { .. } => ErrorKind::Overflow,
            MjpegError::InvariantViolation(_) => ErrorKind::InvariantViolation,
            MjpegError::Source(_) => ErrorKind::Source,
            MjpegError::InvalidConfig(_) | MjpegError::Json(_) => ErrorKind::Config,
        }
    }
}

/// Result type alias using MjpegError.
pub type Result<T> = std::result::Result<T, MjpegError>;
