//! Error types for geometric operations

use thiserror::Error;

/// Errors raised by part, face and assembly operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CycadError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl CycadError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub(crate) fn precondition(msg: impl Into<String>) -> Self {
        Self::PreconditionFailed(msg.into())
    }

    pub(crate) fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

/// Result type for geometric operations
pub type CycadResult<T> = Result<T, CycadError>;
