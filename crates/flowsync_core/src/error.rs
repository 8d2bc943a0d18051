//! Validation errors for the domain model.

use thiserror::Error;

/// Result type for core validation.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors produced while validating domain objects.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Flow name is empty or otherwise unusable.
    #[error("invalid flow name: {reason}")]
    InvalidFlowName {
        /// Why the name was rejected.
        reason: String,
    },

    /// Runtime spec carries an unusable value.
    #[error("invalid runtime spec: {reason}")]
    InvalidRuntimeSpec {
        /// Why the spec was rejected.
        reason: String,
    },

    /// Sink spec carries an unusable value.
    #[error("invalid sink spec: {reason}")]
    InvalidSinkSpec {
        /// Why the spec was rejected.
        reason: String,
    },
}
