//! Core error types

use thiserror::Error;

/// Errors raised by the pure domain layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A raw affinity value did not name a known rating.
    #[error("Unknown affinity '{raw}'")]
    UnknownAffinity {
        /// The rejected raw value
        raw: String,
    },

    /// Input failed validation.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Why the input was rejected
        reason: String,
    },
}

impl CoreError {
    /// Shorthand for [`CoreError::InvalidInput`].
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}
