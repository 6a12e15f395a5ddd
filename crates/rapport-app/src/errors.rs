//! Categorized application errors
//!
//! Every fallible workflow returns [`AppError`]. Frontends route on
//! [`ErrorCategory`] rather than on individual variants.

use rapport_core::CoreError;
use rapport_store::StoreError;
use std::fmt;
use thiserror::Error;

use crate::config::ConfigError;

// ============================================================================
// Error Categories
// ============================================================================

/// High-level error categories for frontend error handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// User input validation errors (correctable by user)
    Input,
    /// Configuration errors (correctable by modifying settings)
    Config,
    /// Missing system permission (contacts, calendar, location)
    Permission,
    /// Resource not found errors
    NotFound,
    /// Local persistence failures
    Storage,
    /// External collaborator failures (often transient)
    External,
}

impl ErrorCategory {
    /// Whether the user can fix this by acting (input, settings, permissions).
    #[must_use]
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, Self::Input | Self::Config | Self::Permission)
    }

    /// Whether a retry may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::External | Self::NotFound)
    }

    /// Short label for this category.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Input => "Input",
            Self::Config => "Config",
            Self::Permission => "Permission",
            Self::NotFound => "Not Found",
            Self::Storage => "Storage",
            Self::External => "External",
        }
    }

    /// Hint for the user on how to resolve this category of error.
    #[must_use]
    pub fn resolution_hint(&self) -> &'static str {
        match self {
            Self::Input => "Check your input and try again",
            Self::Config => "Review your configuration settings",
            Self::Permission => "Grant access in system settings",
            Self::NotFound => "The contact may have been deleted elsewhere",
            Self::Storage => "Check available disk space",
            Self::External => "Try again in a moment",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// Source Errors
// ============================================================================

/// Failures reported by the contact, calendar and location sources.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// Access to the source was not granted or was revoked.
    #[error("Access to {source_name} denied")]
    PermissionDenied {
        /// Which source refused
        source_name: String,
    },

    /// The addressed record does not exist.
    #[error("{what} not found")]
    NotFound {
        /// Description of the missing record
        what: String,
    },

    /// Any other backend failure.
    #[error("Source backend failed: {reason}")]
    Backend {
        /// Backend-provided detail
        reason: String,
    },
}

impl SourceError {
    /// Permission failure for `source_name`.
    pub fn denied(source_name: impl Into<String>) -> Self {
        Self::PermissionDenied {
            source_name: source_name.into(),
        }
    }

    /// Missing-record failure.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Generic backend failure.
    pub fn backend(reason: impl Into<String>) -> Self {
        Self::Backend {
            reason: reason.into(),
        }
    }
}

// ============================================================================
// Application Errors
// ============================================================================

/// Categorized application errors.
#[derive(Debug, Error)]
pub enum AppError {
    /// A contact, calendar or location source failed.
    #[error("{operation} failed: {source}")]
    Source {
        /// Workflow that was running
        operation: &'static str,
        /// Underlying failure
        #[source]
        source: SourceError,
    },

    /// A local store could not be written.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Caller supplied invalid input.
    #[error(transparent)]
    Input(#[from] CoreError),
}

impl AppError {
    /// Wrap a source failure raised during `operation`.
    pub fn source_failed(operation: &'static str, source: SourceError) -> Self {
        Self::Source { operation, source }
    }

    /// Classify for frontend routing.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Source { source, .. } => match source {
                SourceError::PermissionDenied { .. } => ErrorCategory::Permission,
                SourceError::NotFound { .. } => ErrorCategory::NotFound,
                SourceError::Backend { .. } => ErrorCategory::External,
            },
            Self::Store(_) => ErrorCategory::Storage,
            Self::Config(_) => ErrorCategory::Config,
            Self::Input(_) => ErrorCategory::Input,
        }
    }

    /// Short error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Source { source, .. } => match source {
                SourceError::PermissionDenied { .. } => "SOURCE_DENIED",
                SourceError::NotFound { .. } => "SOURCE_NOT_FOUND",
                SourceError::Backend { .. } => "SOURCE_BACKEND",
            },
            Self::Store(StoreError::Io { .. }) => "STORE_IO",
            Self::Store(StoreError::Serialization { .. }) => "STORE_SERIALIZE",
            Self::Config(_) => "CONFIG",
            Self::Input(_) => "INPUT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_errors_are_user_correctable() {
        let err = AppError::source_failed("add address", SourceError::denied("contacts"));
        assert_eq!(err.category(), ErrorCategory::Permission);
        assert!(err.category().is_user_correctable());
        assert_eq!(err.code(), "SOURCE_DENIED");
        assert_eq!(
            err.to_string(),
            "add address failed: Access to contacts denied"
        );
    }

    #[test]
    fn backend_errors_are_transient() {
        let err = AppError::source_failed("sync contacts", SourceError::backend("timeout"));
        assert!(err.category().is_transient());
        assert!(!err.category().is_user_correctable());
    }

    #[test]
    fn input_errors_wrap_core_errors() {
        let err: AppError = CoreError::invalid("empty address").into();
        assert_eq!(err.category(), ErrorCategory::Input);
    }
}
