//! Geocode error classification

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure classes reported by a geocoding service.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeocodeError {
    /// Network-class failure, typically the service throttling us.
    #[error("Geocoding service rate limited: {reason}")]
    RateLimited {
        /// Service-provided detail
        reason: String,
    },

    /// The service verified that the address does not resolve.
    #[error("No geocoding result for address")]
    NoResult,

    /// Anything else.
    #[error("Geocoding failed: {reason}")]
    Unknown {
        /// Service-provided detail
        reason: String,
    },
}

impl GeocodeError {
    /// Only verified non-resolution is worth remembering; everything else is
    /// retried on next demand.
    pub fn is_cacheable(&self) -> bool {
        matches!(self, Self::NoResult)
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RateLimited { .. } => "rate_limited",
            Self::NoResult => "no_result",
            Self::Unknown { .. } => "unknown",
        }
    }
}
