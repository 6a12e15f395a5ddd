//! Geocoding service seam

use crate::error::GeocodeError;
use async_trait::async_trait;
use rapport_core::{Coordinate, PostalAddress};
use serde::{Deserialize, Serialize};

/// A candidate match returned by a geocoding service.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Placemark {
    /// Resolved coordinate, if the candidate carries one
    pub coordinate: Option<Coordinate>,
    /// Service-provided name
    pub name: Option<String>,
}

impl Placemark {
    /// A placemark at `coordinate`.
    pub fn at(coordinate: Coordinate) -> Self {
        Self {
            coordinate: Some(coordinate),
            name: None,
        }
    }
}

/// External forward-geocoding service.
#[async_trait]
pub trait GeocodingService: Send + Sync {
    /// Resolve a structured address into candidate placemarks.
    async fn resolve(&self, address: &PostalAddress) -> Result<Vec<Placemark>, GeocodeError>;
}

/// Service used when no geocoder is configured. Every request fails with an
/// uncached error so nothing is remembered.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableGeocodingService;

#[async_trait]
impl GeocodingService for UnavailableGeocodingService {
    async fn resolve(&self, _address: &PostalAddress) -> Result<Vec<Placemark>, GeocodeError> {
        Err(GeocodeError::Unknown {
            reason: "no geocoding service configured".to_string(),
        })
    }
}
