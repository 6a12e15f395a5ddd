//! # Geography
//!
//! Coordinates, visible map regions, and great-circle distance.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters.
const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Fraction of the latitude span the focused point sits above the region center.
///
/// The bottom sheet covers the lower part of the map, so the center is pushed
/// south of the target by this fraction of the span.
pub const CENTER_OFFSET_FRACTION: f64 = 1.0 / 6.0;

/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are finite and within their valid ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Great-circle distance to `other` in meters (haversine).
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_METERS * c
    }
}

/// Angular extent of a map region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// North-south extent in degrees
    pub latitude_delta: f64,
    /// East-west extent in degrees
    pub longitude_delta: f64,
}

impl Span {
    /// Create a span.
    pub const fn new(latitude_delta: f64, longitude_delta: f64) -> Self {
        Self {
            latitude_delta,
            longitude_delta,
        }
    }

    /// Clamp each delta to at most `max_delta`. Never widens.
    pub fn clamped_to(&self, max_delta: f64) -> Self {
        Self {
            latitude_delta: self.latitude_delta.min(max_delta),
            longitude_delta: self.longitude_delta.min(max_delta),
        }
    }
}

/// The visible map region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Center of the region
    pub center: Coordinate,
    /// Visible extent
    pub span: Span,
}

impl Region {
    /// Create a region.
    pub const fn new(center: Coordinate, span: Span) -> Self {
        Self { center, span }
    }

    /// Recenter on `target`, zooming in to at most `focused_delta`.
    ///
    /// The span is clamped (never widened) and the center is shifted south by
    /// [`CENTER_OFFSET_FRACTION`] of the resulting latitude span.
    pub fn focused_on(&self, target: Coordinate, focused_delta: f64) -> Self {
        let span = self.span.clamped_to(focused_delta);
        let center = Coordinate::new(
            target.latitude - span.latitude_delta * CENTER_OFFSET_FRACTION,
            target.longitude,
        );
        Self { center, span }
    }
}
