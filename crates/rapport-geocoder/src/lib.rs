//! # Rapport Geocoder
//!
//! Turns postal addresses into coordinates under an external service quota.
//!
//! - Results (including verified "no result" answers) are memoized in a
//!   [`rapport_store::PersistentCache`] keyed by the address id.
//! - Outbound requests are serialized: at most one is in flight.
//! - Request starts are paced at least `min_interval` apart.
//! - Concurrent lookups of the same address share one request.
//! - The number of queued or running lookups is reported to observers every
//!   time it changes.

pub mod error;
pub mod geocoder;
pub mod service;

pub use error::GeocodeError;
pub use geocoder::{pacing_delay, Geocoder, QueueObserver, DEFAULT_MIN_INTERVAL_MS};
pub use service::{GeocodingService, Placemark, UnavailableGeocodingService};
