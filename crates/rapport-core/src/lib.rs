//! # Rapport Core
//!
//! Pure domain layer for rapport. Nothing in this crate performs I/O apart
//! from the real time handler in [`effects`]; everything else is total and
//! deterministic so it can be driven from the reducer and from tests alike.
//!
//! - [`contact`]: contacts and their postal addresses
//! - [`calendar`]: calendar events fetched from the system calendar
//! - [`affinity`]: the closeness rating attached to each contact
//! - [`person`]: derived persons, person locations and overdue status
//! - [`search`]: ranked fuzzy search shared by contacts and persons
//! - [`geo`]: coordinates, map regions and great-circle distance

pub mod affinity;
pub mod calendar;
pub mod contact;
pub mod effects;
pub mod errors;
pub mod geo;
pub mod identifiers;
pub mod person;
pub mod search;

pub use affinity::{Affinity, AffinityMap};
pub use calendar::CalendarEvent;
pub use contact::{Contact, PostalAddress};
pub use effects::{PhysicalTimeEffects, RealTimeHandler};
pub use errors::CoreError;
pub use geo::{Coordinate, Region, Span};
pub use identifiers::{ContactId, EventId};
pub use person::{derive_persons, Person, PersonLocation};
pub use search::{rank, Searchable};
