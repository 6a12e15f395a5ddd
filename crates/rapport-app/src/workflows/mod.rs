//! # Workflows
//!
//! The effect layer. Each workflow performs its I/O first (external store,
//! affinity file, geocoder) and only then dispatches a pure action carrying
//! the outcome. A failed write leaves the state untouched.

pub mod access;
pub mod affinity;
pub mod contacts;
pub mod geocode;
pub mod sync;
pub mod watch;

use crate::context::AppContext;
use crate::errors::{AppError, SourceError};
use rapport_core::Contact;
use tracing::error;

pub use access::{
    refresh_authorizations, request_calendar_access, request_contacts_access,
    request_location_access,
};
pub use affinity::set_person_affinity;
pub use contacts::{
    add_postal_address, assign_address_from_search, delete_contact, delete_postal_address,
    update_photo, update_postal_address,
};
pub use geocode::{apply_resolved_coordinate, geocode_pending_addresses};
pub use sync::{sync_all, sync_calendar, sync_contacts};
pub use watch::watch_sources;

pub(crate) fn source_failure(operation: &'static str, e: SourceError) -> AppError {
    error!(operation, error = %e, "Source operation failed");
    AppError::source_failed(operation, e)
}

/// Fill unresolved addresses from the geocode cache. Never hits the network.
pub(crate) fn attach_cached_coordinates(ctx: &AppContext, contact: &mut Contact) {
    for address in contact
        .postal_addresses
        .iter_mut()
        .filter(|a| !a.is_located() && !a.is_blank())
    {
        address.coordinate = ctx.geocoder().get_cached(address);
    }
}
