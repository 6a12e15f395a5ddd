//! # Actions
//!
//! The closed set of state transitions. Data-sync actions carry the instant
//! they were produced at, so deriving persons inside the reducer stays pure.

use crate::state::{AuthorizationStatus, Detent};
use chrono::{DateTime, Utc};
use rapport_core::{
    Affinity, AffinityMap, CalendarEvent, Contact, ContactId, Coordinate, PersonLocation, Region,
};
use std::collections::BTreeSet;

/// Everything that can change [`AppState`](crate::state::AppState).
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ------------------------------------------------------------------------
    // Authorization
    // ------------------------------------------------------------------------
    /// Location permission changed
    LocationAccessChanged(AuthorizationStatus),
    /// Contact store permission changed
    ContactsAccessChanged(AuthorizationStatus),
    /// Calendar permission changed
    CalendarAccessChanged(AuthorizationStatus),
    /// Notification permission changed
    NotificationsAccessChanged(AuthorizationStatus),

    // ------------------------------------------------------------------------
    // Data sync
    // ------------------------------------------------------------------------
    /// Full contact list replaced
    ContactsChanged {
        /// Fresh contacts
        contacts: Vec<Contact>,
        /// Derivation instant
        at: DateTime<Utc>,
    },
    /// Full event list replaced
    CalendarChanged {
        /// Fresh events
        events: Vec<CalendarEvent>,
        /// Derivation instant
        at: DateTime<Utc>,
    },
    /// Affinity ratings replaced
    AffinitiesChanged {
        /// Fresh ratings
        affinities: AffinityMap,
        /// Derivation instant
        at: DateTime<Utc>,
    },
    /// One contact written back by an edit
    ContactUpdated {
        /// The contact as stored
        contact: Contact,
        /// Derivation instant
        at: DateTime<Utc>,
    },
    /// One contact removed
    ContactDeleted {
        /// Removed contact
        id: ContactId,
        /// Derivation instant
        at: DateTime<Utc>,
    },

    // ------------------------------------------------------------------------
    // Geocoder
    // ------------------------------------------------------------------------
    /// Number of queued or running geocode lookups
    GeocoderQueueChanged(usize),
    /// A geocode result for one address. Applied only while the contact still
    /// carries an unresolved address with that id.
    AddressResolved {
        /// Owning contact
        id: ContactId,
        /// Address id the lookup was made for
        address_id: String,
        /// Resolved coordinate
        coordinate: Coordinate,
        /// Derivation instant
        at: DateTime<Utc>,
    },

    // ------------------------------------------------------------------------
    // List
    // ------------------------------------------------------------------------
    /// List search field activated or cancelled
    ListSearchActive(bool),
    /// List search text edited
    ListSearchQueryChanged(String),
    /// List row selected or cleared
    ListSelect {
        /// Selected row, `None` to clear
        location: Option<PersonLocation>,
        /// Whether the row came from the list search results
        from_search: bool,
    },

    // ------------------------------------------------------------------------
    // Map
    // ------------------------------------------------------------------------
    /// Map search field activated or cancelled
    MapSearchActive(bool),
    /// Map search text edited
    MapSearchQueryChanged(String),
    /// Single annotation selected, possibly from a search result
    MapSelectLocation {
        /// Selected location
        location: PersonLocation,
        /// Whether the selection came from the map search
        from_search: bool,
    },
    /// Cluster selected
    MapSelectCluster(Vec<PersonLocation>),
    /// Member opened from the selected cluster
    MapFocusClusterMember(PersonLocation),
    /// Selection dismissed
    MapDismissSelection,
    /// Map moved by the user
    MapRegionChanged(Region),
    /// Recenter on a coordinate
    ZoomTo(Coordinate),

    // ------------------------------------------------------------------------
    // Filters and sheets
    // ------------------------------------------------------------------------
    /// Show or hide one affinity
    ToggleAffinityFilter(Affinity),
    /// Replace the affinity filter
    SetAffinityFilter(BTreeSet<Affinity>),
    /// List sheet moved
    ListDetentChanged(Detent),
    /// Detail sheet moved
    DetailDetentChanged(Detent),

    /// Does nothing
    Noop,
}

impl Action {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::LocationAccessChanged(_) => "location_access_changed",
            Self::ContactsAccessChanged(_) => "contacts_access_changed",
            Self::CalendarAccessChanged(_) => "calendar_access_changed",
            Self::NotificationsAccessChanged(_) => "notifications_access_changed",
            Self::ContactsChanged { .. } => "contacts_changed",
            Self::CalendarChanged { .. } => "calendar_changed",
            Self::AffinitiesChanged { .. } => "affinities_changed",
            Self::ContactUpdated { .. } => "contact_updated",
            Self::ContactDeleted { .. } => "contact_deleted",
            Self::GeocoderQueueChanged(_) => "geocoder_queue_changed",
            Self::AddressResolved { .. } => "address_resolved",
            Self::ListSearchActive(_) => "list_search_active",
            Self::ListSearchQueryChanged(_) => "list_search_query_changed",
            Self::ListSelect { .. } => "list_select",
            Self::MapSearchActive(_) => "map_search_active",
            Self::MapSearchQueryChanged(_) => "map_search_query_changed",
            Self::MapSelectLocation { .. } => "map_select_location",
            Self::MapSelectCluster(_) => "map_select_cluster",
            Self::MapFocusClusterMember(_) => "map_focus_cluster_member",
            Self::MapDismissSelection => "map_dismiss_selection",
            Self::MapRegionChanged(_) => "map_region_changed",
            Self::ZoomTo(_) => "zoom_to",
            Self::ToggleAffinityFilter(_) => "toggle_affinity_filter",
            Self::SetAffinityFilter(_) => "set_affinity_filter",
            Self::ListDetentChanged(_) => "list_detent_changed",
            Self::DetailDetentChanged(_) => "detail_detent_changed",
            Self::Noop => "noop",
        }
    }
}
