//! # Application State
//!
//! The single value every view renders from. Only the reducer produces new
//! values; everything else reads snapshots or subscribes to slices.

use crate::config::DEFAULT_FOCUSED_SPAN_DELTA;
use rapport_core::{
    rank, Affinity, AffinityMap, CalendarEvent, Contact, Person, PersonLocation, Region,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ============================================================================
// Authorization
// ============================================================================

/// System permission state for one capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AuthorizationStatus {
    /// The user has not been asked yet
    #[default]
    NotDetermined,
    /// Access granted
    Authorized,
    /// Access refused by the user
    Denied,
    /// Access blocked by policy
    Restricted,
}

impl AuthorizationStatus {
    /// Whether access is granted.
    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized)
    }

    /// Whether asking again could change the answer.
    pub fn can_request(&self) -> bool {
        matches!(self, Self::NotDetermined)
    }
}

/// Permission state of every capability the app uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Authorizations {
    /// Location access
    pub location: AuthorizationStatus,
    /// Contact store access
    pub contacts: AuthorizationStatus,
    /// Calendar access
    pub calendar: AuthorizationStatus,
    /// Notification permission
    pub notifications: AuthorizationStatus,
}

// ============================================================================
// Sheets
// ============================================================================

/// Height of a bottom sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Detent {
    /// Only the grabber is visible
    Collapsed,
    /// A single row
    Small,
    /// Half height
    #[default]
    Normal,
    /// Fully expanded
    Large,
}

impl Detent {
    /// `Large` drops to `Normal`; anything smaller is kept.
    pub fn lowered(self) -> Self {
        match self {
            Self::Large => Self::Normal,
            other => other,
        }
    }
}

/// Detents of the list sheet and the detail sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SheetState {
    /// Person list sheet
    pub list: Detent,
    /// Person detail sheet
    pub detail: Detent,
}

impl SheetState {
    /// Lower both sheets out of `Large`.
    pub fn lowered(self) -> Self {
        Self {
            list: self.list.lowered(),
            detail: self.detail.lowered(),
        }
    }
}

// ============================================================================
// List and Map
// ============================================================================

/// State of the person list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ListState {
    /// Current search text
    pub search_query: String,
    /// Whether the search field is active
    pub is_searching: bool,
    /// Selected row
    pub selected: Option<PersonLocation>,
}

/// What is selected on the map.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum MapSelection {
    /// Nothing selected
    #[default]
    None,
    /// A single annotation
    Location(PersonLocation),
    /// A cluster of co-located annotations, optionally with one member focused
    Cluster {
        /// Members of the cluster
        members: Vec<PersonLocation>,
        /// Member opened from the cluster
        focused: Option<PersonLocation>,
    },
}

impl MapSelection {
    /// Whether anything is selected.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// The location detail should show: the single selection or the focused
    /// cluster member.
    pub fn detail_location(&self) -> Option<&PersonLocation> {
        match self {
            Self::None => None,
            Self::Location(location) => Some(location),
            Self::Cluster { focused, .. } => focused.as_ref(),
        }
    }
}

/// State of the map.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MapState {
    /// Current search text
    pub search_query: String,
    /// Whether the search field is active
    pub is_searching: bool,
    /// Current selection
    pub selection: MapSelection,
    /// Visible region, once known
    pub region: Option<Region>,
    /// Span the map zooms in to when focusing a coordinate
    pub focused_span_delta: f64,
}

// ============================================================================
// AppState
// ============================================================================

/// The whole application state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    /// Permission states
    pub authorizations: Authorizations,
    /// Contacts as last synced
    pub contacts: Vec<Contact>,
    /// Calendar events as last synced
    pub events: Vec<CalendarEvent>,
    /// Affinity ratings as last persisted
    pub affinities: AffinityMap,
    /// Persons derived from the three inputs above, in natural order
    pub persons: Vec<Person>,
    /// Geocode lookups queued or running
    pub geocoder_queue: usize,
    /// Person list
    pub list: ListState,
    /// Map
    pub map: MapState,
    /// Affinities shown; empty shows everyone
    pub affinity_filter: BTreeSet<Affinity>,
    /// Sheet detents
    pub sheets: SheetState,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DEFAULT_FOCUSED_SPAN_DELTA)
    }
}

impl AppState {
    /// Empty state zooming to `focused_span_delta`.
    pub fn new(focused_span_delta: f64) -> Self {
        Self {
            authorizations: Authorizations::default(),
            contacts: Vec::new(),
            events: Vec::new(),
            affinities: AffinityMap::new(),
            persons: Vec::new(),
            geocoder_queue: 0,
            list: ListState::default(),
            map: MapState {
                focused_span_delta,
                ..MapState::default()
            },
            affinity_filter: BTreeSet::new(),
            sheets: SheetState::default(),
        }
    }

    /// Empty state seeded with persisted affinity ratings.
    pub fn with_affinities(mut self, affinities: AffinityMap) -> Self {
        self.affinities = affinities;
        self
    }

    /// Person by contact id.
    pub fn person(&self, id: &rapport_core::ContactId) -> Option<&Person> {
        self.persons.iter().find(|p| p.id() == id)
    }

    /// Persons passing the affinity filter, ranked by the list search.
    pub fn filtered_persons(&self) -> Vec<Person> {
        let passing: Vec<Person> = self
            .persons
            .iter()
            .filter(|p| self.affinity_filter.is_empty() || self.affinity_filter.contains(&p.affinity))
            .cloned()
            .collect();
        rank(&passing, &self.list.search_query)
    }

    /// Map annotations: every located address of the filtered persons.
    pub fn visible_locations(&self) -> Vec<PersonLocation> {
        self.filtered_persons()
            .iter()
            .flat_map(Person::located_locations)
            .collect()
    }

    /// Persons ranked against the map search.
    pub fn map_search_results(&self) -> Vec<Person> {
        rank(&self.persons, &self.map.search_query)
    }

    /// Persons due a reach-out, in natural order.
    pub fn overdue_persons(&self) -> Vec<Person> {
        self.persons.iter().filter(|p| p.overdue).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowering_only_touches_large() {
        assert_eq!(Detent::Large.lowered(), Detent::Normal);
        assert_eq!(Detent::Small.lowered(), Detent::Small);
        assert_eq!(Detent::Collapsed.lowered(), Detent::Collapsed);
    }

    #[test]
    fn default_state_is_empty() {
        let state = AppState::default();
        assert!(state.persons.is_empty());
        assert!(state.filtered_persons().is_empty());
        assert!(state.visible_locations().is_empty());
        assert!(state.map.selection.is_none());
        assert_eq!(state.map.focused_span_delta, DEFAULT_FOCUSED_SPAN_DELTA);
    }
}
