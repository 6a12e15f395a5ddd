//! # Reducer
//!
//! ```text
//! workflow → dispatch(Action) → [reduce] → AppState → subscribers
//! ```
//!
//! `reduce` is a pure function of the current state and one action. It never
//! performs I/O; workflows do that before dispatching.
//!
//! Invariants kept here rather than by callers:
//! - persons are rebuilt from scratch whenever contacts, events or affinities
//!   change, and every selection is then rebuilt from the fresh persons
//! - stored contacts carry the rating from `affinities`, so contacts and
//!   persons rank the same way
//! - selecting from the list or map search ends that search
//! - selecting on the map never leaves a sheet fully expanded
//! - zooming never widens the span

use crate::action::Action;
use crate::state::{AppState, Detent, MapSelection};
use chrono::{DateTime, Utc};
use rapport_core::affinity::affinity_of;
use rapport_core::{derive_persons, Person, PersonLocation, PostalAddress, Region, Span};

/// Apply `action` to `state`.
pub fn reduce(state: &AppState, action: Action) -> AppState {
    let mut next = state.clone();
    match action {
        Action::LocationAccessChanged(status) => next.authorizations.location = status,
        Action::ContactsAccessChanged(status) => next.authorizations.contacts = status,
        Action::CalendarAccessChanged(status) => next.authorizations.calendar = status,
        Action::NotificationsAccessChanged(status) => next.authorizations.notifications = status,

        Action::ContactsChanged { contacts, at } => {
            next.contacts = contacts;
            refresh_persons(&mut next, at);
        }
        Action::CalendarChanged { events, at } => {
            next.events = events;
            refresh_persons(&mut next, at);
        }
        Action::AffinitiesChanged { affinities, at } => {
            next.affinities = affinities;
            refresh_persons(&mut next, at);
        }
        Action::ContactUpdated { contact, at } => {
            match next.contacts.iter_mut().find(|c| c.id == contact.id) {
                Some(existing) => *existing = contact,
                None => next.contacts.push(contact),
            }
            refresh_persons(&mut next, at);
        }
        Action::ContactDeleted { id, at } => {
            next.contacts.retain(|c| c.id != id);
            refresh_persons(&mut next, at);
        }

        Action::GeocoderQueueChanged(depth) => next.geocoder_queue = depth,
        Action::AddressResolved {
            id,
            address_id,
            coordinate,
            at,
        } => {
            let pending = next
                .contacts
                .iter_mut()
                .find(|c| c.id == id)
                .and_then(|c| {
                    c.postal_addresses
                        .iter_mut()
                        .find(|a| a.id() == address_id && !a.is_located())
                });
            if let Some(address) = pending {
                address.coordinate = Some(coordinate);
                refresh_persons(&mut next, at);
            }
        }

        Action::ListSearchActive(active) => {
            next.list.is_searching = active;
            if !active {
                next.list.search_query.clear();
            }
        }
        Action::ListSearchQueryChanged(query) => next.list.search_query = query,
        Action::ListSelect {
            location,
            from_search,
        } => {
            if from_search && location.is_some() {
                next.list.is_searching = false;
                next.list.search_query.clear();
            }
            next.list.selected = location;
        }

        Action::MapSearchActive(active) => {
            next.map.is_searching = active;
            if !active {
                next.map.search_query.clear();
            }
        }
        Action::MapSearchQueryChanged(query) => next.map.search_query = query,
        Action::MapSelectLocation {
            location,
            from_search,
        } => {
            next.map.selection = MapSelection::Location(location);
            next.sheets = next.sheets.lowered();
            if from_search {
                next.map.is_searching = false;
                next.map.search_query.clear();
                next.sheets.list = Detent::Small;
            }
        }
        Action::MapSelectCluster(members) => {
            next.map.selection = if members.is_empty() {
                MapSelection::None
            } else {
                MapSelection::Cluster {
                    members,
                    focused: None,
                }
            };
            next.sheets = next.sheets.lowered();
        }
        Action::MapFocusClusterMember(member) => {
            if let MapSelection::Cluster { members, focused } = &mut next.map.selection {
                if members.iter().any(|m| m.id() == member.id()) {
                    *focused = Some(member);
                }
            }
        }
        Action::MapDismissSelection => {
            next.map.selection = match next.map.selection {
                MapSelection::Cluster {
                    members,
                    focused: Some(_),
                } => MapSelection::Cluster {
                    members,
                    focused: None,
                },
                _ => MapSelection::None,
            };
        }
        Action::MapRegionChanged(region) => next.map.region = Some(region),
        Action::ZoomTo(target) => {
            let delta = next.map.focused_span_delta;
            let current = next
                .map
                .region
                .unwrap_or_else(|| Region::new(target, Span::new(delta, delta)));
            next.map.region = Some(current.focused_on(target, delta));
        }

        Action::ToggleAffinityFilter(affinity) => {
            if !next.affinity_filter.remove(&affinity) {
                next.affinity_filter.insert(affinity);
            }
        }
        Action::SetAffinityFilter(filter) => next.affinity_filter = filter,
        Action::ListDetentChanged(detent) => next.sheets.list = detent,
        Action::DetailDetentChanged(detent) => next.sheets.detail = detent,

        Action::Noop => {}
    }
    next
}

fn refresh_persons(state: &mut AppState, at: DateTime<Utc>) {
    for contact in &mut state.contacts {
        contact.affinity = affinity_of(&state.affinities, &contact.id);
    }
    state.persons = derive_persons(&state.contacts, &state.events, &state.affinities, at);
    let persons = &state.persons;

    state.list.selected = state
        .list
        .selected
        .take()
        .and_then(|selected| refresh_location(persons, &selected));

    state.map.selection = match std::mem::take(&mut state.map.selection) {
        MapSelection::None => MapSelection::None,
        MapSelection::Location(location) => refresh_location(persons, &location)
            .map(MapSelection::Location)
            .unwrap_or_default(),
        MapSelection::Cluster { members, focused } => {
            let members: Vec<PersonLocation> = members
                .iter()
                .filter_map(|m| refresh_location(persons, m))
                .collect();
            if members.is_empty() {
                MapSelection::None
            } else {
                let focused = focused.and_then(|f| refresh_location(persons, &f));
                MapSelection::Cluster { members, focused }
            }
        }
    };
}

/// Rebuild `stale` from fresh persons.
///
/// The address is matched by id, falling back to the first located address,
/// then the first address. `None` when the person is gone.
fn refresh_location(persons: &[Person], stale: &PersonLocation) -> Option<PersonLocation> {
    let person = persons.iter().find(|p| p.id() == stale.person.id())?;
    let addresses = &person.contact.postal_addresses;

    let by_id = stale
        .address
        .as_ref()
        .and_then(|old| person.contact.address(&old.id()));
    let address: Option<&PostalAddress> = by_id
        .or_else(|| addresses.iter().find(|a| a.is_located()))
        .or_else(|| addresses.first());

    Some(PersonLocation::new(person.clone(), address.cloned()))
}
