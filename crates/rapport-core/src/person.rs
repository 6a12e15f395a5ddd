//! # Persons
//!
//! A [`Person`] is never stored. It is derived from a contact, its affinity
//! and the calendar events shared with it, and rebuilt from scratch whenever
//! any of those inputs change.

use crate::affinity::{affinity_of, Affinity, AffinityMap};
use crate::calendar::CalendarEvent;
use crate::contact::{Contact, PostalAddress};
use crate::geo::Coordinate;
use crate::identifiers::ContactId;
use crate::search::Searchable;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Identity fragment used for a location without an address.
pub const NULL_ADDRESS_ID: &str = "null";

/// A contact enriched with its affinity and calendar history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    /// The underlying contact, with its affinity field filled in
    pub contact: Contact,
    /// Affinity rating
    pub affinity: Affinity,
    /// Qualifying events, newest first
    pub events: Vec<CalendarEvent>,
    /// First of `events`
    pub latest_event: Option<CalendarEvent>,
    /// Whether the person is due a reach-out
    pub overdue: bool,
    /// Whole days since `latest_event` ended (negative when it lies ahead)
    pub days_since_contact: Option<i64>,
}

impl Person {
    /// Derive a person from a contact, its affinity and all known events.
    pub fn derive(
        contact: &Contact,
        affinity: Affinity,
        events: &[CalendarEvent],
        now: DateTime<Utc>,
    ) -> Self {
        let emails = contact.normalized_emails();
        let threshold = Duration::days(affinity.days());
        let horizon = now + threshold;

        let mut shared: Vec<CalendarEvent> = if emails.is_empty() {
            Vec::new()
        } else {
            events
                .iter()
                .filter(|e| e.start < horizon && e.has_attendee_in(&emails))
                .cloned()
                .collect()
        };
        shared.sort();

        let latest_event = shared.first().cloned();
        let days_since_contact = latest_event
            .as_ref()
            .map(|e| (now - e.end).num_days());
        let overdue = match &latest_event {
            None => true,
            Some(event) => now - event.end > threshold,
        };

        let mut contact = contact.clone();
        contact.affinity = affinity;

        Self {
            contact,
            affinity,
            events: shared,
            latest_event,
            overdue,
            days_since_contact,
        }
    }

    /// The contact id.
    pub fn id(&self) -> &ContactId {
        &self.contact.id
    }

    /// Display name of the underlying contact.
    pub fn display_name(&self) -> String {
        self.contact.display_name()
    }

    /// One location per postal address, or a single address-less location.
    pub fn locations(&self) -> Vec<PersonLocation> {
        if self.contact.postal_addresses.is_empty() {
            return vec![PersonLocation::new(self.clone(), None)];
        }
        self.contact
            .postal_addresses
            .iter()
            .map(|a| PersonLocation::new(self.clone(), Some(a.clone())))
            .collect()
    }

    /// Locations whose address has a coordinate.
    pub fn located_locations(&self) -> Vec<PersonLocation> {
        self.contact
            .located_addresses()
            .map(|a| PersonLocation::new(self.clone(), Some(a.clone())))
            .collect()
    }

    /// The located non-work address closest to `target`, with its distance in
    /// meters. Without one, the location has no address and the distance is
    /// infinite.
    pub fn nearest_home_location(&self, target: Coordinate) -> (PersonLocation, f64) {
        let nearest = self
            .contact
            .postal_addresses
            .iter()
            .filter(|a| !a.is_work())
            .filter_map(|a| a.coordinate.map(|c| (a, c.distance_to(&target))))
            .min_by(|(_, da), (_, db)| da.partial_cmp(db).unwrap_or(Ordering::Equal));

        match nearest {
            Some((address, distance)) => (
                PersonLocation::new(self.clone(), Some(address.clone())),
                distance,
            ),
            None => (PersonLocation::new(self.clone(), None), f64::INFINITY),
        }
    }
}

impl Searchable for Person {
    fn search_fields(&self) -> Vec<&str> {
        self.contact.search_fields()
    }

    fn natural_order(&self, other: &Self) -> Ordering {
        self.contact.natural_cmp(&other.contact)
    }
}

/// A person paired with one of its addresses.
///
/// Used as map annotation identity and as list row identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonLocation {
    /// The person
    pub person: Person,
    /// The address, if any
    pub address: Option<PostalAddress>,
}

impl PersonLocation {
    /// Pair a person with an address.
    pub fn new(person: Person, address: Option<PostalAddress>) -> Self {
        Self { person, address }
    }

    /// Address id, or [`NULL_ADDRESS_ID`].
    pub fn address_id(&self) -> String {
        self.address
            .as_ref()
            .map(PostalAddress::id)
            .unwrap_or_else(|| NULL_ADDRESS_ID.to_string())
    }

    /// `"{person id}:{address id}"`.
    pub fn id(&self) -> String {
        format!("{}:{}", self.person.id(), self.address_id())
    }

    /// Coordinate of the address, if located.
    pub fn coordinate(&self) -> Option<Coordinate> {
        self.address.as_ref().and_then(|a| a.coordinate)
    }
}

/// Rebuild every person from the raw inputs, sorted in natural order.
///
/// Empty inputs produce an empty list.
pub fn derive_persons(
    contacts: &[Contact],
    events: &[CalendarEvent],
    affinities: &AffinityMap,
    now: DateTime<Utc>,
) -> Vec<Person> {
    let mut persons: Vec<Person> = contacts
        .iter()
        .map(|c| Person::derive(c, affinity_of(affinities, &c.id), events, now))
        .collect();
    persons.sort_by(|a, b| a.natural_order(b));
    persons
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap()
    }

    fn contact(id: &str, email: &str) -> Contact {
        let mut c = Contact::new(id, id, "Test");
        c.emails = vec![email.to_string()];
        c
    }

    fn event_ending(id: &str, days_ago: i64, email: &str) -> CalendarEvent {
        let end = now() - Duration::days(days_ago);
        CalendarEvent::new(id, "Coffee", end - Duration::hours(1), end, [email])
    }

    #[test]
    fn best_friend_seen_ten_days_ago_is_overdue() {
        let c = contact("ann", "ann@example.com");
        let events = vec![event_ending("e1", 10, "ann@example.com")];
        let person = Person::derive(&c, Affinity::Best, &events, now());
        assert!(person.overdue);
        assert_eq!(person.days_since_contact, Some(10));
    }

    #[test]
    fn best_friend_seen_three_days_ago_is_not_overdue() {
        let c = contact("ann", "ann@example.com");
        let events = vec![event_ending("e1", 3, "ann@example.com")];
        let person = Person::derive(&c, Affinity::Best, &events, now());
        assert!(!person.overdue);
        assert_eq!(person.latest_event.map(|e| e.id.to_string()), Some("e1".into()));
    }

    #[test]
    fn no_qualifying_event_is_always_overdue() {
        let c = contact("ann", "ann@example.com");
        let events = vec![event_ending("e1", 1, "bob@example.com")];
        for affinity in Affinity::ALL {
            let person = Person::derive(&c, affinity, &events, now());
            assert!(person.overdue, "{affinity} should be overdue");
            assert!(person.latest_event.is_none());
        }
    }

    #[test]
    fn upcoming_event_within_window_counts_as_latest() {
        let c = contact("ann", "ann@example.com");
        let soon = now() + Duration::days(2);
        let far = now() + Duration::days(20);
        let events = vec![
            event_ending("past", 5, "ann@example.com"),
            CalendarEvent::new("soon", "", soon, soon, ["ann@example.com"]),
            CalendarEvent::new("far", "", far, far, ["ann@example.com"]),
        ];
        let person = Person::derive(&c, Affinity::Best, &events, now());
        let ids: Vec<_> = person.events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["soon", "past"]);
        assert!(!person.overdue);
    }

    #[test]
    fn email_matching_is_case_insensitive() {
        let c = contact("ann", "Ann@Example.com");
        let events = vec![event_ending("e1", 1, "ann@example.com")];
        let person = Person::derive(&c, Affinity::Close, &events, now());
        assert_eq!(person.events.len(), 1);
    }

    #[test]
    fn derive_persons_applies_affinities_and_sorts() {
        let contacts = vec![contact("b", "b@x.io"), contact("a", "a@x.io")];
        let mut affinities = AffinityMap::new();
        affinities.insert(ContactId::new("b"), Affinity::Best);

        let persons = derive_persons(&contacts, &[], &affinities, now());
        assert_eq!(persons[0].id().as_str(), "b");
        assert_eq!(persons[0].contact.affinity, Affinity::Best);
        assert_eq!(persons[1].affinity, Affinity::Undefined);
    }

    #[test]
    fn derive_persons_of_nothing_is_empty() {
        assert!(derive_persons(&[], &[], &AffinityMap::new(), now()).is_empty());
    }

    #[test]
    fn nearest_home_skips_work_and_unlocated() {
        let mut c = contact("ann", "ann@example.com");
        let home = PostalAddress {
            street: "Home St".into(),
            coordinate: Some(Coordinate::new(52.0, 13.0)),
            ..PostalAddress::default()
        };
        let work = PostalAddress {
            street: "Work St".into(),
            label: Some("work".into()),
            coordinate: Some(Coordinate::new(52.5, 13.4)),
            ..PostalAddress::default()
        };
        let unlocated = PostalAddress {
            street: "Nowhere".into(),
            ..PostalAddress::default()
        };
        c.postal_addresses = vec![work, unlocated, home.clone()];
        let person = Person::derive(&c, Affinity::Best, &[], now());

        let (location, distance) = person.nearest_home_location(Coordinate::new(52.5, 13.4));
        assert_eq!(location.address.as_ref().map(PostalAddress::id), Some(home.id()));
        assert!(distance.is_finite());
    }

    #[test]
    fn nearest_home_without_located_address_is_infinite() {
        let c = contact("ann", "ann@example.com");
        let person = Person::derive(&c, Affinity::Best, &[], now());
        let (location, distance) = person.nearest_home_location(Coordinate::new(0.0, 0.0));
        assert!(location.address.is_none());
        assert_eq!(distance, f64::INFINITY);
        assert_eq!(location.id(), "ann:null");
    }
}
