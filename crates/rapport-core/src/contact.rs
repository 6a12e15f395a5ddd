//! # Contacts
//!
//! Contacts as read from the device contact store, plus the structured postal
//! addresses that get geocoded onto the map.

use crate::affinity::Affinity;
use crate::geo::Coordinate;
use crate::identifiers::ContactId;
use crate::search::Searchable;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Placeholder identity for an address with no structured fields.
pub const EMPTY_ADDRESS_ID: &str = "Location";

/// Placeholder display name for a contact with no name fields.
pub const EMPTY_DISPLAY_NAME: &str = "No Name";

/// A structured postal address, optionally resolved to a coordinate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostalAddress {
    /// Street and number
    pub street: String,
    /// Neighbourhood or district
    pub sub_locality: String,
    /// City
    pub city: String,
    /// State or province
    pub state: String,
    /// Postal code
    pub postal_code: String,
    /// Country
    pub country: String,
    /// Resolved coordinate, if geocoded
    pub coordinate: Option<Coordinate>,
    /// User-facing label such as "home" or "work"
    pub label: Option<String>,
}

impl PostalAddress {
    fn structured_fields(&self) -> [&str; 6] {
        [
            self.street.as_str(),
            self.sub_locality.as_str(),
            self.city.as_str(),
            self.state.as_str(),
            self.postal_code.as_str(),
            self.country.as_str(),
        ]
    }

    /// Stable identity built from the non-empty structured fields.
    ///
    /// Label and coordinate do not take part, so two addresses with identical
    /// fields share an id. The id doubles as the geocode cache key. An address
    /// with no fields at all gets [`EMPTY_ADDRESS_ID`].
    pub fn id(&self) -> String {
        let parts: Vec<&str> = self
            .structured_fields()
            .into_iter()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .collect();
        if parts.is_empty() {
            EMPTY_ADDRESS_ID.to_string()
        } else {
            parts.join(", ")
        }
    }

    /// Whether every structured field is blank.
    pub fn is_blank(&self) -> bool {
        self.structured_fields()
            .into_iter()
            .all(|f| f.trim().is_empty())
    }

    /// Whether a coordinate has been resolved.
    pub fn is_located(&self) -> bool {
        self.coordinate.is_some()
    }

    /// Whether the label marks this as a work address.
    pub fn is_work(&self) -> bool {
        self.label
            .as_deref()
            .map(|l| l.to_lowercase().contains("work"))
            .unwrap_or(false)
    }

    /// Copy of this address carrying `coordinate`.
    pub fn located_at(&self, coordinate: Coordinate) -> Self {
        Self {
            coordinate: Some(coordinate),
            ..self.clone()
        }
    }
}

/// A contact from the device contact store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// Externally assigned stable identifier
    pub id: ContactId,
    /// Given name
    #[serde(default)]
    pub given_name: String,
    /// Family name
    #[serde(default)]
    pub family_name: String,
    /// Nickname
    #[serde(default)]
    pub nickname: String,
    /// Organization, used as a display fallback
    #[serde(default)]
    pub organization: String,
    /// Email addresses used to match calendar attendees
    #[serde(default)]
    pub emails: Vec<String>,
    /// Postal addresses
    #[serde(default)]
    pub postal_addresses: Vec<PostalAddress>,
    /// Photo bytes
    #[serde(default)]
    pub photo: Option<Vec<u8>>,
    /// Affinity rating. Filled in from the affinity ratings whenever the
    /// application state derives persons; `Undefined` as read from a source.
    #[serde(default)]
    pub affinity: Affinity,
}

impl Contact {
    /// Create a contact with only an id and names.
    pub fn new(
        id: impl Into<ContactId>,
        given_name: impl Into<String>,
        family_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            given_name: given_name.into(),
            family_name: family_name.into(),
            nickname: String::new(),
            organization: String::new(),
            emails: Vec::new(),
            postal_addresses: Vec::new(),
            photo: None,
            affinity: Affinity::Undefined,
        }
    }

    /// Full name, falling back to nickname, organization, then a placeholder.
    pub fn display_name(&self) -> String {
        let full = [self.given_name.trim(), self.family_name.trim()]
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !full.is_empty() {
            return full;
        }
        if !self.nickname.trim().is_empty() {
            return self.nickname.trim().to_string();
        }
        if !self.organization.trim().is_empty() {
            return self.organization.trim().to_string();
        }
        EMPTY_DISPLAY_NAME.to_string()
    }

    /// Whether a nickname is set.
    pub fn has_nickname(&self) -> bool {
        !self.nickname.trim().is_empty()
    }

    /// Lowercased email addresses.
    pub fn normalized_emails(&self) -> Vec<String> {
        self.emails
            .iter()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .collect()
    }

    /// Find an address by its id.
    pub fn address(&self, address_id: &str) -> Option<&PostalAddress> {
        self.postal_addresses
            .iter()
            .find(|a| a.id() == address_id)
    }

    /// Addresses with a resolved coordinate.
    pub fn located_addresses(&self) -> impl Iterator<Item = &PostalAddress> {
        self.postal_addresses.iter().filter(|a| a.is_located())
    }

    /// Natural ordering: affinity rank, then nickname presence, then display
    /// name (case-insensitive), then id.
    pub fn natural_cmp(&self, other: &Self) -> Ordering {
        self.affinity
            .cmp(&other.affinity)
            .then_with(|| other.has_nickname().cmp(&self.has_nickname()))
            .then_with(|| {
                self.display_name()
                    .to_lowercase()
                    .cmp(&other.display_name().to_lowercase())
            })
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl Searchable for Contact {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.nickname.as_str(),
            self.given_name.as_str(),
            self.family_name.as_str(),
        ]
    }

    fn natural_order(&self, other: &Self) -> Ordering {
        self.natural_cmp(other)
    }
}
