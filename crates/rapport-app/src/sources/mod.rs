//! # Collaborator Sources
//!
//! Push-based system stores the core reads from. Each source exposes its
//! permission state and a change feed; the feed is a generation counter that
//! only says "something changed", so consumers always re-read and diff.

pub mod memory;

use crate::errors::SourceError;
use crate::state::AuthorizationStatus;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rapport_core::{CalendarEvent, Contact, ContactId, PostalAddress};
use tokio::sync::watch;

pub use memory::{InMemoryCalendarSource, InMemoryContactSource, InMemoryLocationSource};

/// The device contact store.
///
/// Edits are read-modify-write against the store and return the contact as
/// stored afterwards.
#[async_trait]
pub trait ContactSource: Send + Sync {
    /// Current permission state.
    fn authorization_status(&self) -> AuthorizationStatus;

    /// Ask the user for access. Returns the resulting state.
    async fn request_authorization(&self) -> Result<AuthorizationStatus, SourceError>;

    /// Every contact.
    async fn list_contacts(&self) -> Result<Vec<Contact>, SourceError>;

    /// Append `address` to a contact.
    async fn add_postal_address(
        &self,
        id: &ContactId,
        address: PostalAddress,
    ) -> Result<Contact, SourceError>;

    /// Replace the address whose id is `address_id`.
    async fn update_postal_address(
        &self,
        id: &ContactId,
        address_id: &str,
        address: PostalAddress,
    ) -> Result<Contact, SourceError>;

    /// Remove the address whose id is `address_id`.
    async fn delete_postal_address(
        &self,
        id: &ContactId,
        address_id: &str,
    ) -> Result<Contact, SourceError>;

    /// Replace or clear a contact's photo.
    async fn update_photo(
        &self,
        id: &ContactId,
        photo: Option<Vec<u8>>,
    ) -> Result<Contact, SourceError>;

    /// Delete a contact.
    async fn delete_contact(&self, id: &ContactId) -> Result<(), SourceError>;

    /// Change feed.
    fn changes(&self) -> watch::Receiver<u64>;
}

/// The system calendar.
#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// Current permission state.
    fn authorization_status(&self) -> AuthorizationStatus;

    /// Ask the user for access. Returns the resulting state.
    async fn request_authorization(&self) -> Result<AuthorizationStatus, SourceError>;

    /// Events overlapping `[start, end]`.
    async fn list_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, SourceError>;

    /// Change feed.
    fn changes(&self) -> watch::Receiver<u64>;
}

/// Location permission. The core never reads positions itself.
#[async_trait]
pub trait LocationSource: Send + Sync {
    /// Current permission state.
    fn authorization_status(&self) -> AuthorizationStatus;

    /// Ask the user for access. Returns the resulting state.
    async fn request_authorization(&self) -> Result<AuthorizationStatus, SourceError>;

    /// Change feed, bumped when the permission state changes.
    fn changes(&self) -> watch::Receiver<u64>;
}
