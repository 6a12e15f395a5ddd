//! In-memory sources
//!
//! Back the host binary's fixture mode and the test suites. Every mutation
//! bumps the change feed, as the system stores do for edits made through them.

use super::{CalendarSource, ContactSource, LocationSource};
use crate::errors::SourceError;
use crate::state::AuthorizationStatus;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rapport_core::{CalendarEvent, Contact, ContactId, PostalAddress};
use tokio::sync::watch;

/// Permission state plus what a request resolves to.
#[derive(Debug)]
struct Permission {
    status: Mutex<AuthorizationStatus>,
    grant: AuthorizationStatus,
}

impl Permission {
    fn new(status: AuthorizationStatus) -> Self {
        Self {
            status: Mutex::new(status),
            grant: AuthorizationStatus::Authorized,
        }
    }

    fn current(&self) -> AuthorizationStatus {
        *self.status.lock()
    }

    fn request(&self) -> AuthorizationStatus {
        let mut status = self.status.lock();
        if status.can_request() {
            *status = self.grant;
        }
        *status
    }

    fn require(&self, source_name: &str) -> Result<(), SourceError> {
        if self.current().is_authorized() {
            Ok(())
        } else {
            Err(SourceError::denied(source_name))
        }
    }
}

fn change_feed() -> watch::Sender<u64> {
    watch::channel(0).0
}

fn bump(feed: &watch::Sender<u64>) {
    feed.send_modify(|generation| *generation += 1);
}

// ============================================================================
// Contacts
// ============================================================================

/// Contact store held in memory.
#[derive(Debug)]
pub struct InMemoryContactSource {
    permission: Permission,
    contacts: Mutex<Vec<Contact>>,
    feed: watch::Sender<u64>,
}

impl Default for InMemoryContactSource {
    fn default() -> Self {
        Self::new(AuthorizationStatus::NotDetermined, Vec::new())
    }
}

impl InMemoryContactSource {
    /// Store with `contacts` and the given permission state.
    pub fn new(status: AuthorizationStatus, contacts: Vec<Contact>) -> Self {
        Self {
            permission: Permission::new(status),
            contacts: Mutex::new(contacts),
            feed: change_feed(),
        }
    }

    /// Authorized store holding `contacts`.
    pub fn authorized(contacts: Vec<Contact>) -> Self {
        Self::new(AuthorizationStatus::Authorized, contacts)
    }

    /// Make a pending request resolve to `grant` instead of `Authorized`.
    pub fn granting(mut self, grant: AuthorizationStatus) -> Self {
        self.permission.grant = grant;
        self
    }

    /// Replace every contact, as an edit made outside the app would.
    pub fn replace_all(&self, contacts: Vec<Contact>) {
        *self.contacts.lock() = contacts;
        bump(&self.feed);
    }

    /// Change the permission state, as the user would in system settings.
    pub fn set_authorization(&self, status: AuthorizationStatus) {
        *self.permission.status.lock() = status;
        bump(&self.feed);
    }

    fn edit(
        &self,
        id: &ContactId,
        apply: impl FnOnce(&mut Contact) -> Result<(), SourceError>,
    ) -> Result<Contact, SourceError> {
        self.permission.require("contacts")?;
        let updated = {
            let mut contacts = self.contacts.lock();
            let contact = contacts
                .iter_mut()
                .find(|c| &c.id == id)
                .ok_or_else(|| SourceError::not_found(format!("Contact {id}")))?;
            apply(contact)?;
            contact.clone()
        };
        bump(&self.feed);
        Ok(updated)
    }
}

fn address_index(contact: &Contact, address_id: &str) -> Result<usize, SourceError> {
    contact
        .postal_addresses
        .iter()
        .position(|a| a.id() == address_id)
        .ok_or_else(|| SourceError::not_found(format!("Address {address_id}")))
}

#[async_trait]
impl ContactSource for InMemoryContactSource {
    fn authorization_status(&self) -> AuthorizationStatus {
        self.permission.current()
    }

    async fn request_authorization(&self) -> Result<AuthorizationStatus, SourceError> {
        Ok(self.permission.request())
    }

    async fn list_contacts(&self) -> Result<Vec<Contact>, SourceError> {
        self.permission.require("contacts")?;
        Ok(self.contacts.lock().clone())
    }

    async fn add_postal_address(
        &self,
        id: &ContactId,
        address: PostalAddress,
    ) -> Result<Contact, SourceError> {
        self.edit(id, |contact| {
            contact.postal_addresses.push(address);
            Ok(())
        })
    }

    async fn update_postal_address(
        &self,
        id: &ContactId,
        address_id: &str,
        address: PostalAddress,
    ) -> Result<Contact, SourceError> {
        self.edit(id, |contact| {
            let index = address_index(contact, address_id)?;
            contact.postal_addresses[index] = address;
            Ok(())
        })
    }

    async fn delete_postal_address(
        &self,
        id: &ContactId,
        address_id: &str,
    ) -> Result<Contact, SourceError> {
        self.edit(id, |contact| {
            let index = address_index(contact, address_id)?;
            contact.postal_addresses.remove(index);
            Ok(())
        })
    }

    async fn update_photo(
        &self,
        id: &ContactId,
        photo: Option<Vec<u8>>,
    ) -> Result<Contact, SourceError> {
        self.edit(id, |contact| {
            contact.photo = photo;
            Ok(())
        })
    }

    async fn delete_contact(&self, id: &ContactId) -> Result<(), SourceError> {
        self.permission.require("contacts")?;
        {
            let mut contacts = self.contacts.lock();
            let before = contacts.len();
            contacts.retain(|c| &c.id != id);
            if contacts.len() == before {
                return Err(SourceError::not_found(format!("Contact {id}")));
            }
        }
        bump(&self.feed);
        Ok(())
    }

    fn changes(&self) -> watch::Receiver<u64> {
        self.feed.subscribe()
    }
}

// ============================================================================
// Calendar
// ============================================================================

/// Calendar held in memory.
#[derive(Debug)]
pub struct InMemoryCalendarSource {
    permission: Permission,
    events: Mutex<Vec<CalendarEvent>>,
    feed: watch::Sender<u64>,
}

impl Default for InMemoryCalendarSource {
    fn default() -> Self {
        Self::new(AuthorizationStatus::NotDetermined, Vec::new())
    }
}

impl InMemoryCalendarSource {
    /// Calendar with `events` and the given permission state.
    pub fn new(status: AuthorizationStatus, events: Vec<CalendarEvent>) -> Self {
        Self {
            permission: Permission::new(status),
            events: Mutex::new(events),
            feed: change_feed(),
        }
    }

    /// Authorized calendar holding `events`.
    pub fn authorized(events: Vec<CalendarEvent>) -> Self {
        Self::new(AuthorizationStatus::Authorized, events)
    }

    /// Replace every event.
    pub fn replace_all(&self, events: Vec<CalendarEvent>) {
        *self.events.lock() = events;
        bump(&self.feed);
    }

    /// Change the permission state.
    pub fn set_authorization(&self, status: AuthorizationStatus) {
        *self.permission.status.lock() = status;
        bump(&self.feed);
    }
}

#[async_trait]
impl CalendarSource for InMemoryCalendarSource {
    fn authorization_status(&self) -> AuthorizationStatus {
        self.permission.current()
    }

    async fn request_authorization(&self) -> Result<AuthorizationStatus, SourceError> {
        Ok(self.permission.request())
    }

    async fn list_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, SourceError> {
        self.permission.require("calendar")?;
        Ok(self
            .events
            .lock()
            .iter()
            .filter(|e| e.end >= start && e.start <= end)
            .cloned()
            .collect())
    }

    fn changes(&self) -> watch::Receiver<u64> {
        self.feed.subscribe()
    }
}

// ============================================================================
// Location
// ============================================================================

/// Location permission held in memory.
#[derive(Debug)]
pub struct InMemoryLocationSource {
    permission: Permission,
    feed: watch::Sender<u64>,
}

impl Default for InMemoryLocationSource {
    fn default() -> Self {
        Self::new(AuthorizationStatus::NotDetermined)
    }
}

impl InMemoryLocationSource {
    /// Source in the given permission state.
    pub fn new(status: AuthorizationStatus) -> Self {
        Self {
            permission: Permission::new(status),
            feed: change_feed(),
        }
    }

    /// Change the permission state.
    pub fn set_authorization(&self, status: AuthorizationStatus) {
        *self.permission.status.lock() = status;
        bump(&self.feed);
    }
}

#[async_trait]
impl LocationSource for InMemoryLocationSource {
    fn authorization_status(&self) -> AuthorizationStatus {
        self.permission.current()
    }

    async fn request_authorization(&self) -> Result<AuthorizationStatus, SourceError> {
        let before = self.permission.current();
        let after = self.permission.request();
        if before != after {
            bump(&self.feed);
        }
        Ok(after)
    }

    fn changes(&self) -> watch::Receiver<u64> {
        self.feed.subscribe()
    }
}
