//! Calendar events fetched from the system calendar.

use crate::identifiers::EventId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A calendar event with its attendee emails.
///
/// The whole set is replaced on every calendar sync; events are never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Event identifier
    pub id: EventId,
    /// Title
    #[serde(default)]
    pub title: String,
    /// Start time
    pub start: DateTime<Utc>,
    /// End time
    pub end: DateTime<Utc>,
    /// All-day flag
    #[serde(default)]
    pub is_all_day: bool,
    /// Attendee emails, lowercased
    #[serde(default)]
    pub attendee_emails: Vec<String>,
}

impl CalendarEvent {
    /// Create an event, lowercasing attendee emails.
    pub fn new(
        id: impl Into<EventId>,
        title: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        attendee_emails: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            start,
            end,
            is_all_day: false,
            attendee_emails: attendee_emails
                .into_iter()
                .map(|e| e.as_ref().trim().to_lowercase())
                .collect(),
        }
    }

    /// Whether any attendee matches one of `emails` (already lowercased).
    pub fn has_attendee_in(&self, emails: &[String]) -> bool {
        self.attendee_emails
            .iter()
            .any(|a| emails.iter().any(|e| e.eq_ignore_ascii_case(a)))
    }

    /// Reverse chronological by start, tie-broken by id.
    pub fn recency_cmp(&self, other: &Self) -> Ordering {
        other
            .start
            .cmp(&self.start)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for CalendarEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CalendarEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.recency_cmp(other)
    }
}
