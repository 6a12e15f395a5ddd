use chrono::{DateTime, Duration, Utc};
use rapport_core::CalendarEvent;

/// Builder for calendar events relative to a reference instant.
#[derive(Debug, Clone)]
pub struct EventBuilder {
    id: String,
    title: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    attendees: Vec<String>,
}

impl EventBuilder {
    /// One-hour event ending at `end`.
    pub fn ending_at(id: &str, end: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            title: id.to_string(),
            start: end - Duration::hours(1),
            end,
            attendees: Vec::new(),
        }
    }

    /// One-hour event that ended `days` days before `now`.
    pub fn days_ago(id: &str, now: DateTime<Utc>, days: i64) -> Self {
        Self::ending_at(id, now - Duration::days(days))
    }

    /// Set the title.
    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    /// Add an attendee email.
    pub fn attendee(mut self, email: &str) -> Self {
        self.attendees.push(email.to_string());
        self
    }

    /// Finish.
    pub fn build(self) -> CalendarEvent {
        CalendarEvent::new(self.id, self.title, self.start, self.end, self.attendees)
    }
}
