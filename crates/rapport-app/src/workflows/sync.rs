//! Contact and calendar sync
//!
//! Fetch, diff against the current state, dispatch only on change. Sources
//! notify redundantly and out of order, so an unchanged fetch is common.

use super::{attach_cached_coordinates, source_failure};
use crate::action::Action;
use crate::context::AppContext;
use crate::errors::AppError;
use chrono::Duration;
use rapport_core::affinity::affinity_of;
use tracing::{debug, info};

use super::access::refresh_authorizations;

/// Re-read every contact. Returns whether the state changed.
pub async fn sync_contacts(ctx: &AppContext) -> Result<bool, AppError> {
    let status = ctx.contacts().authorization_status();
    ctx.dispatch(Action::ContactsAccessChanged(status));
    if !status.is_authorized() {
        debug!(?status, "Skipping contact sync");
        return Ok(false);
    }

    let mut contacts = ctx
        .contacts()
        .list_contacts()
        .await
        .map_err(|e| source_failure("sync contacts", e))?;
    for contact in &mut contacts {
        attach_cached_coordinates(ctx, contact);
    }

    let unchanged = ctx.core().read(|s| {
        for contact in &mut contacts {
            contact.affinity = affinity_of(&s.affinities, &contact.id);
        }
        s.contacts == contacts
    });
    if unchanged {
        debug!("Contacts unchanged");
        return Ok(false);
    }

    let count = contacts.len();
    let changed = ctx.dispatch(Action::ContactsChanged {
        contacts,
        at: ctx.time().physical_time(),
    });
    info!(contacts = count, "Synced contacts");
    Ok(changed)
}

/// Re-read events within the configured window around now. Returns whether
/// the state changed.
pub async fn sync_calendar(ctx: &AppContext) -> Result<bool, AppError> {
    let status = ctx.calendar().authorization_status();
    ctx.dispatch(Action::CalendarAccessChanged(status));
    if !status.is_authorized() {
        debug!(?status, "Skipping calendar sync");
        return Ok(false);
    }

    let now = ctx.time().physical_time();
    let window = Duration::days(ctx.config().calendar_window_days);
    let mut events = ctx
        .calendar()
        .list_events(now - window, now + window)
        .await
        .map_err(|e| source_failure("sync calendar", e))?;
    events.sort();

    if ctx.core().read(|s| s.events == events) {
        debug!("Calendar unchanged");
        return Ok(false);
    }

    let count = events.len();
    let changed = ctx.dispatch(Action::CalendarChanged { events, at: now });
    info!(events = count, "Synced calendar");
    Ok(changed)
}

/// Refresh permissions, then contacts and calendar.
pub async fn sync_all(ctx: &AppContext) -> Result<(), AppError> {
    refresh_authorizations(ctx);
    sync_contacts(ctx).await?;
    sync_calendar(ctx).await?;
    Ok(())
}
