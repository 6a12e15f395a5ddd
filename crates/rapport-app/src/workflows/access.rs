//! Permission workflows

use super::source_failure;
use super::sync::{sync_calendar, sync_contacts};
use crate::action::Action;
use crate::context::AppContext;
use crate::errors::AppError;
use crate::state::AuthorizationStatus;
use tracing::info;

/// Mirror every source's current permission into the state.
pub fn refresh_authorizations(ctx: &AppContext) {
    ctx.dispatch(Action::ContactsAccessChanged(
        ctx.contacts().authorization_status(),
    ));
    ctx.dispatch(Action::CalendarAccessChanged(
        ctx.calendar().authorization_status(),
    ));
    ctx.dispatch(Action::LocationAccessChanged(
        ctx.location().authorization_status(),
    ));
}

/// Ask for contact access; sync once granted.
pub async fn request_contacts_access(ctx: &AppContext) -> Result<AuthorizationStatus, AppError> {
    let status = ctx
        .contacts()
        .request_authorization()
        .await
        .map_err(|e| source_failure("request contacts access", e))?;
    info!(?status, "Contacts access");
    ctx.dispatch(Action::ContactsAccessChanged(status));
    if status.is_authorized() {
        sync_contacts(ctx).await?;
    }
    Ok(status)
}

/// Ask for calendar access; sync once granted.
pub async fn request_calendar_access(ctx: &AppContext) -> Result<AuthorizationStatus, AppError> {
    let status = ctx
        .calendar()
        .request_authorization()
        .await
        .map_err(|e| source_failure("request calendar access", e))?;
    info!(?status, "Calendar access");
    ctx.dispatch(Action::CalendarAccessChanged(status));
    if status.is_authorized() {
        sync_calendar(ctx).await?;
    }
    Ok(status)
}

/// Ask for location access.
pub async fn request_location_access(ctx: &AppContext) -> Result<AuthorizationStatus, AppError> {
    let status = ctx
        .location()
        .request_authorization()
        .await
        .map_err(|e| source_failure("request location access", e))?;
    info!(?status, "Location access");
    ctx.dispatch(Action::LocationAccessChanged(status));
    Ok(status)
}
