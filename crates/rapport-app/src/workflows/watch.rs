//! Source change listener

use super::geocode::geocode_pending_addresses;
use super::sync::{sync_calendar, sync_contacts};
use crate::action::Action;
use crate::context::AppContext;
use std::sync::Arc;
use tracing::{info, warn};

/// Re-sync on every source notification until a feed closes.
///
/// Contact changes also kick off geocoding of new addresses on a separate
/// task, so a long geocode backlog does not delay later notifications.
pub async fn watch_sources(ctx: Arc<AppContext>) {
    let mut contacts = ctx.contacts().changes();
    let mut calendar = ctx.calendar().changes();
    let mut location = ctx.location().changes();
    info!("Watching sources");

    loop {
        tokio::select! {
            changed = contacts.changed() => {
                if changed.is_err() {
                    break;
                }
                match sync_contacts(&ctx).await {
                    Ok(true) => {
                        let ctx = Arc::clone(&ctx);
                        tokio::spawn(async move {
                            geocode_pending_addresses(&ctx).await;
                        });
                    }
                    Ok(false) => {}
                    Err(e) => warn!(error = %e, "Contact resync failed"),
                }
            }
            changed = calendar.changed() => {
                if changed.is_err() {
                    break;
                }
                if let Err(e) = sync_calendar(&ctx).await {
                    warn!(error = %e, "Calendar resync failed");
                }
            }
            changed = location.changed() => {
                if changed.is_err() {
                    break;
                }
                ctx.dispatch(Action::LocationAccessChanged(
                    ctx.location().authorization_status(),
                ));
            }
        }
    }
    info!("Source feeds closed");
}
