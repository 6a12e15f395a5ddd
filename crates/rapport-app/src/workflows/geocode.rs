//! Background geocoding of contact addresses

use crate::action::Action;
use crate::context::AppContext;
use futures::future::join_all;
use rapport_core::{ContactId, Coordinate, PostalAddress};
use tracing::{debug, info};

/// Geocode every unresolved address in the current contacts. Returns how many
/// results were applied.
///
/// Lookups are queued together so the geocoder's queue depth reflects the
/// whole backlog. A result is dropped if its address was edited or resolved
/// in the meantime.
pub async fn geocode_pending_addresses(ctx: &AppContext) -> usize {
    let pending: Vec<(ContactId, PostalAddress)> = ctx.core().read(|s| {
        s.contacts
            .iter()
            .flat_map(|c| {
                c.postal_addresses
                    .iter()
                    .filter(|a| !a.is_located() && !a.is_blank())
                    .map(move |a| (c.id.clone(), a.clone()))
            })
            .collect()
    });
    if pending.is_empty() {
        return 0;
    }
    info!(pending = pending.len(), "Geocoding addresses");

    let lookups = pending.iter().map(|(id, address)| async move {
        let coordinate = ctx.geocoder().geocode(address).await?;
        apply_resolved_coordinate(ctx, id, &address.id(), coordinate).then_some(())
    });
    let applied = join_all(lookups).await.into_iter().flatten().count();

    info!(applied, "Geocoding finished");
    applied
}

/// Apply one geocode result if the address is still pending. Returns whether
/// it was applied.
pub fn apply_resolved_coordinate(
    ctx: &AppContext,
    id: &ContactId,
    address_id: &str,
    coordinate: Coordinate,
) -> bool {
    let applied = ctx.dispatch(Action::AddressResolved {
        id: id.clone(),
        address_id: address_id.to_string(),
        coordinate,
        at: ctx.time().physical_time(),
    });
    if !applied {
        debug!(contact_id = %id, address_id, "Discarding stale geocode result");
    }
    applied
}
