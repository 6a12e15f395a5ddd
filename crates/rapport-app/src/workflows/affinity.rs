//! Affinity workflow

use crate::action::Action;
use crate::context::AppContext;
use crate::errors::AppError;
use rapport_core::{Affinity, ContactId};
use tracing::{error, info};

/// Persist a rating, then publish the whole rating set.
///
/// On a write failure neither the store nor the state changes.
pub async fn set_person_affinity(
    ctx: &AppContext,
    id: &ContactId,
    affinity: Affinity,
) -> Result<(), AppError> {
    let affinities = {
        let mut store = ctx.affinities().lock();
        if let Err(e) = store.set(id.clone(), affinity) {
            error!(contact_id = %id, error = %e, "Failed to persist affinity");
            return Err(e.into());
        }
        store.snapshot()
    };

    info!(contact_id = %id, %affinity, "Affinity set");
    ctx.dispatch(Action::AffinitiesChanged {
        affinities,
        at: ctx.time().physical_time(),
    });
    Ok(())
}
