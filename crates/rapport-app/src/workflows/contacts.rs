//! Contact edit workflows
//!
//! Edit-then-confirm: the external store is written first and the state is
//! updated from what the store returns. Nothing is applied optimistically.

use super::{attach_cached_coordinates, source_failure};
use crate::action::Action;
use crate::context::AppContext;
use crate::errors::AppError;
use rapport_core::{Contact, ContactId, CoreError, Coordinate, PostalAddress};
use tracing::{info, warn};

fn publish(ctx: &AppContext, mut contact: Contact) -> Contact {
    attach_cached_coordinates(ctx, &mut contact);
    ctx.dispatch(Action::ContactUpdated {
        contact: contact.clone(),
        at: ctx.time().physical_time(),
    });
    contact
}

fn require_fields(address: &PostalAddress) -> Result<(), AppError> {
    if address.is_blank() {
        return Err(CoreError::invalid("address has no fields").into());
    }
    Ok(())
}

/// Add an address to a contact.
pub async fn add_postal_address(
    ctx: &AppContext,
    id: &ContactId,
    address: PostalAddress,
) -> Result<Contact, AppError> {
    require_fields(&address)?;
    let stored = ctx
        .contacts()
        .add_postal_address(id, address)
        .await
        .map_err(|e| source_failure("add postal address", e))?;
    info!(contact_id = %id, "Added postal address");
    Ok(publish(ctx, stored))
}

/// Replace the address whose id is `address_id`.
pub async fn update_postal_address(
    ctx: &AppContext,
    id: &ContactId,
    address_id: &str,
    address: PostalAddress,
) -> Result<Contact, AppError> {
    require_fields(&address)?;
    let stored = ctx
        .contacts()
        .update_postal_address(id, address_id, address)
        .await
        .map_err(|e| source_failure("update postal address", e))?;
    info!(contact_id = %id, address_id, "Updated postal address");
    Ok(publish(ctx, stored))
}

/// Remove the address whose id is `address_id`.
pub async fn delete_postal_address(
    ctx: &AppContext,
    id: &ContactId,
    address_id: &str,
) -> Result<Contact, AppError> {
    let stored = ctx
        .contacts()
        .delete_postal_address(id, address_id)
        .await
        .map_err(|e| source_failure("delete postal address", e))?;
    info!(contact_id = %id, address_id, "Deleted postal address");
    Ok(publish(ctx, stored))
}

/// Replace or clear a contact's photo.
pub async fn update_photo(
    ctx: &AppContext,
    id: &ContactId,
    photo: Option<Vec<u8>>,
) -> Result<Contact, AppError> {
    let stored = ctx
        .contacts()
        .update_photo(id, photo)
        .await
        .map_err(|e| source_failure("update photo", e))?;
    info!(contact_id = %id, "Updated photo");
    Ok(publish(ctx, stored))
}

/// Delete a contact and forget its rating.
pub async fn delete_contact(ctx: &AppContext, id: &ContactId) -> Result<(), AppError> {
    ctx.contacts()
        .delete_contact(id)
        .await
        .map_err(|e| source_failure("delete contact", e))?;

    let at = ctx.time().physical_time();
    ctx.dispatch(Action::ContactDeleted { id: id.clone(), at });

    let affinities = {
        let mut store = ctx.affinities().lock();
        match store.remove(id) {
            Ok(true) => Some(store.snapshot()),
            Ok(false) => None,
            Err(e) => {
                warn!(contact_id = %id, error = %e, "Failed to forget affinity of deleted contact");
                None
            }
        }
    };
    if let Some(affinities) = affinities {
        ctx.dispatch(Action::AffinitiesChanged { affinities, at });
    }
    info!(contact_id = %id, "Deleted contact");
    Ok(())
}

/// Add an address picked from a map search, whose coordinate is already
/// known. The coordinate seeds the geocode cache so it is never looked up.
pub async fn assign_address_from_search(
    ctx: &AppContext,
    id: &ContactId,
    address: PostalAddress,
    coordinate: Coordinate,
) -> Result<Contact, AppError> {
    require_fields(&address)?;
    ctx.geocoder().cache(&address, coordinate);
    add_postal_address(ctx, id, address).await
}
