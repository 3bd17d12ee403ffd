use log::*;

use crate::{
    entities::{Customer, SyncStatus},
    events::{EntityKind, EventProducers, SyncAction},
    mappers,
    traits::{guard, RemoteGateway, SyncError},
};

/// Saves the aggregate root itself. `Initial` creates, `Changed` updates, anything else is a no-op with zero remote
/// calls.
pub async fn save<G: RemoteGateway>(
    gateway: &G,
    events: &EventProducers,
    customer: &mut Customer,
) -> Result<(), SyncError> {
    let data = mappers::customer::payload(customer);
    let remote = match (customer.remote.status, customer.remote.id.clone()) {
        (SyncStatus::Changed, Some(id)) => {
            debug!("🔁👤 Updating customer {id} on the remote processor");
            events.emit(EntityKind::Customer, SyncAction::Updating, &data).await;
            guard(gateway.update_customer(&id, &data).await?)?
        },
        (SyncStatus::Initial, _) => {
            debug!("🔁👤 Creating customer {} on the remote processor", customer.local_id);
            events.emit(EntityKind::Customer, SyncAction::Creating, &data).await;
            guard(gateway.create_customer(&data).await?)?
        },
        _ => return Ok(()),
    };
    events.emit(EntityKind::Customer, SyncAction::Saved, &remote).await;
    mappers::customer::apply_remote(customer, &remote);
    Ok(())
}
