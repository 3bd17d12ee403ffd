use futures_util::future::join_all;
use log::*;

use crate::{
    entities::{Customer, RemoteId, SyncStatus},
    events::{EntityKind, EventProducers, SyncAction},
    mappers,
    remote::AddressPayload,
    traits::{guard, RemoteGateway, SyncError},
};

enum Op {
    Create(AddressPayload),
    Update(RemoteId, AddressPayload),
}

/// Saves every address that needs it, siblings concurrently. Address operations are scoped to the customer's remote
/// id, so the aggregate root must already be saved when any address has outstanding work.
pub async fn save_all<G: RemoteGateway>(
    gateway: &G,
    events: &EventProducers,
    customer: &mut Customer,
) -> Result<(), SyncError> {
    let mut planned: Vec<(usize, Op)> = Vec::new();
    for (index, address) in customer.addresses.iter().enumerate() {
        match (address.remote.status, address.remote.id.clone()) {
            (SyncStatus::Changed, Some(id)) => {
                planned.push((index, Op::Update(id, mappers::address::payload(address))));
            },
            (SyncStatus::Initial, _) => planned.push((index, Op::Create(mappers::address::payload(address)))),
            _ => {},
        }
    }
    if planned.is_empty() {
        return Ok(());
    }
    let customer_id = customer.remote.id.clone().ok_or(SyncError::NotYetSaved("Customer"))?;
    debug!("🔁📫 Saving {} of {} addresses", planned.len(), customer.addresses.len());

    for (_, op) in &mut planned {
        match op {
            Op::Create(data) => {
                data.customer_id = Some(customer_id.0.clone());
                events.emit(EntityKind::Address, SyncAction::Creating, &*data).await;
            },
            Op::Update(_, data) => events.emit(EntityKind::Address, SyncAction::Updating, &*data).await,
        }
    }

    let customer_id = &customer_id;
    let calls = planned.iter().map(|(_, op)| async move {
        match op {
            Op::Create(data) => gateway.create_address(data).await,
            Op::Update(id, data) => gateway.update_address(customer_id, id, data).await,
        }
    });
    let results = join_all(calls).await;

    let mut first_error = None;
    for ((index, _), result) in planned.iter().zip(results) {
        match result.map_err(SyncError::from).and_then(guard) {
            Ok(remote) => {
                events.emit(EntityKind::Address, SyncAction::Saved, &remote).await;
                mappers::address::apply_remote(&mut customer.addresses[*index], &remote);
                customer.mark_modified(format!("addresses.{index}"));
            },
            Err(e) => {
                warn!("🔁📫 Address save failed: {e}");
                first_error.get_or_insert(e);
            },
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
