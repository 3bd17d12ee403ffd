use futures_util::future::join_all;
use log::*;

use crate::{
    entities::{Customer, RemoteId, SyncStatus},
    events::{EntityKind, EventProducers, SyncAction},
    mappers,
    remote::PaymentMethodPayload,
    traits::{guard, RemoteGateway, SyncError},
};

enum Op {
    Create(PaymentMethodPayload),
    Update(RemoteId, PaymentMethodPayload),
}

/// Saves every payment method that needs it, siblings concurrently.
///
/// A `Changed` payment method is only sent when [`mappers::payment_method::is_changed`] holds against the
/// pre-modification aggregate; status churn without an actual difference costs no remote call. When the processor
/// attaches a billing address to the response and the local entity had none, a new already-`Saved` address is added
/// to the aggregate and referenced.
pub async fn save_all<G: RemoteGateway>(
    gateway: &G,
    events: &EventProducers,
    customer: &mut Customer,
    original: &Customer,
) -> Result<(), SyncError> {
    let mut planned: Vec<(usize, Op)> = Vec::new();
    for (index, pm) in customer.payment_methods.iter().enumerate() {
        match (pm.remote.status, pm.remote.id.clone()) {
            (SyncStatus::Changed, Some(id)) if mappers::payment_method::is_changed(customer, original, pm) => {
                planned.push((index, Op::Update(id, mappers::payment_method::payload(customer, pm))));
            },
            (SyncStatus::Initial, _) => {
                let customer_id = customer.remote.id.as_ref().ok_or(SyncError::NotYetSaved("Customer"))?;
                let mut data = mappers::payment_method::payload(customer, pm);
                data.customer_id = Some(customer_id.0.clone());
                planned.push((index, Op::Create(data)));
            },
            _ => {},
        }
    }
    if planned.is_empty() {
        return Ok(());
    }
    debug!("🔁💳 Saving {} of {} payment methods", planned.len(), customer.payment_methods.len());

    for (_, op) in &planned {
        match op {
            Op::Create(data) => events.emit(EntityKind::PaymentMethod, SyncAction::Creating, data).await,
            Op::Update(_, data) => events.emit(EntityKind::PaymentMethod, SyncAction::Updating, data).await,
        }
    }

    let calls = planned.iter().map(|(_, op)| async move {
        match op {
            Op::Create(data) => gateway.create_payment_method(data).await,
            Op::Update(token, data) => gateway.update_payment_method(token, data).await,
        }
    });
    let results = join_all(calls).await;

    let mut first_error = None;
    for ((index, _), result) in planned.iter().zip(results) {
        match result.map_err(SyncError::from).and_then(guard) {
            Ok(remote) => {
                events.emit(EntityKind::PaymentMethod, SyncAction::Saved, &remote).await;
                // The processor derives a billing address from the instrument when none was sent; adopt it
                if customer.payment_methods[*index].billing_address_id.is_none() {
                    if let Some(remote_billing) = &remote.billing_address {
                        let address = mappers::address::from_remote(remote_billing);
                        customer.payment_methods[*index].billing_address_id = Some(address.local_id.clone());
                        customer.addresses.push(address);
                    }
                }
                let addresses = customer.addresses.clone();
                mappers::payment_method::apply_remote(&addresses, &mut customer.payment_methods[*index], &remote);
                customer.mark_modified(format!("paymentMethods.{index}"));
            },
            Err(e) => {
                warn!("🔁💳 Payment method save failed: {e}");
                first_error.get_or_insert(e);
            },
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
