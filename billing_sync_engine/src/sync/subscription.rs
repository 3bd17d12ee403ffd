use futures_util::future::join_all;
use log::*;

use crate::{
    entities::{Customer, Discount, LocalId, RemoteId, SubscriptionStatus, SyncStatus},
    events::{EntityKind, EventProducers, SyncAction},
    mappers,
    remote::SubscriptionPayload,
    traits::{guard, RemoteGateway, SyncError},
};

enum Op {
    Cancel(RemoteId, SubscriptionPayload),
    Update(RemoteId, SubscriptionPayload),
    Create(SubscriptionPayload),
}

/// Saves every subscription that needs it, siblings concurrently.
///
/// The cancel edge takes precedence: a `Changed` subscription whose status moved to `Canceled` (and was not already
/// canceled before) is canceled remotely instead of updated. `Local` subscriptions are never synced. Updates never
/// resend `firstBillingDate`; the remote treats it as immutable after creation.
pub async fn save_all<G: RemoteGateway>(
    gateway: &G,
    events: &EventProducers,
    customer: &mut Customer,
    original: &Customer,
) -> Result<(), SyncError> {
    let mut planned: Vec<(usize, Op)> = Vec::new();
    for (index, subscription) in customer.subscriptions.iter().enumerate() {
        let original_sub = original.subscription(&subscription.local_id);
        let original_discounts = original_sub.map(|s| s.discounts.as_slice()).unwrap_or(&[]);
        let was_canceled = original_sub.map(|s| s.status == SubscriptionStatus::Canceled).unwrap_or(false);
        let canceling = subscription.status == SubscriptionStatus::Canceled && !was_canceled;
        match subscription.remote.status {
            SyncStatus::Changed if canceling => {
                let id = subscription.remote.id.clone().ok_or(SyncError::NotYetSaved("Subscription"))?;
                let data = mappers::subscription::payload(customer, original_discounts, subscription)?;
                planned.push((index, Op::Cancel(id, data)));
            },
            SyncStatus::Changed if subscription.status != SubscriptionStatus::Canceled => {
                let id = subscription.remote.id.clone().ok_or(SyncError::NotYetSaved("Subscription"))?;
                let mut data = mappers::subscription::payload(customer, original_discounts, subscription)?;
                data.first_billing_date = None;
                planned.push((index, Op::Update(id, data)));
            },
            SyncStatus::Initial => {
                let data = mappers::subscription::payload(customer, original_discounts, subscription)?;
                planned.push((index, Op::Create(data)));
            },
            _ => {},
        }
    }
    if planned.is_empty() {
        return Ok(());
    }
    debug!("🔁📅 Saving {} of {} subscriptions", planned.len(), customer.subscriptions.len());

    for (_, op) in &planned {
        match op {
            Op::Cancel(_, data) => events.emit(EntityKind::Subscription, SyncAction::Canceling, data).await,
            Op::Update(_, data) => events.emit(EntityKind::Subscription, SyncAction::Updating, data).await,
            Op::Create(data) => events.emit(EntityKind::Subscription, SyncAction::Creating, data).await,
        }
    }

    let calls = planned.iter().map(|(_, op)| async move {
        match op {
            Op::Cancel(id, _) => gateway.cancel_subscription(id).await,
            Op::Update(id, data) => gateway.update_subscription(id, data).await,
            Op::Create(data) => gateway.create_subscription(data).await,
        }
    });
    let results = join_all(calls).await;

    let mut first_error = None;
    for ((index, _), result) in planned.iter().zip(results) {
        match result.map_err(SyncError::from).and_then(guard) {
            Ok(remote) => {
                events.emit(EntityKind::Subscription, SyncAction::Saved, &remote).await;
                fold(customer, *index, &remote);
            },
            Err(e) => {
                warn!("🔁📅 Subscription save failed: {e}");
                first_error.get_or_insert(e);
            },
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Folds a remote subscription response into the aggregate: the subscription itself, then any nested transactions
/// the aggregate has not seen yet.
pub(crate) fn fold(customer: &mut Customer, index: usize, remote: &crate::remote::RemoteSubscription) {
    let payment_methods = customer.payment_methods.clone();
    let current_discounts: Vec<Discount> = customer.subscriptions[index].discounts.clone();
    mappers::subscription::apply_remote(
        &payment_methods,
        &current_discounts,
        &mut customer.subscriptions[index],
        remote,
    );
    customer.mark_modified(format!("subscriptions.{index}.discounts"));

    let subscriptions = customer.subscriptions.clone();
    for remote_tx in &remote.transactions {
        let local_id = LocalId::from(remote_tx.id.clone());
        if customer.transaction(&local_id).is_none() {
            customer.transactions.push(mappers::transaction::from_remote(&subscriptions, remote_tx));
        }
    }
}

/// Cancels a single saved subscription on demand, outside the save flow. Requires both the customer and the
/// subscription to be saved; fails before any remote call otherwise.
pub async fn cancel<G: RemoteGateway>(
    gateway: &G,
    events: &EventProducers,
    customer: &mut Customer,
    subscription_id: &LocalId,
) -> Result<(), SyncError> {
    if !customer.remote.is_saved() {
        return Err(SyncError::NotYetSaved("Customer"));
    }
    let index = customer
        .subscriptions
        .iter()
        .position(|s| &s.local_id == subscription_id)
        .ok_or_else(|| SyncError::MissingEntity("subscription", subscription_id.clone()))?;
    let subscription = &customer.subscriptions[index];
    if !subscription.remote.is_saved() {
        return Err(SyncError::NotYetSaved("Subscription"));
    }
    let remote_id = subscription.remote.id.clone().ok_or(SyncError::NotYetSaved("Subscription"))?;

    debug!("🔁📅 Canceling subscription {remote_id}");
    events.emit(EntityKind::Subscription, SyncAction::Canceling, subscription).await;
    let remote = guard(gateway.cancel_subscription(&remote_id).await?)?;
    events.emit(EntityKind::Subscription, SyncAction::Canceled, &remote).await;
    fold(customer, index, &remote);
    Ok(())
}
