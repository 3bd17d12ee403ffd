//! The aggregate load/merge engine.
//!
//! Pulls the full customer snapshot from the remote (payment methods nesting subscriptions nesting transactions),
//! flattens the nesting, and merges each collection into the local aggregate by remote id: known entities are folded
//! in place, unknown ones appear as already-`Saved` locals. Running a load twice against the same remote snapshot
//! changes nothing the second time.

use log::*;

use crate::{
    entities::{Customer, Linked, Plan},
    events::{EntityKind, EventProducers, SyncAction},
    mappers,
    remote::{RemoteSubscription, RemoteTransaction},
    traits::{RemoteGateway, SyncError},
};

fn dedupe_by<T, K: PartialEq>(items: impl IntoIterator<Item = T>, key: impl Fn(&T) -> K) -> Vec<T> {
    let mut seen: Vec<K> = Vec::new();
    let mut out: Vec<T> = Vec::new();
    for item in items {
        let k = key(&item);
        if !seen.contains(&k) {
            seen.push(k);
            out.push(item);
        }
    }
    out
}

fn has_remote_id<T: Linked>(entity: &T, remote_id: &str) -> bool {
    entity.remote().id.as_ref().map(|id| id.as_str() == remote_id).unwrap_or(false)
}

pub async fn load<G: RemoteGateway>(
    gateway: &G,
    events: &EventProducers,
    plans: &[Plan],
    customer: &mut Customer,
) -> Result<(), SyncError> {
    if !customer.remote.is_saved() {
        return Err(SyncError::NotYetSaved("Customer"));
    }
    let id = customer.remote.id.clone().ok_or(SyncError::NotYetSaved("Customer"))?;

    debug!("🔁⬇️ Loading customer {id} from the remote processor");
    events.emit(EntityKind::Customer, SyncAction::Loading, &*customer).await;
    let remote = gateway.find_customer(&id).await?;
    events.emit(EntityKind::Customer, SyncAction::Loaded, &remote).await;

    mappers::customer::apply_remote(customer, &remote);

    // flatten the nested collections, dropping duplicates the nesting produces
    let remote_subscriptions: Vec<RemoteSubscription> =
        dedupe_by(remote.payment_methods.iter().flat_map(|pm| pm.subscriptions.clone()), |s| s.id.clone());
    let mut remote_transactions: Vec<RemoteTransaction> =
        dedupe_by(remote_subscriptions.iter().flat_map(|s| s.transactions.clone()), |t| t.id.clone());
    // newest first; unknown creation times sort last
    remote_transactions.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    for remote_address in &remote.addresses {
        match customer.addresses.iter_mut().find(|a| has_remote_id(*a, &remote_address.id)) {
            Some(address) => mappers::address::apply_remote(address, remote_address),
            None => customer.addresses.push(mappers::address::from_remote(remote_address)),
        }
    }

    let addresses = customer.addresses.clone();
    for remote_pm in &remote.payment_methods {
        match customer.payment_methods.iter_mut().find(|p| has_remote_id(*p, &remote_pm.token)) {
            Some(pm) => mappers::payment_method::apply_remote(&addresses, pm, remote_pm),
            None => customer.payment_methods.push(mappers::payment_method::from_remote(&addresses, remote_pm)),
        }
    }

    let payment_methods = customer.payment_methods.clone();
    for remote_sub in &remote_subscriptions {
        let plan = plans.iter().find(|p| Some(p.remote_id.as_str()) == remote_sub.plan_id.as_deref()).cloned();
        if plan.is_none() {
            warn!("🔁⬇️ No local plan matches remote plan id {:?}", remote_sub.plan_id);
        }
        match customer.subscriptions.iter_mut().find(|s| has_remote_id(*s, &remote_sub.id)) {
            Some(subscription) => {
                let local_discounts = subscription.discounts.clone();
                mappers::subscription::apply_remote(&payment_methods, &local_discounts, subscription, remote_sub);
                if plan.is_some() {
                    subscription.plan = plan;
                }
            },
            None => {
                let mut subscription = mappers::subscription::from_remote(&payment_methods, remote_sub);
                subscription.plan = plan;
                customer.subscriptions.push(subscription);
            },
        }
    }

    let subscriptions = customer.subscriptions.clone();
    let mut fresh = Vec::new();
    for remote_tx in &remote_transactions {
        match customer.transactions.iter_mut().find(|t| t.local_id.as_str() == remote_tx.id) {
            Some(tx) => *tx = mappers::transaction::from_remote(&subscriptions, remote_tx),
            None => fresh.push(mappers::transaction::from_remote(&subscriptions, remote_tx)),
        }
    }
    // remote_transactions is newest-first, so prepending in reverse keeps that order at the head
    for tx in fresh.into_iter().rev() {
        customer.transactions.insert(0, tx);
    }

    // nesting plus repeated loads must never leave duplicates behind
    let merge_key = |id: Option<&str>, local: &str| id.map(String::from).unwrap_or_else(|| local.to_string());
    customer.payment_methods = dedupe_by(std::mem::take(&mut customer.payment_methods), |p| {
        merge_key(p.remote.id.as_ref().map(|i| i.as_str()), p.local_id.as_str())
    });
    customer.subscriptions = dedupe_by(std::mem::take(&mut customer.subscriptions), |s| {
        merge_key(s.remote.id.as_ref().map(|i| i.as_str()), s.local_id.as_str())
    });
    customer.transactions = dedupe_by(std::mem::take(&mut customer.transactions), |t| t.local_id.clone());

    debug!(
        "🔁⬇️ Loaded customer {id}: {} addresses, {} payment methods, {} subscriptions, {} transactions",
        customer.addresses.len(),
        customer.payment_methods.len(),
        customer.subscriptions.len(),
        customer.transactions.len()
    );
    Ok(())
}
