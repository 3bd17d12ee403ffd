use std::fmt::Debug;

use bsync_common::Money;
use log::*;

use crate::{
    entities::{Customer, LocalId, Plan},
    events::{EntityKind, EventProducers, SyncAction},
    sync,
    traits::{AggregateStore, RemoteGateway, SyncError},
};

/// `BillingSyncApi` is the primary API for reconciling a local billing aggregate against the remote payment
/// processor: full-aggregate save and load, plus the on-demand cancel/refund/void operations.
///
/// `G` talks to the processor, `S` persists the aggregate between save phases. Use [`crate::traits::NullStore`] when
/// persistence happens elsewhere.
pub struct BillingSyncApi<G, S> {
    gateway: G,
    store: S,
    plans: Vec<Plan>,
    producers: EventProducers,
}

impl<G, S> Debug for BillingSyncApi<G, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BillingSyncApi ({} plans)", self.plans.len())
    }
}

impl<G, S> BillingSyncApi<G, S> {
    pub fn new(gateway: G, store: S, plans: Vec<Plan>, producers: EventProducers) -> Self {
        Self { gateway, store, plans, producers }
    }

    /// Looks a plan up by its remote id.
    pub fn plan(&self, remote_id: &str) -> Option<&Plan> {
        self.plans.iter().find(|p| p.remote_id.as_str() == remote_id)
    }
}

impl<G, S> BillingSyncApi<G, S>
where
    G: RemoteGateway,
    S: AggregateStore,
{
    /// Saves the whole aggregate to the remote processor.
    ///
    /// Entity kinds go out in strict order -- customer, addresses, payment methods, subscriptions -- because each
    /// phase resolves references against the remote ids the previous one assigned. Siblings within a collection are
    /// saved concurrently. The aggregate is persisted through the store after every phase, so remote ids survive a
    /// failure partway through; a failed phase stops the phases after it.
    ///
    /// `original` is the aggregate as it was last persisted. It drives the changed-payment-method predicate and the
    /// discount diff; pass a clone taken before mutating when no persisted snapshot exists.
    pub async fn save(&self, customer: &mut Customer, original: &Customer) -> Result<(), SyncError> {
        trace!("🔁💾 Saving aggregate {}", customer.local_id);
        sync::customer::save(&self.gateway, &self.producers, customer).await?;
        self.store.persist(customer).await?;
        sync::address::save_all(&self.gateway, &self.producers, customer).await?;
        self.store.persist(customer).await?;
        sync::payment_method::save_all(&self.gateway, &self.producers, customer, original).await?;
        self.store.persist(customer).await?;
        sync::subscription::save_all(&self.gateway, &self.producers, customer, original).await?;
        self.store.persist(customer).await?;
        debug!("🔁💾 Aggregate {} saved", customer.local_id);
        Ok(())
    }

    /// Pulls the remote snapshot and merges it into the local aggregate. Requires a saved customer.
    pub async fn load(&self, customer: &mut Customer) -> Result<(), SyncError> {
        sync::load::load(&self.gateway, &self.producers, &self.plans, customer).await?;
        self.store.persist(customer).await?;
        Ok(())
    }

    /// Cancels one saved subscription immediately, without going through a full save.
    pub async fn cancel_subscription(
        &self,
        customer: &mut Customer,
        subscription_id: &LocalId,
    ) -> Result<(), SyncError> {
        sync::subscription::cancel(&self.gateway, &self.producers, customer, subscription_id).await?;
        self.store.persist(customer).await?;
        Ok(())
    }

    /// Refunds a saved transaction, fully when `amount` is `None`. The refund lands as a new transaction at the head
    /// of the aggregate's transaction list.
    pub async fn refund_transaction(
        &self,
        customer: &mut Customer,
        transaction_id: &LocalId,
        amount: Option<Money>,
    ) -> Result<(), SyncError> {
        sync::transaction::refund(&self.gateway, &self.producers, customer, transaction_id, amount).await?;
        self.store.persist(customer).await?;
        Ok(())
    }

    /// Voids a saved transaction, replacing the local record in place.
    pub async fn void_transaction(&self, customer: &mut Customer, transaction_id: &LocalId) -> Result<(), SyncError> {
        sync::transaction::void(&self.gateway, &self.producers, customer, transaction_id).await?;
        self.store.persist(customer).await?;
        Ok(())
    }

    /// Refreshes the local plan catalogue from the remote processor.
    pub async fn load_plans(&mut self) -> Result<&[Plan], SyncError> {
        self.producers.emit(EntityKind::Plan, SyncAction::Loading, ()).await;
        let remote_plans = self.gateway.all_plans().await?;
        self.producers.emit(EntityKind::Plan, SyncAction::Loaded, &remote_plans).await;
        self.plans = remote_plans.into_iter().map(Plan::from).collect();
        debug!("🔁📋 Loaded {} plans from the remote processor", self.plans.len());
        Ok(&self.plans)
    }
}
