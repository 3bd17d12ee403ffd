use bsync_common::Money;
use log::*;

use crate::{
    entities::{Customer, LocalId, RemoteId},
    events::{EntityKind, EventProducers, SyncAction},
    mappers,
    traits::{guard, RemoteGateway, SyncError},
};

fn saved_transaction_id(customer: &Customer, transaction_id: &LocalId) -> Result<RemoteId, SyncError> {
    if !customer.remote.is_saved() {
        return Err(SyncError::NotYetSaved("Customer"));
    }
    let transaction = customer
        .transaction(transaction_id)
        .ok_or_else(|| SyncError::MissingEntity("transaction", transaction_id.clone()))?;
    if !transaction.remote.is_saved() {
        return Err(SyncError::NotYetSaved("Transaction"));
    }
    transaction.remote.id.clone().ok_or(SyncError::NotYetSaved("Transaction"))
}

/// Refunds a settled transaction, fully when `amount` is `None`. The processor answers with a brand-new refund
/// transaction, which is prepended to the aggregate's newest-first transaction list.
pub async fn refund<G: RemoteGateway>(
    gateway: &G,
    events: &EventProducers,
    customer: &mut Customer,
    transaction_id: &LocalId,
    amount: Option<Money>,
) -> Result<(), SyncError> {
    let remote_id = saved_transaction_id(customer, transaction_id)?;

    debug!("🔁💸 Refunding transaction {remote_id}");
    events.emit(EntityKind::Transaction, SyncAction::Refund, &amount).await;
    let remote = guard(gateway.refund_transaction(&remote_id, amount).await?)?;
    events.emit(EntityKind::Transaction, SyncAction::Refunded, &remote).await;

    let refund = mappers::transaction::from_remote(&customer.subscriptions, &remote);
    customer.transactions.insert(0, refund);
    Ok(())
}

/// Voids a not-yet-settled transaction. Unlike a refund, a void mutates the existing remote record, so the matching
/// local transaction is replaced in place.
pub async fn void<G: RemoteGateway>(
    gateway: &G,
    events: &EventProducers,
    customer: &mut Customer,
    transaction_id: &LocalId,
) -> Result<(), SyncError> {
    let remote_id = saved_transaction_id(customer, transaction_id)?;

    debug!("🔁💸 Voiding transaction {remote_id}");
    events.emit(EntityKind::Transaction, SyncAction::Void, transaction_id).await;
    let remote = guard(gateway.void_transaction(&remote_id).await?)?;
    events.emit(EntityKind::Transaction, SyncAction::Voided, &remote).await;

    let voided = mappers::transaction::from_remote(&customer.subscriptions, &remote);
    match customer.transactions.iter().position(|t| &t.local_id == transaction_id) {
        Some(index) => customer.transactions[index] = voided,
        None => customer.transactions.insert(0, voided),
    }
    Ok(())
}
