//! Refund, void and on-demand cancel scenarios.
mod support;

use billing_sync_engine::{
    entities::{Customer, LocalId, RemoteId, RemoteLink, SubscriptionStatus, Transaction},
    events::SyncAction,
    remote::{RemoteResult, RemoteStatusEntry},
    BillingSyncApi,
    NullStore,
    SyncError,
};
use bsync_common::Money;
use support::*;

fn customer_with_transaction() -> Customer {
    let mut customer = Customer::new("Pesho Peshev");
    customer.remote = RemoteLink::saved("cus-1");
    let mut tx = Transaction::new(LocalId::from("tx-1"), Money::from_cents(1341));
    tx.remote = RemoteLink::saved("tx-1");
    tx.status = Some("settled".to_string());
    customer.transactions.push(tx);
    customer
}

#[tokio::test]
async fn partial_refund_prepends_a_new_transaction() {
    let _ = env_logger::try_init();
    let gateway = MockGateway::new();
    let mut refund = remote_transaction("tx-2", Money::from_cents(350), "sub-1");
    refund.refunded_transaction_id = Some("tx-1".to_string());
    gateway.script_transaction(RemoteResult::ok(refund));

    let api = BillingSyncApi::new(gateway.clone(), NullStore, vec![], Default::default());
    let mut customer = customer_with_transaction();

    api.refund_transaction(&mut customer, &LocalId::from("tx-1"), Some(Money::from_cents(350))).await.unwrap();

    assert_eq!(gateway.calls(), vec!["refund_transaction"]);
    assert_eq!(customer.transactions.len(), 2);
    assert_eq!(customer.transactions[0].local_id.as_str(), "tx-2");
    assert_eq!(customer.transactions[0].amount, Money::from_cents(350));
    assert_eq!(customer.transactions[0].refunded_transaction_id, Some(RemoteId::from("tx-1")));
    // the refunded transaction itself is untouched
    assert_eq!(customer.transactions[1].local_id.as_str(), "tx-1");
    assert_eq!(customer.transactions[1].amount, Money::from_cents(1341));
}

#[tokio::test]
async fn refund_preconditions_fail_before_any_remote_call() {
    let _ = env_logger::try_init();
    let gateway = MockGateway::new();
    let api = BillingSyncApi::new(gateway.clone(), NullStore, vec![], Default::default());

    // unsaved transaction
    let mut customer = customer_with_transaction();
    customer.transactions[0].remote = RemoteLink::initial();
    let err = api.refund_transaction(&mut customer, &LocalId::from("tx-1"), None).await.unwrap_err();
    assert!(matches!(err, SyncError::NotYetSaved("Transaction")));

    // unsaved customer
    let mut customer = customer_with_transaction();
    customer.remote = RemoteLink::initial();
    let err = api.refund_transaction(&mut customer, &LocalId::from("tx-1"), None).await.unwrap_err();
    assert!(matches!(err, SyncError::NotYetSaved("Customer")));

    // unknown transaction
    let mut customer = customer_with_transaction();
    let err = api.refund_transaction(&mut customer, &LocalId::from("tx-9"), None).await.unwrap_err();
    assert!(matches!(err, SyncError::MissingEntity("transaction", _)));

    assert_eq!(gateway.call_count(), 0);
}

#[tokio::test]
async fn void_replaces_the_transaction_in_place() {
    let _ = env_logger::try_init();
    let gateway = MockGateway::new();
    let mut voided = remote_transaction("tx-1", Money::from_cents(1341), "sub-1");
    voided.status = Some("voided".to_string());
    gateway.script_transaction(RemoteResult::ok(voided));

    let api = BillingSyncApi::new(gateway.clone(), NullStore, vec![], Default::default());
    let mut customer = customer_with_transaction();
    // a newer transaction at the head, so in-place replacement is observable
    let mut newer = Transaction::new(LocalId::from("tx-0"), Money::from_cents(500));
    newer.remote = RemoteLink::saved("tx-0");
    customer.transactions.insert(0, newer);

    api.void_transaction(&mut customer, &LocalId::from("tx-1")).await.unwrap();

    assert_eq!(gateway.calls(), vec!["void_transaction"]);
    assert_eq!(customer.transactions.len(), 2);
    assert_eq!(customer.transactions[0].local_id.as_str(), "tx-0");
    assert_eq!(customer.transactions[1].local_id.as_str(), "tx-1");
    assert_eq!(customer.transactions[1].status.as_deref(), Some("voided"));
}

#[tokio::test]
async fn cancel_appends_a_single_canceled_history_entry() {
    let _ = env_logger::try_init();
    let gateway = MockGateway::new();
    let mut response = remote_subscription("sub-1", "tok-1");
    response.status = Some("Canceled".to_string());
    response.status_history.push(RemoteStatusEntry { timestamp: None, status: Some("Canceled".to_string()) });
    gateway.script_subscription(RemoteResult::ok(response));

    let capture = EventCapture::new();
    let api = BillingSyncApi::new(gateway.clone(), NullStore, vec![monthly_plan()], capture.producers());

    let mut customer = fresh_aggregate();
    customer.remote = RemoteLink::saved("cus-1");
    customer.payment_methods[0].remote = RemoteLink::saved("tok-1");
    customer.subscriptions[0].remote = RemoteLink::saved("sub-1");
    customer.subscriptions[0].status = SubscriptionStatus::Active;
    let subscription_id = customer.subscriptions[0].local_id.clone();

    api.cancel_subscription(&mut customer, &subscription_id).await.unwrap();

    assert_eq!(gateway.calls(), vec!["cancel_subscription"]);
    let subscription = &customer.subscriptions[0];
    assert_eq!(subscription.status, SubscriptionStatus::Canceled);
    assert_eq!(subscription.status_history.len(), 2);
    assert_eq!(subscription.status_history[1].status, SubscriptionStatus::Canceled);

    drop(api);
    let events = capture.drain().await;
    let actions: Vec<SyncAction> = events.iter().map(|e| e.action).collect();
    assert!(actions.contains(&SyncAction::Canceling));
    assert!(actions.contains(&SyncAction::Canceled));
}

#[tokio::test]
async fn unsaved_subscription_cannot_be_canceled() {
    let _ = env_logger::try_init();
    let gateway = MockGateway::new();
    let api = BillingSyncApi::new(gateway.clone(), NullStore, vec![monthly_plan()], Default::default());

    let mut customer = fresh_aggregate();
    customer.remote = RemoteLink::saved("cus-1");
    let subscription_id = customer.subscriptions[0].local_id.clone();

    let err = api.cancel_subscription(&mut customer, &subscription_id).await.unwrap_err();
    assert!(matches!(err, SyncError::NotYetSaved("Subscription")));
    assert_eq!(gateway.call_count(), 0);
}
