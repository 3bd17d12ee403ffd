//! Aggregate load/merge scenarios: nested flattening, reference resolution, ordering and idempotence.
mod support;

use billing_sync_engine::{
    entities::{Customer, RemoteLink},
    BillingSyncApi,
    NullStore,
    SyncError,
};
use bsync_common::Money;
use chrono::{TimeZone, Utc};
use support::*;

fn scripted_remote() -> billing_sync_engine::remote::RemoteCustomer {
    let mut remote = remote_customer("cus-1");
    remote.addresses.push(remote_address("addr-1"));

    let mut old_tx = remote_transaction("tx-old", Money::from_cents(1498), "sub-1");
    old_tx.created_at = Some(Utc.with_ymd_and_hms(2026, 1, 10, 12, 0, 0).unwrap());
    let mut new_tx = remote_transaction("tx-new", Money::from_cents(350), "sub-1");
    new_tx.created_at = Some(Utc.with_ymd_and_hms(2026, 2, 20, 12, 0, 0).unwrap());

    let mut subscription = remote_subscription("sub-1", "tok-1");
    // deliberately oldest first; the merge must re-order
    subscription.transactions.push(old_tx);
    subscription.transactions.push(new_tx);

    let mut pm = remote_payment_method("tok-1", Some("addr-1"));
    pm.subscriptions.push(subscription);
    remote.payment_methods.push(pm);
    remote
}

#[tokio::test]
async fn load_merges_nested_collections_and_resolves_references() {
    let _ = env_logger::try_init();
    let gateway = MockGateway::new();
    gateway.script_find(scripted_remote());

    let api = BillingSyncApi::new(gateway.clone(), NullStore, vec![monthly_plan()], Default::default());
    let mut customer = Customer::new("Placeholder");
    customer.remote = RemoteLink::saved("cus-1");

    api.load(&mut customer).await.unwrap();

    assert_eq!(customer.name, "Pesho Peshev");
    assert_eq!(customer.addresses.len(), 1);
    assert_eq!(customer.payment_methods.len(), 1);
    assert_eq!(customer.subscriptions.len(), 1);
    assert_eq!(customer.transactions.len(), 2);

    // references were resolved remote -> local
    let address = &customer.addresses[0];
    let pm = &customer.payment_methods[0];
    let subscription = &customer.subscriptions[0];
    assert_eq!(pm.billing_address_id, Some(address.local_id.clone()));
    assert_eq!(subscription.payment_method_id, Some(pm.local_id.clone()));
    assert_eq!(customer.transactions[0].subscription_id, Some(subscription.local_id.clone()));

    // the plan was looked up locally
    assert_eq!(subscription.plan.as_ref().unwrap().remote_id.as_str(), "monthly");

    // transactions come out newest first regardless of the nesting order
    assert_eq!(customer.transactions[0].local_id.as_str(), "tx-new");
    assert_eq!(customer.transactions[1].local_id.as_str(), "tx-old");

    assert!(customer.addresses[0].remote.is_saved());
    assert!(pm.remote.is_saved());
    assert!(subscription.remote.is_saved());
    assert!(customer.transactions.iter().all(|t| t.remote.is_saved()));
}

#[tokio::test]
async fn loading_the_same_snapshot_twice_changes_nothing() {
    let _ = env_logger::try_init();
    let gateway = MockGateway::new();
    gateway.script_find(scripted_remote());
    gateway.script_find(scripted_remote());

    let api = BillingSyncApi::new(gateway.clone(), NullStore, vec![monthly_plan()], Default::default());
    let mut customer = Customer::new("Placeholder");
    customer.remote = RemoteLink::saved("cus-1");

    api.load(&mut customer).await.unwrap();
    let after_first = customer.clone();
    api.load(&mut customer).await.unwrap();
    assert_eq!(customer, after_first);
}

#[tokio::test]
async fn unsaved_customer_cannot_be_loaded() {
    let _ = env_logger::try_init();
    let gateway = MockGateway::new();
    let api = BillingSyncApi::new(gateway.clone(), NullStore, vec![], Default::default());

    let mut customer = Customer::new("Nobody");
    let err = api.load(&mut customer).await.unwrap_err();
    assert!(matches!(err, SyncError::NotYetSaved("Customer")));
    assert_eq!(gateway.call_count(), 0);
}

#[tokio::test]
async fn unknown_plan_id_merges_the_subscription_without_a_plan() {
    let _ = env_logger::try_init();
    let gateway = MockGateway::new();
    let mut remote = scripted_remote();
    remote.payment_methods[0].subscriptions[0].plan_id = Some("weekly".to_string());
    gateway.script_find(remote);

    let api = BillingSyncApi::new(gateway.clone(), NullStore, vec![monthly_plan()], Default::default());
    let mut customer = Customer::new("Placeholder");
    customer.remote = RemoteLink::saved("cus-1");

    api.load(&mut customer).await.unwrap();
    assert_eq!(customer.subscriptions.len(), 1);
    assert_eq!(customer.subscriptions[0].plan, None);
    assert!(customer.subscriptions[0].remote.is_saved());
}
