//! Billing Sync Engine
//!
//! A state-reconciliation engine that keeps a local customer billing aggregate (customer, addresses, payment
//! methods, subscriptions, transactions) in sync with a remote payment processor. It is gateway-agnostic: anything
//! implementing [`RemoteGateway`] can act as the remote side (see the `braintree_tools` crate for the HTTP client).
//!
//! The library is divided into three main sections:
//! 1. The aggregate model ([`mod@entities`]) and its wire-side counterpart ([`mod@remote`]), bridged by the pure
//!    field mappers ([`mod@mappers`]). Every syncable entity carries a remote-id/sync-status pair that drives the
//!    save state machine: only `Initial` and `Changed` entities cost remote calls.
//! 2. The sync protocols ([`mod@sync`]) and the orchestrator ([`BillingSyncApi`]), which saves the aggregate in
//!    strict entity-kind order with concurrent siblings, merges remote snapshots back in on load, and carries the
//!    on-demand cancel/refund/void operations.
//! 3. The event channel ([`mod@events`]): every state transition is announced as a [`events::SyncEvent`] that
//!    subscribers can hook for audit or observability. The engine never requires a subscriber.

pub mod api;
pub mod decline;
pub mod entities;
pub mod events;
pub mod helpers;
pub mod mappers;
pub mod remote;
pub mod sync;
pub mod traits;

pub use api::BillingSyncApi;
pub use traits::{
    guard,
    AggregateStore,
    GatewayError,
    NullStore,
    RemoteGateway,
    StoreError,
    SyncError,
};
