use std::fmt::Display;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which entity a sync event concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Customer,
    Address,
    PaymentMethod,
    Subscription,
    Transaction,
    Plan,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Customer => write!(f, "customer"),
            EntityKind::Address => write!(f, "address"),
            EntityKind::PaymentMethod => write!(f, "paymentMethod"),
            EntityKind::Subscription => write!(f, "subscription"),
            EntityKind::Transaction => write!(f, "transaction"),
            EntityKind::Plan => write!(f, "plan"),
        }
    }
}

/// The state transition being announced. "-ing" actions fire before the remote call, the others after it succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncAction {
    Creating,
    Updating,
    Canceling,
    Canceled,
    Saved,
    Loading,
    Loaded,
    Refund,
    Refunded,
    Void,
    Voided,
}

impl Display for SyncAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncAction::Creating => write!(f, "creating"),
            SyncAction::Updating => write!(f, "updating"),
            SyncAction::Canceling => write!(f, "canceling"),
            SyncAction::Canceled => write!(f, "canceled"),
            SyncAction::Saved => write!(f, "saved"),
            SyncAction::Loading => write!(f, "loading"),
            SyncAction::Loaded => write!(f, "loaded"),
            SyncAction::Refund => write!(f, "refund"),
            SyncAction::Refunded => write!(f, "refunded"),
            SyncAction::Void => write!(f, "void"),
            SyncAction::Voided => write!(f, "voided"),
        }
    }
}

/// A structured notification of one engine state transition. Consumers subscribe for audit or observability; the
/// engine never depends on a subscriber existing.
#[derive(Debug, Clone, Serialize)]
pub struct SyncEvent {
    pub entity: EntityKind,
    pub action: SyncAction,
    pub payload: Value,
}

impl SyncEvent {
    pub fn new(entity: EntityKind, action: SyncAction, payload: impl Serialize) -> Self {
        let payload = serde_json::to_value(payload).unwrap_or(Value::Null);
        Self { entity, action, payload }
    }
}

impl PartialEq for SyncEvent {
    fn eq(&self, other: &Self) -> bool {
        self.entity == other.entity && self.action == other.action
    }
}
