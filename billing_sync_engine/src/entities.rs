//! Local billing aggregate types.
//!
//! The aggregate root is [`Customer`], which owns the address, payment method, subscription and transaction
//! collections. Every syncable entity carries a [`RemoteLink`] — the remote id assigned by the payment processor plus
//! the [`SyncStatus`] flag that drives the save state machine.

use std::{fmt::Display, str::FromStr};

use bsync_common::Money;
use chrono::{DateTime, Utc};
use log::error;
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

//--------------------------------------     SyncStatus      ---------------------------------------------------------

/// The four-valued flag governing whether and how an entity is synced.
///
/// Only `Initial` and `Changed` trigger outbound calls; `Saved` and `Local` are no-ops on save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncStatus {
    /// Never to be synced. Used for entities with no remote counterpart, e.g. a local-only discount.
    Local,
    /// New locally, never synced.
    #[default]
    Initial,
    /// Synced before, modified locally since.
    Changed,
    /// Matches the remote as of the last sync.
    Saved,
}

impl Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncStatus::Local => write!(f, "Local"),
            SyncStatus::Initial => write!(f, "Initial"),
            SyncStatus::Changed => write!(f, "Changed"),
            SyncStatus::Saved => write!(f, "Saved"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ConversionError(String);

impl FromStr for SyncStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Local" => Ok(Self::Local),
            "Initial" => Ok(Self::Initial),
            "Changed" => Ok(Self::Changed),
            "Saved" => Ok(Self::Saved),
            s => Err(ConversionError(format!("Invalid sync status: {s}"))),
        }
    }
}

//--------------------------------------    LocalId / RemoteId    ----------------------------------------------------

/// Identity of an entity within the local aggregate. Stable across syncs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalId(pub String);

impl LocalId {
    /// Generates a fresh random local id.
    pub fn generate() -> Self {
        let id: String = rand::thread_rng().sample_iter(&Alphanumeric).take(16).map(char::from).collect();
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S: Into<String>> From<S> for LocalId {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

impl Display for LocalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier assigned by the payment processor upon successful create. Immutable afterward.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteId(pub String);

impl RemoteId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S: Into<String>> From<S> for RemoteId {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

impl Display for RemoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------     RemoteLink      ---------------------------------------------------------

/// The remote-id / sync-status pair attached to every syncable entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteLink {
    pub id: Option<RemoteId>,
    pub status: SyncStatus,
}

impl RemoteLink {
    pub fn initial() -> Self {
        Self { id: None, status: SyncStatus::Initial }
    }

    pub fn local() -> Self {
        Self { id: None, status: SyncStatus::Local }
    }

    pub fn saved(id: impl Into<RemoteId>) -> Self {
        Self { id: Some(id.into()), status: SyncStatus::Saved }
    }

    pub fn is_saved(&self) -> bool {
        self.id.is_some() && self.status == SyncStatus::Saved
    }
}

/// Implemented by every entity that carries a local id and a remote link, so that cross-references can be resolved
/// generically in both directions.
pub trait Linked {
    fn local_id(&self) -> &LocalId;
    fn remote(&self) -> &RemoteLink;
}

/// Resolves a local cross-reference to the referenced entity's remote id, if it has one.
pub fn remote_id_of<T: Linked>(items: &[T], local: Option<&LocalId>) -> Option<RemoteId> {
    let local = local?;
    items.iter().find(|i| i.local_id() == local).and_then(|i| i.remote().id.clone())
}

/// Resolves a remote id back to the local id of the matching entity. Returns `None` when nothing matches — an
/// unresolved reference is a null reference, never an error.
pub fn local_id_of<T: Linked>(items: &[T], remote: Option<&str>) -> Option<LocalId> {
    let remote = remote?;
    items
        .iter()
        .find(|i| i.remote().id.as_ref().map(|r| r.as_str() == remote).unwrap_or(false))
        .map(|i| i.local_id().clone())
}

macro_rules! linked {
    ($t:ty) => {
        impl Linked for $t {
            fn local_id(&self) -> &LocalId {
                &self.local_id
            }

            fn remote(&self) -> &RemoteLink {
                &self.remote
            }
        }
    };
}

//--------------------------------------      Customer       ---------------------------------------------------------

/// The aggregate root: one customer plus the nested collections that are loaded and saved as a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub local_id: LocalId,
    pub remote: RemoteLink,
    /// Full name as a single field. Split into first/last at the mapper boundary.
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub ip_address: Option<String>,
    pub default_payment_method_id: Option<LocalId>,
    pub addresses: Vec<Address>,
    pub payment_methods: Vec<PaymentMethod>,
    pub subscriptions: Vec<Subscription>,
    /// Newest first. The merge engine maintains this ordering.
    pub transactions: Vec<Transaction>,
    /// Dirty-field hints for the persistence layer. Consumed by [`Customer::take_modified_paths`].
    #[serde(skip)]
    pub modified_paths: Vec<String>,
}

linked!(Customer);

impl Customer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            local_id: LocalId::generate(),
            remote: RemoteLink::initial(),
            name: name.into(),
            email: None,
            phone: None,
            ip_address: None,
            default_payment_method_id: None,
            addresses: Vec::new(),
            payment_methods: Vec::new(),
            subscriptions: Vec::new(),
            transactions: Vec::new(),
            modified_paths: Vec::new(),
        }
    }

    pub fn address(&self, id: &LocalId) -> Option<&Address> {
        self.addresses.iter().find(|a| &a.local_id == id)
    }

    pub fn payment_method(&self, id: &LocalId) -> Option<&PaymentMethod> {
        self.payment_methods.iter().find(|p| &p.local_id == id)
    }

    pub fn subscription(&self, id: &LocalId) -> Option<&Subscription> {
        self.subscriptions.iter().find(|s| &s.local_id == id)
    }

    pub fn transaction(&self, id: &LocalId) -> Option<&Transaction> {
        self.transactions.iter().find(|t| &t.local_id == id)
    }

    pub fn default_payment_method(&self) -> Option<&PaymentMethod> {
        self.default_payment_method_id.as_ref().and_then(|id| self.payment_method(id))
    }

    /// Records a dirty path for partial persistence, e.g. `paymentMethods.2`.
    pub fn mark_modified(&mut self, path: impl Into<String>) {
        let path = path.into();
        if !self.modified_paths.contains(&path) {
            self.modified_paths.push(path);
        }
    }

    pub fn take_modified_paths(&mut self) -> Vec<String> {
        std::mem::take(&mut self.modified_paths)
    }
}

//--------------------------------------      Address        ---------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub local_id: LocalId,
    pub remote: RemoteLink,
    /// Full name as a single field. Joining first/last from the remote is lossy for 3+ token names.
    pub name: String,
    pub company: Option<String>,
    pub country: Option<String>,
    pub locality: Option<String>,
    pub street_address: Option<String>,
    pub extended_address: Option<String>,
    pub postal_code: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

linked!(Address);

impl Address {
    pub fn new(name: impl Into<String>) -> Self {
        Self { local_id: LocalId::generate(), remote: RemoteLink::initial(), name: name.into(), ..Self::default() }
    }
}

//--------------------------------------    PaymentMethod    ---------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub local_id: LocalId,
    pub remote: RemoteLink,
    pub instrument: Instrument,
    pub billing_address_id: Option<LocalId>,
    /// One-time tokenization credential from the client-side payment form. Write-only; cleared after a successful
    /// sync and never persisted with a value.
    pub nonce: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

linked!(PaymentMethod);

impl PaymentMethod {
    pub fn new(instrument: Instrument) -> Self {
        Self {
            local_id: LocalId::generate(),
            remote: RemoteLink::initial(),
            instrument,
            billing_address_id: None,
            nonce: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }
}

/// The payment instrument variants the processor supports. `Unknown` is the silent-degrade arm for discriminators
/// this engine does not recognise: base fields only, not a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instrument {
    CreditCard {
        masked_number: Option<String>,
        country_of_issuance: Option<String>,
        issuing_bank: Option<String>,
        card_type: Option<String>,
        cardholder_name: Option<String>,
        expiration_month: Option<String>,
        expiration_year: Option<String>,
    },
    PayPalAccount {
        email: Option<String>,
        payer_info: Option<serde_json::Value>,
    },
    ApplePayCard {
        card_type: Option<String>,
        payment_instrument_name: Option<String>,
        expiration_month: Option<String>,
        expiration_year: Option<String>,
    },
    AndroidPayCard {
        source_card_last4: Option<String>,
        virtual_card_last4: Option<String>,
        source_card_type: Option<String>,
        virtual_card_type: Option<String>,
        expiration_month: Option<String>,
        expiration_year: Option<String>,
    },
    Unknown,
}

impl Instrument {
    pub fn kind(&self) -> &'static str {
        match self {
            Instrument::CreditCard { .. } => "CreditCard",
            Instrument::PayPalAccount { .. } => "PayPalAccount",
            Instrument::ApplePayCard { .. } => "ApplePayCard",
            Instrument::AndroidPayCard { .. } => "AndroidPayCard",
            Instrument::Unknown => "Unknown",
        }
    }

    /// The country the instrument was issued in, where the variant carries one. Used for the customer's
    /// additional-evidence-country custom field.
    pub fn country_code(&self) -> Option<&str> {
        match self {
            Instrument::CreditCard { country_of_issuance, .. } => country_of_issuance.as_deref(),
            _ => None,
        }
    }
}

//--------------------------------------        Plan         ---------------------------------------------------------

/// A billing plan. Plans are looked up locally by remote plan id and are never synced outbound by this engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub remote_id: RemoteId,
    pub name: Option<String>,
    pub price: Money,
    pub currency: Option<String>,
    pub billing_frequency: Option<i32>,
    pub description: Option<String>,
}

//--------------------------------------     Subscription    ---------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubscriptionStatus {
    #[default]
    Pending,
    Active,
    #[serde(rename = "Past Due")]
    PastDue,
    Expired,
    Canceled,
}

impl Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubscriptionStatus::Pending => write!(f, "Pending"),
            SubscriptionStatus::Active => write!(f, "Active"),
            SubscriptionStatus::PastDue => write!(f, "Past Due"),
            SubscriptionStatus::Expired => write!(f, "Expired"),
            SubscriptionStatus::Canceled => write!(f, "Canceled"),
        }
    }
}

impl FromStr for SubscriptionStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Active" => Ok(Self::Active),
            "Past Due" => Ok(Self::PastDue),
            "Expired" => Ok(Self::Expired),
            "Canceled" => Ok(Self::Canceled),
            s => Err(ConversionError(format!("Invalid subscription status: {s}"))),
        }
    }
}

impl From<String> for SubscriptionStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid subscription status: {value}. Defaulting to Pending");
            SubscriptionStatus::Pending
        })
    }
}

/// One entry in the append-only, deduplicated subscription status log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub timestamp: Option<DateTime<Utc>>,
    pub status: SubscriptionStatus,
}

/// Billing descriptor shown on the customer's statement. Shared by subscriptions and transactions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub local_id: LocalId,
    pub remote: RemoteLink,
    pub plan: Option<Plan>,
    pub payment_method_id: Option<LocalId>,
    pub discounts: Vec<Discount>,
    pub status: SubscriptionStatus,
    pub status_history: Vec<StatusEntry>,
    pub price: Option<Money>,
    pub descriptor: Option<Descriptor>,
    pub is_trial: bool,
    pub trial_duration: Option<i32>,
    pub trial_duration_unit: Option<String>,
    pub first_billing_date: Option<DateTime<Utc>>,
    pub next_billing_date: Option<DateTime<Utc>>,
    pub paid_through_date: Option<DateTime<Utc>>,
    pub billing_period_start_date: Option<DateTime<Utc>>,
    pub billing_period_end_date: Option<DateTime<Utc>>,
    pub billing_day_of_month: Option<i32>,
    pub current_billing_cycle: Option<i32>,
    pub failure_count: Option<i32>,
    pub days_past_due: Option<i32>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

linked!(Subscription);

impl Subscription {
    pub fn new(plan: Plan, payment_method_id: LocalId) -> Self {
        Self {
            local_id: LocalId::generate(),
            remote: RemoteLink::initial(),
            plan: Some(plan),
            payment_method_id: Some(payment_method_id),
            discounts: Vec::new(),
            status: SubscriptionStatus::Pending,
            status_history: Vec::new(),
            price: None,
            descriptor: None,
            is_trial: false,
            trial_duration: None,
            trial_duration_unit: None,
            first_billing_date: None,
            next_billing_date: None,
            paid_through_date: None,
            billing_period_start_date: None,
            billing_period_end_date: None,
            billing_day_of_month: None,
            current_billing_cycle: None,
            failure_count: None,
            days_past_due: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub(crate) fn empty() -> Self {
        Self {
            local_id: LocalId::generate(),
            remote: RemoteLink::initial(),
            plan: None,
            payment_method_id: None,
            ..Self::new(Plan::default(), LocalId::generate())
        }
    }
}

//--------------------------------------      Discount       ---------------------------------------------------------

/// Discount discriminator. Doubles as the remote-side discount id the processor inherits from, so the diff logic
/// matches discounts across the wire by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscountKind {
    Coupon,
    Amount,
}

impl DiscountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountKind::Coupon => "DiscountCoupon",
            DiscountKind::Amount => "DiscountAmount",
        }
    }
}

impl Display for DiscountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discount {
    pub local_id: LocalId,
    pub remote: RemoteLink,
    pub kind: DiscountKind,
    pub amount: Money,
    pub number_of_billing_cycles: Option<i32>,
    pub current_billing_cycle: Option<i32>,
    /// Local-only metadata, e.g. the coupon code. Survives merges with the remote.
    pub name: Option<String>,
}

linked!(Discount);

impl Discount {
    /// A percent-based coupon. The amount is computed from the percentage of the plan price at construction time.
    pub fn coupon(percent: i64, plan_price: Money, cycles: Option<i32>) -> Self {
        Self {
            local_id: LocalId::generate(),
            remote: RemoteLink::initial(),
            kind: DiscountKind::Coupon,
            amount: plan_price.percent(percent),
            number_of_billing_cycles: cycles,
            current_billing_cycle: None,
            name: None,
        }
    }

    /// A fixed-amount discount.
    pub fn amount(amount: Money, cycles: Option<i32>) -> Self {
        Self {
            local_id: LocalId::generate(),
            remote: RemoteLink::initial(),
            kind: DiscountKind::Amount,
            amount,
            number_of_billing_cycles: cycles,
            current_billing_cycle: None,
            name: None,
        }
    }
}

//--------------------------------------     Transaction     ---------------------------------------------------------

/// Denormalized customer contact info captured at transaction time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerSnapshot {
    pub name: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionDiscount {
    pub name: Option<String>,
    pub amount: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionStatusEntry {
    pub timestamp: Option<DateTime<Utc>>,
    pub status: Option<String>,
}

/// The instrument variants as they appear on transactions. Same closed set as [`Instrument`] plus the PayPal payer
/// snapshot fields that only exist transaction-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransactionInstrument {
    CreditCard {
        masked_number: Option<String>,
        country_of_issuance: Option<String>,
        issuing_bank: Option<String>,
        card_type: Option<String>,
        cardholder_name: Option<String>,
        expiration_month: Option<String>,
        expiration_year: Option<String>,
    },
    PayPalAccount {
        name: Option<String>,
        payer_id: Option<String>,
        email: Option<String>,
    },
    ApplePayCard {
        card_type: Option<String>,
        payment_instrument_name: Option<String>,
        expiration_month: Option<String>,
        expiration_year: Option<String>,
    },
    AndroidPayCard {
        source_card_last4: Option<String>,
        virtual_card_last4: Option<String>,
        source_card_type: Option<String>,
        virtual_card_type: Option<String>,
        expiration_month: Option<String>,
        expiration_year: Option<String>,
    },
    Unknown,
}

impl TransactionInstrument {
    pub fn kind(&self) -> &'static str {
        match self {
            TransactionInstrument::CreditCard { .. } => "TransactionCreditCard",
            TransactionInstrument::PayPalAccount { .. } => "TransactionPayPalAccount",
            TransactionInstrument::ApplePayCard { .. } => "TransactionApplePayCard",
            TransactionInstrument::AndroidPayCard { .. } => "TransactionAndroidPayCard",
            TransactionInstrument::Unknown => "Unknown",
        }
    }
}

/// A processor transaction. Append-only from the engine's perspective: refunds prepend a new record, voids replace
/// the matching record in place, nothing else mutates an existing transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Equals the remote transaction id once assigned.
    pub local_id: LocalId,
    pub remote: RemoteLink,
    pub amount: Money,
    pub currency: Option<String>,
    pub status: Option<String>,
    pub instrument: TransactionInstrument,
    pub refunded_transaction_id: Option<RemoteId>,
    pub subscription_id: Option<LocalId>,
    pub plan_remote_id: Option<RemoteId>,
    /// Billing address snapshot at transaction time. Denormalized, not a reference.
    pub billing: Option<Address>,
    pub customer: Option<CustomerSnapshot>,
    pub descriptor: Option<Descriptor>,
    pub status_history: Vec<TransactionStatusEntry>,
    pub discounts: Vec<TransactionDiscount>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

linked!(Transaction);

impl Transaction {
    pub fn new(local_id: LocalId, amount: Money) -> Self {
        Self {
            local_id,
            remote: RemoteLink::initial(),
            amount,
            currency: None,
            status: None,
            instrument: TransactionInstrument::Unknown,
            refunded_transaction_id: None,
            subscription_id: None,
            plan_remote_id: None,
            billing: None,
            customer: None,
            descriptor: None,
            status_history: Vec::new(),
            discounts: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }
}
