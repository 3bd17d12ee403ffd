//! Wire-side data objects for the remote payment processor.
//!
//! Everything inbound deserializes leniently (`default` everywhere) — the engine must be total over any well-formed
//! remote response. Outbound payloads are sparse: a key whose value is absent is omitted entirely, so the remote API
//! never receives unintentional nulling fields.

use bsync_common::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entities::Descriptor;

//--------------------------------------   Inbound entities   --------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteAddress {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company: Option<String>,
    pub country_code_alpha2: Option<String>,
    pub locality: Option<String>,
    pub street_address: Option<String>,
    pub extended_address: Option<String>,
    pub postal_code: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteCustomFields {
    pub ip_address: Option<String>,
    pub additional_evidence_country: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteCustomer {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub custom_fields: RemoteCustomFields,
    pub addresses: Vec<RemoteAddress>,
    pub payment_methods: Vec<RemotePaymentMethod>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A payment method as returned by the processor. The `kind` discriminator selects the instrument variant; fields
/// not belonging to the discriminated variant are simply absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemotePaymentMethod {
    /// The processor calls the payment method's remote id a token.
    pub token: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub masked_number: Option<String>,
    pub country_of_issuance: Option<String>,
    pub issuing_bank: Option<String>,
    pub card_type: Option<String>,
    pub cardholder_name: Option<String>,
    pub expiration_month: Option<String>,
    pub expiration_year: Option<String>,
    pub email: Option<String>,
    pub payer_info: Option<Value>,
    pub payment_instrument_name: Option<String>,
    pub source_card_last4: Option<String>,
    pub virtual_card_last4: Option<String>,
    pub source_card_type: Option<String>,
    pub virtual_card_type: Option<String>,
    pub billing_address: Option<RemoteAddress>,
    pub subscriptions: Vec<RemoteSubscription>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteStatusEntry {
    pub timestamp: Option<DateTime<Utc>>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteDiscount {
    pub id: String,
    pub name: Option<String>,
    pub amount: Option<Money>,
    pub number_of_billing_cycles: Option<i32>,
    pub current_billing_cycle: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteSubscription {
    pub id: String,
    pub plan_id: Option<String>,
    pub payment_method_token: Option<String>,
    pub status: Option<String>,
    pub price: Option<Money>,
    pub descriptor: Option<Descriptor>,
    pub trial_period: bool,
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
    pub status_history: Vec<RemoteStatusEntry>,
    pub discounts: Vec<RemoteDiscount>,
    pub transactions: Vec<RemoteTransaction>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteCardDetails {
    pub masked_number: Option<String>,
    pub bin: Option<String>,
    pub last4: Option<String>,
    pub country_of_issuance: Option<String>,
    pub issuing_bank: Option<String>,
    pub card_type: Option<String>,
    pub cardholder_name: Option<String>,
    pub expiration_month: Option<String>,
    pub expiration_year: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemotePayPalDetails {
    pub payer_first_name: Option<String>,
    pub payer_last_name: Option<String>,
    pub payer_id: Option<String>,
    pub payer_email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteApplePayDetails {
    pub card_type: Option<String>,
    pub payment_instrument_name: Option<String>,
    pub expiration_month: Option<String>,
    pub expiration_year: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteAndroidPayDetails {
    pub source_card_last4: Option<String>,
    pub virtual_card_last4: Option<String>,
    pub source_card_type: Option<String>,
    pub virtual_card_type: Option<String>,
    pub expiration_month: Option<String>,
    pub expiration_year: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteCustomerSnapshot {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteTransaction {
    pub id: String,
    pub amount: Option<Money>,
    pub currency_iso_code: Option<String>,
    pub status: Option<String>,
    /// snake_case instrument discriminator, e.g. `credit_card`. Selects which detail sub-object applies.
    pub payment_instrument_type: Option<String>,
    pub credit_card: Option<RemoteCardDetails>,
    pub paypal_account: Option<RemotePayPalDetails>,
    pub apple_pay_card: Option<RemoteApplePayDetails>,
    pub android_pay_card: Option<RemoteAndroidPayDetails>,
    pub refunded_transaction_id: Option<String>,
    pub subscription_id: Option<String>,
    pub plan_id: Option<String>,
    pub billing: Option<RemoteAddress>,
    pub customer: Option<RemoteCustomerSnapshot>,
    pub descriptor: Option<Descriptor>,
    pub status_history: Vec<RemoteStatusEntry>,
    pub discounts: Vec<RemoteDiscount>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemotePlan {
    pub id: String,
    pub name: Option<String>,
    pub price: Option<Money>,
    pub currency_iso_code: Option<String>,
    pub description: Option<String>,
    pub billing_frequency: Option<i32>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<RemotePlan> for crate::entities::Plan {
    fn from(remote: RemotePlan) -> Self {
        Self {
            remote_id: remote.id.into(),
            name: remote.name,
            price: remote.price.unwrap_or_default(),
            currency: remote.currency_iso_code,
            billing_frequency: remote.billing_frequency,
            description: remote.description,
        }
    }
}

//--------------------------------------   Outbound payloads   -------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code_alpha2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    /// Only present on create; the remote scopes new addresses to a customer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomFieldsPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_evidence_country: Option<String>,
}

impl CustomFieldsPayload {
    pub fn is_empty(&self) -> bool {
        self.ip_address.is_none() && self.additional_evidence_country.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<CustomFieldsPayload>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodOptions {
    pub make_default: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method_nonce: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<PaymentMethodOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountUpdateEntry {
    pub existing_id: String,
    pub amount: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_billing_cycles: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountAddEntry {
    pub inherited_from_id: String,
    pub amount: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_billing_cycles: Option<i32>,
}

/// The three remote-bound discount buckets. Empty buckets are omitted from the wire format.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountsPayload {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub update: Vec<DiscountUpdateEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub add: Vec<DiscountAddEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub remove: Vec<String>,
}

impl DiscountsPayload {
    pub fn is_empty(&self) -> bool {
        self.update.is_empty() && self.add.is_empty() && self.remove.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trial_period: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trial_duration: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trial_duration_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptor: Option<Descriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discounts: Option<DiscountsPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_billing_date: Option<DateTime<Utc>>,
}

//--------------------------------------   Result envelope   ---------------------------------------------------------

/// A structured validation error reported by the processor alongside a failed result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidationError {
    pub attribute: Option<String>,
    pub code: Option<String>,
    pub message: String,
}

/// What a remote mutation resolves to: either a successful result carrying the affected entity, or a failure
/// carrying the processor's message, validation errors and (for payment operations) the declined transaction.
///
/// A transport-level failure is a different thing entirely and surfaces as a `GatewayError` instead.
#[derive(Debug, Clone)]
pub struct RemoteResult<T> {
    pub success: bool,
    pub message: Option<String>,
    pub errors: Vec<ValidationError>,
    pub processor_response_code: Option<String>,
    pub transaction: Option<RemoteTransaction>,
    pub entity: Option<T>,
}

impl<T> RemoteResult<T> {
    pub fn ok(entity: T) -> Self {
        Self { success: true, message: None, errors: Vec::new(), processor_response_code: None, transaction: None, entity: Some(entity) }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            errors: Vec::new(),
            processor_response_code: None,
            transaction: None,
            entity: None,
        }
    }

    pub fn with_response_code(mut self, code: impl Into<String>) -> Self {
        self.processor_response_code = Some(code.into());
        self
    }
}
