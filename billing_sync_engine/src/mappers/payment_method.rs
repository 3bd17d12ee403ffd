use crate::{
    entities::{local_id_of, remote_id_of, Address, Customer, Instrument, PaymentMethod, RemoteLink},
    mappers::nonempty_opt,
    remote::{PaymentMethodOptions, PaymentMethodPayload, RemotePaymentMethod},
};

/// Builds the outbound payment method payload. The billing address reference is translated to its remote id, and the
/// `makeDefault` option is sent only when this payment method is the customer's default.
pub fn payload(customer: &Customer, payment_method: &PaymentMethod) -> PaymentMethodPayload {
    let make_default = customer.default_payment_method_id.as_ref() == Some(&payment_method.local_id);
    PaymentMethodPayload {
        billing_address_id: remote_id_of(&customer.addresses, payment_method.billing_address_id.as_ref())
            .map(|id| id.0),
        payment_method_nonce: nonempty_opt(&payment_method.nonce),
        options: make_default.then(|| PaymentMethodOptions { make_default: true }),
        customer_id: None,
    }
}

/// Whether a `Changed` payment method actually warrants a remote update. Both the current and the pre-modification
/// aggregates are passed explicitly; a payment method absent from `original` counts as changed on every axis.
pub fn is_changed(customer: &Customer, original: &Customer, payment_method: &PaymentMethod) -> bool {
    let original_pm = original.payment_method(&payment_method.local_id);
    let nonce_changed = match payment_method.nonce.as_deref() {
        Some(nonce) if !nonce.is_empty() => original_pm.and_then(|o| o.nonce.as_deref()) != Some(nonce),
        _ => false,
    };
    let billing_changed =
        payment_method.billing_address_id != original_pm.and_then(|o| o.billing_address_id.clone());
    let default_changed = customer.default_payment_method_id != original.default_payment_method_id
        && customer.default_payment_method_id.as_ref() == Some(&payment_method.local_id);
    nonce_changed || billing_changed || default_changed
}

/// Maps the remote discriminator onto an instrument variant. Unrecognised discriminators degrade to `Unknown` rather
/// than failing the sync.
pub fn instrument_from_remote(remote: &RemotePaymentMethod) -> Instrument {
    match remote.kind.as_deref() {
        Some("CreditCard") => Instrument::CreditCard {
            masked_number: remote.masked_number.clone(),
            country_of_issuance: remote.country_of_issuance.clone(),
            issuing_bank: remote.issuing_bank.clone(),
            card_type: remote.card_type.clone(),
            cardholder_name: remote.cardholder_name.clone(),
            expiration_month: remote.expiration_month.clone(),
            expiration_year: remote.expiration_year.clone(),
        },
        Some("PayPalAccount") => {
            Instrument::PayPalAccount { email: remote.email.clone(), payer_info: remote.payer_info.clone() }
        },
        Some("ApplePayCard") => Instrument::ApplePayCard {
            card_type: remote.card_type.clone(),
            payment_instrument_name: remote.payment_instrument_name.clone(),
            expiration_month: remote.expiration_month.clone(),
            expiration_year: remote.expiration_year.clone(),
        },
        Some("AndroidPayCard") => Instrument::AndroidPayCard {
            source_card_last4: remote.source_card_last4.clone(),
            virtual_card_last4: remote.virtual_card_last4.clone(),
            source_card_type: remote.source_card_type.clone(),
            virtual_card_type: remote.virtual_card_type.clone(),
            expiration_month: remote.expiration_month.clone(),
            expiration_year: remote.expiration_year.clone(),
        },
        _ => Instrument::Unknown,
    }
}

/// Folds a remote payment method into the local entity. The billing address reference is resolved against the given
/// address collection; no match means no reference. The nonce is single-use and always cleared.
pub fn apply_remote(addresses: &[Address], payment_method: &mut PaymentMethod, remote: &RemotePaymentMethod) {
    payment_method.remote = RemoteLink::saved(remote.token.clone());
    payment_method.instrument = instrument_from_remote(remote);
    payment_method.nonce = None;
    if let Some(local) = local_id_of(addresses, remote.billing_address.as_ref().map(|b| b.id.as_str())) {
        payment_method.billing_address_id = Some(local);
    }
    if remote.created_at.is_some() {
        payment_method.created_at = remote.created_at;
    }
    if remote.updated_at.is_some() {
        payment_method.updated_at = remote.updated_at;
    }
}

/// Builds a brand-new local payment method, already `Saved`, from a remote one.
pub fn from_remote(addresses: &[Address], remote: &RemotePaymentMethod) -> PaymentMethod {
    let mut payment_method = PaymentMethod::new(Instrument::Unknown);
    apply_remote(addresses, &mut payment_method, remote);
    payment_method
}
