use crate::{
    entities::{Customer, RemoteLink},
    helpers::name,
    mappers::{nonempty, nonempty_opt},
    remote::{CustomFieldsPayload, CustomerPayload, RemoteCustomer},
};

/// Builds the outbound customer payload. The issuing country of the default payment method rides along as the
/// `additionalEvidenceCountry` custom field when there is one.
pub fn payload(customer: &Customer) -> CustomerPayload {
    let evidence_country =
        customer.default_payment_method().and_then(|pm| pm.instrument.country_code()).map(String::from);
    let custom_fields = CustomFieldsPayload {
        ip_address: nonempty_opt(&customer.ip_address),
        additional_evidence_country: evidence_country,
    };
    CustomerPayload {
        first_name: nonempty(name::first(&customer.name)),
        last_name: nonempty(name::last(&customer.name)),
        email: nonempty_opt(&customer.email),
        phone: nonempty_opt(&customer.phone),
        custom_fields: if custom_fields.is_empty() { None } else { Some(custom_fields) },
    }
}

/// Folds the remote customer's own scalar fields into the local aggregate root. The nested collections are merged
/// separately by the load engine; this function never touches them.
pub fn apply_remote(customer: &mut Customer, remote: &RemoteCustomer) {
    customer.remote = RemoteLink::saved(remote.id.clone());
    let full = name::full(remote.first_name.as_deref().unwrap_or(""), remote.last_name.as_deref().unwrap_or(""));
    if !full.is_empty() {
        customer.name = full;
    }
    if remote.email.is_some() {
        customer.email = remote.email.clone();
    }
    if remote.phone.is_some() {
        customer.phone = remote.phone.clone();
    }
    if remote.custom_fields.ip_address.is_some() {
        customer.ip_address = remote.custom_fields.ip_address.clone();
    }
}
