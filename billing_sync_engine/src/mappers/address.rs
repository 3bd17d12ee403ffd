use crate::{
    entities::{Address, RemoteLink},
    helpers::name,
    mappers::{nonempty, nonempty_opt},
    remote::{AddressPayload, RemoteAddress},
};

/// Builds the outbound address payload. The single local `name` field is split into first/last for the remote.
pub fn payload(address: &Address) -> AddressPayload {
    AddressPayload {
        company: nonempty_opt(&address.company),
        first_name: nonempty(name::first(&address.name)),
        last_name: nonempty(name::last(&address.name)),
        country_code_alpha2: nonempty_opt(&address.country),
        locality: nonempty_opt(&address.locality),
        street_address: nonempty_opt(&address.street_address),
        extended_address: nonempty_opt(&address.extended_address),
        postal_code: nonempty_opt(&address.postal_code),
        customer_id: None,
    }
}

/// Folds a remote address into the local entity. Fields the remote omits keep their local value.
pub fn apply_remote(address: &mut Address, remote: &RemoteAddress) {
    address.remote = RemoteLink::saved(remote.id.clone());
    let full = name::full(remote.first_name.as_deref().unwrap_or(""), remote.last_name.as_deref().unwrap_or(""));
    if !full.is_empty() {
        address.name = full;
    }
    if remote.company.is_some() {
        address.company = remote.company.clone();
    }
    if remote.country_code_alpha2.is_some() {
        address.country = remote.country_code_alpha2.clone();
    }
    if remote.locality.is_some() {
        address.locality = remote.locality.clone();
    }
    if remote.street_address.is_some() {
        address.street_address = remote.street_address.clone();
    }
    if remote.extended_address.is_some() {
        address.extended_address = remote.extended_address.clone();
    }
    if remote.postal_code.is_some() {
        address.postal_code = remote.postal_code.clone();
    }
    if remote.created_at.is_some() {
        address.created_at = remote.created_at;
    }
    if remote.updated_at.is_some() {
        address.updated_at = remote.updated_at;
    }
}

/// Builds a brand-new local address, already `Saved`, from a remote one. Used when the merge engine encounters a
/// remote address with no local match.
pub fn from_remote(remote: &RemoteAddress) -> Address {
    let mut address = Address::new("");
    apply_remote(&mut address, remote);
    address
}
