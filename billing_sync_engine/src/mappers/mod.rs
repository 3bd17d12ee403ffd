//! Field mappers: the pure translation layer between local entities and the remote wire format.
//!
//! `payload` functions build sparse outbound requests (absent keys are never sent); `apply_remote` functions fold a
//! remote response back into a local entity, setting its sync status to `Saved` and resolving every remote-id
//! cross-reference against the local collections. Unresolved references become `None`, never an error.

pub mod address;
pub mod customer;
pub mod payment_method;
pub mod subscription;
pub mod transaction;

/// Empty strings are treated as absent, so they are omitted from outbound payloads.
pub(crate) fn nonempty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

pub(crate) fn nonempty_opt(s: &Option<String>) -> Option<String> {
    s.as_deref().and_then(nonempty)
}
