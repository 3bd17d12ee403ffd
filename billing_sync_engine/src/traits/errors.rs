use thiserror::Error;

use crate::{
    decline,
    entities::LocalId,
    remote::{RemoteResult, RemoteTransaction, ValidationError},
    traits::{GatewayError, StoreError},
};

/// The failure taxonomy of the sync engine.
///
/// * `Gateway` — the remote call itself rejected (network/timeout/auth). Propagated unchanged; no local state was
///   mutated and no "saved" event was emitted.
/// * `RequestFailed` — the remote call resolved but reported failure. Carries the processor's message, a
///   decline-code-derived description when one applies, the structured validation errors, and the partial
///   transaction payload for caller inspection.
/// * `NotYetSaved` — a precondition failure: the operation needs an entity that already has a remote id. Raised
///   before any remote call is made.
///
/// No retries happen anywhere in the engine; retry policy is the caller's concern.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
    #[error("{message}")]
    RequestFailed {
        message: String,
        /// Human-readable decline description, when the processor supplied a response code.
        decline: Option<String>,
        errors: Vec<ValidationError>,
        transaction: Option<Box<RemoteTransaction>>,
    },
    #[error("{0} has not been saved to the remote processor yet")]
    NotYetSaved(&'static str),
    #[error("No {0} with local id {1} in the aggregate")]
    MissingEntity(&'static str, LocalId),
    #[error("Subscription {0} has no plan assigned")]
    MissingPlan(LocalId),
    #[error("Persistence error: {0}")]
    Store(#[from] StoreError),
}

impl SyncError {
    /// Wraps a resolved-but-unsuccessful gateway result into a domain error.
    pub fn from_failure<T>(result: RemoteResult<T>) -> Self {
        let decline = result
            .processor_response_code
            .as_deref()
            .map(|code| decline::description(code).unwrap_or(decline::GENERIC_DECLINE).to_string());
        SyncError::RequestFailed {
            message: result.message.unwrap_or_else(|| "Remote request failed".to_string()),
            decline,
            errors: result.errors,
            transaction: result.transaction.map(Box::new),
        }
    }
}

/// Guards a gateway result: a successful result yields its entity, anything else becomes a [`SyncError`].
pub fn guard<T>(result: RemoteResult<T>) -> Result<T, SyncError> {
    if result.success {
        if let Some(entity) = result.entity {
            return Ok(entity);
        }
    }
    Err(SyncError::from_failure(result))
}
