use thiserror::Error;

use crate::entities::Customer;

/// The persistence boundary for the billing aggregate.
///
/// The engine itself never persists anything; it calls `persist` between save phases and maintains the dirty-path
/// hints on the aggregate (see [`Customer::take_modified_paths`]) so implementations can do partial writes.
#[allow(async_fn_in_trait)]
pub trait AggregateStore {
    async fn persist(&self, customer: &mut Customer) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Persistence backend error: {0}")]
    Backend(String),
}

/// A store that persists nothing. For callers that persist the aggregate elsewhere, and for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

impl AggregateStore for NullStore {
    async fn persist(&self, customer: &mut Customer) -> Result<(), StoreError> {
        customer.take_modified_paths();
        Ok(())
    }
}
