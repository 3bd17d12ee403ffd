use thiserror::Error;

use bsync_common::Money;

use crate::{
    entities::RemoteId,
    remote::{
        AddressPayload,
        CustomerPayload,
        PaymentMethodPayload,
        RemoteAddress,
        RemoteCustomer,
        RemotePaymentMethod,
        RemotePlan,
        RemoteResult,
        RemoteSubscription,
        RemoteTransaction,
        SubscriptionPayload,
    },
};

/// The remote payment processor, reduced to the per-entity operations the sync engine needs.
///
/// Every mutation resolves to a [`RemoteResult`] — the processor's success/failure envelope — or fails with a
/// [`GatewayError`] when the call itself could not complete (network, timeout, auth). The engine applies no retry
/// policy of its own; whatever the implementation surfaces is propagated to the caller.
#[allow(async_fn_in_trait)]
pub trait RemoteGateway {
    async fn create_customer(&self, payload: &CustomerPayload) -> Result<RemoteResult<RemoteCustomer>, GatewayError>;

    async fn update_customer(
        &self,
        id: &RemoteId,
        payload: &CustomerPayload,
    ) -> Result<RemoteResult<RemoteCustomer>, GatewayError>;

    /// Fetches the full customer snapshot, with payment methods nesting subscriptions nesting transactions.
    async fn find_customer(&self, id: &RemoteId) -> Result<RemoteCustomer, GatewayError>;

    async fn create_address(&self, payload: &AddressPayload) -> Result<RemoteResult<RemoteAddress>, GatewayError>;

    async fn update_address(
        &self,
        customer_id: &RemoteId,
        id: &RemoteId,
        payload: &AddressPayload,
    ) -> Result<RemoteResult<RemoteAddress>, GatewayError>;

    async fn create_payment_method(
        &self,
        payload: &PaymentMethodPayload,
    ) -> Result<RemoteResult<RemotePaymentMethod>, GatewayError>;

    async fn update_payment_method(
        &self,
        token: &RemoteId,
        payload: &PaymentMethodPayload,
    ) -> Result<RemoteResult<RemotePaymentMethod>, GatewayError>;

    async fn create_subscription(
        &self,
        payload: &SubscriptionPayload,
    ) -> Result<RemoteResult<RemoteSubscription>, GatewayError>;

    async fn update_subscription(
        &self,
        id: &RemoteId,
        payload: &SubscriptionPayload,
    ) -> Result<RemoteResult<RemoteSubscription>, GatewayError>;

    async fn cancel_subscription(&self, id: &RemoteId) -> Result<RemoteResult<RemoteSubscription>, GatewayError>;

    /// Refunds the transaction, fully when `amount` is `None`. A successful refund creates a brand-new transaction
    /// record on the remote side.
    async fn refund_transaction(
        &self,
        id: &RemoteId,
        amount: Option<Money>,
    ) -> Result<RemoteResult<RemoteTransaction>, GatewayError>;

    /// Voids the transaction. Unlike a refund this mutates the existing remote record rather than creating one.
    async fn void_transaction(&self, id: &RemoteId) -> Result<RemoteResult<RemoteTransaction>, GatewayError>;

    /// Fetches the plan catalogue.
    async fn all_plans(&self) -> Result<Vec<RemotePlan>, GatewayError>;
}

/// Transport-level failure: the call itself did not complete. Contrast with a resolved-but-unsuccessful
/// [`RemoteResult`], which the engine wraps into `SyncError::RequestFailed`.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid request: {0}")]
    RequestError(String),
    #[error("Invalid response: {0}")]
    ResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("The remote processor has no record with id {0}")]
    NotFound(String),
}
