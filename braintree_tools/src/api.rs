use std::sync::Arc;

use billing_sync_engine::{
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
    GatewayError,
    RemoteGateway,
};
use bsync_common::Money;
use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
    StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::config::BraintreeConfig;

#[derive(Clone)]
pub struct BraintreeApi {
    config: BraintreeConfig,
    client: Arc<Client>,
}

impl BraintreeApi {
    pub fn new(config: BraintreeConfig) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::with_capacity(2);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| GatewayError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/merchants/{}{path}", self.config.environment.base_url(), self.config.merchant_id)
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, GatewayError> {
        let url = self.url(path);
        trace!("Sending REST query: {url}");
        let mut req = self
            .client
            .request(method, url)
            .basic_auth(&self.config.public_key, Some(self.config.private_key.reveal()));
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| GatewayError::ResponseError(e.to_string()))?;
        match response.status() {
            status if status.is_success() => {
                trace!("REST query successful. {status}");
                response.json::<T>().await.map_err(|e| GatewayError::JsonError(e.to_string()))
            },
            StatusCode::NOT_FOUND => Err(GatewayError::NotFound(path.to_string())),
            status => {
                let message = response.text().await.map_err(|e| GatewayError::ResponseError(e.to_string()))?;
                Err(GatewayError::QueryError { status: status.as_u16(), message })
            },
        }
    }

    /// Runs a mutation and reshapes the processor's result envelope: the affected entity sits under `key`, the
    /// success flag, message, validation errors and (for payment operations) the declined transaction alongside it.
    async fn mutate<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
        key: &str,
    ) -> Result<RemoteResult<T>, GatewayError> {
        let value: Value = self.rest_query(method, path, body).await?;
        parse_result(value, key)
    }
}

fn field<T: DeserializeOwned>(value: &Value, key: &str) -> Result<Option<T>, GatewayError> {
    match value.get(key) {
        None => Ok(None),
        Some(Value::Null) => Ok(None),
        Some(v) => serde_json::from_value(v.clone()).map(Some).map_err(|e| GatewayError::JsonError(e.to_string())),
    }
}

fn parse_result<T: DeserializeOwned>(value: Value, key: &str) -> Result<RemoteResult<T>, GatewayError> {
    Ok(RemoteResult {
        success: value.get("success").and_then(Value::as_bool).unwrap_or(false),
        message: value.get("message").and_then(Value::as_str).map(String::from),
        errors: field(&value, "errors")?.unwrap_or_default(),
        processor_response_code: value.get("processorResponseCode").and_then(Value::as_str).map(String::from),
        transaction: field(&value, "transaction")?,
        entity: field(&value, key)?,
    })
}

impl RemoteGateway for BraintreeApi {
    async fn create_customer(&self, payload: &CustomerPayload) -> Result<RemoteResult<RemoteCustomer>, GatewayError> {
        debug!("Creating customer");
        self.mutate(Method::POST, "/customers", Some(payload), "customer").await
    }

    async fn update_customer(
        &self,
        id: &RemoteId,
        payload: &CustomerPayload,
    ) -> Result<RemoteResult<RemoteCustomer>, GatewayError> {
        debug!("Updating customer {id}");
        self.mutate(Method::PUT, &format!("/customers/{id}"), Some(payload), "customer").await
    }

    async fn find_customer(&self, id: &RemoteId) -> Result<RemoteCustomer, GatewayError> {
        #[derive(serde::Deserialize)]
        struct CustomerResponse {
            customer: RemoteCustomer,
        }
        debug!("Fetching customer {id}");
        let result =
            self.rest_query::<CustomerResponse, ()>(Method::GET, &format!("/customers/{id}"), None).await?;
        Ok(result.customer)
    }

    async fn create_address(&self, payload: &AddressPayload) -> Result<RemoteResult<RemoteAddress>, GatewayError> {
        let customer_id = payload
            .customer_id
            .as_deref()
            .ok_or_else(|| GatewayError::RequestError("address create requires a customer id".to_string()))?;
        debug!("Creating address for customer {customer_id}");
        self.mutate(Method::POST, &format!("/customers/{customer_id}/addresses"), Some(payload), "address").await
    }

    async fn update_address(
        &self,
        customer_id: &RemoteId,
        id: &RemoteId,
        payload: &AddressPayload,
    ) -> Result<RemoteResult<RemoteAddress>, GatewayError> {
        debug!("Updating address {id} of customer {customer_id}");
        self.mutate(Method::PUT, &format!("/customers/{customer_id}/addresses/{id}"), Some(payload), "address")
            .await
    }

    async fn create_payment_method(
        &self,
        payload: &PaymentMethodPayload,
    ) -> Result<RemoteResult<RemotePaymentMethod>, GatewayError> {
        debug!("Creating payment method");
        self.mutate(Method::POST, "/payment_methods", Some(payload), "paymentMethod").await
    }

    async fn update_payment_method(
        &self,
        token: &RemoteId,
        payload: &PaymentMethodPayload,
    ) -> Result<RemoteResult<RemotePaymentMethod>, GatewayError> {
        debug!("Updating payment method {token}");
        self.mutate(Method::PUT, &format!("/payment_methods/{token}"), Some(payload), "paymentMethod").await
    }

    async fn create_subscription(
        &self,
        payload: &SubscriptionPayload,
    ) -> Result<RemoteResult<RemoteSubscription>, GatewayError> {
        debug!("Creating subscription");
        self.mutate(Method::POST, "/subscriptions", Some(payload), "subscription").await
    }

    async fn update_subscription(
        &self,
        id: &RemoteId,
        payload: &SubscriptionPayload,
    ) -> Result<RemoteResult<RemoteSubscription>, GatewayError> {
        debug!("Updating subscription {id}");
        self.mutate(Method::PUT, &format!("/subscriptions/{id}"), Some(payload), "subscription").await
    }

    async fn cancel_subscription(&self, id: &RemoteId) -> Result<RemoteResult<RemoteSubscription>, GatewayError> {
        debug!("Canceling subscription {id}");
        self.mutate::<_, ()>(Method::PUT, &format!("/subscriptions/{id}/cancel"), None, "subscription").await
    }

    async fn refund_transaction(
        &self,
        id: &RemoteId,
        amount: Option<Money>,
    ) -> Result<RemoteResult<RemoteTransaction>, GatewayError> {
        debug!("Refunding transaction {id}");
        let body = amount.map(|amount| serde_json::json!({ "amount": amount }));
        self.mutate(Method::POST, &format!("/transactions/{id}/refund"), body, "transaction").await
    }

    async fn void_transaction(&self, id: &RemoteId) -> Result<RemoteResult<RemoteTransaction>, GatewayError> {
        debug!("Voiding transaction {id}");
        self.mutate::<_, ()>(Method::PUT, &format!("/transactions/{id}/void"), None, "transaction").await
    }

    async fn all_plans(&self) -> Result<Vec<RemotePlan>, GatewayError> {
        #[derive(serde::Deserialize)]
        struct PlansResponse {
            plans: Vec<RemotePlan>,
        }
        debug!("Fetching the plan catalogue");
        let result = self.rest_query::<PlansResponse, ()>(Method::GET, "/plans", None).await?;
        Ok(result.plans)
    }
}
