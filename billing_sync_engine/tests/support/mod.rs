//! Shared test support: a scripted mock gateway plus aggregate and remote fixtures.
#![allow(dead_code)]

use std::{
    collections::VecDeque,
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex},
};

use billing_sync_engine::{
    entities::*,
    events::{EventHandler, EventProducers, SyncEvent},
    remote::*,
    GatewayError,
    RemoteGateway,
};
use bsync_common::Money;

//--------------------------------------    Mock gateway    ----------------------------------------------------------

type Queue<T> = Arc<Mutex<VecDeque<T>>>;

/// A gateway whose every response is scripted in advance. Cloning shares the script and the call log, so a clone can
/// be handed to the API while the test keeps inspecting the original.
#[derive(Clone, Default)]
pub struct MockGateway {
    log: Arc<Mutex<Vec<String>>>,
    customers: Queue<RemoteResult<RemoteCustomer>>,
    found: Queue<RemoteCustomer>,
    addresses: Queue<RemoteResult<RemoteAddress>>,
    payment_methods: Queue<RemoteResult<RemotePaymentMethod>>,
    subscriptions: Queue<RemoteResult<RemoteSubscription>>,
    transactions: Queue<RemoteResult<RemoteTransaction>>,
    plans: Queue<Vec<RemotePlan>>,
    failures: Queue<GatewayError>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: &str) {
        self.log.lock().unwrap().push(call.to_string());
    }

    fn next<T>(queue: &Queue<T>, call: &str) -> T {
        queue.lock().unwrap().pop_front().unwrap_or_else(|| panic!("no scripted response for {call}"))
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.log.lock().unwrap().len()
    }

    pub fn script_customer(&self, result: RemoteResult<RemoteCustomer>) {
        self.customers.lock().unwrap().push_back(result);
    }

    pub fn script_find(&self, customer: RemoteCustomer) {
        self.found.lock().unwrap().push_back(customer);
    }

    pub fn script_address(&self, result: RemoteResult<RemoteAddress>) {
        self.addresses.lock().unwrap().push_back(result);
    }

    pub fn script_payment_method(&self, result: RemoteResult<RemotePaymentMethod>) {
        self.payment_methods.lock().unwrap().push_back(result);
    }

    pub fn script_subscription(&self, result: RemoteResult<RemoteSubscription>) {
        self.subscriptions.lock().unwrap().push_back(result);
    }

    pub fn script_transaction(&self, result: RemoteResult<RemoteTransaction>) {
        self.transactions.lock().unwrap().push_back(result);
    }

    pub fn script_plans(&self, plans: Vec<RemotePlan>) {
        self.plans.lock().unwrap().push_back(plans);
    }

    /// Scripts a transport-level rejection. The next call, whichever it is, fails with the given error instead of
    /// resolving to a scripted result.
    pub fn script_failure(&self, error: GatewayError) {
        self.failures.lock().unwrap().push_back(error);
    }

    fn check_failure(&self) -> Result<(), GatewayError> {
        match self.failures.lock().unwrap().pop_front() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl RemoteGateway for MockGateway {
    async fn create_customer(&self, _payload: &CustomerPayload) -> Result<RemoteResult<RemoteCustomer>, GatewayError> {
        self.record("create_customer");
        self.check_failure()?;
        Ok(Self::next(&self.customers, "create_customer"))
    }

    async fn update_customer(
        &self,
        _id: &RemoteId,
        _payload: &CustomerPayload,
    ) -> Result<RemoteResult<RemoteCustomer>, GatewayError> {
        self.record("update_customer");
        self.check_failure()?;
        Ok(Self::next(&self.customers, "update_customer"))
    }

    async fn find_customer(&self, _id: &RemoteId) -> Result<RemoteCustomer, GatewayError> {
        self.record("find_customer");
        self.check_failure()?;
        Ok(Self::next(&self.found, "find_customer"))
    }

    async fn create_address(&self, _payload: &AddressPayload) -> Result<RemoteResult<RemoteAddress>, GatewayError> {
        self.record("create_address");
        self.check_failure()?;
        Ok(Self::next(&self.addresses, "create_address"))
    }

    async fn update_address(
        &self,
        _customer_id: &RemoteId,
        _id: &RemoteId,
        _payload: &AddressPayload,
    ) -> Result<RemoteResult<RemoteAddress>, GatewayError> {
        self.record("update_address");
        self.check_failure()?;
        Ok(Self::next(&self.addresses, "update_address"))
    }

    async fn create_payment_method(
        &self,
        _payload: &PaymentMethodPayload,
    ) -> Result<RemoteResult<RemotePaymentMethod>, GatewayError> {
        self.record("create_payment_method");
        self.check_failure()?;
        Ok(Self::next(&self.payment_methods, "create_payment_method"))
    }

    async fn update_payment_method(
        &self,
        _token: &RemoteId,
        _payload: &PaymentMethodPayload,
    ) -> Result<RemoteResult<RemotePaymentMethod>, GatewayError> {
        self.record("update_payment_method");
        self.check_failure()?;
        Ok(Self::next(&self.payment_methods, "update_payment_method"))
    }

    async fn create_subscription(
        &self,
        _payload: &SubscriptionPayload,
    ) -> Result<RemoteResult<RemoteSubscription>, GatewayError> {
        self.record("create_subscription");
        self.check_failure()?;
        Ok(Self::next(&self.subscriptions, "create_subscription"))
    }

    async fn update_subscription(
        &self,
        _id: &RemoteId,
        _payload: &SubscriptionPayload,
    ) -> Result<RemoteResult<RemoteSubscription>, GatewayError> {
        self.record("update_subscription");
        self.check_failure()?;
        Ok(Self::next(&self.subscriptions, "update_subscription"))
    }

    async fn cancel_subscription(&self, _id: &RemoteId) -> Result<RemoteResult<RemoteSubscription>, GatewayError> {
        self.record("cancel_subscription");
        self.check_failure()?;
        Ok(Self::next(&self.subscriptions, "cancel_subscription"))
    }

    async fn refund_transaction(
        &self,
        _id: &RemoteId,
        _amount: Option<Money>,
    ) -> Result<RemoteResult<RemoteTransaction>, GatewayError> {
        self.record("refund_transaction");
        self.check_failure()?;
        Ok(Self::next(&self.transactions, "refund_transaction"))
    }

    async fn void_transaction(&self, _id: &RemoteId) -> Result<RemoteResult<RemoteTransaction>, GatewayError> {
        self.record("void_transaction");
        self.check_failure()?;
        Ok(Self::next(&self.transactions, "void_transaction"))
    }

    async fn all_plans(&self) -> Result<Vec<RemotePlan>, GatewayError> {
        self.record("all_plans");
        self.check_failure()?;
        Ok(Self::next(&self.plans, "all_plans"))
    }
}

//--------------------------------------    Event capture    ---------------------------------------------------------

/// Collects every published event. Call [`EventCapture::drain`] after dropping the API to run the handler loop to
/// completion and take the captured events.
pub struct EventCapture {
    handler: EventHandler<SyncEvent>,
    captured: Arc<Mutex<Vec<SyncEvent>>>,
}

impl EventCapture {
    pub fn new() -> Self {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let sink = captured.clone();
        let handler = EventHandler::new(64, Arc::new(move |ev: SyncEvent| {
            let sink = sink.clone();
            Box::pin(async move {
                sink.lock().unwrap().push(ev);
            }) as Pin<Box<dyn Future<Output = ()> + Send>>
        }));
        Self { handler, captured }
    }

    pub fn producers(&self) -> EventProducers {
        EventProducers { sync_event_producers: vec![self.handler.subscribe()] }
    }

    pub async fn drain(self) -> Vec<SyncEvent> {
        self.handler.start_handler().await;
        Arc::try_unwrap(self.captured).expect("events still being captured").into_inner().unwrap()
    }
}

//--------------------------------------      Fixtures      ----------------------------------------------------------

pub fn monthly_plan() -> Plan {
    Plan {
        remote_id: RemoteId::from("monthly"),
        name: Some("Monthly".to_string()),
        price: Money::from_cents(1498),
        currency: Some("USD".to_string()),
        billing_frequency: Some(1),
        description: None,
    }
}

/// A brand-new aggregate: customer, one address, one tokenized payment method and one subscription on the monthly
/// plan, all `Initial`.
pub fn fresh_aggregate() -> Customer {
    let mut customer = Customer::new("Pesho Peshev");
    customer.email = Some("pesho@example.com".to_string());
    customer.ip_address = Some("10.0.0.1".to_string());

    let mut address = Address::new("Pesho Peshev");
    address.country = Some("BG".to_string());
    address.locality = Some("Sofia".to_string());

    let mut pm = PaymentMethod::new(Instrument::Unknown).with_nonce("nonce-1");
    pm.billing_address_id = Some(address.local_id.clone());
    customer.default_payment_method_id = Some(pm.local_id.clone());

    let subscription = Subscription::new(monthly_plan(), pm.local_id.clone());

    customer.addresses.push(address);
    customer.payment_methods.push(pm);
    customer.subscriptions.push(subscription);
    customer
}

pub fn remote_address(id: &str) -> RemoteAddress {
    RemoteAddress {
        id: id.to_string(),
        first_name: Some("Pesho".to_string()),
        last_name: Some("Peshev".to_string()),
        country_code_alpha2: Some("BG".to_string()),
        locality: Some("Sofia".to_string()),
        ..RemoteAddress::default()
    }
}

pub fn remote_payment_method(token: &str, billing_address_id: Option<&str>) -> RemotePaymentMethod {
    RemotePaymentMethod {
        token: token.to_string(),
        kind: Some("CreditCard".to_string()),
        masked_number: Some("401288******1881".to_string()),
        card_type: Some("Visa".to_string()),
        billing_address: billing_address_id.map(remote_address),
        ..RemotePaymentMethod::default()
    }
}

pub fn remote_subscription(id: &str, token: &str) -> RemoteSubscription {
    RemoteSubscription {
        id: id.to_string(),
        plan_id: Some("monthly".to_string()),
        payment_method_token: Some(token.to_string()),
        status: Some("Active".to_string()),
        price: Some(Money::from_cents(1498)),
        status_history: vec![RemoteStatusEntry { timestamp: None, status: Some("Active".to_string()) }],
        ..RemoteSubscription::default()
    }
}

pub fn remote_transaction(id: &str, amount: Money, subscription_id: &str) -> RemoteTransaction {
    RemoteTransaction {
        id: id.to_string(),
        amount: Some(amount),
        currency_iso_code: Some("USD".to_string()),
        status: Some("settled".to_string()),
        payment_instrument_type: Some("credit_card".to_string()),
        credit_card: Some(RemoteCardDetails {
            bin: Some("401288".to_string()),
            last4: Some("1881".to_string()),
            card_type: Some("Visa".to_string()),
            ..RemoteCardDetails::default()
        }),
        subscription_id: Some(subscription_id.to_string()),
        plan_id: Some("monthly".to_string()),
        ..RemoteTransaction::default()
    }
}

pub fn remote_customer(id: &str) -> RemoteCustomer {
    RemoteCustomer {
        id: id.to_string(),
        first_name: Some("Pesho".to_string()),
        last_name: Some("Peshev".to_string()),
        email: Some("pesho@example.com".to_string()),
        ..RemoteCustomer::default()
    }
}
