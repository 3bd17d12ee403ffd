//! HTTP client for the Braintree payment processor, implementing the billing sync engine's
//! [`billing_sync_engine::RemoteGateway`] trait over the JSON REST surface.

mod api;
mod config;

pub use api::BraintreeApi;
pub use config::{BraintreeConfig, Environment};
