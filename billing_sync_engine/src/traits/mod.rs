mod errors;
mod remote_gateway;
mod store;

pub use errors::{guard, SyncError};
pub use remote_gateway::{GatewayError, RemoteGateway};
pub use store::{AggregateStore, NullStore, StoreError};
