mod money;
mod secret;

pub use money::{Money, MoneyError};
pub use secret::Secret;
