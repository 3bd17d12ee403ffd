use bsync_common::Secret;
use log::*;

/// Which Braintree environment to talk to. Selects the API base url.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Sandbox,
    Production,
}

impl Environment {
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Sandbox => "https://api.sandbox.braintreegateway.com",
            Environment::Production => "https://api.braintreegateway.com",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BraintreeConfig {
    pub merchant_id: String,
    pub public_key: String,
    pub private_key: Secret<String>,
    pub environment: Environment,
}

impl BraintreeConfig {
    pub fn new_from_env_or_default() -> Self {
        let merchant_id = std::env::var("BSYNC_BT_MERCHANT_ID").unwrap_or_else(|_| {
            warn!("BSYNC_BT_MERCHANT_ID not set, using (probably useless) default");
            "merchant_id".to_string()
        });
        let public_key = std::env::var("BSYNC_BT_PUBLIC_KEY").unwrap_or_else(|_| {
            warn!("BSYNC_BT_PUBLIC_KEY not set, using (probably useless) default");
            "public_key".to_string()
        });
        let private_key = Secret::new(std::env::var("BSYNC_BT_PRIVATE_KEY").unwrap_or_else(|_| {
            warn!("BSYNC_BT_PRIVATE_KEY not set, using (probably useless) default");
            "private_key".to_string()
        }));
        let environment = match std::env::var("BSYNC_BT_ENVIRONMENT").as_deref() {
            Ok("production") => Environment::Production,
            Ok("sandbox") => Environment::Sandbox,
            Ok(other) => {
                warn!("BSYNC_BT_ENVIRONMENT has unknown value {other}, using sandbox");
                Environment::Sandbox
            },
            Err(_) => {
                warn!("BSYNC_BT_ENVIRONMENT not set, using sandbox");
                Environment::Sandbox
            },
        };
        Self { merchant_id, public_key, private_key, environment }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn environment_selects_base_url() {
        assert!(Environment::Sandbox.base_url().contains("sandbox"));
        assert!(!Environment::Production.base_url().contains("sandbox"));
    }

    #[test]
    fn private_key_never_leaks_through_debug() {
        let config = BraintreeConfig {
            private_key: Secret::new("very_secret".to_string()),
            ..BraintreeConfig::default()
        };
        let debugged = format!("{config:?}");
        assert!(!debugged.contains("very_secret"));
    }
}
