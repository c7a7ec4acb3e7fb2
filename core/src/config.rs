//! Client configuration.
//!
//! Values come either from code (`ClientConfig::new` plus setters) or from
//! `PAYPAL_*` environment variables via `ClientConfig::from_env`.

use std::time::Duration;

use crate::auth::{AccessToken, Credentials};
use crate::error::PayPalError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// PayPal REST host selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Sandbox,
    Live,
}

impl Environment {
    pub fn api_base(&self) -> &'static str {
        match self {
            Environment::Sandbox => "https://api.sandbox.paypal.com",
            Environment::Live => "https://api.paypal.com",
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = PayPalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Environment::Sandbox),
            "live" | "production" => Ok(Environment::Live),
            other => Err(PayPalError::Configuration(format!(
                "unknown PayPal environment {other:?}"
            ))),
        }
    }
}

/// Everything needed to construct a `PayPalClient`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base: String,
    pub credentials: Credentials,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(
        environment: Environment,
        client_id: impl Into<String>,
        secret: impl Into<String>,
        access_token: AccessToken,
    ) -> Self {
        Self {
            api_base: environment.api_base().to_string(),
            credentials: Credentials::new(client_id, secret, access_token),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the API base, e.g. to point at a local mock server.
    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read configuration from the process environment.
    ///
    /// | Variable | Required | Default |
    /// |---|---|---|
    /// | `PAYPAL_CLIENT_ID` | yes | |
    /// | `PAYPAL_SECRET` | yes | |
    /// | `PAYPAL_ACCESS_TOKEN` | yes | |
    /// | `PAYPAL_API_BASE` | no | from `PAYPAL_ENVIRONMENT` |
    /// | `PAYPAL_ENVIRONMENT` | no | `sandbox` |
    /// | `PAYPAL_TIMEOUT_SECS` | no | `30` |
    pub fn from_env() -> Result<Self, PayPalError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PayPalError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| PayPalError::Configuration(format!("{key} is not set")))
        };

        let environment = match lookup("PAYPAL_ENVIRONMENT") {
            Some(value) => value.parse()?,
            None => Environment::Sandbox,
        };
        let timeout = match lookup("PAYPAL_TIMEOUT_SECS") {
            Some(value) => value.trim().parse().map(Duration::from_secs).map_err(|_| {
                PayPalError::Configuration(format!("PAYPAL_TIMEOUT_SECS is not a number: {value:?}"))
            })?,
            None => DEFAULT_TIMEOUT,
        };
        if timeout.is_zero() {
            return Err(PayPalError::Configuration(
                "PAYPAL_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        let mut config = Self::new(
            environment,
            required("PAYPAL_CLIENT_ID")?,
            required("PAYPAL_SECRET")?,
            AccessToken::new(required("PAYPAL_ACCESS_TOKEN")?),
        )
        .timeout(timeout);
        if let Some(api_base) = lookup("PAYPAL_API_BASE").filter(|v| !v.is_empty()) {
            config = config.api_base(api_base);
        }
        Ok(config)
    }
}
