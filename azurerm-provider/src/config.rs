//! Provider configuration
//!
//! Settings come either from a provider attribute block or from the usual
//! `ARM_*` environment variables.

use std::collections::HashMap;

use azurerm_core::provider::{ProviderError, ProviderResult};
use azurerm_core::resource::Value;

use crate::environment::Environment;

pub const ENV_ENVIRONMENT: &str = "ARM_ENVIRONMENT";
pub const ENV_SUBSCRIPTION_ID: &str = "ARM_SUBSCRIPTION_ID";
pub const ENV_ACCESS_TOKEN: &str = "ARM_ACCESS_TOKEN";

/// Configuration of the Azure provider
#[derive(Clone, Default)]
pub struct ProviderConfig {
    pub environment: Environment,
    /// Subscription used for Resource Manager lookups
    pub subscription_id: Option<String>,
    /// Bearer token sent with every request
    pub access_token: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("environment", &self.environment.name)
            .field("subscription_id", &self.subscription_id)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ProviderConfig {
    /// Build from a provider attribute block
    ///
    /// Recognised keys: `environment`, `subscription_id`, `access_token`.
    pub fn from_attributes(attributes: &HashMap<String, Value>) -> ProviderResult<Self> {
        let get = |key: &str| attributes.get(key).and_then(Value::as_str).map(str::to_string);
        Self::build(get("environment"), get("subscription_id"), get("access_token"))
    }

    /// Build from `ARM_ENVIRONMENT`, `ARM_SUBSCRIPTION_ID` and `ARM_ACCESS_TOKEN`
    pub fn from_env() -> ProviderResult<Self> {
        let get = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());
        Self::build(
            get(ENV_ENVIRONMENT),
            get(ENV_SUBSCRIPTION_ID),
            get(ENV_ACCESS_TOKEN),
        )
    }

    fn build(
        environment: Option<String>,
        subscription_id: Option<String>,
        access_token: Option<String>,
    ) -> ProviderResult<Self> {
        let environment = match environment {
            Some(name) => Environment::from_name(&name).ok_or_else(|| {
                ProviderError::new(format!(
                    "Unknown environment {:?}: expected one of public, china, german, usgovernment",
                    name
                ))
            })?,
            None => Environment::PUBLIC,
        };

        Ok(Self {
            environment,
            subscription_id,
            access_token,
        })
    }

    /// Subscription ID, failing when it was not configured
    pub fn require_subscription_id(&self) -> ProviderResult<&str> {
        self.subscription_id.as_deref().ok_or_else(|| {
            ProviderError::new(format!(
                "A subscription ID is required: set `subscription_id` or {}",
                ENV_SUBSCRIPTION_ID
            ))
        })
    }
}
