//! Resource Manager resource group lookups

use async_trait::async_trait;
use serde::Deserialize;

use super::{ClientError, ClientResult, authorize, check_status};
use azurerm_core::provider::ProviderResult;

use crate::config::ProviderConfig;

const API_VERSION: &str = "2020-06-01";

/// A resource group as returned by Resource Manager
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResourceGroup {
    pub id: Option<String>,
    /// Canonical (case-correct) name
    pub name: Option<String>,
    pub location: Option<String>,
}

/// Resolves a resource group by name
#[async_trait]
pub trait ResourceGroupResolver: Send + Sync {
    async fn get(&self, name: &str) -> ClientResult<ResourceGroup>;
}

/// `ResourceGroupResolver` backed by the Resource Manager REST API
pub struct ResourceGroupsClient {
    http: reqwest::Client,
    endpoint: String,
    subscription_id: String,
    access_token: Option<String>,
}

impl ResourceGroupsClient {
    pub fn new(
        endpoint: impl Into<String>,
        subscription_id: impl Into<String>,
        access_token: Option<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            subscription_id: subscription_id.into(),
            access_token,
        }
    }

    /// Build a client for the configured cloud and subscription
    pub fn from_config(config: &ProviderConfig) -> ProviderResult<Self> {
        let subscription_id = config.require_subscription_id()?;
        Ok(Self::new(
            config.environment.resource_manager_endpoint,
            subscription_id,
            config.access_token.clone(),
        ))
    }

    pub fn group_url(&self, name: &str) -> ClientResult<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.endpoint)
            .map_err(|e| ClientError::InvalidRequest(format!("endpoint {:?}: {}", self.endpoint, e)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidRequest(format!("endpoint {:?}", self.endpoint)))?
            .pop_if_empty()
            .extend(["subscriptions", self.subscription_id.as_str(), "resourcegroups", name]);
        url.query_pairs_mut().append_pair("api-version", API_VERSION);
        Ok(url)
    }
}

#[async_trait]
impl ResourceGroupResolver for ResourceGroupsClient {
    async fn get(&self, name: &str) -> ClientResult<ResourceGroup> {
        let url = self.group_url(name)?;
        log::debug!("GET {}", url);
        let response = authorize(self.http.get(url), self.access_token.as_deref())
            .send()
            .await?;
        let response = check_status("ResourceGroups.Get", response).await?;
        Ok(response.json().await?)
    }
}

/// Resolver used when no subscription is configured; every lookup fails
pub struct MissingSubscription;

#[async_trait]
impl ResourceGroupResolver for MissingSubscription {
    async fn get(&self, name: &str) -> ClientResult<ResourceGroup> {
        Err(ClientError::InvalidRequest(format!(
            "looking up Resource Group {:?} requires a subscription ID",
            name
        )))
    }
}
