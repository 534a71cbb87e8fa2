//! Azure provider implementation
//!
//! Dispatches resource operations to the handler of each resource type and
//! provides what the state upgraders need.

use std::collections::HashMap;
use std::sync::Arc;

use azurerm_core::provider::{ProviderError, ProviderResult};
use azurerm_core::resource::{Resource, ResourceId, State};
use azurerm_core::upgrade::UpgradeChain;

use crate::clients::{
    MissingSubscription, ResourceGroupResolver, ResourceGroupsClient, StoreFilesClient,
    WebHdfsClient,
};
use crate::config::ProviderConfig;
use crate::data_lake_store_file::{self, DataLakeStoreFileResource};
use crate::migration::{UpgradeContext, upgrade_chains};

/// Azure Resource Manager provider
pub struct AzureProvider {
    config: ProviderConfig,
    store_files: Option<DataLakeStoreFileResource>,
    resource_groups: Arc<dyn ResourceGroupResolver>,
}

impl AzureProvider {
    /// Create a provider talking to the real Azure APIs
    pub fn new(config: ProviderConfig) -> Self {
        let store_files: Option<Arc<dyn StoreFilesClient>> =
            config.environment.data_lake_store_suffix.map(|suffix| {
                Arc::new(WebHdfsClient::new(suffix, config.access_token.clone()))
                    as Arc<dyn StoreFilesClient>
            });

        let resource_groups: Arc<dyn ResourceGroupResolver> =
            match ResourceGroupsClient::from_config(&config) {
                Ok(client) => Arc::new(client),
                Err(_) => {
                    log::debug!("No subscription configured; resource group lookups are disabled");
                    Arc::new(MissingSubscription)
                }
            };

        Self::with_clients(config, store_files, resource_groups)
    }

    /// Create a provider with the given clients
    pub fn with_clients(
        config: ProviderConfig,
        store_files: Option<Arc<dyn StoreFilesClient>>,
        resource_groups: Arc<dyn ResourceGroupResolver>,
    ) -> Self {
        Self {
            config,
            store_files: store_files.map(DataLakeStoreFileResource::new),
            resource_groups,
        }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Capabilities handed to state upgraders
    pub fn upgrade_context(&self) -> UpgradeContext {
        UpgradeContext::new(self.config.environment, self.resource_groups.clone())
    }

    /// Upgrade chain of every resource type, keyed by type name
    pub fn upgrade_chains(&self) -> HashMap<String, UpgradeChain<UpgradeContext>> {
        upgrade_chains()
    }

    fn store_files(&self, id: &ResourceId) -> ProviderResult<&DataLakeStoreFileResource> {
        if id.resource_type != data_lake_store_file::RESOURCE_TYPE {
            return Err(ProviderError::new(format!(
                "Resource type {} has no create, read or delete support",
                id.resource_type
            ))
            .for_resource(id.clone()));
        }

        self.store_files.as_ref().ok_or_else(|| {
            ProviderError::new(format!(
                "Data Lake Store is not available in {}",
                self.config.environment
            ))
            .for_resource(id.clone())
        })
    }

    // =========================================================================
    // Resource Operations
    // =========================================================================

    pub async fn read_resource(&self, id: &ResourceId, identifier: &str) -> ProviderResult<State> {
        self.store_files(id)?.read(id, identifier).await
    }

    pub async fn create_resource(&self, resource: &Resource) -> ProviderResult<State> {
        self.store_files(&resource.id)?.create(resource).await
    }

    /// Adopt an existing remote object under `id`
    pub async fn import_resource(
        &self,
        id: &ResourceId,
        identifier: &str,
    ) -> ProviderResult<State> {
        self.store_files(id)?.import(id, identifier).await
    }

    pub async fn delete_resource(&self, id: &ResourceId, identifier: &str) -> ProviderResult<()> {
        self.store_files(id)?.delete(id, identifier).await
    }
}
