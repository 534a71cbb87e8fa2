//! Azure provider
//!
//! State upgraders for Azure resource types and the Data Lake Store file
//! resource.
//!
//! ## Module Structure
//!
//! - `clients` - HTTP clients (Data Lake Store filesystem, resource groups)
//! - `config` - Provider configuration
//! - `data_lake_store_file` - Chunked upload resource
//! - `environment` - Azure clouds and their endpoint suffixes
//! - `migration` - State upgraders per resource type
//! - `provider` - AzureProvider implementation
//! - `resource_id` - Resource identifier parsing
//! - `resources` - Resource type registry

pub mod clients;
pub mod config;
pub mod data_lake_store_file;
pub mod environment;
pub mod migration;
pub mod provider;
pub mod resource_id;
pub mod resources;

// Re-export main types
pub use config::ProviderConfig;
pub use environment::Environment;
pub use migration::{UpgradeContext, upgrade_chains};
pub use provider::AzureProvider;

use azurerm_core::provider::{BoxFuture, Provider, ProviderResult, ResourceType};
use azurerm_core::resource::{Resource, ResourceId, State};

use resources::resource_types;

// =============================================================================
// Provider Trait Implementation
// =============================================================================

impl Provider for AzureProvider {
    fn name(&self) -> &'static str {
        "azurerm"
    }

    fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
        resource_types()
    }

    fn read(&self, id: &ResourceId, identifier: &str) -> BoxFuture<'_, ProviderResult<State>> {
        let id = id.clone();
        let identifier = identifier.to_string();
        Box::pin(async move { self.read_resource(&id, &identifier).await })
    }

    fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
        let resource = resource.clone();
        Box::pin(async move { self.create_resource(&resource).await })
    }

    fn delete(&self, id: &ResourceId, identifier: &str) -> BoxFuture<'_, ProviderResult<()>> {
        let id = id.clone();
        let identifier = identifier.to_string();
        Box::pin(async move { self.delete_resource(&id, &identifier).await })
    }
}
