//! Resource types known to the Azure provider
//!
//! Every type with persisted state carries its current schema version and the
//! upgraders leading up to it. Only `data_lake_store_file` has CRUD handlers;
//! the others are known for state upgrades.

use azurerm_core::provider::ResourceType;
use azurerm_core::upgrade::StateUpgrader;

use crate::data_lake_store_file::{self, DataLakeStoreFileType};
use crate::migration::{UpgradeContext, cdn, cosmos, datalake, dns, storage};

/// Registration of one resource type
#[derive(Clone, Copy)]
pub struct ResourceDefinition {
    pub name: &'static str,
    pub schema_version: u32,
    pub upgraders: fn() -> Vec<StateUpgrader<UpgradeContext>>,
}

impl std::fmt::Debug for ResourceDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceDefinition")
            .field("name", &self.name)
            .field("schema_version", &self.schema_version)
            .finish()
    }
}

// =============================================================================
// Resource Type Definitions
// =============================================================================

macro_rules! define_resource_type {
    ($name:ident, $type_name:expr, $version:expr, [$($upgrader:path),* $(,)?]) => {
        pub struct $name;

        impl $name {
            pub const DEFINITION: ResourceDefinition = ResourceDefinition {
                name: $type_name,
                schema_version: $version,
                upgraders: $name::upgraders,
            };

            fn upgraders() -> Vec<StateUpgrader<UpgradeContext>> {
                vec![$($upgrader()),*]
            }
        }

        impl ResourceType for $name {
            fn name(&self) -> &'static str {
                $type_name
            }

            fn schema_version(&self) -> u32 {
                $version
            }
        }
    };
}

define_resource_type!(
    StorageAccountType,
    "storage_account",
    2,
    [storage::account_v0_to_v1, storage::account_v1_to_v2]
);
define_resource_type!(
    StorageShareType,
    "storage_share",
    2,
    [storage::share_v0_to_v1, storage::share_v1_to_v2]
);
define_resource_type!(StorageBlobType, "storage_blob", 1, [storage::blob_v0_to_v1]);
define_resource_type!(
    CosmosDbGremlinDatabaseType,
    "cosmosdb_gremlin_database",
    1,
    [cosmos::gremlin_database_v0_to_v1]
);
define_resource_type!(CdnProfileType, "cdn_profile", 1, [cdn::cdn_profile_v0_to_v1]);
define_resource_type!(DnsZoneType, "dns_zone", 1, [dns::dns_zone_v0_to_v1]);

fn data_lake_store_file_upgraders() -> Vec<StateUpgrader<UpgradeContext>> {
    vec![datalake::store_file_v0_to_v1()]
}

const DATA_LAKE_STORE_FILE: ResourceDefinition = ResourceDefinition {
    name: data_lake_store_file::RESOURCE_TYPE,
    schema_version: data_lake_store_file::SCHEMA_VERSION,
    upgraders: data_lake_store_file_upgraders,
};

/// Returns all resource types supported by this provider
pub fn resource_types() -> Vec<Box<dyn ResourceType>> {
    vec![
        Box::new(StorageAccountType),
        Box::new(StorageShareType),
        Box::new(StorageBlobType),
        Box::new(CosmosDbGremlinDatabaseType),
        Box::new(CdnProfileType),
        Box::new(DnsZoneType),
        Box::new(DataLakeStoreFileType),
    ]
}

/// Registrations of all resource types, in the order of `resource_types`
pub fn resource_definitions() -> Vec<ResourceDefinition> {
    vec![
        StorageAccountType::DEFINITION,
        StorageShareType::DEFINITION,
        StorageBlobType::DEFINITION,
        CosmosDbGremlinDatabaseType::DEFINITION,
        CdnProfileType::DEFINITION,
        DnsZoneType::DEFINITION,
        DATA_LAKE_STORE_FILE,
    ]
}

/// Look up a registration by type name
pub fn find_definition(name: &str) -> Option<ResourceDefinition> {
    resource_definitions().into_iter().find(|d| d.name == name)
}
