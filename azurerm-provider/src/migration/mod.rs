//! State upgraders for Azure resource types
//!
//! Each submodule holds the upgraders of one service together with the
//! schemas of the state versions they read. `upgrade_chains` wires them into
//! one chain per resource type.

pub mod cdn;
pub mod cosmos;
pub mod datalake;
pub mod dns;
pub mod storage;

use std::collections::HashMap;
use std::sync::Arc;

use azurerm_core::upgrade::UpgradeChain;

use crate::clients::ResourceGroupResolver;
use crate::environment::Environment;
use crate::resources::resource_definitions;

/// What upgraders are allowed to use
#[derive(Clone)]
pub struct UpgradeContext {
    /// Cloud whose endpoint suffixes go into rewritten IDs
    pub environment: Environment,
    /// Canonical resource group lookups
    pub resource_groups: Arc<dyn ResourceGroupResolver>,
}

impl UpgradeContext {
    pub fn new(environment: Environment, resource_groups: Arc<dyn ResourceGroupResolver>) -> Self {
        Self {
            environment,
            resource_groups,
        }
    }
}

impl std::fmt::Debug for UpgradeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpgradeContext")
            .field("environment", &self.environment.name)
            .finish_non_exhaustive()
    }
}

/// Upgrade chain of every resource type with persisted state upgrades
pub fn upgrade_chains() -> HashMap<String, UpgradeChain<UpgradeContext>> {
    resource_definitions()
        .into_iter()
        .map(|def| {
            (
                def.name.to_string(),
                UpgradeChain::new(def.schema_version, (def.upgraders)()),
            )
        })
        .collect()
}
