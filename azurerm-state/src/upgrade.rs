//! Upgrading every resource of a state file to its current schema version

use std::collections::HashMap;

use azurerm_core::upgrade::{UpgradeChain, UpgradeFailure};
use thiserror::Error;

use crate::state::{ResourceState, StateFile};

/// A resource in the state file could not be upgraded
#[derive(Debug, Error)]
#[error("Failed to upgrade state of {resource_type}.{name}: {source}")]
pub struct StateUpgradeError {
    pub resource_type: String,
    pub name: String,
    #[source]
    pub source: UpgradeFailure,
}

/// A resource whose state was rewritten
#[derive(Debug, Clone, PartialEq)]
pub struct UpgradedResource {
    pub resource_type: String,
    pub name: String,
    pub from_version: u32,
    pub to_version: u32,
}

/// Outcome of an upgrade pass over a state file
#[derive(Debug, Default)]
pub struct UpgradeReport {
    pub upgraded: Vec<UpgradedResource>,
    /// Resources whose type has no registered chain; left untouched
    pub unknown: Vec<String>,
}

impl UpgradeReport {
    /// Whether the pass changed nothing
    pub fn is_empty(&self) -> bool {
        self.upgraded.is_empty()
    }
}

/// Upgrade every resource in `state` using the chain registered for its type
///
/// The pass is all-or-nothing: when any resource fails, `state` is left
/// exactly as it was and the first failure is returned.
pub async fn upgrade_state_file<C>(
    state: &mut StateFile,
    chains: &HashMap<String, UpgradeChain<C>>,
    ctx: &C,
) -> Result<UpgradeReport, StateUpgradeError> {
    let mut report = UpgradeReport::default();
    let mut resources = Vec::with_capacity(state.resources.len());

    for resource in &state.resources {
        let Some(chain) = chains.get(&resource.resource_type) else {
            report
                .unknown
                .push(format!("{}.{}", resource.resource_type, resource.name));
            resources.push(resource.clone());
            continue;
        };

        let attributes = chain
            .upgrade(resource.attributes.clone(), resource.schema_version, ctx)
            .await
            .map_err(|source| StateUpgradeError {
                resource_type: resource.resource_type.clone(),
                name: resource.name.clone(),
                source,
            })?;

        if !chain.needs_upgrade(resource.schema_version) {
            resources.push(resource.clone());
            continue;
        }

        log::info!(
            "Upgraded {}.{} from schema version {} to {}",
            resource.resource_type,
            resource.name,
            resource.schema_version,
            chain.schema_version()
        );
        report.upgraded.push(UpgradedResource {
            resource_type: resource.resource_type.clone(),
            name: resource.name.clone(),
            from_version: resource.schema_version,
            to_version: chain.schema_version(),
        });
        resources.push(ResourceState {
            schema_version: chain.schema_version(),
            attributes,
            ..resource.clone()
        });
    }

    state.resources = resources;
    Ok(report)
}
