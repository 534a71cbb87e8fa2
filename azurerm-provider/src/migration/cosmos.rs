//! Cosmos DB Gremlin database state upgraders

use azurerm_core::schema::{AttributeSchema, AttributeType, ResourceSchema};
use azurerm_core::upgrade::{RawState, RawStateExt, StateUpgrader, UpgradeResult};

use super::UpgradeContext;

const LEGACY_SEGMENT: &str = "apis/gremlin/databases";
const CURRENT_SEGMENT: &str = "gremlinDatabases";

pub fn gremlin_database_v0_to_v1() -> StateUpgrader<UpgradeContext> {
    StateUpgrader::new(0, gremlin_database_schema_v0, gremlin_database_upgrade_v0_to_v1)
}

fn gremlin_database_schema_v0() -> ResourceSchema {
    ResourceSchema::new("cosmosdb_gremlin_database")
        .attribute(
            AttributeSchema::new("name", AttributeType::String)
                .required()
                .force_new(),
        )
        .attribute(
            AttributeSchema::new("resource_group_name", AttributeType::String)
                .required()
                .force_new(),
        )
        .attribute(
            AttributeSchema::new("account_name", AttributeType::String)
                .required()
                .force_new(),
        )
        .attribute(AttributeSchema::new("throughput", AttributeType::Int).computed())
}

/// Only the first occurrence of the legacy segment is rewritten
fn gremlin_database_upgrade_v0_to_v1(
    state: &RawState,
    _: &UpgradeContext,
) -> UpgradeResult<RawState> {
    let old_id = state.required_str("id")?;
    let new_id = old_id.replacen(LEGACY_SEGMENT, CURRENT_SEGMENT, 1);

    log::debug!("Updating ID from {:?} to {:?}", old_id, new_id);
    Ok(state.with_str("id", new_id))
}
