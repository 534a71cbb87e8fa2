//! Storage account, share and blob state upgraders

use azurerm_core::resource::Value;
use azurerm_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};
use azurerm_core::upgrade::{RawState, RawStateExt, StateUpgrader, UpgradeError, UpgradeResult};

use super::UpgradeContext;
use crate::resource_id::{storage_blob_id, storage_share_id};

// =============================================================================
// storage_account
// =============================================================================

pub fn account_v0_to_v1() -> StateUpgrader<UpgradeContext> {
    StateUpgrader::new(0, account_schema_v0_v1, account_upgrade_v0_to_v1)
}

pub fn account_v1_to_v2() -> StateUpgrader<UpgradeContext> {
    StateUpgrader::new(1, account_schema_v0_v1, account_upgrade_v1_to_v2)
}

/// Schema shared by versions 0 and 1
fn account_schema_v0_v1() -> ResourceSchema {
    let computed = |name: &str| AttributeSchema::new(name, AttributeType::String).computed();

    let mut schema = ResourceSchema::new("storage_account")
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
            AttributeSchema::new("location", AttributeType::String)
                .required()
                .force_new(),
        )
        .attribute(
            AttributeSchema::new("account_kind", AttributeType::String)
                .force_new()
                .with_default(Value::String("Storage".to_string())),
        )
        .attribute(
            AttributeSchema::new("account_type", AttributeType::String)
                .computed()
                .deprecated(
                    "This field has been split into `account_tier` and `account_replication_type`",
                ),
        )
        .attribute(
            AttributeSchema::new("account_tier", AttributeType::String)
                .required()
                .force_new(),
        )
        .attribute(AttributeSchema::new("account_replication_type", AttributeType::String).required())
        .attribute(computed("access_tier"))
        .attribute(AttributeSchema::new(
            "custom_domain",
            AttributeType::List(Box::new(AttributeType::Object(vec![
                AttributeSchema::new("name", AttributeType::String).required(),
                AttributeSchema::new("use_subdomain", AttributeType::Bool)
                    .with_default(Value::Bool(false)),
            ]))),
        ))
        .attribute(AttributeSchema::new("enable_blob_encryption", AttributeType::Bool))
        .attribute(AttributeSchema::new("enable_file_encryption", AttributeType::Bool))
        .attribute(AttributeSchema::new("enable_https_traffic_only", AttributeType::Bool))
        .attribute(AttributeSchema::new("tags", types::tags()));

    for name in [
        "primary_location",
        "secondary_location",
        "primary_blob_endpoint",
        "secondary_blob_endpoint",
        "primary_queue_endpoint",
        "secondary_queue_endpoint",
        "primary_table_endpoint",
        "secondary_table_endpoint",
        "primary_file_endpoint",
        "primary_access_key",
        "secondary_access_key",
        "primary_blob_connection_string",
        "secondary_blob_connection_string",
    ] {
        schema = schema.attribute(computed(name));
    }
    schema
}

/// `account_type` "Standard_LRS" becomes tier "Standard" and replication "LRS"
fn account_upgrade_v0_to_v1(state: &RawState, _: &UpgradeContext) -> UpgradeResult<RawState> {
    let account_type = state.required_str("account_type")?;
    let (tier, replication) =
        account_type
            .split_once('_')
            .ok_or_else(|| UpgradeError::InvalidAttribute {
                name: "account_type".to_string(),
                message: format!("expected `{{tier}}_{{replication}}`, got {:?}", account_type),
            })?;

    // Anything after a second underscore is dropped, matching the historical split.
    let replication = replication.split('_').next().unwrap_or(replication);

    Ok(state
        .with_str("account_tier", tier)
        .with_str("account_replication_type", replication))
}

fn account_upgrade_v1_to_v2(state: &RawState, _: &UpgradeContext) -> UpgradeResult<RawState> {
    Ok(state.with_str("account_encryption_source", "Microsoft.Storage"))
}

// =============================================================================
// storage_share
// =============================================================================

pub fn share_v0_to_v1() -> StateUpgrader<UpgradeContext> {
    StateUpgrader::new(0, share_schema_v0_v1, share_upgrade_v0_to_v1)
}

pub fn share_v1_to_v2() -> StateUpgrader<UpgradeContext> {
    StateUpgrader::new(1, share_schema_v0_v1, share_upgrade_v1_to_v2)
}

/// Schema shared by versions 0 and 1
fn share_schema_v0_v1() -> ResourceSchema {
    ResourceSchema::new("storage_share")
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
            AttributeSchema::new("storage_account_name", AttributeType::String)
                .required()
                .force_new(),
        )
        .attribute(
            AttributeSchema::new(
                "quota",
                AttributeType::Custom {
                    name: "ShareQuota".to_string(),
                    base: Box::new(AttributeType::Int),
                    validate: |value| match value {
                        Value::Int(n) if (1..=5120).contains(n) => Ok(()),
                        _ => Err("Value must be between 1 and 5120".to_string()),
                    },
                },
            )
            .with_default(Value::Int(5120)),
        )
        .attribute(AttributeSchema::new("url", AttributeType::String).computed())
}

/// id becomes `{name}/{resource_group_name}/{storage_account_name}`
fn share_upgrade_v0_to_v1(state: &RawState, _: &UpgradeContext) -> UpgradeResult<RawState> {
    let share_name = state.required_str("name")?;
    let resource_group = state.required_str("resource_group_name")?;
    let account_name = state.required_str("storage_account_name")?;

    let old_id = state.optional_str("id")?;
    let new_id = format!("{}/{}/{}", share_name, resource_group, account_name);
    log::debug!("Updating ID from {:?} to {:?}", old_id, new_id);

    Ok(state.with_str("id", new_id))
}

/// id `{name}/{resource_group}/{account}` becomes the share URL
fn share_upgrade_v1_to_v2(state: &RawState, ctx: &UpgradeContext) -> UpgradeResult<RawState> {
    let id = state.required_str("id")?;

    let segments: Vec<&str> = id.split('/').collect();
    let [share_name, _resource_group, account_name] = segments[..] else {
        return Err(UpgradeError::SegmentCount {
            expected: 3,
            got: segments.len(),
        });
    };

    let new_id = storage_share_id(&ctx.environment, account_name, share_name);
    log::debug!("Updating Resource ID from {:?} to {:?}", id, new_id);

    Ok(state.with_str("id", new_id))
}

// =============================================================================
// storage_blob
// =============================================================================

pub fn blob_v0_to_v1() -> StateUpgrader<UpgradeContext> {
    StateUpgrader::new(0, blob_schema_v0, blob_upgrade_v0_to_v1)
}

fn blob_schema_v0() -> ResourceSchema {
    let force_new = |name: &str, attr_type: AttributeType| {
        AttributeSchema::new(name, attr_type).force_new()
    };

    ResourceSchema::new("storage_blob")
        .attribute(force_new("name", AttributeType::String).required())
        .attribute(force_new("resource_group_name", AttributeType::String))
        .attribute(force_new("storage_account_name", AttributeType::String).required())
        .attribute(force_new("storage_container_name", AttributeType::String).required())
        .attribute(force_new("type", AttributeType::String))
        .attribute(AttributeSchema::new("size", AttributeType::Int).with_default(Value::Int(0)))
        .attribute(AttributeSchema::new("access_tier", AttributeType::String).computed())
        .attribute(force_new("content_type", AttributeType::String))
        .attribute(force_new("source", AttributeType::String))
        .attribute(force_new("source_uri", AttributeType::String))
        .attribute(AttributeSchema::new("url", AttributeType::String).computed())
        .attribute(
            AttributeSchema::new("parallelism", types::positive_int())
                .force_new()
                .with_default(Value::Int(8)),
        )
        .attribute(
            AttributeSchema::new("attempts", types::positive_int())
                .force_new()
                .with_default(Value::Int(1)),
        )
        .attribute(AttributeSchema::new("metadata", types::tags()))
}

/// id becomes the blob URL `https://{account}.blob.{suffix}/{container}/{name}`
fn blob_upgrade_v0_to_v1(state: &RawState, ctx: &UpgradeContext) -> UpgradeResult<RawState> {
    let blob_name = state.required_str("name")?;
    let container_name = state.required_str("storage_container_name")?;
    let account_name = state.required_str("storage_account_name")?;

    let old_id = state.optional_str("id")?;
    let new_id = storage_blob_id(&ctx.environment, account_name, container_name, blob_name);
    log::debug!("Updating ID from {:?} to {:?}", old_id, new_id);

    Ok(state.with_str("id", new_id))
}
