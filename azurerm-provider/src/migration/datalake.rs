//! Data Lake Store file state upgraders

use azurerm_core::schema::{AttributeSchema, AttributeType, ResourceSchema};
use azurerm_core::upgrade::{RawState, RawStateExt, StateUpgrader, UpgradeError, UpgradeResult};

use super::UpgradeContext;
use crate::resource_id::DataLakeStoreFileId;

pub fn store_file_v0_to_v1() -> StateUpgrader<UpgradeContext> {
    StateUpgrader::new(0, store_file_schema_v0, store_file_upgrade_v0_to_v1)
}

fn store_file_schema_v0() -> ResourceSchema {
    let required = |name: &str| {
        AttributeSchema::new(name, AttributeType::String)
            .required()
            .force_new()
    };

    ResourceSchema::new("data_lake_store_file")
        .attribute(required("account_name"))
        .attribute(required("remote_file_path"))
        .attribute(required("local_file_path"))
}

/// id becomes `{account_name}.{suffix}{remote_file_path}`
fn store_file_upgrade_v0_to_v1(state: &RawState, ctx: &UpgradeContext) -> UpgradeResult<RawState> {
    let suffix = ctx.environment.data_lake_store_suffix.ok_or_else(|| {
        UpgradeError::Unavailable(format!(
            "Data Lake Store is not available in {}",
            ctx.environment
        ))
    })?;

    let account_name = state.required_str("account_name")?;
    let remote_file_path = state.required_str("remote_file_path")?;

    let old_id = state.optional_str("id")?;
    let new_id = DataLakeStoreFileId::new(account_name, remote_file_path).id(suffix);
    log::debug!("Updating ID from {:?} to {:?}", old_id, new_id);

    Ok(state.with_str("id", new_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use crate::migration::tests::{context, raw};
    use serde_json::json;

    #[test]
    fn test_store_file_v0_to_v1() {
        let state = raw(json!({
            "id": "example/test/example.txt",
            "account_name": "example",
            "remote_file_path": "/test/example.txt",
            "local_file_path": "/tmp/example.txt",
        }));

        let upgraded = store_file_upgrade_v0_to_v1(&state, &context(Environment::PUBLIC)).unwrap();
        assert_eq!(
            upgraded.get("id"),
            Some(&json!("example.azuredatalakestore.net/test/example.txt"))
        );
        assert_eq!(upgraded.get("local_file_path"), Some(&json!("/tmp/example.txt")));
    }

    #[test]
    fn test_store_file_outside_public_cloud() {
        let state = raw(json!({
            "account_name": "example",
            "remote_file_path": "/test/example.txt",
        }));

        let err = store_file_upgrade_v0_to_v1(&state, &context(Environment::GERMAN)).unwrap_err();
        assert_eq!(
            err,
            UpgradeError::Unavailable("Data Lake Store is not available in AzureGermanCloud".to_string())
        );
    }
}
