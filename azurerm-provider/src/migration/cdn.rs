//! CDN profile state upgraders

use azurerm_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};
use azurerm_core::upgrade::{RawState, RawStateExt, StateUpgrader, UpgradeError, UpgradeResult};

use super::UpgradeContext;
use crate::resource_id::{AzureResourceId, CdnProfileId, ResourceIdError};

pub fn cdn_profile_v0_to_v1() -> StateUpgrader<UpgradeContext> {
    StateUpgrader::new(0, cdn_profile_schema_v0, cdn_profile_upgrade_v0_to_v1)
}

fn cdn_profile_schema_v0() -> ResourceSchema {
    let required = |name: &str| {
        AttributeSchema::new(name, AttributeType::String)
            .required()
            .force_new()
    };

    ResourceSchema::new("cdn_profile")
        .attribute(required("name"))
        .attribute(required("location"))
        .attribute(required("resource_group_name"))
        .attribute(required("sku"))
        .attribute(AttributeSchema::new("tags", types::tags()))
}

/// `.../resourcegroups/{rg}/...` becomes `.../resourceGroups/{rg}/...`
fn cdn_profile_upgrade_v0_to_v1(state: &RawState, _: &UpgradeContext) -> UpgradeResult<RawState> {
    let old_id = state.required_str("id")?;
    let invalid = |e: ResourceIdError| UpgradeError::InvalidId {
        id: old_id.to_string(),
        message: e.to_string(),
    };

    let mut parsed = AzureResourceId::parse(old_id).map_err(invalid)?;
    let name = parsed.pop_segment("profiles").map_err(invalid)?;

    let new_id = CdnProfileId::new(parsed.subscription_id, parsed.resource_group, name).id();
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
    fn test_cdn_profile_v0_to_v1() {
        let state = raw(json!({
            "id": "/subscriptions/sub-1/resourcegroups/group1/providers/Microsoft.Cdn/profiles/profile1",
            "name": "profile1",
            "sku": "Standard_Verizon",
            "tags": {"env": "prod"},
        }));

        let upgraded = cdn_profile_upgrade_v0_to_v1(&state, &context(Environment::PUBLIC)).unwrap();
        assert_eq!(
            upgraded.get("id"),
            Some(&json!(
                "/subscriptions/sub-1/resourceGroups/group1/providers/Microsoft.Cdn/profiles/profile1"
            ))
        );
        assert_eq!(upgraded.get("tags"), Some(&json!({"env": "prod"})));
    }

    #[test]
    fn test_cdn_profile_missing_profiles_segment() {
        let state = raw(json!({
            "id": "/subscriptions/sub-1/resourcegroups/group1/providers/Microsoft.Cdn/endpoints/e1",
        }));

        let err = cdn_profile_upgrade_v0_to_v1(&state, &context(Environment::PUBLIC)).unwrap_err();
        match err {
            UpgradeError::InvalidId { message, .. } => {
                assert_eq!(message, "ID was missing the `profiles` element")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_cdn_profile_malformed_id() {
        let state = raw(json!({"id": "/subscriptions/sub-1/resourcegroups"}));
        let err = cdn_profile_upgrade_v0_to_v1(&state, &context(Environment::PUBLIC)).unwrap_err();
        assert!(matches!(err, UpgradeError::InvalidId { .. }));
    }
}
