//! DNS zone state upgraders

use azurerm_core::provider::BoxFuture;
use azurerm_core::resource::Value;
use azurerm_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};
use azurerm_core::upgrade::{RawState, RawStateExt, StateUpgrader, UpgradeError, UpgradeResult};

use super::UpgradeContext;
use crate::resource_id::DnsZoneId;

pub fn dns_zone_v0_to_v1() -> StateUpgrader<UpgradeContext> {
    StateUpgrader::new_async(0, dns_zone_schema_v0, dns_zone_upgrade_v0_to_v1)
}

fn dns_zone_schema_v0() -> ResourceSchema {
    let int_with_default = |name: &str, default: i64| {
        AttributeSchema::new(name, AttributeType::Int).with_default(Value::Int(default))
    };

    let soa_record = AttributeType::Object(vec![
        AttributeSchema::new("email", AttributeType::String).required(),
        AttributeSchema::new("host_name", AttributeType::String).required(),
        int_with_default("expire_time", 2419200),
        int_with_default("minimum_ttl", 300),
        int_with_default("refresh_time", 3600),
        int_with_default("retry_time", 300),
        int_with_default("serial_number", 1),
        int_with_default("ttl", 3600),
        AttributeSchema::new("tags", types::tags()),
        AttributeSchema::new("fqdn", AttributeType::String).computed(),
    ]);

    ResourceSchema::new("dns_zone")
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
        .attribute(AttributeSchema::new("number_of_record_sets", AttributeType::Int).computed())
        .attribute(AttributeSchema::new("max_number_of_record_sets", AttributeType::Int).computed())
        .attribute(
            AttributeSchema::new(
                "name_servers",
                AttributeType::List(Box::new(AttributeType::String)),
            )
            .computed(),
        )
        .attribute(
            AttributeSchema::new("soa_record", AttributeType::List(Box::new(soa_record)))
                .computed()
                .force_new(),
        )
        .attribute(AttributeSchema::new("tags", types::tags()))
}

/// Rebuild the id with the resource group name as Resource Manager spells it
///
/// Older IDs carry the resource group in whatever case it was configured in.
fn dns_zone_upgrade_v0_to_v1<'a>(
    state: &'a RawState,
    ctx: &'a UpgradeContext,
) -> BoxFuture<'a, UpgradeResult<RawState>> {
    Box::pin(async move {
        let old_id = state.required_str("id")?;
        let id = DnsZoneId::parse(old_id).map_err(|e| UpgradeError::InvalidId {
            id: old_id.to_string(),
            message: e.to_string(),
        })?;

        let group = ctx
            .resource_groups
            .get(&id.resource_group)
            .await
            .map_err(|e| {
                UpgradeError::Lookup(format!(
                    "retrieving Resource Group {:?}: {}",
                    id.resource_group, e
                ))
            })?;
        let resource_group = group.name.ok_or_else(|| {
            UpgradeError::Lookup(format!(
                "`name` was nil for Resource Group {:?}",
                id.resource_group
            ))
        })?;

        let name = state.required_str("name")?;
        let new_id = DnsZoneId::new(id.subscription_id, resource_group, name).id();
        log::debug!("Updating `id` from {:?} to {:?}", old_id, new_id);

        Ok(state.with_str("id", new_id))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ResourceGroup;
    use crate::environment::Environment;
    use crate::migration::tests::{StaticResourceGroups, context_with_groups, raw};
    use serde_json::json;

    fn groups() -> StaticResourceGroups {
        StaticResourceGroups::new().with_group(
            "my-group",
            ResourceGroup {
                id: Some("/subscriptions/sub-1/resourceGroups/My-Group".to_string()),
                name: Some("My-Group".to_string()),
                location: Some("westeurope".to_string()),
            },
        )
    }

    #[tokio::test]
    async fn test_dns_zone_v0_to_v1() {
        let ctx = context_with_groups(Environment::PUBLIC, groups());
        let state = raw(json!({
            "id": "/subscriptions/sub-1/resourceGroups/my-group/providers/Microsoft.Network/dnszones/Example.com",
            "name": "example.com",
            "resource_group_name": "my-group",
            "name_servers": ["ns1-01.azure-dns.com."],
        }));

        let upgraded = dns_zone_upgrade_v0_to_v1(&state, &ctx).await.unwrap();
        assert_eq!(
            upgraded.get("id"),
            Some(&json!(
                "/subscriptions/sub-1/resourceGroups/My-Group/providers/Microsoft.Network/dnszones/example.com"
            ))
        );
        assert_eq!(upgraded.get("resource_group_name"), Some(&json!("my-group")));
    }

    #[tokio::test]
    async fn test_dns_zone_resource_group_without_name() {
        let ctx = context_with_groups(
            Environment::PUBLIC,
            StaticResourceGroups::new().with_group("my-group", ResourceGroup::default()),
        );
        let state = raw(json!({
            "id": "/subscriptions/sub-1/resourceGroups/my-group/providers/Microsoft.Network/dnszones/example.com",
            "name": "example.com",
        }));

        let err = dns_zone_upgrade_v0_to_v1(&state, &ctx).await.unwrap_err();
        assert_eq!(
            err,
            UpgradeError::Lookup("`name` was nil for Resource Group \"my-group\"".to_string())
        );
    }

    #[tokio::test]
    async fn test_dns_zone_unknown_resource_group() {
        let ctx = context_with_groups(Environment::PUBLIC, StaticResourceGroups::new());
        let state = raw(json!({
            "id": "/subscriptions/sub-1/resourceGroups/other/providers/Microsoft.Network/dnszones/example.com",
            "name": "example.com",
        }));

        let err = dns_zone_upgrade_v0_to_v1(&state, &ctx).await.unwrap_err();
        assert!(matches!(err, UpgradeError::Lookup(ref m) if m.contains("\"other\"")));
    }

    #[tokio::test]
    async fn test_dns_zone_malformed_id() {
        let ctx = context_with_groups(Environment::PUBLIC, groups());
        let state = raw(json!({
            "id": "/subscriptions/sub-1/resourceGroups/my-group/providers/Microsoft.Network/zones/example.com",
            "name": "example.com",
        }));

        let err = dns_zone_upgrade_v0_to_v1(&state, &ctx).await.unwrap_err();
        assert!(matches!(err, UpgradeError::InvalidId { .. }));
    }
}
