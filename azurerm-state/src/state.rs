//! State file structures for persisting resource state

use azurerm_core::upgrade::RawState;
use serde::{Deserialize, Serialize};

/// The main state file structure that persists to the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateFile {
    /// State file format version
    pub version: u32,
    /// Monotonically increasing number for each state modification
    pub serial: u64,
    /// Unique identifier for this state lineage (prevents accidental overwrites)
    pub lineage: String,
    /// Version of the provider that last wrote this state
    pub provider_version: String,
    /// All managed resources and their current state
    pub resources: Vec<ResourceState>,
}

impl StateFile {
    /// Current state file format version
    pub const CURRENT_VERSION: u32 = 1;

    /// Create a new empty state file
    pub fn new() -> Self {
        Self::with_lineage(uuid::Uuid::new_v4().to_string())
    }

    /// Create a new state file with a specific lineage (for initialization)
    pub fn with_lineage(lineage: String) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            serial: 0,
            lineage,
            provider_version: env!("CARGO_PKG_VERSION").to_string(),
            resources: Vec::new(),
        }
    }

    /// Increment serial and stamp the provider version for a new state write
    pub fn increment_serial(&mut self) {
        self.serial += 1;
        self.provider_version = env!("CARGO_PKG_VERSION").to_string();
    }

    /// Find a resource by type and name
    pub fn find_resource(&self, resource_type: &str, name: &str) -> Option<&ResourceState> {
        self.resources
            .iter()
            .find(|r| r.resource_type == resource_type && r.name == name)
    }

    /// Add or replace a resource in the state
    pub fn upsert_resource(&mut self, resource: ResourceState) {
        match self
            .resources
            .iter_mut()
            .find(|r| r.resource_type == resource.resource_type && r.name == resource.name)
        {
            Some(existing) => *existing = resource,
            None => self.resources.push(resource),
        }
    }

    /// Remove a resource from the state
    pub fn remove_resource(&mut self, resource_type: &str, name: &str) -> Option<ResourceState> {
        let pos = self
            .resources
            .iter()
            .position(|r| r.resource_type == resource_type && r.name == name)?;
        Some(self.resources.remove(pos))
    }
}

impl Default for StateFile {
    fn default() -> Self {
        Self::new()
    }
}

/// State of a single managed resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceState {
    /// Resource type (e.g., "storage_share", "data_lake_store_file")
    pub resource_type: String,
    /// Local name of the resource
    pub name: String,
    /// Provider name (e.g., "azurerm")
    pub provider: String,
    /// Schema version the attributes were written with
    #[serde(default)]
    pub schema_version: u32,
    /// All attributes of the resource, including `id`
    pub attributes: RawState,
}

impl ResourceState {
    /// Create a new resource state
    pub fn new(
        resource_type: impl Into<String>,
        name: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            provider: provider.into(),
            schema_version: 0,
            attributes: RawState::new(),
        }
    }

    /// Set an attribute value
    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn with_schema_version(mut self, version: u32) -> Self {
        self.schema_version = version;
        self
    }

    /// The provider-side identifier stored under `id`
    pub fn id(&self) -> Option<&str> {
        self.attributes.get("id").and_then(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_file_new() {
        let state = StateFile::new();
        assert_eq!(state.version, StateFile::CURRENT_VERSION);
        assert_eq!(state.serial, 0);
        assert!(!state.lineage.is_empty());
        assert!(state.resources.is_empty());
    }

    #[test]
    fn test_state_file_increment_serial() {
        let mut state = StateFile::new();
        state.increment_serial();
        state.increment_serial();
        assert_eq!(state.serial, 2);
    }

    #[test]
    fn test_state_file_upsert_resource() {
        let mut state = StateFile::new();

        state.upsert_resource(
            ResourceState::new("storage_share", "logs", "azurerm")
                .with_attribute("quota", serde_json::json!(50)),
        );
        state.upsert_resource(
            ResourceState::new("storage_share", "logs", "azurerm")
                .with_attribute("quota", serde_json::json!(100)),
        );

        assert_eq!(state.resources.len(), 1);
        assert_eq!(
            state.resources[0].attributes.get("quota"),
            Some(&serde_json::json!(100))
        );
    }

    #[test]
    fn test_state_file_remove_resource() {
        let mut state = StateFile::new();
        state.upsert_resource(ResourceState::new("storage_share", "logs", "azurerm"));

        assert!(state.remove_resource("storage_share", "logs").is_some());
        assert!(state.resources.is_empty());
        assert!(state.remove_resource("storage_share", "other").is_none());
    }

    #[test]
    fn test_missing_schema_version_defaults_to_zero() {
        let json = r#"{
            "resource_type": "storage_blob",
            "name": "report",
            "provider": "azurerm",
            "attributes": {"id": "old-id"}
        }"#;

        let resource: ResourceState = serde_json::from_str(json).unwrap();
        assert_eq!(resource.schema_version, 0);
        assert_eq!(resource.id(), Some("old-id"));
    }

    #[test]
    fn test_state_file_serialization() {
        let mut state = StateFile::new();
        state.upsert_resource(
            ResourceState::new("data_lake_store_file", "upload", "azurerm")
                .with_schema_version(1)
                .with_attribute(
                    "id",
                    serde_json::json!("example.azuredatalakestore.net/test/example.txt"),
                ),
        );

        let json = serde_json::to_string_pretty(&state).unwrap();
        let deserialized: StateFile = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.lineage, state.lineage);
        assert_eq!(deserialized.resources[0].schema_version, 1);
        assert_eq!(
            deserialized.find_resource("data_lake_store_file", "upload").unwrap().id(),
            Some("example.azuredatalakestore.net/test/example.txt")
        );
    }
}
