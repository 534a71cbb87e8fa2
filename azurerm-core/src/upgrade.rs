//! Upgrade - Rewriting persisted state across schema versions
//!
//! Every resource type carries a schema version. When the persisted state of a
//! resource is older than the current version, it is passed through a chain of
//! upgraders, each of which turns the raw state of version `n` into the raw
//! state of version `n + 1`.
//!
//! Upgraders never mutate their input. A failing step hands the caller back the
//! state exactly as it was before the chain started.

use crate::provider::BoxFuture;
use crate::schema::ResourceSchema;

/// Untyped attribute map persisted for a resource
pub type RawState = serde_json::Map<String, serde_json::Value>;

/// Errors raised while upgrading a single state
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UpgradeError {
    /// A required attribute is absent or null
    #[error("Attribute `{0}` is missing from the state")]
    MissingAttribute(String),

    /// An attribute is present but cannot be interpreted
    #[error("Attribute `{name}` is invalid: {message}")]
    InvalidAttribute { name: String, message: String },

    /// A delimited identifier has the wrong number of segments
    #[error("Expected {expected} segments in the ID but got {got}")]
    SegmentCount { expected: usize, got: usize },

    /// An identifier does not match the expected layout
    #[error("Parsing ID {id:?}: {message}")]
    InvalidId { id: String, message: String },

    /// A remote lookup needed by the upgrade failed or returned incomplete data
    #[error("{0}")]
    Lookup(String),

    /// The configured environment lacks a service the upgrade depends on
    #[error("{0}")]
    Unavailable(String),

    /// The state does not have the shape of the schema the upgrader expects
    #[error("State does not match the version {version} schema: {}", .errors.join("; "))]
    Schema { version: u32, errors: Vec<String> },

    /// An upgrader removed attributes that were present in its input
    #[error("Upgrade from version {version} dropped attributes: {}", .attributes.join(", "))]
    DroppedAttributes { version: u32, attributes: Vec<String> },

    /// No upgrader is registered for a version inside the chain
    #[error("No state upgrader registered for version {0}")]
    MissingUpgrader(u32),

    /// The state was written by a newer schema than this build knows
    #[error("State version {version} is newer than the current schema version {current}")]
    UnsupportedVersion { version: u32, current: u32 },
}

pub type UpgradeResult<T> = Result<T, UpgradeError>;

/// A failed upgrade, carrying the untouched input state
#[derive(Debug, thiserror::Error)]
#[error("Upgrading state from version {version}: {error}")]
pub struct UpgradeFailure {
    /// The state as it was before the chain started
    pub state: RawState,
    /// The version whose upgrader failed
    pub version: u32,
    #[source]
    pub error: UpgradeError,
}

/// Pure transform between adjacent versions
pub type SyncUpgradeFn<C> = fn(&RawState, &C) -> UpgradeResult<RawState>;

/// Transform that needs to call out to a remote API
pub type AsyncUpgradeFn<C> =
    for<'a> fn(&'a RawState, &'a C) -> BoxFuture<'a, UpgradeResult<RawState>>;

pub enum UpgradeFn<C> {
    Sync(SyncUpgradeFn<C>),
    Async(AsyncUpgradeFn<C>),
}

/// Upgrades state persisted at `version` to `version + 1`
///
/// `C` is the capability set the upgrader may use, such as the cloud
/// environment or a resource group resolver.
pub struct StateUpgrader<C> {
    /// Version this upgrader upgrades from
    pub version: u32,
    /// Schema of the state at `version`
    pub schema: fn() -> ResourceSchema,
    pub upgrade: UpgradeFn<C>,
}

impl<C> StateUpgrader<C> {
    pub fn new(version: u32, schema: fn() -> ResourceSchema, upgrade: SyncUpgradeFn<C>) -> Self {
        Self {
            version,
            schema,
            upgrade: UpgradeFn::Sync(upgrade),
        }
    }

    pub fn new_async(
        version: u32,
        schema: fn() -> ResourceSchema,
        upgrade: AsyncUpgradeFn<C>,
    ) -> Self {
        Self {
            version,
            schema,
            upgrade: UpgradeFn::Async(upgrade),
        }
    }

    /// Run this single step without the chain's checks
    pub async fn apply(&self, state: &RawState, ctx: &C) -> UpgradeResult<RawState> {
        match &self.upgrade {
            UpgradeFn::Sync(f) => f(state, ctx),
            UpgradeFn::Async(f) => f(state, ctx).await,
        }
    }
}

/// All upgraders of one resource type, leading up to its current schema version
pub struct UpgradeChain<C> {
    schema_version: u32,
    upgraders: Vec<StateUpgrader<C>>,
}

impl<C> UpgradeChain<C> {
    pub fn new(schema_version: u32, mut upgraders: Vec<StateUpgrader<C>>) -> Self {
        upgraders.sort_by_key(|u| u.version);
        Self {
            schema_version,
            upgraders,
        }
    }

    /// Current schema version of the resource type
    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    pub fn upgraders(&self) -> &[StateUpgrader<C>] {
        &self.upgraders
    }

    /// Whether state persisted at `version` has to go through the chain
    pub fn needs_upgrade(&self, version: u32) -> bool {
        version < self.schema_version
    }

    /// Upgrade `state`, persisted at `from_version`, to the current schema version
    pub async fn upgrade(
        &self,
        state: RawState,
        from_version: u32,
        ctx: &C,
    ) -> Result<RawState, UpgradeFailure> {
        if from_version > self.schema_version {
            return Err(UpgradeFailure {
                state,
                version: from_version,
                error: UpgradeError::UnsupportedVersion {
                    version: from_version,
                    current: self.schema_version,
                },
            });
        }

        let mut upgraded: Option<RawState> = None;
        for version in from_version..self.schema_version {
            let input = upgraded.as_ref().unwrap_or(&state);
            match self.step(version, input, ctx).await {
                Ok(next) => upgraded = Some(next),
                Err(error) => {
                    return Err(UpgradeFailure {
                        state,
                        version,
                        error,
                    });
                }
            }
        }

        Ok(upgraded.unwrap_or(state))
    }

    async fn step(&self, version: u32, state: &RawState, ctx: &C) -> UpgradeResult<RawState> {
        let upgrader = self
            .upgraders
            .iter()
            .find(|u| u.version == version)
            .ok_or(UpgradeError::MissingUpgrader(version))?;

        (upgrader.schema)()
            .validate_state(state)
            .map_err(|errors| UpgradeError::Schema {
                version,
                errors: errors.iter().map(ToString::to_string).collect(),
            })?;

        let next = upgrader.apply(state, ctx).await?;

        let mut dropped: Vec<String> = state
            .keys()
            .filter(|k| !next.contains_key(k.as_str()))
            .cloned()
            .collect();
        if !dropped.is_empty() {
            dropped.sort();
            return Err(UpgradeError::DroppedAttributes {
                version,
                attributes: dropped,
            });
        }

        log::trace!("Upgraded state from version {} to {}", version, version + 1);
        Ok(next)
    }
}

/// Typed accessors for raw state attributes
pub trait RawStateExt {
    /// A string attribute that must be present
    fn required_str(&self, key: &str) -> UpgradeResult<&str>;

    /// A string attribute that may be absent or null
    fn optional_str(&self, key: &str) -> UpgradeResult<Option<&str>>;

    /// Return a copy with `key` set to a string value
    fn with_str(&self, key: &str, value: impl Into<String>) -> RawState;
}

impl RawStateExt for RawState {
    fn required_str(&self, key: &str) -> UpgradeResult<&str> {
        self.optional_str(key)?
            .ok_or_else(|| UpgradeError::MissingAttribute(key.to_string()))
    }

    fn optional_str(&self, key: &str) -> UpgradeResult<Option<&str>> {
        match self.get(key) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(serde_json::Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(UpgradeError::InvalidAttribute {
                name: key.to_string(),
                message: format!("expected a string, got {}", other),
            }),
        }
    }

    fn with_str(&self, key: &str, value: impl Into<String>) -> RawState {
        let mut next = self.clone();
        next.insert(key.to_string(), serde_json::Value::String(value.into()));
        next
    }
}
