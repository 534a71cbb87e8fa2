//! Azure Provider State Management
//!
//! Persisted resource state for the Azure provider, and the pass that brings
//! every persisted resource up to its current schema version.
//!
//! # Overview
//!
//! - **StateFile**: The main state structure containing all managed resources
//! - **StateBackend**: A trait for state storage backends (currently local files)
//! - **LockInfo**: Information about state locks for concurrent access control
//! - **upgrade_state_file**: Runs each resource through its upgrade chain
//!
//! # Example
//!
//! ```ignore
//! use azurerm_state::{create_backend, upgrade_state_file, BackendConfig};
//!
//! let backend = create_backend(&BackendConfig::local("azurerm.state.json"))?;
//! let lock = backend.acquire_lock("upgrade").await?;
//!
//! let mut state = backend.read_state().await?.unwrap_or_default();
//! let report = upgrade_state_file(&mut state, &chains, &ctx).await?;
//! if !report.is_empty() {
//!     state.increment_serial();
//!     backend.write_state(&state).await?;
//! }
//!
//! backend.release_lock(&lock).await?;
//! ```

pub mod backend;
pub mod backends;
pub mod lock;
pub mod state;
pub mod upgrade;

// Re-export main types for convenience
pub use backend::{BackendConfig, BackendError, BackendResult, StateBackend};
pub use backends::create_backend;
pub use lock::LockInfo;
pub use state::{ResourceState, StateFile};
pub use upgrade::{StateUpgradeError, UpgradeReport, UpgradedResource, upgrade_state_file};
