//! Local file backend for state storage
//!
//! State lives in a JSON file (default: azurerm.state.json) next to a `.lock`
//! file used for locking. Writes go to a temporary sibling first and are
//! renamed into place.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::backend::{BackendConfig, BackendError, BackendResult, StateBackend};
use crate::lock::{DEFAULT_LOCK_TIMEOUT_SECS, LockInfo};
use crate::state::StateFile;

/// Local file backend
pub struct LocalBackend {
    state_path: PathBuf,
    lock_path: PathBuf,
    lock_timeout_secs: i64,
}

impl LocalBackend {
    /// Default state file name
    pub const DEFAULT_STATE_FILE: &'static str = "azurerm.state.json";

    /// Create a LocalBackend for a specific state file path
    pub fn with_path(state_path: impl Into<PathBuf>) -> Self {
        let state_path = state_path.into();
        let lock_path = state_path.with_extension("lock");
        Self {
            state_path,
            lock_path,
            lock_timeout_secs: DEFAULT_LOCK_TIMEOUT_SECS,
        }
    }

    /// Create a LocalBackend from configuration (`path`, `lock_timeout`)
    pub fn from_config(config: &BackendConfig) -> BackendResult<Self> {
        let path = config
            .get_string("path")
            .unwrap_or(Self::DEFAULT_STATE_FILE);

        let mut backend = Self::with_path(path);
        if let Some(timeout) = config.get_int("lock_timeout") {
            if timeout <= 0 {
                return Err(BackendError::configuration(
                    "lock_timeout must be a positive number of seconds",
                ));
            }
            backend.lock_timeout_secs = timeout;
        }
        Ok(backend)
    }

    /// Get the state file path
    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    async fn read_lock(&self) -> BackendResult<Option<LockInfo>> {
        match tokio::fs::read_to_string(&self.lock_path).await {
            Ok(content) => serde_json::from_str(&content)
                .map(Some)
                .map_err(|e| BackendError::InvalidState(format!("Failed to parse lock file: {}", e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BackendError::Io(format!("Failed to read lock file: {}", e))),
        }
    }

    async fn remove_lock(&self) -> BackendResult<()> {
        tokio::fs::remove_file(&self.lock_path)
            .await
            .map_err(|e| BackendError::Io(format!("Failed to remove lock file: {}", e)))
    }
}

#[async_trait]
impl StateBackend for LocalBackend {
    async fn read_state(&self) -> BackendResult<Option<StateFile>> {
        let content = match tokio::fs::read_to_string(&self.state_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(BackendError::Io(format!("Failed to read state file: {}", e))),
        };

        let state: StateFile = serde_json::from_str(&content).map_err(|e| {
            BackendError::InvalidState(format!("Failed to parse state file: {}", e))
        })?;

        Ok(Some(state))
    }

    async fn write_state(&self, state: &StateFile) -> BackendResult<()> {
        if let Some(existing) = self.read_state().await?
            && existing.lineage != state.lineage
        {
            return Err(BackendError::LineageMismatch {
                expected: existing.lineage,
                actual: state.lineage.clone(),
            });
        }

        let content = serde_json::to_string_pretty(state).map_err(|e| {
            BackendError::Serialization(format!("Failed to serialize state: {}", e))
        })?;

        let tmp_path = self.state_path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, content)
            .await
            .map_err(|e| BackendError::Io(format!("Failed to write state file: {}", e)))?;
        tokio::fs::rename(&tmp_path, &self.state_path)
            .await
            .map_err(|e| BackendError::Io(format!("Failed to replace state file: {}", e)))?;

        log::debug!(
            "Wrote state serial {} to {}",
            state.serial,
            self.state_path.display()
        );
        Ok(())
    }

    async fn acquire_lock(&self, operation: &str) -> BackendResult<LockInfo> {
        if let Some(existing) = self.read_lock().await? {
            if !existing.is_expired() {
                return Err(BackendError::locked(&existing));
            }
            log::warn!(
                "Taking over expired lock {} held by {}",
                existing.id,
                existing.who
            );
        }

        let lock = LockInfo::with_timeout(operation, self.lock_timeout_secs);
        let content = serde_json::to_string_pretty(&lock)
            .map_err(|e| BackendError::Serialization(format!("Failed to serialize lock: {}", e)))?;

        tokio::fs::write(&self.lock_path, content)
            .await
            .map_err(|e| BackendError::Io(format!("Failed to write lock file: {}", e)))?;

        Ok(lock)
    }

    async fn release_lock(&self, lock: &LockInfo) -> BackendResult<()> {
        let existing = self
            .read_lock()
            .await?
            .ok_or_else(|| BackendError::LockNotFound(lock.id.clone()))?;

        if existing.id != lock.id {
            return Err(BackendError::LockMismatch {
                expected: lock.id.clone(),
                actual: existing.id,
            });
        }

        self.remove_lock().await
    }

    async fn force_unlock(&self, lock_id: &str) -> BackendResult<()> {
        let existing = self
            .read_lock()
            .await?
            .ok_or_else(|| BackendError::LockNotFound(lock_id.to_string()))?;

        if existing.id != lock_id {
            return Err(BackendError::LockMismatch {
                expected: lock_id.to_string(),
                actual: existing.id,
            });
        }

        self.remove_lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azurerm_core::resource::Value;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_local_backend_read_write() {
        let dir = tempdir().unwrap();
        let backend = LocalBackend::with_path(dir.path().join("test.state.json"));

        assert!(backend.read_state().await.unwrap().is_none());

        let mut state_file = StateFile::new();
        state_file.increment_serial();
        backend.write_state(&state_file).await.unwrap();

        let read_state = backend.read_state().await.unwrap().unwrap();
        assert_eq!(read_state.serial, 1);
        assert_eq!(read_state.lineage, state_file.lineage);
    }

    #[tokio::test]
    async fn test_local_backend_rejects_other_lineage() {
        let dir = tempdir().unwrap();
        let backend = LocalBackend::with_path(dir.path().join("test.state.json"));

        backend.write_state(&StateFile::new()).await.unwrap();
        let result = backend.write_state(&StateFile::new()).await;

        assert!(matches!(result, Err(BackendError::LineageMismatch { .. })));
    }

    #[tokio::test]
    async fn test_local_backend_locking() {
        let dir = tempdir().unwrap();
        let backend = LocalBackend::with_path(dir.path().join("test.state.json"));

        let lock = backend.acquire_lock("upgrade").await.unwrap();
        assert_eq!(lock.operation, "upgrade");

        let result = backend.acquire_lock("create").await;
        assert!(matches!(result, Err(BackendError::Locked { .. })));

        backend.release_lock(&lock).await.unwrap();

        let lock2 = backend.acquire_lock("delete").await.unwrap();
        assert_eq!(lock2.operation, "delete");
        backend.release_lock(&lock2).await.unwrap();
    }

    #[tokio::test]
    async fn test_local_backend_expired_lock_is_replaced() {
        let dir = tempdir().unwrap();
        let config = BackendConfig::local(
            dir.path().join("test.state.json").to_string_lossy().to_string(),
        );
        let backend = LocalBackend::from_config(&config).unwrap();

        let stale = LockInfo::with_timeout("upgrade", -60);
        tokio::fs::write(
            dir.path().join("test.state.lock"),
            serde_json::to_string(&stale).unwrap(),
        )
        .await
        .unwrap();

        let lock = backend.acquire_lock("create").await.unwrap();
        assert_ne!(lock.id, stale.id);
    }

    #[tokio::test]
    async fn test_local_backend_force_unlock_checks_id() {
        let dir = tempdir().unwrap();
        let backend = LocalBackend::with_path(dir.path().join("test.state.json"));

        let lock = backend.acquire_lock("upgrade").await.unwrap();
        assert!(matches!(
            backend.force_unlock("some-other-id").await,
            Err(BackendError::LockMismatch { .. })
        ));
        backend.force_unlock(&lock.id).await.unwrap();
        assert!(matches!(
            backend.force_unlock(&lock.id).await,
            Err(BackendError::LockNotFound(_))
        ));
    }

    #[test]
    fn test_local_backend_default_path() {
        let config = BackendConfig {
            backend_type: "local".to_string(),
            attributes: HashMap::new(),
        };

        let backend = LocalBackend::from_config(&config).unwrap();
        assert_eq!(backend.state_path(), Path::new("azurerm.state.json"));
    }

    #[test]
    fn test_local_backend_rejects_bad_lock_timeout() {
        let mut config = BackendConfig::local("custom.state.json");
        config
            .attributes
            .insert("lock_timeout".to_string(), Value::Int(0));

        assert!(matches!(
            LocalBackend::from_config(&config),
            Err(BackendError::Configuration(_))
        ));
    }
}
