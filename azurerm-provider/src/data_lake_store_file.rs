//! Data Lake Store file resource
//!
//! Uploads a local file to a Data Lake Store (Gen1) account in fixed-size
//! chunks. The remote object is identified by `{account}.{suffix}{path}`.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use azurerm_core::provider::{ProviderError, ProviderResult, ResourceType};
use azurerm_core::resource::{Resource, ResourceId, State, Value};
use azurerm_core::schema::{AttributeSchema, AttributeType, ResourceSchema};
use tokio::io::AsyncReadExt;
use tokio::time::Instant;

use crate::clients::{StoreFilesClient, SyncFlag};
use crate::resource_id::DataLakeStoreFileId;

pub const RESOURCE_TYPE: &str = "data_lake_store_file";

/// Current schema version of the resource
pub const SCHEMA_VERSION: u32 = 1;

/// Size of each appended chunk (4 MiB)
pub const CHUNK_SIZE: usize = 4 * 1024 * 1024;

/// Deadlines for each operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub create: Duration,
    pub read: Duration,
    pub delete: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            create: Duration::from_secs(30 * 60),
            read: Duration::from_secs(5 * 60),
            delete: Duration::from_secs(30 * 60),
        }
    }
}

pub fn schema() -> ResourceSchema {
    let required = |name: &str, attr_type: AttributeType| {
        AttributeSchema::new(name, attr_type).required().force_new()
    };

    ResourceSchema::new(RESOURCE_TYPE)
        .with_description("A file uploaded to a Data Lake Store account")
        .attribute(required("account_name", AttributeType::String))
        .attribute(required("remote_file_path", remote_file_path_type()))
        .attribute(
            required("local_file_path", AttributeType::String)
                .with_description("Path of the file to upload"),
        )
}

/// Absolute path inside the store
fn remote_file_path_type() -> AttributeType {
    AttributeType::Custom {
        name: "RemoteFilePath".to_string(),
        base: Box::new(AttributeType::String),
        validate: |value| match value {
            Value::String(path) if path.starts_with('/') => Ok(()),
            Value::String(path) => Err(format!(
                "remote_file_path {:?} must start with `/`",
                path
            )),
            _ => Err("Expected string".to_string()),
        },
    }
}

pub struct DataLakeStoreFileType;

impl ResourceType for DataLakeStoreFileType {
    fn name(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn schema(&self) -> ResourceSchema {
        schema()
    }

    fn schema_version(&self) -> u32 {
        SCHEMA_VERSION
    }
}

/// Create/Read/Delete handlers for `data_lake_store_file`
pub struct DataLakeStoreFileResource {
    client: Arc<dyn StoreFilesClient>,
    timeouts: Timeouts,
    chunk_size: usize,
}

impl DataLakeStoreFileResource {
    pub fn new(client: Arc<dyn StoreFilesClient>) -> Self {
        Self {
            client,
            timeouts: Timeouts::default(),
            chunk_size: CHUNK_SIZE,
        }
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Upload the local file and return the state read back from the store
    ///
    /// Once the upload has finished the returned state always carries the
    /// identifier, even when reading the file back fails.
    pub async fn create(&self, resource: &Resource) -> ProviderResult<State> {
        let id = &resource.id;
        schema().validate(&resource.attributes).map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            ProviderError::new(format!("Invalid configuration: {}", messages.join("; ")))
                .for_resource(id.clone())
        })?;

        let account_name = required_attribute(resource, "account_name")?;
        let remote_file_path = required_attribute(resource, "remote_file_path")?;
        let local_file_path = required_attribute(resource, "local_file_path")?;

        let file_id = DataLakeStoreFileId::new(account_name, remote_file_path);
        let identifier = file_id.id(self.client.dns_suffix());
        let deadline = Instant::now() + self.timeouts.create;

        let mut file = with_deadline(deadline, self.timeouts.create, "creating", id, async {
            let existing = self
                .client
                .get_file_status(account_name, remote_file_path)
                .await
                .map_err(|e| {
                    ProviderError::new(format!(
                        "Error checking for existence of {:?} (Account {:?})",
                        remote_file_path, account_name
                    ))
                    .for_resource(id.clone())
                    .with_cause(e)
                })?;
            if existing.is_some_and(|status| status.modification_time.is_some()) {
                return Err(ProviderError::new(format!(
                    "A resource with the ID {:?} already exists - it must be imported before it can be managed",
                    identifier
                ))
                .for_resource(id.clone()));
            }

            log::info!(
                "Creating Data Lake Store File {:?} in Account {:?}",
                remote_file_path,
                account_name
            );
            let file = tokio::fs::File::open(local_file_path).await.map_err(|e| {
                ProviderError::new(format!("Error opening file {:?}", local_file_path))
                    .for_resource(id.clone())
                    .with_cause(e)
            })?;

            self.client
                .create(account_name, remote_file_path)
                .await
                .map_err(|e| {
                    ProviderError::new(format!(
                        "Error issuing create request for Data Lake Store File {:?}",
                        remote_file_path
                    ))
                    .for_resource(id.clone())
                    .with_cause(e)
                })?;
            Ok(file)
        })
        .await?;

        let uploaded = with_deadline(
            deadline,
            self.timeouts.create,
            "creating",
            id,
            self.upload(&mut file, account_name, remote_file_path, id),
        )
        .await;
        if let Err(e) = uploaded {
            self.discard_partial_upload(account_name, remote_file_path)
                .await;
            return Err(e);
        }

        let read_back = with_deadline(
            deadline,
            self.timeouts.create,
            "creating",
            id,
            self.read_file(id, &file_id, &identifier),
        )
        .await;
        match read_back {
            Ok(state) => Ok(state),
            Err(e) => {
                log::warn!("Uploaded {:?} but reading it back failed: {}", identifier, e);
                Ok(State::existing(id.clone(), file_attributes(&file_id))
                    .with_identifier(identifier))
            }
        }
    }

    /// Adopt an existing remote file
    pub async fn import(&self, id: &ResourceId, identifier: &str) -> ProviderResult<State> {
        let state = self.read(id, identifier).await?;
        if !state.exists {
            return Err(ProviderError::new(format!(
                "Cannot import non-existent remote object {:?}",
                identifier
            ))
            .for_resource(id.clone()));
        }
        Ok(state)
    }

    /// Append the file chunk by chunk; the last append closes the stream
    async fn upload(
        &self,
        file: &mut tokio::fs::File,
        account_name: &str,
        remote_file_path: &str,
        id: &ResourceId,
    ) -> ProviderResult<()> {
        let mut buffer = vec![0u8; self.chunk_size];
        loop {
            let n = fill_buffer(file, &mut buffer).await.map_err(|e| {
                ProviderError::new("Error reading contents of the local file")
                    .for_resource(id.clone())
                    .with_cause(e)
            })?;

            let flag = if n < buffer.len() {
                SyncFlag::Close
            } else {
                SyncFlag::Data
            };

            log::debug!(
                "Appending {} bytes to {:?} with flag {}",
                n,
                remote_file_path,
                flag.as_str()
            );
            self.client
                .append(account_name, remote_file_path, buffer[..n].to_vec(), flag)
                .await
                .map_err(|e| {
                    ProviderError::new(format!(
                        "Error transferring chunk for Data Lake Store File {:?}",
                        remote_file_path
                    ))
                    .for_resource(id.clone())
                    .with_cause(e)
                })?;

            if flag == SyncFlag::Close {
                return Ok(());
            }
        }
    }

    /// Best-effort removal of a partially uploaded object
    async fn discard_partial_upload(&self, account_name: &str, remote_file_path: &str) {
        match self.client.delete(account_name, remote_file_path).await {
            Ok(_) => log::debug!("Removed partial upload {:?}", remote_file_path),
            Err(e) => log::warn!(
                "Failed to remove partial upload {:?} from Account {:?}: {}",
                remote_file_path,
                account_name,
                e
            ),
        }
    }

    /// Read the current state; a missing object yields `State::not_found`
    pub async fn read(&self, id: &ResourceId, identifier: &str) -> ProviderResult<State> {
        let file_id = self.parse_identifier(id, identifier)?;
        with_timeout(
            self.timeouts.read,
            "reading",
            id,
            self.read_file(id, &file_id, identifier),
        )
        .await
    }

    async fn read_file(
        &self,
        id: &ResourceId,
        file_id: &DataLakeStoreFileId,
        identifier: &str,
    ) -> ProviderResult<State> {
        let status = self
            .client
            .get_file_status(&file_id.account_name, &file_id.file_path)
            .await
            .map_err(|e| {
                ProviderError::new(format!(
                    "Error making Read request on Azure Data Lake Store File {:?}",
                    file_id.file_path
                ))
                .for_resource(id.clone())
                .with_cause(e)
            })?;

        if status.is_none() {
            log::warn!(
                "Data Lake Store File {:?} was not found (Account {:?}); removing from state",
                file_id.file_path,
                file_id.account_name
            );
            return Ok(State::not_found(id.clone()));
        }

        Ok(State::existing(id.clone(), file_attributes(file_id)).with_identifier(identifier))
    }

    /// Delete the remote object; one that is already gone counts as deleted
    pub async fn delete(&self, id: &ResourceId, identifier: &str) -> ProviderResult<()> {
        let file_id = self.parse_identifier(id, identifier)?;

        with_timeout(self.timeouts.delete, "deleting", id, async {
            match self
                .client
                .delete(&file_id.account_name, &file_id.file_path)
                .await
            {
                Ok(true) => Ok(()),
                Ok(false) => {
                    log::debug!("Data Lake Store File {:?} was already gone", file_id.file_path);
                    Ok(())
                }
                Err(e) if e.is_not_found() => Ok(()),
                Err(e) => Err(ProviderError::new(format!(
                    "Error issuing delete request for Data Lake Store File {:?}",
                    file_id.file_path
                ))
                .for_resource(id.clone())
                .with_cause(e)),
            }
        })
        .await
    }

    fn parse_identifier(
        &self,
        id: &ResourceId,
        identifier: &str,
    ) -> ProviderResult<DataLakeStoreFileId> {
        DataLakeStoreFileId::parse(identifier, self.client.dns_suffix()).map_err(|e| {
            ProviderError::new(format!("Invalid identifier {:?}", identifier))
                .for_resource(id.clone())
                .with_cause(e)
        })
    }
}

fn required_attribute<'a>(resource: &'a Resource, key: &str) -> ProviderResult<&'a str> {
    resource.get_string(key).ok_or_else(|| {
        ProviderError::new(format!("Attribute `{}` is required", key)).for_resource(resource.id.clone())
    })
}

/// Attributes known from the identifier alone
fn file_attributes(file_id: &DataLakeStoreFileId) -> HashMap<String, Value> {
    HashMap::from([
        (
            "account_name".to_string(),
            Value::String(file_id.account_name.clone()),
        ),
        (
            "remote_file_path".to_string(),
            Value::String(file_id.file_path.clone()),
        ),
    ])
}

/// Read until `buffer` is full or the file ends
async fn fill_buffer(file: &mut tokio::fs::File, buffer: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        let n = file.read(&mut buffer[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

async fn with_timeout<T>(
    duration: Duration,
    operation: &str,
    id: &ResourceId,
    future: impl Future<Output = ProviderResult<T>>,
) -> ProviderResult<T> {
    with_deadline(Instant::now() + duration, duration, operation, id, future).await
}

/// Run `future` until `deadline`; `duration` is the full budget it was derived from
async fn with_deadline<T>(
    deadline: Instant,
    duration: Duration,
    operation: &str,
    id: &ResourceId,
    future: impl Future<Output = ProviderResult<T>>,
) -> ProviderResult<T> {
    tokio::time::timeout_at(deadline, future).await.map_err(|_| {
        ProviderError::new(format!("Timed out after {:?} while {}", duration, operation))
            .for_resource(id.clone())
    })?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{ClientError, ClientResult, FileStatus};
    use async_trait::async_trait;
    use std::io::Write;
    use std::sync::Mutex;

    const SUFFIX: &str = "azuredatalakestore.net";

    /// In-memory store recording every append
    #[derive(Default)]
    struct FakeStore {
        files: Mutex<HashMap<String, Vec<u8>>>,
        appends: Mutex<Vec<(usize, SyncFlag)>>,
        fail_append_at: Option<usize>,
        /// Status lookups from this call on fail with HTTP 500
        fail_status_from: Option<usize>,
        status_calls: Mutex<usize>,
        delay: Option<Duration>,
        append_delay: Option<Duration>,
    }

    impl FakeStore {
        fn key(account: &str, path: &str) -> String {
            format!("{}{}", account, path)
        }

        fn with_file(self, account: &str, path: &str, contents: &[u8]) -> Self {
            self.files
                .lock()
                .unwrap()
                .insert(Self::key(account, path), contents.to_vec());
            self
        }

        fn contents(&self, account: &str, path: &str) -> Option<Vec<u8>> {
            self.files.lock().unwrap().get(&Self::key(account, path)).cloned()
        }

        fn appends(&self) -> Vec<(usize, SyncFlag)> {
            self.appends.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StoreFilesClient for FakeStore {
        fn dns_suffix(&self) -> &str {
            SUFFIX
        }

        async fn get_file_status(
            &self,
            account: &str,
            path: &str,
        ) -> ClientResult<Option<FileStatus>> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let call = {
                let mut calls = self.status_calls.lock().unwrap();
                *calls += 1;
                *calls
            };
            if self.fail_status_from.is_some_and(|from| call >= from) {
                return Err(ClientError::Status {
                    operation: "GetFileStatus",
                    status: 500,
                    body: "internal error".to_string(),
                });
            }
            Ok(self.contents(account, path).map(|data| FileStatus {
                length: Some(data.len() as u64),
                file_type: Some("FILE".to_string()),
                modification_time: Some(1_600_000_000_000),
                ..Default::default()
            }))
        }

        async fn create(&self, account: &str, path: &str) -> ClientResult<()> {
            self.files
                .lock()
                .unwrap()
                .insert(Self::key(account, path), Vec::new());
            Ok(())
        }

        async fn append(
            &self,
            account: &str,
            path: &str,
            data: Vec<u8>,
            flag: SyncFlag,
        ) -> ClientResult<()> {
            if let Some(delay) = self.append_delay {
                tokio::time::sleep(delay).await;
            }
            let mut appends = self.appends.lock().unwrap();
            if self.fail_append_at == Some(appends.len()) {
                return Err(ClientError::Status {
                    operation: "Append",
                    status: 500,
                    body: "internal error".to_string(),
                });
            }
            appends.push((data.len(), flag));
            self.files
                .lock()
                .unwrap()
                .entry(Self::key(account, path))
                .or_default()
                .extend_from_slice(&data);
            Ok(())
        }

        async fn delete(&self, account: &str, path: &str) -> ClientResult<bool> {
            Ok(self
                .files
                .lock()
                .unwrap()
                .remove(&Self::key(account, path))
                .is_some())
        }
    }

    fn local_file(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        file.flush().unwrap();
        file
    }

    fn resource(local_path: &std::path::Path) -> Resource {
        Resource::new(RESOURCE_TYPE, "example")
            .with_attribute("account_name", Value::String("example".to_string()))
            .with_attribute(
                "remote_file_path",
                Value::String("/test/example.txt".to_string()),
            )
            .with_attribute(
                "local_file_path",
                Value::String(local_path.display().to_string()),
            )
    }

    #[tokio::test]
    async fn test_create_uploads_in_chunks() {
        let store = Arc::new(FakeStore::default());
        let handler = DataLakeStoreFileResource::new(store.clone()).with_chunk_size(4);
        let local = local_file(b"hello world");

        let state = handler.create(&resource(local.path())).await.unwrap();

        assert!(state.exists);
        assert_eq!(
            state.identifier.as_deref(),
            Some("example.azuredatalakestore.net/test/example.txt")
        );
        assert_eq!(
            state.attributes.get("remote_file_path"),
            Some(&Value::String("/test/example.txt".to_string()))
        );
        assert_eq!(
            store.appends(),
            vec![(4, SyncFlag::Data), (4, SyncFlag::Data), (3, SyncFlag::Close)]
        );
        assert_eq!(
            store.contents("example", "/test/example.txt"),
            Some(b"hello world".to_vec())
        );
    }

    #[tokio::test]
    async fn test_create_closes_on_chunk_boundary() {
        let store = Arc::new(FakeStore::default());
        let handler = DataLakeStoreFileResource::new(store.clone()).with_chunk_size(4);
        let local = local_file(b"abcdefgh");

        handler.create(&resource(local.path())).await.unwrap();

        assert_eq!(
            store.appends(),
            vec![(4, SyncFlag::Data), (4, SyncFlag::Data), (0, SyncFlag::Close)]
        );
    }

    #[tokio::test]
    async fn test_create_empty_file() {
        let store = Arc::new(FakeStore::default());
        let handler = DataLakeStoreFileResource::new(store.clone());
        let local = local_file(b"");

        let state = handler.create(&resource(local.path())).await.unwrap();

        assert!(state.exists);
        assert_eq!(store.appends(), vec![(0, SyncFlag::Close)]);
    }

    #[tokio::test]
    async fn test_create_existing_file_requires_import() {
        let store = Arc::new(FakeStore::default().with_file("example", "/test/example.txt", b"x"));
        let handler = DataLakeStoreFileResource::new(store.clone());
        let local = local_file(b"new contents");

        let err = handler.create(&resource(local.path())).await.unwrap_err();

        assert!(err.message.contains("already exists"));
        assert!(err.message.contains("example.azuredatalakestore.net/test/example.txt"));
        assert!(store.appends().is_empty());
        assert_eq!(
            store.contents("example", "/test/example.txt"),
            Some(b"x".to_vec())
        );
    }

    #[tokio::test]
    async fn test_failed_append_removes_partial_upload() {
        let store = Arc::new(FakeStore {
            fail_append_at: Some(1),
            ..Default::default()
        });
        let handler = DataLakeStoreFileResource::new(store.clone()).with_chunk_size(4);
        let local = local_file(b"hello world");

        let err = handler.create(&resource(local.path())).await.unwrap_err();

        assert!(err.message.contains("Error transferring chunk"));
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(store.contents("example", "/test/example.txt"), None);
    }

    #[tokio::test]
    async fn test_create_timeout_removes_partial_upload() {
        let store = Arc::new(FakeStore {
            append_delay: Some(Duration::from_millis(50)),
            ..Default::default()
        });
        let handler = DataLakeStoreFileResource::new(store.clone())
            .with_chunk_size(4)
            .with_timeouts(Timeouts {
                create: Duration::from_millis(80),
                ..Timeouts::default()
            });
        let local = local_file(b"hello world!!!");

        let err = handler.create(&resource(local.path())).await.unwrap_err();

        assert!(err.message.starts_with("Timed out after"));
        assert!(!store.appends().is_empty());
        assert_eq!(store.contents("example", "/test/example.txt"), None);
    }

    #[tokio::test]
    async fn test_create_keeps_identifier_when_read_back_fails() {
        // The existence check is the first lookup; the read back is the second
        let store = Arc::new(FakeStore {
            fail_status_from: Some(2),
            ..Default::default()
        });
        let handler = DataLakeStoreFileResource::new(store.clone()).with_chunk_size(4);
        let local = local_file(b"hello world");

        let state = handler.create(&resource(local.path())).await.unwrap();

        assert!(state.exists);
        assert_eq!(
            state.identifier.as_deref(),
            Some("example.azuredatalakestore.net/test/example.txt")
        );
        assert_eq!(
            state.attributes.get("account_name"),
            Some(&Value::String("example".to_string()))
        );
        assert_eq!(
            store.contents("example", "/test/example.txt"),
            Some(b"hello world".to_vec())
        );
    }

    #[tokio::test]
    async fn test_import_existing_file() {
        let store = FakeStore::default().with_file("example", "/test/example.txt", b"x");
        let handler = DataLakeStoreFileResource::new(Arc::new(store));
        let id = ResourceId::new(RESOURCE_TYPE, "imported");

        let state = handler
            .import(&id, "example.azuredatalakestore.net/test/example.txt")
            .await
            .unwrap();

        assert!(state.exists);
        assert_eq!(state.id, id);
        assert_eq!(
            state.attributes.get("remote_file_path"),
            Some(&Value::String("/test/example.txt".to_string()))
        );
    }

    #[tokio::test]
    async fn test_import_missing_file() {
        let handler = DataLakeStoreFileResource::new(Arc::new(FakeStore::default()));
        let id = ResourceId::new(RESOURCE_TYPE, "imported");

        let err = handler
            .import(&id, "example.azuredatalakestore.net/test/example.txt")
            .await
            .unwrap_err();
        assert!(err.message.starts_with("Cannot import non-existent remote object"));
        assert_eq!(err.resource_id, Some(id));
    }

    #[tokio::test]
    async fn test_create_missing_local_file() {
        let store = Arc::new(FakeStore::default());
        let handler = DataLakeStoreFileResource::new(store.clone());
        let dir = tempfile::tempdir().unwrap();

        let err = handler
            .create(&resource(&dir.path().join("missing.txt")))
            .await
            .unwrap_err();

        assert!(err.message.starts_with("Error opening file"));
        assert_eq!(store.contents("example", "/test/example.txt"), None);
    }

    #[tokio::test]
    async fn test_create_rejects_relative_remote_path() {
        let store = Arc::new(FakeStore::default());
        let handler = DataLakeStoreFileResource::new(store);
        let local = local_file(b"data");
        let resource = resource(local.path()).with_attribute(
            "remote_file_path",
            Value::String("test/example.txt".to_string()),
        );

        let err = handler.create(&resource).await.unwrap_err();
        assert!(err.message.contains("must start with `/`"));
    }

    #[tokio::test]
    async fn test_read_missing_file_is_not_found() {
        let handler = DataLakeStoreFileResource::new(Arc::new(FakeStore::default()));
        let id = ResourceId::new(RESOURCE_TYPE, "example");

        let state = handler
            .read(&id, "example.azuredatalakestore.net/test/example.txt")
            .await
            .unwrap();
        assert_eq!(state, State::not_found(id));
    }

    #[tokio::test]
    async fn test_read_existing_file() {
        let store = FakeStore::default().with_file("example", "/test/example.txt", b"x");
        let handler = DataLakeStoreFileResource::new(Arc::new(store));
        let id = ResourceId::new(RESOURCE_TYPE, "example");

        let state = handler
            .read(&id, "example.azuredatalakestore.net/test/example.txt")
            .await
            .unwrap();
        assert!(state.exists);
        assert_eq!(
            state.attributes.get("account_name"),
            Some(&Value::String("example".to_string()))
        );
    }

    #[tokio::test]
    async fn test_read_invalid_identifier() {
        let handler = DataLakeStoreFileResource::new(Arc::new(FakeStore::default()));
        let id = ResourceId::new(RESOURCE_TYPE, "example");

        let err = handler
            .read(&id, "example.blob.core.windows.net/test.txt")
            .await
            .unwrap_err();
        assert!(err.message.starts_with("Invalid identifier"));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = Arc::new(FakeStore::default().with_file("example", "/test/example.txt", b"x"));
        let handler = DataLakeStoreFileResource::new(store.clone());
        let id = ResourceId::new(RESOURCE_TYPE, "example");
        let identifier = "example.azuredatalakestore.net/test/example.txt";

        handler.delete(&id, identifier).await.unwrap();
        assert_eq!(store.contents("example", "/test/example.txt"), None);

        // Already gone
        handler.delete(&id, identifier).await.unwrap();
    }

    #[tokio::test]
    async fn test_read_timeout() {
        let store = FakeStore {
            delay: Some(Duration::from_secs(5)),
            ..Default::default()
        };
        let handler = DataLakeStoreFileResource::new(Arc::new(store)).with_timeouts(Timeouts {
            read: Duration::from_millis(10),
            ..Timeouts::default()
        });
        let id = ResourceId::new(RESOURCE_TYPE, "example");

        let err = handler
            .read(&id, "example.azuredatalakestore.net/test/example.txt")
            .await
            .unwrap_err();
        assert!(err.message.starts_with("Timed out after"));
    }

    #[test]
    fn test_default_timeouts() {
        let timeouts = Timeouts::default();
        assert_eq!(timeouts.create, Duration::from_secs(1800));
        assert_eq!(timeouts.read, Duration::from_secs(300));
        assert_eq!(timeouts.delete, Duration::from_secs(1800));
    }
}
