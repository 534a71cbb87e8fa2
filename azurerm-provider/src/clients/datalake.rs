//! Data Lake Store (Gen1) filesystem client
//!
//! Talks WebHDFS: `https://{account}.{suffix}/webhdfs/v1{path}?op=...`.

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;

use super::{ClientError, ClientResult, authorize, check_status, found};

const API_VERSION: &str = "2016-11-01";

/// Whether more data follows an append
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncFlag {
    /// More data is expected
    Data,
    /// Final chunk; the stream is closed
    Close,
}

impl SyncFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncFlag::Data => "DATA",
            SyncFlag::Close => "CLOSE",
        }
    }
}

/// Status of a file or directory
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStatus {
    pub length: Option<u64>,
    #[serde(rename = "type")]
    pub file_type: Option<String>,
    /// Milliseconds since the epoch; present for every existing object
    pub modification_time: Option<i64>,
    pub access_time: Option<i64>,
    pub permission: Option<String>,
    pub owner: Option<String>,
    pub group: Option<String>,
}

#[derive(Deserialize)]
struct FileStatusResponse {
    #[serde(rename = "FileStatus")]
    file_status: Option<FileStatus>,
}

#[derive(Deserialize)]
struct BooleanResponse {
    boolean: bool,
}

/// Filesystem operations used by the Data Lake Store file resource
#[async_trait]
pub trait StoreFilesClient: Send + Sync {
    /// DNS suffix of the filesystem endpoint (e.g., "azuredatalakestore.net")
    fn dns_suffix(&self) -> &str;

    /// Status of `path`, or `None` when it does not exist
    async fn get_file_status(&self, account: &str, path: &str) -> ClientResult<Option<FileStatus>>;

    /// Create an empty file at `path`
    async fn create(&self, account: &str, path: &str) -> ClientResult<()>;

    /// Append `data` to the file at `path`
    async fn append(&self, account: &str, path: &str, data: Vec<u8>, flag: SyncFlag)
    -> ClientResult<()>;

    /// Delete the file at `path`; returns `false` when there was nothing to delete
    async fn delete(&self, account: &str, path: &str) -> ClientResult<bool>;
}

/// WebHDFS implementation of `StoreFilesClient`
pub struct WebHdfsClient {
    http: reqwest::Client,
    dns_suffix: String,
    access_token: Option<String>,
}

impl WebHdfsClient {
    pub fn new(dns_suffix: impl Into<String>, access_token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            dns_suffix: dns_suffix.into(),
            access_token,
        }
    }

    /// URL of `path` in `account`, with each path segment percent-encoded
    pub fn file_url(&self, account: &str, path: &str) -> ClientResult<Url> {
        let mut url = Url::parse(&format!("https://{}.{}/webhdfs/v1", account, self.dns_suffix))
            .map_err(|e| ClientError::InvalidRequest(format!("account {:?}: {}", account, e)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidRequest(format!("account {:?}", account)))?
            .extend(path.split('/').filter(|s| !s.is_empty()));
        url.query_pairs_mut().append_pair("api-version", API_VERSION);
        Ok(url)
    }

    fn request(
        &self,
        method: reqwest::Method,
        url: Url,
        query: &[(&str, &str)],
    ) -> reqwest::RequestBuilder {
        authorize(
            self.http.request(method, url).query(query),
            self.access_token.as_deref(),
        )
    }
}

#[async_trait]
impl StoreFilesClient for WebHdfsClient {
    fn dns_suffix(&self) -> &str {
        &self.dns_suffix
    }

    async fn get_file_status(&self, account: &str, path: &str) -> ClientResult<Option<FileStatus>> {
        let url = self.file_url(account, path)?;
        let response = self
            .request(
                reqwest::Method::GET,
                url,
                &[("op", "GETFILESTATUS"), ("tooid", "true")],
            )
            .send()
            .await?;

        let Some(response) = found(check_status("GetFileStatus", response).await)? else {
            return Ok(None);
        };
        Ok(response.json::<FileStatusResponse>().await?.file_status)
    }

    async fn create(&self, account: &str, path: &str) -> ClientResult<()> {
        let url = self.file_url(account, path)?;
        let response = self
            .request(
                reqwest::Method::PUT,
                url,
                &[
                    ("op", "CREATE"),
                    ("write", "true"),
                    ("overwrite", "false"),
                    ("syncFlag", SyncFlag::Data.as_str()),
                ],
            )
            .body(Vec::new())
            .send()
            .await?;
        check_status("Create", response).await?;
        Ok(())
    }

    async fn append(
        &self,
        account: &str,
        path: &str,
        data: Vec<u8>,
        flag: SyncFlag,
    ) -> ClientResult<()> {
        let url = self.file_url(account, path)?;
        let response = self
            .request(
                reqwest::Method::POST,
                url,
                &[
                    ("op", "APPEND"),
                    ("append", "true"),
                    ("syncFlag", flag.as_str()),
                ],
            )
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(data)
            .send()
            .await?;
        check_status("Append", response).await?;
        Ok(())
    }

    async fn delete(&self, account: &str, path: &str) -> ClientResult<bool> {
        let url = self.file_url(account, path)?;
        let response = self
            .request(
                reqwest::Method::DELETE,
                url,
                &[("op", "DELETE"), ("recursive", "false")],
            )
            .send()
            .await?;

        let Some(response) = found(check_status("Delete", response).await)? else {
            return Ok(false);
        };
        Ok(response.json::<BooleanResponse>().await?.boolean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_url() {
        let client = WebHdfsClient::new("azuredatalakestore.net", None);
        let url = client.file_url("example", "/test/my file.txt").unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.azuredatalakestore.net/webhdfs/v1/test/my%20file.txt?api-version=2016-11-01"
        );
    }

    #[test]
    fn test_file_url_rejects_bad_account() {
        let client = WebHdfsClient::new("azuredatalakestore.net", None);
        assert!(matches!(
            client.file_url("bad host", "/x"),
            Err(ClientError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_file_status_deserialization() {
        let json = r#"{
            "FileStatus": {
                "length": 1024,
                "pathSuffix": "",
                "type": "FILE",
                "blockSize": 268435456,
                "accessTime": 1600000000000,
                "modificationTime": 1600000001000,
                "replication": 1,
                "permission": "770",
                "owner": "owner-id",
                "group": "group-id"
            }
        }"#;

        let response: FileStatusResponse = serde_json::from_str(json).unwrap();
        let status = response.file_status.unwrap();
        assert_eq!(status.length, Some(1024));
        assert_eq!(status.file_type.as_deref(), Some("FILE"));
        assert_eq!(status.modification_time, Some(1600000001000));
    }

    #[test]
    fn test_sync_flag() {
        assert_eq!(SyncFlag::Data.as_str(), "DATA");
        assert_eq!(SyncFlag::Close.as_str(), "CLOSE");
    }
}
