//! HTTP clients for the Azure APIs the provider talks to
//!
//! - `datalake` - Data Lake Store filesystem (WebHDFS) operations
//! - `resources` - Resource Manager resource group lookups
//!
//! Each client sits behind a narrow trait so resource handlers and state
//! upgraders can be driven by in-memory fakes.

pub mod datalake;
pub mod resources;

pub use datalake::{FileStatus, StoreFilesClient, SyncFlag, WebHdfsClient};
pub use resources::{
    MissingSubscription, ResourceGroup, ResourceGroupResolver, ResourceGroupsClient,
};

use thiserror::Error;

/// Errors returned by the HTTP clients
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("{operation} returned HTTP {status}: {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// A request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    /// Whether the service reported that the target does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Status { status: 404, .. })
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Turn a non-success response into `ClientError::Status`
pub(crate) async fn check_status(
    operation: &'static str,
    response: reqwest::Response,
) -> ClientResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status {
        operation,
        status: status.as_u16(),
        body,
    })
}

/// `None` when the service answered 404; other errors pass through
pub(crate) fn found<T>(result: ClientResult<T>) -> ClientResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Attach a bearer token when one is configured
pub(crate) fn authorize(
    request: reqwest::RequestBuilder,
    access_token: Option<&str>,
) -> reqwest::RequestBuilder {
    match access_token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found() {
        let err = ClientError::Status {
            operation: "GetFileStatus",
            status: 404,
            body: String::new(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "GetFileStatus returned HTTP 404: ");

        let err = ClientError::InvalidRequest("bad path".to_string());
        assert!(!err.is_not_found());
    }

    fn status(status: u16) -> ClientError {
        ClientError::Status {
            operation: "Delete",
            status,
            body: "{}".to_string(),
        }
    }

    #[test]
    fn test_found_maps_404_to_none() {
        assert!(matches!(found::<bool>(Err(status(404))), Ok(None)));
        assert!(matches!(found(Ok(true)), Ok(Some(true))));
    }

    #[test]
    fn test_found_keeps_other_errors() {
        assert!(matches!(
            found::<bool>(Err(status(500))),
            Err(ClientError::Status { status: 500, .. })
        ));
        assert!(matches!(
            found::<bool>(Err(status(403))),
            Err(ClientError::Status { status: 403, .. })
        ));
    }
}
