//! Azure resource identifiers
//!
//! Resource Manager IDs look like
//! `/subscriptions/{sub}/resourceGroups/{rg}/providers/{namespace}/{type}/{name}`.
//! Storage and Data Lake objects are identified by their URL or host/path instead.

use thiserror::Error;

use crate::environment::Environment;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResourceIdError {
    #[error("Cannot parse an empty Azure resource ID")]
    Empty,

    #[error("The number of path segments is not divisible by 2 in {0:?}")]
    OddSegments(String),

    #[error("Key/Value cannot be empty strings. Key: {key:?}, Value: {value:?}")]
    EmptySegment { key: String, value: String },

    #[error("No subscription ID found in: {0:?}")]
    MissingSubscription(String),

    #[error("ID was missing the `{0}` element")]
    MissingSegment(String),

    #[error("ID contained more segments than required: {id:?}, {remaining:?}")]
    ExtraSegments { id: String, remaining: Vec<String> },

    #[error("Parsing {id:?}: {message}")]
    Invalid { id: String, message: String },
}

pub type ResourceIdResult<T> = Result<T, ResourceIdError>;

/// A parsed Resource Manager ID
#[derive(Debug, Clone, PartialEq)]
pub struct AzureResourceId {
    pub subscription_id: String,
    /// Empty when the ID is not scoped to a resource group
    pub resource_group: String,
    /// Resource provider namespace (e.g., "Microsoft.Cdn")
    pub provider: Option<String>,
    /// Remaining key/value segments, in order
    pub path: Vec<(String, String)>,
    raw: String,
}

impl AzureResourceId {
    /// Parse a Resource Manager ID
    ///
    /// Both `resourceGroups` and the lower-case `resourcegroups` spelling found
    /// in older IDs are accepted.
    pub fn parse(id: &str) -> ResourceIdResult<Self> {
        let trimmed = id.trim_start_matches('/').trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ResourceIdError::Empty);
        }

        let components: Vec<&str> = trimmed.split('/').collect();
        if components.len() % 2 != 0 {
            return Err(ResourceIdError::OddSegments(id.to_string()));
        }

        let mut subscription_id = None;
        let mut resource_group = None;
        let mut provider = None;
        let mut path = Vec::new();

        for pair in components.chunks(2) {
            let (key, value) = (pair[0], pair[1]);
            if key.is_empty() || value.is_empty() {
                return Err(ResourceIdError::EmptySegment {
                    key: key.to_string(),
                    value: value.to_string(),
                });
            }

            match key {
                "subscriptions" if subscription_id.is_none() => {
                    subscription_id = Some(value.to_string())
                }
                "resourceGroups" | "resourcegroups" if resource_group.is_none() => {
                    resource_group = Some(value.to_string())
                }
                "providers" if provider.is_none() => provider = Some(value.to_string()),
                _ => path.push((key.to_string(), value.to_string())),
            }
        }

        let subscription_id =
            subscription_id.ok_or_else(|| ResourceIdError::MissingSubscription(id.to_string()))?;

        Ok(Self {
            subscription_id,
            resource_group: resource_group.unwrap_or_default(),
            provider,
            path,
            raw: id.to_string(),
        })
    }

    /// Remove the segment with key `key` and return its value
    pub fn pop_segment(&mut self, key: &str) -> ResourceIdResult<String> {
        let pos = self
            .path
            .iter()
            .position(|(k, _)| k == key)
            .ok_or_else(|| ResourceIdError::MissingSegment(key.to_string()))?;
        Ok(self.path.remove(pos).1)
    }

    /// Fail when segments remain after all expected ones were popped
    pub fn validate_no_empty_segments(&self) -> ResourceIdResult<()> {
        if self.path.is_empty() {
            return Ok(());
        }
        Err(ResourceIdError::ExtraSegments {
            id: self.raw.clone(),
            remaining: self
                .path
                .iter()
                .map(|(k, v)| format!("{}/{}", k, v))
                .collect(),
        })
    }

    fn require_resource_group(&self) -> ResourceIdResult<&str> {
        if self.resource_group.is_empty() {
            return Err(ResourceIdError::MissingSegment("resourceGroups".to_string()));
        }
        Ok(&self.resource_group)
    }
}

/// ID of a CDN profile
#[derive(Debug, Clone, PartialEq)]
pub struct CdnProfileId {
    pub subscription_id: String,
    pub resource_group: String,
    pub name: String,
}

impl CdnProfileId {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            name: name.into(),
        }
    }

    pub fn parse(input: &str) -> ResourceIdResult<Self> {
        let mut id = AzureResourceId::parse(input)?;
        let name = id.pop_segment("profiles")?;
        id.validate_no_empty_segments()?;
        Ok(Self::new(
            id.subscription_id.clone(),
            id.require_resource_group()?,
            name,
        ))
    }

    pub fn id(&self) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Cdn/profiles/{}",
            self.subscription_id, self.resource_group, self.name
        )
    }
}

/// ID of a DNS zone
#[derive(Debug, Clone, PartialEq)]
pub struct DnsZoneId {
    pub subscription_id: String,
    pub resource_group: String,
    pub name: String,
}

impl DnsZoneId {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            name: name.into(),
        }
    }

    pub fn parse(input: &str) -> ResourceIdResult<Self> {
        let mut id = AzureResourceId::parse(input)?;
        let name = id.pop_segment("dnszones")?;
        id.validate_no_empty_segments()?;
        Ok(Self::new(
            id.subscription_id.clone(),
            id.require_resource_group()?,
            name,
        ))
    }

    pub fn id(&self) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Network/dnszones/{}",
            self.subscription_id, self.resource_group, self.name
        )
    }
}

/// URL of a blob: `https://{account}.blob.{suffix}/{container}/{name}`
pub fn storage_blob_id(
    environment: &Environment,
    account_name: &str,
    container_name: &str,
    blob_name: &str,
) -> String {
    format!(
        "https://{}.blob.{}/{}/{}",
        account_name, environment.storage_endpoint_suffix, container_name, blob_name
    )
}

/// URL of a file share: `https://{account}.file.{suffix}/{share}`
pub fn storage_share_id(environment: &Environment, account_name: &str, share_name: &str) -> String {
    format!(
        "https://{}.file.{}/{}",
        account_name, environment.storage_endpoint_suffix, share_name
    )
}

/// ID of a file in a Data Lake Store: `{account}.{suffix}{path}`
///
/// e.g. `example.azuredatalakestore.net/test/example.txt`
#[derive(Debug, Clone, PartialEq)]
pub struct DataLakeStoreFileId {
    pub account_name: String,
    /// Absolute path inside the store, starting with `/`
    pub file_path: String,
}

impl DataLakeStoreFileId {
    pub fn new(account_name: impl Into<String>, file_path: impl Into<String>) -> Self {
        Self {
            account_name: account_name.into(),
            file_path: file_path.into(),
        }
    }

    pub fn parse(input: &str, suffix: &str) -> ResourceIdResult<Self> {
        let invalid = |message: String| ResourceIdError::Invalid {
            id: input.to_string(),
            message,
        };

        let rest = input
            .strip_prefix("https://")
            .unwrap_or(input);
        let (host, path) = match rest.find('/') {
            Some(pos) => rest.split_at(pos),
            None => (rest, ""),
        };

        let account_name = host
            .strip_suffix(suffix)
            .and_then(|h| h.strip_suffix('.'))
            .ok_or_else(|| invalid(format!("expected a host ending in .{}", suffix)))?;
        if account_name.is_empty() {
            return Err(invalid("missing account name".to_string()));
        }

        Ok(Self::new(account_name, path))
    }

    pub fn id(&self, suffix: &str) -> String {
        format!("{}.{}{}", self.account_name, suffix, self.file_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resource_id() {
        let id = AzureResourceId::parse(
            "/subscriptions/sub-1/resourceGroups/group1/providers/Microsoft.Cdn/profiles/profile1",
        )
        .unwrap();

        assert_eq!(id.subscription_id, "sub-1");
        assert_eq!(id.resource_group, "group1");
        assert_eq!(id.provider.as_deref(), Some("Microsoft.Cdn"));
        assert_eq!(
            id.path,
            vec![("profiles".to_string(), "profile1".to_string())]
        );
    }

    #[test]
    fn test_parse_lowercase_resource_groups() {
        let id = AzureResourceId::parse("/subscriptions/sub-1/resourcegroups/Group1").unwrap();
        assert_eq!(id.resource_group, "Group1");
        assert!(id.path.is_empty());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(AzureResourceId::parse(""), Err(ResourceIdError::Empty));
        assert!(matches!(
            AzureResourceId::parse("/subscriptions/sub-1/resourceGroups"),
            Err(ResourceIdError::OddSegments(_))
        ));
        assert!(matches!(
            AzureResourceId::parse("/resourceGroups/group1"),
            Err(ResourceIdError::MissingSubscription(_))
        ));
        assert!(matches!(
            AzureResourceId::parse("/subscriptions//resourceGroups/group1"),
            Err(ResourceIdError::EmptySegment { .. })
        ));
    }

    #[test]
    fn test_pop_segment() {
        let mut id = AzureResourceId::parse(
            "/subscriptions/sub-1/resourceGroups/group1/providers/Microsoft.Network/dnszones/example.com",
        )
        .unwrap();

        assert_eq!(
            id.pop_segment("profiles"),
            Err(ResourceIdError::MissingSegment("profiles".to_string()))
        );
        assert_eq!(id.pop_segment("dnszones").unwrap(), "example.com");
        assert!(id.validate_no_empty_segments().is_ok());
    }

    #[test]
    fn test_cdn_profile_id_round_trip() {
        let input =
            "/subscriptions/sub-1/resourceGroups/group1/providers/Microsoft.Cdn/profiles/profile1";
        let id = CdnProfileId::parse(input).unwrap();
        assert_eq!(id, CdnProfileId::new("sub-1", "group1", "profile1"));
        assert_eq!(id.id(), input);
    }

    #[test]
    fn test_dns_zone_id_rejects_extra_segments() {
        let result = DnsZoneId::parse(
            "/subscriptions/sub-1/resourceGroups/group1/providers/Microsoft.Network/dnszones/example.com/A/www",
        );
        assert!(matches!(result, Err(ResourceIdError::ExtraSegments { .. })));
    }

    #[test]
    fn test_dns_zone_id_requires_resource_group() {
        let result =
            DnsZoneId::parse("/subscriptions/sub-1/providers/Microsoft.Network/dnszones/example.com");
        assert_eq!(
            result,
            Err(ResourceIdError::MissingSegment("resourceGroups".to_string()))
        );
    }

    #[test]
    fn test_storage_ids() {
        let env = Environment::CHINA;
        assert_eq!(
            storage_blob_id(&env, "acct", "container", "blob.txt"),
            "https://acct.blob.core.chinacloudapi.cn/container/blob.txt"
        );
        assert_eq!(
            storage_share_id(&env, "acct", "share"),
            "https://acct.file.core.chinacloudapi.cn/share"
        );
    }

    #[test]
    fn test_data_lake_store_file_id() {
        let id = DataLakeStoreFileId::parse(
            "tomdevdls1.azuredatalakestore.net/test/example.txt",
            "azuredatalakestore.net",
        )
        .unwrap();
        assert_eq!(id.account_name, "tomdevdls1");
        assert_eq!(id.file_path, "/test/example.txt");
        assert_eq!(
            id.id("azuredatalakestore.net"),
            "tomdevdls1.azuredatalakestore.net/test/example.txt"
        );
    }

    #[test]
    fn test_data_lake_store_file_id_wrong_suffix() {
        let result = DataLakeStoreFileId::parse(
            "tomdevdls1.example.net/test/example.txt",
            "azuredatalakestore.net",
        );
        assert!(matches!(result, Err(ResourceIdError::Invalid { .. })));
    }
}
