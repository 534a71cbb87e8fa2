//! Azure cloud environments and their endpoint suffixes

use std::fmt;

/// An Azure cloud (public, sovereign or government)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Environment {
    /// Name as used by the SDKs (e.g., "AzurePublicCloud")
    pub name: &'static str,
    /// Azure Resource Manager endpoint, with trailing slash
    pub resource_manager_endpoint: &'static str,
    /// Suffix of storage service hosts (`{account}.blob.{suffix}`)
    pub storage_endpoint_suffix: &'static str,
    /// Suffix of Data Lake Store filesystem hosts, where the service exists
    pub data_lake_store_suffix: Option<&'static str>,
}

impl Environment {
    pub const PUBLIC: Environment = Environment {
        name: "AzurePublicCloud",
        resource_manager_endpoint: "https://management.azure.com/",
        storage_endpoint_suffix: "core.windows.net",
        data_lake_store_suffix: Some("azuredatalakestore.net"),
    };

    pub const CHINA: Environment = Environment {
        name: "AzureChinaCloud",
        resource_manager_endpoint: "https://management.chinacloudapi.cn/",
        storage_endpoint_suffix: "core.chinacloudapi.cn",
        data_lake_store_suffix: None,
    };

    pub const GERMAN: Environment = Environment {
        name: "AzureGermanCloud",
        resource_manager_endpoint: "https://management.microsoftazure.de/",
        storage_endpoint_suffix: "core.cloudapi.de",
        data_lake_store_suffix: None,
    };

    pub const US_GOVERNMENT: Environment = Environment {
        name: "AzureUSGovernmentCloud",
        resource_manager_endpoint: "https://management.usgovcloudapi.net/",
        storage_endpoint_suffix: "core.usgovcloudapi.net",
        data_lake_store_suffix: None,
    };

    /// Every supported cloud
    pub const ALL: [Environment; 4] = [
        Environment::CHINA,
        Environment::GERMAN,
        Environment::PUBLIC,
        Environment::US_GOVERNMENT,
    ];

    /// Look up a cloud by its configuration name
    ///
    /// Accepts `public`, `china`, `german` and `usgovernment` (case-insensitive)
    /// as well as the full SDK names.
    pub fn from_name(name: &str) -> Option<Environment> {
        let name = name.trim().to_ascii_lowercase();
        match name.as_str() {
            "public" | "azurepubliccloud" => Some(Environment::PUBLIC),
            "china" | "azurechinacloud" => Some(Environment::CHINA),
            "german" | "azuregermancloud" => Some(Environment::GERMAN),
            "usgovernment" | "azureusgovernmentcloud" => Some(Environment::US_GOVERNMENT),
            _ => None,
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::PUBLIC
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
