//! Driver configuration.

use ftpvfs_client::ConnectionConfig;
use serde::{Deserialize, Serialize};

/// Configuration for the remote hash offload service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteServiceConfig {
    /// Offload hashing to a companion endpoint on the server instead of
    /// downloading files merely to digest them.
    #[serde(default)]
    pub enable: bool,
    /// Key the shared secret is derived from.
    #[serde(default)]
    pub encryption_key: String,
    /// Identifier the companion endpoint is deployed at.
    #[serde(default = "default_service_file_name")]
    pub file_name: String,
    /// Extra request headers, `Name: value` per element.
    #[serde(default)]
    pub additional_headers: Vec<String>,
    /// On a malformed or unreachable response, redeploy the endpoint
    /// once and retry. Disable when the endpoint is deployed and
    /// managed independently.
    #[serde(default = "default_true")]
    pub redeploy_on_failure: bool,
}

fn default_service_file_name() -> String {
    "/.remote-hash-service.php".into()
}
fn default_true() -> bool {
    true
}

impl Default for RemoteServiceConfig {
    fn default() -> Self {
        Self {
            enable: false,
            encryption_key: String::new(),
            file_name: default_service_file_name(),
            additional_headers: Vec::new(),
            redeploy_on_failure: true,
        }
    }
}

/// Full driver configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverConfig {
    /// FTP connection settings, including the base path every
    /// identifier is relative to.
    pub connection: ConnectionConfig,
    /// Public HTTP root the FTP tree is reachable under; used for
    /// `public_url()` and to reach the remote hash endpoint.
    #[serde(default)]
    pub public_url: String,
    /// Override listing timestamps with an exact MDTM query per entry.
    /// More accurate, but one protocol round trip per listed file; a
    /// failing query silently keeps the listing-supplied time.
    #[serde(default)]
    pub exact_modification_time: bool,
    /// Digest algorithms `hash()` accepts.
    #[serde(default = "default_hash_algorithms")]
    pub supported_hash_algorithms: Vec<String>,
    #[serde(default)]
    pub remote_service: RemoteServiceConfig,
}

fn default_hash_algorithms() -> Vec<String> {
    vec!["sha1".into(), "md5".into()]
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig::default(),
            public_url: String::new(),
            exact_modification_time: false,
            supported_hash_algorithms: default_hash_algorithms(),
            remote_service: RemoteServiceConfig::default(),
        }
    }
}
