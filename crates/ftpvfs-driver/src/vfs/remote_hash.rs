//! Remote hash offload protocol.
//!
//! Hashing a remote file normally means downloading it in full. When a
//! companion endpoint is deployed next to the served tree, the driver
//! instead sends an authenticated GET and the server digests the file
//! in place. The shared secret is the MD5 of the configured key and is
//! both embedded in the deployed script and sent with every request.
//!
//! Wire format: query parameters
//! `action=hashFile&parameters[fileIdentifier]=…&parameters[hashAlgorithm]=…&encryptionKey=…`;
//! the response body is JSON `{"result":true,"hash":"…"}` or
//! `{"result":false,"message":"…"}`.

use crate::vfs::config::RemoteServiceConfig;
use ftpvfs_client::{FtpError, FtpResult};
use md5::{Digest, Md5};
use serde::Deserialize;
use url::Url;

/// The endpoint script, with a placeholder for the shared secret.
const SERVICE_TEMPLATE: &str = include_str!("../../assets/remote-hash-service.php");

/// Parsed endpoint response.
///
/// `result: false` is a well-formed refusal (missing file, wrong key)
/// and does **not** trigger the self-healing redeploy; only transport
/// failures and malformed bodies do.
#[derive(Debug, Deserialize)]
pub struct ServiceReply {
    pub result: bool,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

pub struct RemoteHashService {
    config: RemoteServiceConfig,
    public_url: String,
    shared_secret: String,
    http: reqwest::Client,
}

impl RemoteHashService {
    pub fn new(config: RemoteServiceConfig, public_url: &str) -> Self {
        let shared_secret = hex::encode(Md5::digest(config.encryption_key.as_bytes()));
        Self {
            config,
            public_url: public_url.trim_end_matches('/').to_string(),
            shared_secret,
            http: reqwest::Client::new(),
        }
    }

    /// Identifier the endpoint lives at on the server.
    pub fn file_name(&self) -> &str {
        &self.config.file_name
    }

    /// The deployable endpoint script with the current shared secret
    /// embedded.
    pub fn deployable_script(&self) -> String {
        SERVICE_TEMPLATE.replace("###ENCRYPTION_KEY###", &self.shared_secret)
    }

    fn endpoint_url(&self, file_identifier: &str, algorithm: &str) -> FtpResult<Url> {
        let base = format!("{}{}", self.public_url, self.config.file_name);
        Url::parse_with_params(
            &base,
            &[
                ("action", "hashFile"),
                ("parameters[fileIdentifier]", file_identifier),
                ("parameters[hashAlgorithm]", algorithm),
                ("encryptionKey", &self.shared_secret),
            ],
        )
        .map_err(|e| FtpError::configuration(format!("remote hash endpoint URL: {}", e)))
    }

    /// One request to the endpoint. Transport failures and malformed
    /// bodies come back as errors; a parsed refusal comes back as
    /// `Ok(reply)` with `result == false`.
    pub async fn request_hash(
        &self,
        file_identifier: &str,
        algorithm: &str,
    ) -> FtpResult<ServiceReply> {
        let url = self.endpoint_url(file_identifier, algorithm)?;

        let mut request = self.http.get(url);
        for header in &self.config.additional_headers {
            if let Some((name, value)) = header.split_once(':') {
                request = request.header(name.trim(), value.trim());
            }
        }

        let response = request
            .send()
            .await
            .map_err(|e| FtpError::connection(format!("remote hash endpoint unreachable: {}", e)))?;
        response
            .json::<ServiceReply>()
            .await
            .map_err(|e| FtpError::connection(format!("remote hash response malformed: {}", e)))
    }
}
