//! Shared types for the FTP client crate.

use serde::{Deserialize, Serialize};

// ─── Connection ──────────────────────────────────────────────────────

/// Transfer type for the data channel (RFC 959 TYPE command).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TransferMode {
    Ascii,
    Binary,
}

impl Default for TransferMode {
    fn default() -> Self {
        Self::Binary
    }
}

/// Configuration for a single FTP connection.
///
/// `base_path` is prepended to every identifier before it is sent to the
/// server; all public client methods take base-path-relative paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Explicit FTPS — upgrade the control channel via AUTH TLS.
    #[serde(default)]
    pub ssl: bool,
    /// Timeout in seconds applied to connects and every reply read.
    #[serde(default = "default_timeout")]
    pub timeout_sec: u64,
    /// Passive (PASV) versus active (PORT) data channels.
    #[serde(default = "default_true")]
    pub passive_mode: bool,
    #[serde(default)]
    pub transfer_mode: TransferMode,
    /// Root prefix on the server; identifiers are relative to this.
    #[serde(default = "default_base_path")]
    pub base_path: String,
    /// Accept self-signed / untrusted certificates.
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

fn default_port() -> u16 {
    21
}
fn default_timeout() -> u64 {
    90
}
fn default_true() -> bool {
    true
}
fn default_base_path() -> String {
    "/".into()
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_port(),
            username: "anonymous".into(),
            password: "anonymous@".into(),
            ssl: false,
            timeout_sec: default_timeout(),
            passive_mode: true,
            transfer_mode: TransferMode::Binary,
            base_path: default_base_path(),
            accept_invalid_certs: false,
        }
    }
}

// ─── Directory listing ───────────────────────────────────────────────

/// One validated entry from a directory listing.
///
/// Produced by `FtpClient::fetch_directory_list` after the parser and
/// filter chains have run; `name` is never empty here and the type flag
/// is always known.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListedResource {
    /// Identifier of the folder this entry was listed in (ends in `/`).
    pub path: String,
    pub is_directory: bool,
    pub name: String,
    pub size: u64,
    pub owner: Option<String>,
    pub group: Option<String>,
    /// Raw nine-character permission string (`rwxr-xr-x`), when the
    /// dialect supplies one.
    pub mode: Option<String>,
    /// Modification time as epoch seconds; 0 when the listing did not
    /// carry a resolvable timestamp.
    pub mtime: i64,
}

// ─── FTP response ────────────────────────────────────────────────────

/// A single FTP reply (possibly multi-line).
#[derive(Debug, Clone)]
pub struct FtpResponse {
    pub code: u16,
    pub lines: Vec<String>,
}

impl FtpResponse {
    /// Full reply text (all lines joined).
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Whether the reply code indicates success (1xx–3xx).
    pub fn is_success(&self) -> bool {
        self.code < 400
    }

    /// Positive-preliminary reply (1xx) — a transfer is starting.
    pub fn is_preliminary(&self) -> bool {
        (100..200).contains(&self.code)
    }

    /// Positive-completion reply (2xx).
    pub fn is_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }

    /// Positive-intermediate reply (3xx) — more input expected.
    pub fn is_intermediate(&self) -> bool {
        (300..400).contains(&self.code)
    }
}
