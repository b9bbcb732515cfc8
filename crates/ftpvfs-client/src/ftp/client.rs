//! Stateful FTP client — owns the control connection and issues commands.
//!
//! Lifecycle: lazy connect on first use (or explicit `connect()`) →
//! optional AUTH TLS upgrade → login → TYPE. All public path arguments
//! are base-path-relative; `absolute()` translates them before anything
//! is sent. One client owns one control connection and is not safe for
//! concurrent use; concurrent workers open separate clients.
//!
//! Directory and file operations live in `directory.rs` and
//! `file_ops.rs`; this file holds the session plumbing and the listing
//! pipeline (parser chain → filter chain → validation).

use crate::ftp::connection;
use crate::ftp::error::{FtpError, FtpResult};
use crate::ftp::filter::{self, ListingFilter};
use crate::ftp::parser::{self, ListingParser, Parsed};
use crate::ftp::protocol::FtpCodec;
use crate::ftp::stream::FtpStream;
use crate::ftp::transfer;
use crate::ftp::types::{ConnectionConfig, ListedResource, TransferMode};
use std::time::Duration;
use tokio::io::AsyncReadExt;
use uuid::Uuid;

/// An FTP client session.
pub struct FtpClient {
    pub id: String,
    config: ConnectionConfig,
    codec: Option<FtpCodec>,
    parsers: Vec<Box<dyn ListingParser>>,
    filters: Vec<Box<dyn ListingFilter>>,
}

impl FtpClient {
    /// Create a client with the default recognizer and filter chains.
    pub fn new(config: ConnectionConfig) -> Self {
        Self::with_chains(config, parser::default_chain(), filter::default_filters())
    }

    /// Create a client with caller-supplied chains. The chains are
    /// fixed for the session; extension happens here, at composition
    /// time, not through any global registry.
    pub fn with_chains(
        config: ConnectionConfig,
        parsers: Vec<Box<dyn ListingParser>>,
        filters: Vec<Box<dyn ListingFilter>>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            config,
            codec: None,
            parsers,
            filters,
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.codec.is_some()
    }

    /// Switch between passive (PASV) and active (PORT) data channels.
    /// Takes effect from the next transfer.
    pub fn set_passive_mode(&mut self, passive: bool) {
        self.config.passive_mode = passive;
    }

    // ─── Session lifecycle ───────────────────────────────────────

    /// Establish the control connection and log in. A no-op when
    /// already connected.
    pub async fn connect(&mut self) -> FtpResult<()> {
        if self.codec.is_some() {
            return Ok(());
        }
        if self.config.host.is_empty() {
            return Err(FtpError::configuration("host must not be empty"));
        }

        let (mut codec, banner) = connection::connect(&self.config).await?;
        log::debug!("ftp[{}] connected: {}", self.id, banner.text());

        // ── Explicit FTPS: AUTH TLS ──────────────────────────────
        if self.config.ssl {
            let resp = codec.execute("AUTH TLS").await?;
            if !resp.is_success() {
                return Err(FtpError::configuration(format!(
                    "AUTH TLS rejected: {}",
                    resp.text()
                )));
            }
            codec = codec
                .upgrade_tls(&self.config.host, self.config.accept_invalid_certs)
                .await?;
            codec.expect_ok("PBSZ 0").await?;
            codec.expect_ok("PROT P").await?;
        }

        // ── Login ────────────────────────────────────────────────
        let username = if self.config.username.is_empty() {
            "anonymous"
        } else {
            self.config.username.as_str()
        };
        let user_resp = codec.execute(&format!("USER {}", username)).await?;
        if user_resp.code == 331 {
            let pass_resp = codec
                .execute(&format!("PASS {}", self.config.password))
                .await?;
            if !pass_resp.is_success() {
                return Err(FtpError::configuration(format!(
                    "login with username '{}' failed: {}",
                    username,
                    pass_resp.text()
                )));
            }
        } else if !user_resp.is_success() {
            return Err(FtpError::configuration(format!(
                "USER rejected: {}",
                user_resp.text()
            )));
        }

        // ── TYPE ─────────────────────────────────────────────────
        let type_cmd = match self.config.transfer_mode {
            TransferMode::Ascii => "TYPE A",
            TransferMode::Binary => "TYPE I",
        };
        codec.expect_ok(type_cmd).await?;

        log::info!(
            "ftp[{}] session established with {}:{}",
            self.id,
            self.config.host,
            self.config.port
        );
        self.codec = Some(codec);
        Ok(())
    }

    /// Gracefully close the session (QUIT). A no-op when disconnected.
    pub async fn disconnect(&mut self) -> FtpResult<()> {
        if let Some(mut codec) = self.codec.take() {
            let _ = codec.execute("QUIT").await;
            log::info!("ftp[{}] session closed", self.id);
        }
        Ok(())
    }

    /// Connect on demand and hand out the codec.
    pub(crate) async fn codec(&mut self) -> FtpResult<&mut FtpCodec> {
        self.connect().await?;
        self.codec
            .as_mut()
            .ok_or_else(|| FtpError::connection("control connection not established"))
    }

    // ─── Path translation ────────────────────────────────────────

    /// Translate a base-path-relative identifier to the absolute server
    /// path.
    pub fn absolute(&self, identifier: &str) -> String {
        let base = self.config.base_path.trim_end_matches('/');
        format!("{}/{}", base, identifier.trim_start_matches('/'))
    }

    // ─── Working directory ───────────────────────────────────────

    /// Change the current directory.
    pub async fn change_directory(&mut self, directory: &str) -> FtpResult<()> {
        let path = self.absolute(directory);
        self.codec()
            .await?
            .expect_ok(&format!("CWD {}", path))
            .await?;
        Ok(())
    }

    /// Change to the parent of the current directory.
    pub async fn change_to_parent_directory(&mut self) -> FtpResult<()> {
        self.codec().await?.expect_ok("CDUP").await?;
        Ok(())
    }

    // ─── Existence probes ────────────────────────────────────────

    /// Whether the given directory exists (CWD probe).
    pub async fn directory_exists(&mut self, directory: &str) -> FtpResult<bool> {
        let path = self.absolute(directory);
        let resp = self.codec().await?.execute(&format!("CWD {}", path)).await?;
        Ok(resp.is_success())
    }

    /// Whether the given file exists (SIZE probe).
    pub async fn file_exists(&mut self, file: &str) -> FtpResult<bool> {
        let path = self.absolute(file);
        let resp = self
            .codec()
            .await?
            .execute(&format!("SIZE {}", path))
            .await?;
        Ok(resp.code == 213)
    }

    /// Whether a directory or file with this identifier exists.
    pub async fn resource_exists(&mut self, resource: &str) -> FtpResult<bool> {
        if self.directory_exists(resource).await? {
            return Ok(true);
        }
        self.file_exists(resource).await
    }

    // ─── Data channel ────────────────────────────────────────────

    /// Open a data channel with the current configuration.
    pub(crate) async fn open_data_channel(&mut self) -> FtpResult<FtpStream> {
        let passive = self.config.passive_mode;
        let secured = self.config.ssl;
        let host = self.config.host.clone();
        let accept_invalid = self.config.accept_invalid_certs;
        let data_timeout = Duration::from_secs(self.config.timeout_sec);
        let codec = self.codec().await?;
        transfer::open_data_channel(codec, passive, secured, &host, accept_invalid, data_timeout)
            .await
    }

    // ─── Listing ─────────────────────────────────────────────────

    /// Fetch the raw listing lines of the **current** directory.
    ///
    /// Issues `LIST -a` so hidden entries show up; some servers return
    /// nothing for `-a`, in which case a plain `LIST` is retried.
    pub async fn raw_list(&mut self) -> FtpResult<Vec<String>> {
        let lines = self.raw_list_with("LIST -a").await?;
        if lines.len() <= 1 {
            return self.raw_list_with("LIST").await;
        }
        Ok(lines)
    }

    async fn raw_list_with(&mut self, cmd: &str) -> FtpResult<Vec<String>> {
        let mut data = self.open_data_channel().await?;
        let resp = self.codec().await?.execute(cmd).await?;
        if !resp.is_preliminary() && !resp.is_success() {
            return Err(FtpError::from_reply(resp.code, &resp.text()));
        }

        let mut buf = Vec::new();
        data.read_to_end(&mut buf)
            .await
            .map_err(|e| FtpError::connection(format!("listing read: {}", e)))?;
        drop(data);

        let done = self.codec().await?.read_response().await?;
        if !done.is_success() {
            return Err(FtpError::from_reply(done.code, &done.text()));
        }

        let text = String::from_utf8_lossy(&buf);
        Ok(text
            .lines()
            .map(|l| l.trim_end_matches('\r').to_string())
            .collect())
    }

    /// Fetch and parse the listing of `directory`.
    ///
    /// Runs every raw line through the recognizer chain (first match
    /// wins; no match is a hard `UnsupportedFormat` error), then the
    /// filter chain, then the mandatory-attribute validation. Entries
    /// come back sorted by name, case-insensitively.
    pub async fn fetch_directory_list(
        &mut self,
        directory: &str,
    ) -> FtpResult<Vec<ListedResource>> {
        self.change_directory(directory).await?;
        let lines = self.raw_list().await?;
        let mut resources = self.parse_listing(directory, &lines)?;
        resources.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(resources)
    }

    /// The parse/filter/validate pipeline, separated from the wire so
    /// it can be exercised on canned listings.
    pub(crate) fn parse_listing(
        &self,
        directory: &str,
        lines: &[String],
    ) -> FtpResult<Vec<ListedResource>> {
        let mut resources = Vec::new();

        'line: for raw in lines {
            let mut parsed = None;
            for recognizer in &self.parsers {
                if let Some(outcome) = recognizer.parse(raw) {
                    log::trace!("listing line matched by '{}': {}", recognizer.name(), raw);
                    parsed = Some(outcome);
                    break;
                }
            }

            let entry = match parsed {
                Some(Parsed::Entry(entry)) => entry,
                Some(Parsed::Noise) => continue,
                None => return Err(FtpError::unsupported_format(raw)),
            };

            for f in &self.filters {
                if f.exclude(&entry, raw) {
                    log::trace!("listing entry excluded by '{}': {}", f.name(), raw);
                    continue 'line;
                }
            }

            let Some(is_directory) = entry.is_directory else {
                return Err(FtpError::invalid_attribute(format!(
                    "listing entry has no type: '{}'",
                    raw
                )));
            };
            let name = match entry.name {
                Some(name) if !name.is_empty() => name,
                _ => {
                    return Err(FtpError::invalid_attribute(format!(
                        "listing entry has no name: '{}'",
                        raw
                    )))
                }
            };

            resources.push(ListedResource {
                path: directory.to_string(),
                is_directory,
                name,
                size: entry.size,
                owner: entry.owner,
                group: entry.group,
                mode: entry.mode,
                mtime: entry.mtime,
            });
        }

        Ok(resources)
    }
}
