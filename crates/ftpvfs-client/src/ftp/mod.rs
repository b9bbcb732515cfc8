//! # ftpvfs-client — FTP/FTPS protocol client
//!
//! Implements the control-channel side of RFC 959 with the pieces a
//! virtual-filesystem driver needs:
//! - `types` — configuration and listing data structures
//! - `error` — categorised error type shared with the driver crate
//! - `stream` — plain/TLS socket behind one type, with AUTH TLS upgrade
//! - `protocol` — control-channel command/reply codec
//! - `connection` — establishing the control connection
//! - `transfer` — per-transfer data channels (passive/active)
//! - `client` — stateful client: session lifecycle, path translation,
//!   existence probes, the listing pipeline
//! - `directory` — create/rename/copy/delete of folders
//! - `file_ops` — upload, download, contents staging, round-trip copy
//! - `parser` — multi-dialect LIST line recognizer chain
//! - `filter` — post-parse entry exclusion chain
//! - `interface` — the `Ftp` trait consumed by the driver crate
//!
//! One `FtpClient` owns exactly one control connection and is not safe
//! for concurrent use; callers needing parallelism open separate
//! sessions.

pub mod types;
pub mod error;
pub mod stream;
pub mod protocol;
pub mod connection;
pub mod transfer;
pub mod client;
pub mod directory;
pub mod file_ops;
pub mod parser;
pub mod filter;
pub mod interface;
