//! # ftpvfs-driver — virtual-filesystem driver over an FTP session
//!
//! Exposes a remote FTP tree to a generic storage-abstraction layer:
//! - `config` — driver configuration (wraps the connection config)
//! - `entry` — the canonical resource entry and permission pair
//! - `paths` — identifier canonicalisation, hashing, name sanitation
//! - `mime` — mime-type derivation for file entries
//! - `cache` — per-folder listing snapshots, replaced wholesale
//! - `identifier_map` — recursive old→new mapping for structural changes
//! - `remote_hash` — server-side hash offload with one-shot self-healing
//! - `driver` — the operations consumed by the host layer
//!
//! Identifiers are `/`-rooted, base-path-relative strings; folder
//! identifiers end in `/`, file identifiers never do. The driver is
//! generic over the [`ftpvfs_client::Ftp`] trait and owns exactly one
//! session; it is not safe for concurrent use.

pub mod cache;
pub mod config;
pub mod driver;
pub mod entry;
pub mod identifier_map;
pub mod mime;
pub mod paths;
pub mod remote_hash;
