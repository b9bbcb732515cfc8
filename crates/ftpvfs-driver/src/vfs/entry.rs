//! The canonical resource entry exposed to the host layer.

use crate::vfs::{mime, paths};
use ftpvfs_client::ListedResource;
use serde::{Deserialize, Serialize};

/// Owner permission pair.
///
/// Deliberately reduced to the owner's read/write bits, taken from the
/// first two characters of the listing's permission string; group/other
/// and execute bits are ignored. Dialects without a permission string
/// default to read+write.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    pub read: bool,
    pub write: bool,
}

impl Permissions {
    pub fn from_mode(mode: Option<&str>) -> Self {
        match mode {
            Some(mode) => {
                let bytes = mode.as_bytes();
                Self {
                    read: bytes.first() == Some(&b'r'),
                    write: bytes.get(1) == Some(&b'w'),
                }
            }
            None => Self {
                read: true,
                write: true,
            },
        }
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self {
            read: true,
            write: true,
        }
    }
}

/// One file or folder as the storage layer sees it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceEntry {
    /// Canonical base-path-relative identifier; ends in `/` for folders.
    pub identifier: String,
    pub name: String,
    pub is_directory: bool,
    /// File size in bytes; 0 for folders.
    pub size: u64,
    pub owner: Option<String>,
    pub group: Option<String>,
    pub mode: Permissions,
    /// Derived from the file extension; `None` for folders.
    pub mime_type: Option<String>,
    /// Epoch seconds; 0 = unknown.
    pub mtime: i64,
    /// The protocol provides no creation time.
    pub ctime: i64,
    /// The protocol provides no access time.
    pub atime: i64,
    pub identifier_hash: String,
    /// Hash of the parent folder identifier.
    pub folder_hash: String,
}

impl ResourceEntry {
    /// Build the canonical entry for one listed resource.
    ///
    /// `mtime` is taken from the caller rather than `listed.mtime` so
    /// the exact-time override can be applied upstream.
    pub fn from_listed(listed: &ListedResource, mtime: i64) -> Self {
        let identifier = if listed.is_directory {
            paths::canonicalize_folder(&format!("{}{}", listed.path, listed.name))
        } else {
            paths::canonicalize_file(&format!("{}{}", listed.path, listed.name))
        };
        let parent = paths::parent_folder(&identifier);
        let mime_type = if listed.is_directory {
            None
        } else {
            Some(mime::mime_type_for(&listed.name))
        };

        Self {
            identifier_hash: paths::hash_identifier(&identifier),
            folder_hash: paths::hash_identifier(&parent),
            identifier,
            name: listed.name.clone(),
            is_directory: listed.is_directory,
            size: listed.size,
            owner: listed.owner.clone(),
            group: listed.group.clone(),
            mode: Permissions::from_mode(listed.mode.as_deref()),
            mime_type,
            mtime,
            ctime: 0,
            atime: 0,
        }
    }
}
