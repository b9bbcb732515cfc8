//! Identifier canonicalisation and bookkeeping.
//!
//! Identifiers are `/`-rooted strings relative to the configured base
//! path. Folder identifiers always end in `/`; file identifiers never
//! do. `identifier == parent folder + name` holds for every entry.

use ftpvfs_client::{FtpError, FtpResult};
use sha1::{Digest, Sha1};

/// Canonical folder identifier: leading and trailing `/`, no repeats.
pub fn canonicalize_folder(identifier: &str) -> String {
    let inner = identifier.trim_matches('/');
    if inner.is_empty() {
        "/".into()
    } else {
        format!("/{}/", inner)
    }
}

/// Canonical file identifier: leading `/`, no trailing `/`.
pub fn canonicalize_file(identifier: &str) -> String {
    format!("/{}", identifier.trim_matches('/'))
}

/// Identifier of the folder containing `identifier` (ends in `/`).
pub fn parent_folder(identifier: &str) -> String {
    let trimmed = identifier.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) | None => "/".into(),
        Some(pos) => format!("{}/", &trimmed[..pos]),
    }
}

/// Leaf name of an identifier, without any trailing `/`.
pub fn name_of(identifier: &str) -> &str {
    identifier
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("")
}

/// Whether `identifier` equals or lies below `folder`.
pub fn is_within(folder: &str, identifier: &str) -> bool {
    let folder = canonicalize_folder(folder);
    identifier == folder.trim_end_matches('/') || identifier.starts_with(&folder)
}

/// Stable hash of an identifier (hex SHA-1).
pub fn hash_identifier(identifier: &str) -> String {
    hex::encode(Sha1::digest(identifier.as_bytes()))
}

/// Replace unsafe characters in a file or folder name with `_` and
/// strip trailing dots. ASCII alphanumerics, `.`, `-`, `_` and
/// characters beyond U+00BF pass through.
pub fn sanitize_file_name(name: &str) -> FtpResult<String> {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') || c > '\u{00BF}' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_end_matches('.').to_string();

    if cleaned.is_empty() {
        return Err(FtpError::invalid_attribute(format!(
            "file name '{}' is invalid",
            name
        )));
    }
    Ok(cleaned)
}
