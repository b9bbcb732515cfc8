//! Old→new identifier mapping for structural changes.
//!
//! When a folder is renamed or moved, every identifier below it changes
//! at once; the host layer needs the complete mapping to update its
//! records. The map must be built **before** the rename is issued,
//! because the old identifiers stop resolving the instant it succeeds.

use crate::vfs::paths;
use ftpvfs_client::{Ftp, FtpResult};

/// Ordered old→new identifier pairs: descendants first, the renamed
/// node itself last.
pub type IdentifierMap = Vec<(String, String)>;

/// Build the identifier map for renaming/moving `old` to `new`.
///
/// A file maps to the single pair. A folder is listed **fresh**, never
/// from a cache (correctness over round trips here), and each child
/// recursed before the folder's own pair is appended; each level
/// contributes by concatenation.
pub async fn build_identifier_map<F: Ftp>(
    client: &mut F,
    old: &str,
    new: &str,
) -> FtpResult<IdentifierMap> {
    if !client.directory_exists(old).await? {
        return Ok(vec![(old.to_string(), new.to_string())]);
    }

    let old_folder = paths::canonicalize_folder(old);
    let new_folder = paths::canonicalize_folder(new);

    let listing = client.fetch_directory_list(&old_folder).await?;

    let mut map = IdentifierMap::new();
    for child in listing {
        let child_old = format!("{}{}", old_folder, child.name);
        let child_new = format!("{}{}", new_folder, child.name);
        let child_map = Box::pin(build_identifier_map(client, &child_old, &child_new)).await?;
        map.extend(child_map);
    }
    map.push((old_folder, new_folder));

    Ok(map)
}
