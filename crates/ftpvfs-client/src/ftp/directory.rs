//! Directory operations — create, rename, copy, delete.

use crate::ftp::client::FtpClient;
use crate::ftp::error::{FtpError, FtpResult};

/// Identifier of the folder containing `path` (trailing `/` kept).
pub(crate) fn parent_directory(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(pos) => format!("{}/", &trimmed[..pos]),
    }
}

/// Leaf name of `path`, without any trailing `/`.
pub(crate) fn resource_name(path: &str) -> &str {
    path.trim_end_matches('/').rsplit('/').next().unwrap_or("")
}

impl FtpClient {
    /// Raise an already-exists conflict when `resource` is present and
    /// overwrite was not requested. Runs before any mutating command so
    /// a refused operation leaves no partial protocol state.
    pub(crate) async fn ensure_overwritable(
        &mut self,
        resource: &str,
        overwrite: bool,
    ) -> FtpResult<()> {
        if !overwrite && self.resource_exists(resource).await? {
            return Err(FtpError::already_exists(format!(
                "resource '{}' already exists",
                resource
            )));
        }
        Ok(())
    }

    // ─── MKD ─────────────────────────────────────────────────────

    /// Create a directory.
    pub async fn create_directory(&mut self, directory: &str) -> FtpResult<()> {
        let path = self.absolute(directory);
        self.codec()
            .await?
            .expect_ok(&format!("MKD {}", path))
            .await?;
        Ok(())
    }

    // ─── RNFR / RNTO ─────────────────────────────────────────────

    /// Rename (or move) a file or directory.
    pub async fn rename_resource(
        &mut self,
        source: &str,
        target: &str,
        overwrite: bool,
    ) -> FtpResult<()> {
        self.ensure_overwritable(target, overwrite).await?;

        let from = self.absolute(source);
        let to = self.absolute(target);
        let codec = self.codec().await?;
        let rnfr = codec.execute(&format!("RNFR {}", from)).await?;
        if !rnfr.is_intermediate() && !rnfr.is_success() {
            return Err(FtpError::from_reply(rnfr.code, &rnfr.text()));
        }
        codec.expect_ok(&format!("RNTO {}", to)).await?;
        Ok(())
    }

    // ─── DELE ────────────────────────────────────────────────────

    /// Delete a file.
    pub async fn delete_file(&mut self, file: &str) -> FtpResult<()> {
        let path = self.absolute(file);
        self.codec()
            .await?
            .expect_ok(&format!("DELE {}", path))
            .await?;
        Ok(())
    }

    // ─── RMD ─────────────────────────────────────────────────────

    /// Delete a directory.
    ///
    /// Children are removed first, bottom-up: files directly,
    /// sub-folders by recursion when `recursive` is set (otherwise they
    /// stay, and the final removal fails on the server). The folder
    /// itself is then removed by leaf name with the working directory
    /// at its parent, since some servers reject a full-path RMD argument.
    pub async fn delete_directory(&mut self, directory: &str, recursive: bool) -> FtpResult<()> {
        let listing = self.fetch_directory_list(directory).await?;

        for entry in listing {
            let child = format!("{}{}", entry.path, entry.name);
            if !entry.is_directory {
                self.delete_file(&child).await?;
            } else if recursive {
                Box::pin(self.delete_directory(&format!("{}/", child), recursive)).await?;
            }
        }

        let parent = parent_directory(directory);
        self.change_directory(&parent).await?;
        self.codec()
            .await?
            .expect_ok(&format!("RMD {}", resource_name(directory)))
            .await?;
        Ok(())
    }

    // ─── Copy ────────────────────────────────────────────────────

    /// Copy a directory tree.
    ///
    /// FTP has no native copy; the target folder is created fresh and
    /// every child cloned: sub-folders by recursion, files by a
    /// download/upload round trip. The overwrite check applies only to
    /// the top-level target: descendants are created inside a folder
    /// that did not exist a moment ago and need no check.
    pub async fn copy_directory(
        &mut self,
        source: &str,
        target: &str,
        overwrite: bool,
    ) -> FtpResult<()> {
        self.ensure_overwritable(target, overwrite).await?;

        self.create_directory(target).await?;

        let listing = self.fetch_directory_list(source).await?;
        for entry in listing {
            let source_child = format!("{}{}", source, entry.name);
            let target_child = format!("{}{}", target, entry.name);
            if entry.is_directory {
                Box::pin(self.copy_directory(
                    &format!("{}/", source_child),
                    &format!("{}/", target_child),
                    true,
                ))
                .await?;
            } else {
                self.copy_file(&source_child, &target_child, true).await?;
            }
        }

        Ok(())
    }
}
