//! The protocol-client surface consumed by the driver crate.
//!
//! The driver is generic over this trait so its cache, identifier-map
//! and hashing logic can be exercised against a scripted in-memory
//! client. All paths are base-path-relative identifiers; folder
//! identifiers end in `/`.

use crate::ftp::client::FtpClient;
use crate::ftp::error::FtpResult;
use crate::ftp::types::ListedResource;
use async_trait::async_trait;
use std::path::Path;

#[async_trait]
pub trait Ftp: Send {
    async fn connect(&mut self) -> FtpResult<()>;
    async fn disconnect(&mut self) -> FtpResult<()>;

    async fn directory_exists(&mut self, directory: &str) -> FtpResult<bool>;
    async fn file_exists(&mut self, file: &str) -> FtpResult<bool>;
    async fn resource_exists(&mut self, resource: &str) -> FtpResult<bool>;

    /// Parsed, filtered, validated listing of one folder. Always a
    /// fresh fetch; caching happens above this trait.
    async fn fetch_directory_list(&mut self, directory: &str) -> FtpResult<Vec<ListedResource>>;

    async fn create_directory(&mut self, directory: &str) -> FtpResult<()>;
    async fn delete_directory(&mut self, directory: &str, recursive: bool) -> FtpResult<()>;
    async fn copy_directory(&mut self, source: &str, target: &str, overwrite: bool)
        -> FtpResult<()>;

    async fn rename_resource(
        &mut self,
        source: &str,
        target: &str,
        overwrite: bool,
    ) -> FtpResult<()>;

    async fn create_file(&mut self, file: &str, overwrite: bool) -> FtpResult<()>;
    async fn delete_file(&mut self, file: &str) -> FtpResult<()>;
    async fn copy_file(&mut self, source: &str, target: &str, overwrite: bool) -> FtpResult<()>;
    async fn upload_file(
        &mut self,
        target: &str,
        local_source: &Path,
        overwrite: bool,
    ) -> FtpResult<()>;
    async fn download_file(&mut self, source: &str, local_target: &Path) -> FtpResult<()>;
    async fn replace_file(&mut self, target: &str, local_source: &Path) -> FtpResult<()>;

    async fn set_file_contents(&mut self, file: &str, contents: &[u8]) -> FtpResult<usize>;
    async fn get_file_contents(&mut self, file: &str) -> FtpResult<Vec<u8>>;

    async fn get_file_size(&mut self, file: &str) -> FtpResult<u64>;
    async fn get_modification_time(&mut self, resource: &str) -> FtpResult<i64>;

    // ── Aliases kept for call-site clarity ───────────────────────

    async fn rename_file(&mut self, source: &str, target: &str, overwrite: bool) -> FtpResult<()> {
        self.rename_resource(source, target, overwrite).await
    }

    async fn rename_directory(
        &mut self,
        source: &str,
        target: &str,
        overwrite: bool,
    ) -> FtpResult<()> {
        self.rename_resource(source, target, overwrite).await
    }

    async fn move_file(&mut self, source: &str, target: &str, overwrite: bool) -> FtpResult<()> {
        self.rename_resource(source, target, overwrite).await
    }

    async fn move_directory(
        &mut self,
        source: &str,
        target: &str,
        overwrite: bool,
    ) -> FtpResult<()> {
        self.rename_resource(source, target, overwrite).await
    }
}

#[async_trait]
impl Ftp for FtpClient {
    async fn connect(&mut self) -> FtpResult<()> {
        FtpClient::connect(self).await
    }

    async fn disconnect(&mut self) -> FtpResult<()> {
        FtpClient::disconnect(self).await
    }

    async fn directory_exists(&mut self, directory: &str) -> FtpResult<bool> {
        FtpClient::directory_exists(self, directory).await
    }

    async fn file_exists(&mut self, file: &str) -> FtpResult<bool> {
        FtpClient::file_exists(self, file).await
    }

    async fn resource_exists(&mut self, resource: &str) -> FtpResult<bool> {
        FtpClient::resource_exists(self, resource).await
    }

    async fn fetch_directory_list(&mut self, directory: &str) -> FtpResult<Vec<ListedResource>> {
        FtpClient::fetch_directory_list(self, directory).await
    }

    async fn create_directory(&mut self, directory: &str) -> FtpResult<()> {
        FtpClient::create_directory(self, directory).await
    }

    async fn delete_directory(&mut self, directory: &str, recursive: bool) -> FtpResult<()> {
        FtpClient::delete_directory(self, directory, recursive).await
    }

    async fn copy_directory(
        &mut self,
        source: &str,
        target: &str,
        overwrite: bool,
    ) -> FtpResult<()> {
        FtpClient::copy_directory(self, source, target, overwrite).await
    }

    async fn rename_resource(
        &mut self,
        source: &str,
        target: &str,
        overwrite: bool,
    ) -> FtpResult<()> {
        FtpClient::rename_resource(self, source, target, overwrite).await
    }

    async fn create_file(&mut self, file: &str, overwrite: bool) -> FtpResult<()> {
        FtpClient::create_file(self, file, overwrite).await
    }

    async fn delete_file(&mut self, file: &str) -> FtpResult<()> {
        FtpClient::delete_file(self, file).await
    }

    async fn copy_file(&mut self, source: &str, target: &str, overwrite: bool) -> FtpResult<()> {
        FtpClient::copy_file(self, source, target, overwrite).await
    }

    async fn upload_file(
        &mut self,
        target: &str,
        local_source: &Path,
        overwrite: bool,
    ) -> FtpResult<()> {
        FtpClient::upload_file(self, target, local_source, overwrite).await
    }

    async fn download_file(&mut self, source: &str, local_target: &Path) -> FtpResult<()> {
        FtpClient::download_file(self, source, local_target).await
    }

    async fn replace_file(&mut self, target: &str, local_source: &Path) -> FtpResult<()> {
        FtpClient::replace_file(self, target, local_source).await
    }

    async fn set_file_contents(&mut self, file: &str, contents: &[u8]) -> FtpResult<usize> {
        FtpClient::set_file_contents(self, file, contents).await
    }

    async fn get_file_contents(&mut self, file: &str) -> FtpResult<Vec<u8>> {
        FtpClient::get_file_contents(self, file).await
    }

    async fn get_file_size(&mut self, file: &str) -> FtpResult<u64> {
        FtpClient::get_file_size(self, file).await
    }

    async fn get_modification_time(&mut self, resource: &str) -> FtpResult<i64> {
        FtpClient::get_modification_time(self, resource).await
    }
}
