//! File-level operations — upload, download, contents, copy, SIZE, MDTM.
//!
//! Everything that stages data locally goes through a `NamedTempFile`,
//! which is released by drop on every exit path.

use crate::ftp::client::FtpClient;
use crate::ftp::error::{FtpError, FtpResult};
use chrono::NaiveDateTime;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Chunk size for streaming transfers (64 KiB).
const CHUNK_SIZE: usize = 65_536;

impl FtpClient {
    // ─── SIZE / MDTM ─────────────────────────────────────────────

    /// Size of a remote file in bytes (RFC 3659 SIZE).
    pub async fn get_file_size(&mut self, file: &str) -> FtpResult<u64> {
        let path = self.absolute(file);
        let resp = self
            .codec()
            .await?
            .expect_ok(&format!("SIZE {}", path))
            .await?;
        let text = resp.text();
        // "213 12345"
        text.split_whitespace()
            .nth(1)
            .and_then(|n| n.parse::<u64>().ok())
            .ok_or_else(|| FtpError::connection(format!("cannot parse SIZE reply: {}", text)))
    }

    /// Modification time of a remote file as epoch seconds
    /// (RFC 3659 MDTM).
    pub async fn get_modification_time(&mut self, resource: &str) -> FtpResult<i64> {
        let path = self.absolute(resource);
        let resp = self
            .codec()
            .await?
            .expect_ok(&format!("MDTM {}", path))
            .await?;
        let text = resp.text();
        // "213 20260101120000"
        let stamp = text.split_whitespace().nth(1).unwrap_or("");
        let stamp = if stamp.len() > 14 { &stamp[..14] } else { stamp };
        NaiveDateTime::parse_from_str(stamp, "%Y%m%d%H%M%S")
            .map(|dt| dt.and_utc().timestamp())
            .map_err(|_| FtpError::connection(format!("cannot parse MDTM reply: {}", text)))
    }

    // ─── Upload (STOR) ───────────────────────────────────────────

    /// Upload a local file to the given remote identifier.
    pub async fn upload_file(
        &mut self,
        target: &str,
        local_source: &Path,
        overwrite: bool,
    ) -> FtpResult<()> {
        let meta = fs::metadata(local_source).await.map_err(|e| {
            FtpError::does_not_exist(format!(
                "local file '{}' not readable: {}",
                local_source.display(),
                e
            ))
        })?;
        if !meta.is_file() {
            return Err(FtpError::does_not_exist(format!(
                "'{}' is not a file",
                local_source.display()
            )));
        }

        self.ensure_overwritable(target, overwrite).await?;

        let mut file = fs::File::open(local_source)
            .await
            .map_err(|e| FtpError::local_resource(format!("open upload source: {}", e)))?;
        self.store(target, &mut file).await?;
        Ok(())
    }

    /// Upload from an open stream.
    pub async fn upload_from<R>(
        &mut self,
        target: &str,
        source: &mut R,
        overwrite: bool,
    ) -> FtpResult<u64>
    where
        R: AsyncRead + Unpin + Send,
    {
        self.ensure_overwritable(target, overwrite).await?;
        self.store(target, source).await
    }

    /// Replace a remote file with local contents. Alias for an
    /// overwriting upload.
    pub async fn replace_file(&mut self, target: &str, local_source: &Path) -> FtpResult<()> {
        self.upload_file(target, local_source, true).await
    }

    /// Create an empty remote file.
    pub async fn create_file(&mut self, file: &str, overwrite: bool) -> FtpResult<()> {
        self.ensure_overwritable(file, overwrite).await?;
        self.set_file_contents(file, &[]).await?;
        Ok(())
    }

    // ─── Download (RETR) ─────────────────────────────────────────

    /// Download a remote file to a local path.
    pub async fn download_file(&mut self, source: &str, local_target: &Path) -> FtpResult<()> {
        if let Some(parent) = local_target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| FtpError::local_resource(format!("create target dir: {}", e)))?;
        }
        let mut file = fs::File::create(local_target)
            .await
            .map_err(|e| FtpError::local_resource(format!("create download target: {}", e)))?;
        self.retrieve(source, &mut file).await?;
        file.flush()
            .await
            .map_err(|e| FtpError::local_resource(format!("flush download target: {}", e)))?;
        Ok(())
    }

    /// Download into an open stream.
    pub async fn download_to<W>(&mut self, source: &str, target: &mut W) -> FtpResult<u64>
    where
        W: AsyncWrite + Unpin + Send,
    {
        self.retrieve(source, target).await
    }

    // ─── Contents ────────────────────────────────────────────────

    /// Replace the contents of a remote file, staging them through a
    /// local temporary buffer. Returns the number of bytes written.
    pub async fn set_file_contents(&mut self, file: &str, contents: &[u8]) -> FtpResult<usize> {
        let mut staged = NamedTempFile::new()
            .map_err(|e| FtpError::local_resource(format!("create temporary buffer: {}", e)))?;
        staged
            .write_all(contents)
            .map_err(|e| FtpError::local_resource(format!("write temporary buffer: {}", e)))?;
        staged
            .flush()
            .map_err(|e| FtpError::local_resource(format!("flush temporary buffer: {}", e)))?;

        let mut reader = fs::File::open(staged.path())
            .await
            .map_err(|e| FtpError::local_resource(format!("reopen temporary buffer: {}", e)))?;
        self.store(file, &mut reader).await?;
        Ok(contents.len())
    }

    /// Fetch the contents of a remote file through a local temporary
    /// buffer.
    pub async fn get_file_contents(&mut self, file: &str) -> FtpResult<Vec<u8>> {
        let staged = NamedTempFile::new()
            .map_err(|e| FtpError::local_resource(format!("create temporary buffer: {}", e)))?;

        self.download_file(file, staged.path()).await?;

        fs::read(staged.path())
            .await
            .map_err(|e| FtpError::local_resource(format!("read temporary buffer: {}", e)))
    }

    // ─── Copy ────────────────────────────────────────────────────

    /// Copy a remote file by a download/upload round trip through a
    /// local temporary buffer; the buffer is released whether or not
    /// the round trip succeeds.
    pub async fn copy_file(
        &mut self,
        source: &str,
        target: &str,
        overwrite: bool,
    ) -> FtpResult<()> {
        self.ensure_overwritable(target, overwrite).await?;

        let staged = NamedTempFile::new()
            .map_err(|e| FtpError::local_resource(format!("create temporary buffer: {}", e)))?;
        self.download_file(source, staged.path()).await?;
        self.upload_file(target, staged.path(), true).await?;
        Ok(())
    }

    // ─── Streaming internals ─────────────────────────────────────

    /// Issue STOR and stream `source` over the data channel.
    async fn store<R>(&mut self, target: &str, source: &mut R) -> FtpResult<u64>
    where
        R: AsyncRead + Unpin + Send + ?Sized,
    {
        let path = self.absolute(target);
        let mut data = self.open_data_channel().await?;
        let resp = self
            .codec()
            .await?
            .execute(&format!("STOR {}", path))
            .await?;
        if !resp.is_preliminary() && !resp.is_success() {
            return Err(FtpError::from_reply(resp.code, &resp.text()));
        }

        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut transferred = 0u64;
        loop {
            let n = source
                .read(&mut buf)
                .await
                .map_err(|e| FtpError::local_resource(format!("read upload source: {}", e)))?;
            if n == 0 {
                break;
            }
            data.write_all(&buf[..n])
                .await
                .map_err(|e| FtpError::connection(format!("data channel write: {}", e)))?;
            transferred += n as u64;
        }
        data.flush()
            .await
            .map_err(|e| FtpError::connection(format!("data channel flush: {}", e)))?;
        data.shutdown()
            .await
            .map_err(|e| FtpError::connection(format!("data channel shutdown: {}", e)))?;
        drop(data);

        let done = self.codec().await?.read_response().await?;
        if !done.is_success() {
            return Err(FtpError::from_reply(done.code, &done.text()));
        }

        log::debug!("ftp[{}] stored {} bytes to {}", self.id, transferred, path);
        Ok(transferred)
    }

    /// Issue RETR and stream the data channel into `target`.
    async fn retrieve<W>(&mut self, source: &str, target: &mut W) -> FtpResult<u64>
    where
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        let path = self.absolute(source);
        let mut data = self.open_data_channel().await?;
        let resp = self
            .codec()
            .await?
            .execute(&format!("RETR {}", path))
            .await?;
        if !resp.is_preliminary() && !resp.is_success() {
            return Err(FtpError::from_reply(resp.code, &resp.text()));
        }

        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut transferred = 0u64;
        loop {
            let n = data
                .read(&mut buf)
                .await
                .map_err(|e| FtpError::connection(format!("data channel read: {}", e)))?;
            if n == 0 {
                break;
            }
            target
                .write_all(&buf[..n])
                .await
                .map_err(|e| FtpError::local_resource(format!("write download target: {}", e)))?;
            transferred += n as u64;
        }
        drop(data);

        let done = self.codec().await?.read_response().await?;
        if !done.is_success() {
            return Err(FtpError::from_reply(done.code, &done.text()));
        }

        log::debug!(
            "ftp[{}] retrieved {} bytes from {}",
            self.id,
            transferred,
            path
        );
        Ok(transferred)
    }
}
