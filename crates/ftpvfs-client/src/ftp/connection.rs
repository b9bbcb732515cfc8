//! Establishes the FTP control connection.
//!
//! Failures here are configuration errors: if the host cannot be
//! reached at all, no amount of retrying individual commands helps.

use crate::ftp::error::{FtpError, FtpResult};
use crate::ftp::protocol::FtpCodec;
use crate::ftp::stream::FtpStream;
use crate::ftp::types::{ConnectionConfig, FtpResponse};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Connect the control channel and read the welcome banner.
///
/// The connection starts plain even for FTPS; `client.rs` upgrades it
/// after a successful `AUTH TLS`.
pub async fn connect(config: &ConnectionConfig) -> FtpResult<(FtpCodec, FtpResponse)> {
    let addr = format!("{}:{}", config.host, config.port);
    let dur = Duration::from_secs(config.timeout_sec);

    let tcp = timeout(dur, TcpStream::connect(&addr))
        .await
        .map_err(|_| FtpError::configuration(format!("connect to {} timed out", addr)))?
        .map_err(|e| FtpError::configuration(format!("connect to {}: {}", addr, e)))?;
    tcp.set_nodelay(true).ok();

    let mut codec = FtpCodec::new(FtpStream::Plain(tcp), dur);
    let banner = codec.read_response().await?;
    if !banner.is_success() {
        return Err(FtpError::configuration(format!(
            "server refused connection: {}",
            banner.text()
        )));
    }
    Ok((codec, banner))
}
