//! Data-channel setup.
//!
//! One data connection is opened per transfer, in one of two modes
//! (RFC 959): **PASV** (server opens a port, client connects) or
//! **PORT** (client listens, server connects back). The socket comes
//! back TLS-wrapped when the control channel is secured (PROT P).

use crate::ftp::error::{FtpError, FtpResult};
use crate::ftp::protocol::FtpCodec;
use crate::ftp::stream::FtpStream;
use lazy_static::lazy_static;
use regex::Regex;
use std::net::{IpAddr, SocketAddr};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{timeout, Duration};

/// Open a data channel in the configured mode.
pub async fn open_data_channel(
    codec: &mut FtpCodec,
    passive: bool,
    secured: bool,
    host: &str,
    accept_invalid_certs: bool,
    data_timeout: Duration,
) -> FtpResult<FtpStream> {
    let tcp = if passive {
        open_pasv(codec, data_timeout).await?
    } else {
        open_port(codec, data_timeout).await?
    };

    let stream = FtpStream::Plain(tcp);
    if secured {
        stream.upgrade_tls(host, accept_invalid_certs).await
    } else {
        Ok(stream)
    }
}

// ─── PASV ────────────────────────────────────────────────────────────

/// `PASV` hands us the server's listening address inside the reply:
/// `227 Entering Passive Mode (h1,h2,h3,h4,p1,p2)`.
async fn open_pasv(codec: &mut FtpCodec, data_timeout: Duration) -> FtpResult<TcpStream> {
    let resp = codec.expect_ok("PASV").await?;
    let addr = parse_pasv_response(&resp.text())?;
    timeout(data_timeout, TcpStream::connect(addr))
        .await
        .map_err(|_| FtpError::timeout("PASV data connect timed out"))?
        .map_err(|e| FtpError::connection(format!("PASV data connect: {}", e)))
}

fn parse_pasv_response(text: &str) -> FtpResult<SocketAddr> {
    lazy_static! {
        static ref PASV: Regex = Regex::new(r"\((\d+),(\d+),(\d+),(\d+),(\d+),(\d+)\)").unwrap();
    }
    let caps = PASV
        .captures(text)
        .ok_or_else(|| FtpError::connection(format!("cannot parse PASV reply: {}", text)))?;

    let mut octets = [0u8; 6];
    for (i, octet) in octets.iter_mut().enumerate() {
        *octet = caps[i + 1]
            .parse()
            .map_err(|_| FtpError::connection("PASV number out of range"))?;
    }

    let ip = IpAddr::from([octets[0], octets[1], octets[2], octets[3]]);
    let port = u16::from(octets[4]) * 256 + u16::from(octets[5]);
    Ok(SocketAddr::new(ip, port))
}

// ─── PORT ────────────────────────────────────────────────────────────

/// Bind an ephemeral local port, announce it via `PORT`, wait for the
/// server to connect back.
async fn open_port(codec: &mut FtpCodec, data_timeout: Duration) -> FtpResult<TcpStream> {
    let listener = TcpListener::bind("0.0.0.0:0")
        .await
        .map_err(|e| FtpError::connection(format!("PORT bind: {}", e)))?;
    let local = listener
        .local_addr()
        .map_err(|e| FtpError::connection(format!("PORT local_addr: {}", e)))?;

    let IpAddr::V4(ip) = local.ip() else {
        return Err(FtpError::connection("PORT requires IPv4"));
    };
    let [a, b, c, d] = ip.octets();
    let port = local.port();
    codec
        .expect_ok(&format!(
            "PORT {},{},{},{},{},{}",
            a,
            b,
            c,
            d,
            port / 256,
            port % 256
        ))
        .await?;

    let (tcp, _) = timeout(data_timeout, listener.accept())
        .await
        .map_err(|_| FtpError::timeout("PORT accept timed out"))?
        .map_err(|e| FtpError::connection(format!("PORT accept: {}", e)))?;
    Ok(tcp)
}
