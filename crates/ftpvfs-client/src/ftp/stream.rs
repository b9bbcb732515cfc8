//! Socket abstraction shared by the control and data channels.
//!
//! `FtpStream` is a plain TCP socket or its TLS-wrapped form behind one
//! type, so the codec and the transfer code never branch on security.
//! TLS upgrading consumes the plain stream (RFC 4217: the same socket
//! continues under TLS after `AUTH TLS`, and data sockets are wrapped
//! before the first byte when the control channel is secured).

use crate::ftp::error::{FtpError, FtpResult};
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_native_tls::{TlsConnector, TlsStream};

pub enum FtpStream {
    Plain(TcpStream),
    Tls(TlsStream<TcpStream>),
}

impl FtpStream {
    /// Perform the client-side TLS handshake on this stream.
    ///
    /// Fails when the stream is already secured.
    pub async fn upgrade_tls(self, host: &str, accept_invalid_certs: bool) -> FtpResult<Self> {
        let tcp = match self {
            FtpStream::Plain(tcp) => tcp,
            FtpStream::Tls(_) => {
                return Err(FtpError::connection("stream is already TLS-wrapped"))
            }
        };
        let tls = tls_connector(accept_invalid_certs)?
            .connect(host, tcp)
            .await
            .map_err(|e| FtpError::connection(format!("TLS handshake with {}: {}", host, e)))?;
        Ok(FtpStream::Tls(tls))
    }
}

fn tls_connector(accept_invalid_certs: bool) -> FtpResult<TlsConnector> {
    let mut builder = native_tls::TlsConnector::builder();
    if accept_invalid_certs {
        builder.danger_accept_invalid_certs(true);
        builder.danger_accept_invalid_hostnames(true);
    }
    Ok(TlsConnector::from(builder.build()?))
}

impl AsyncRead for FtpStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            FtpStream::Plain(s) => Pin::new(s).poll_read(cx, buf),
            FtpStream::Tls(s) => Pin::new(s).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for FtpStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            FtpStream::Plain(s) => Pin::new(s).poll_write(cx, buf),
            FtpStream::Tls(s) => Pin::new(s).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            FtpStream::Plain(s) => Pin::new(s).poll_flush(cx),
            FtpStream::Tls(s) => Pin::new(s).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            FtpStream::Plain(s) => Pin::new(s).poll_shutdown(cx),
            FtpStream::Tls(s) => Pin::new(s).poll_shutdown(cx),
        }
    }
}
