//! Control-channel codec (RFC 959 §4): commands out, replies in.
//!
//! A command is one line terminated with CRLF. A reply starts with a
//! three-digit code; `NNN-` opens a multi-line reply that runs until a
//! line starting with `NNN␠`. Every read is bounded by the configured
//! timeout, and an elapsed timer surfaces as a connection-class error.

use crate::ftp::error::{FtpError, FtpResult};
use crate::ftp::stream::FtpStream;
use crate::ftp::types::FtpResponse;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::time::timeout;

pub struct FtpCodec {
    stream: BufReader<FtpStream>,
    reply_timeout: Duration,
}

impl FtpCodec {
    pub fn new(stream: FtpStream, reply_timeout: Duration) -> Self {
        Self {
            stream: BufReader::new(stream),
            reply_timeout,
        }
    }

    /// Secure the control channel in place (after `AUTH TLS` + 234).
    ///
    /// Any buffered-but-unread bytes would be lost; callers only invoke
    /// this directly after consuming a complete reply.
    pub async fn upgrade_tls(self, host: &str, accept_invalid_certs: bool) -> FtpResult<Self> {
        let reply_timeout = self.reply_timeout;
        let stream = self
            .stream
            .into_inner()
            .upgrade_tls(host, accept_invalid_certs)
            .await?;
        Ok(Self::new(stream, reply_timeout))
    }

    /// Send one command; CRLF is appended here.
    pub async fn send_command(&mut self, cmd: &str) -> FtpResult<()> {
        log::trace!(">>> {}", cmd);
        let writer = self.stream.get_mut();
        writer.write_all(cmd.as_bytes()).await?;
        writer.write_all(b"\r\n").await?;
        Ok(())
    }

    async fn read_line(&mut self) -> FtpResult<String> {
        let mut line = String::new();
        let n = timeout(self.reply_timeout, self.stream.read_line(&mut line))
            .await
            .map_err(|_| FtpError::timeout("reply read timed out"))??;
        if n == 0 {
            return Err(FtpError::connection("server closed connection"));
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(line)
    }

    /// Read one complete reply, following multi-line continuations.
    pub async fn read_response(&mut self) -> FtpResult<FtpResponse> {
        let first = self.read_line().await?;
        let code = reply_code(&first)?;
        let mut lines = vec![first];

        if is_continued(&lines[0]) {
            let terminator = format!("{} ", code);
            loop {
                let next = self.read_line().await?;
                let done = next.starts_with(&terminator);
                lines.push(next);
                if done {
                    break;
                }
            }
        }

        log::trace!("<<< {}", lines.last().map(String::as_str).unwrap_or(""));
        Ok(FtpResponse { code, lines })
    }

    /// Send a command and read its reply.
    pub async fn execute(&mut self, cmd: &str) -> FtpResult<FtpResponse> {
        self.send_command(cmd).await?;
        self.read_response().await
    }

    /// Send a command and demand a 2xx completion reply.
    pub async fn expect_ok(&mut self, cmd: &str) -> FtpResult<FtpResponse> {
        let resp = self.execute(cmd).await?;
        if !resp.is_completion() {
            return Err(FtpError::from_reply(resp.code, &resp.text()));
        }
        Ok(resp)
    }
}

/// The three-digit code opening a reply line.
fn reply_code(line: &str) -> FtpResult<u16> {
    line.get(..3)
        .filter(|s| s.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| FtpError::connection(format!("malformed reply: '{}'", line)))
}

/// `NNN-` marks a reply that continues on following lines.
fn is_continued(line: &str) -> bool {
    line.as_bytes().get(3) == Some(&b'-')
}
