//! Categorised error type shared by the client and driver crates.
//!
//! The taxonomy is deliberately small and caller-oriented: what a
//! caller can do about a failure matters more than which syscall
//! produced it. Local-buffer failures get their own kind so "my disk"
//! and "their server" stay distinguishable.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FtpErrorKind {
    /// Connecting or logging in is impossible; fatal, never retried.
    /// Also used for invalid caller-supplied parameters.
    Configuration,
    /// An individual protocol command failed (includes timeouts); the
    /// caller decides between fatal and skip.
    Connection,
    /// Target exists and overwrite was disallowed; recoverable by
    /// renaming the target or setting the overwrite flag.
    AlreadyExists,
    /// A required source resource is missing.
    DoesNotExist,
    /// A parsed listing entry lacks a mandatory type or name.
    InvalidAttribute,
    /// No listing recognizer matched a raw line.
    UnsupportedFormat,
    /// A local temporary buffer could not be created, written or read.
    LocalResource,
}

impl FtpErrorKind {
    fn label(self) -> &'static str {
        match self {
            FtpErrorKind::Configuration => "configuration error",
            FtpErrorKind::Connection => "connection error",
            FtpErrorKind::AlreadyExists => "already exists",
            FtpErrorKind::DoesNotExist => "does not exist",
            FtpErrorKind::InvalidAttribute => "invalid attribute",
            FtpErrorKind::UnsupportedFormat => "unsupported listing format",
            FtpErrorKind::LocalResource => "local resource error",
        }
    }
}

/// An FTP-layer or driver-layer failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FtpError {
    pub kind: FtpErrorKind,
    pub message: String,
    /// Server reply code that triggered the error, if any.
    pub code: Option<u16>,
}

pub type FtpResult<T> = Result<T, FtpError>;

impl FtpError {
    pub fn new(kind: FtpErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            message: msg.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: u16) -> Self {
        self.code = Some(code);
        self
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::new(FtpErrorKind::Configuration, msg)
    }

    pub fn connection(msg: impl Into<String>) -> Self {
        Self::new(FtpErrorKind::Connection, msg)
    }

    pub fn already_exists(msg: impl Into<String>) -> Self {
        Self::new(FtpErrorKind::AlreadyExists, msg)
    }

    pub fn does_not_exist(msg: impl Into<String>) -> Self {
        Self::new(FtpErrorKind::DoesNotExist, msg)
    }

    pub fn invalid_attribute(msg: impl Into<String>) -> Self {
        Self::new(FtpErrorKind::InvalidAttribute, msg)
    }

    pub fn unsupported_format(line: &str) -> Self {
        Self::new(
            FtpErrorKind::UnsupportedFormat,
            format!("no listing recognizer matched line '{}'", line),
        )
    }

    pub fn local_resource(msg: impl Into<String>) -> Self {
        Self::new(FtpErrorKind::LocalResource, msg)
    }

    /// Timeouts are reported as connection-class failures.
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::new(FtpErrorKind::Connection, msg)
    }

    /// Classify a server reply into the taxonomy.
    ///
    /// Login rejections are configuration errors; a 550 whose text says
    /// the resource is missing becomes DoesNotExist; everything else a
    /// command can provoke is connection-class.
    pub fn from_reply(code: u16, text: &str) -> Self {
        let lower = text.to_lowercase();
        let kind = match code {
            430 | 530 => FtpErrorKind::Configuration,
            450 | 550 if lower.contains("not found") || lower.contains("no such") => {
                FtpErrorKind::DoesNotExist
            }
            _ => FtpErrorKind::Connection,
        };
        Self::new(kind, text).with_code(code)
    }
}

impl fmt::Display for FtpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.label(), self.message)?;
        if let Some(code) = self.code {
            write!(f, " (reply {})", code)?;
        }
        Ok(())
    }
}

impl std::error::Error for FtpError {}

/// I/O failures on the control or data socket are connection-class;
/// local file staging maps its errors explicitly via `local_resource`.
impl From<std::io::Error> for FtpError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::TimedOut {
            Self::timeout(format!("I/O timeout: {}", e))
        } else {
            Self::connection(e.to_string())
        }
    }
}

impl From<native_tls::Error> for FtpError {
    fn from(e: native_tls::Error) -> Self {
        Self::connection(format!("TLS: {}", e))
    }
}
