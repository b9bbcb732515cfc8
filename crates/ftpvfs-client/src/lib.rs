pub mod ftp;

pub use ftp::error::{FtpError, FtpErrorKind, FtpResult};
pub use ftp::filter::{DotsFilter, ListingFilter, PatternFilter, TotalLineFilter};
pub use ftp::interface::Ftp;
pub use ftp::parser::{ListingParser, Parsed, ParsedResource};
pub use ftp::types::{ConnectionConfig, ListedResource, TransferMode};
pub use ftp::client::FtpClient;
