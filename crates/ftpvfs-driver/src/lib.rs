pub mod vfs;

pub use vfs::cache::{DirectoryCache, FolderSnapshot};
pub use vfs::config::{DriverConfig, RemoteServiceConfig};
pub use vfs::driver::{FolderInfo, FtpDriver, ListQuery};
pub use vfs::entry::{Permissions, ResourceEntry};
pub use vfs::identifier_map::{build_identifier_map, IdentifierMap};
pub use vfs::remote_hash::RemoteHashService;
