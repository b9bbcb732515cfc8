//! Behavioral tests for the driver over a scripted in-memory client.
//!
//! The mock implements the `Ftp` trait with the same observable
//! semantics as the real client against a server (existence probes,
//! overwrite pre-checks, bottom-up deletes), and counts listing calls
//! so cache behavior is verifiable.

use async_trait::async_trait;
use ftpvfs_driver::vfs::paths;
use ftpvfs_driver::{DriverConfig, FtpDriver, ListQuery, RemoteServiceConfig};
use ftpvfs_client::{Ftp, FtpError, FtpErrorKind, FtpResult, ListedResource};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

const LISTED_MTIME: i64 = 1_700_000_000;
const EXACT_MTIME: i64 = 1_800_000_000;

#[derive(Default)]
struct MockFtp {
    dirs: BTreeSet<String>,
    files: BTreeMap<String, Vec<u8>>,
    list_calls: HashMap<String, usize>,
    download_calls: usize,
    /// Mutating operations, in order.
    mutations: Vec<String>,
}

impl MockFtp {
    fn new() -> Self {
        let mut mock = Self::default();
        mock.dirs.insert("/".into());
        mock
    }

    fn with_tree(dirs: &[&str], files: &[(&str, &[u8])]) -> Self {
        let mut mock = Self::new();
        for dir in dirs {
            mock.dirs.insert(paths::canonicalize_folder(dir));
        }
        for (file, contents) in files {
            mock.files
                .insert(paths::canonicalize_file(file), contents.to_vec());
        }
        mock
    }

    fn list_calls_for(&self, folder: &str) -> usize {
        self.list_calls.get(folder).copied().unwrap_or(0)
    }

    fn has_dir(&self, dir: &str) -> bool {
        self.dirs.contains(&paths::canonicalize_folder(dir))
    }

    fn subtree_of(&self, folder: &str) -> (Vec<String>, Vec<String>) {
        let dirs = self
            .dirs
            .iter()
            .filter(|d| d.starts_with(folder) && d.as_str() != folder)
            .cloned()
            .collect();
        let files = self
            .files
            .keys()
            .filter(|f| f.starts_with(folder))
            .cloned()
            .collect();
        (dirs, files)
    }
}

#[async_trait]
impl Ftp for MockFtp {
    async fn connect(&mut self) -> FtpResult<()> {
        Ok(())
    }

    async fn disconnect(&mut self) -> FtpResult<()> {
        Ok(())
    }

    async fn directory_exists(&mut self, directory: &str) -> FtpResult<bool> {
        Ok(self.dirs.contains(&paths::canonicalize_folder(directory)))
    }

    async fn file_exists(&mut self, file: &str) -> FtpResult<bool> {
        Ok(self.files.contains_key(&paths::canonicalize_file(file)))
    }

    async fn resource_exists(&mut self, resource: &str) -> FtpResult<bool> {
        Ok(self.directory_exists(resource).await? || self.file_exists(resource).await?)
    }

    async fn fetch_directory_list(&mut self, directory: &str) -> FtpResult<Vec<ListedResource>> {
        let directory = paths::canonicalize_folder(directory);
        *self.list_calls.entry(directory.clone()).or_insert(0) += 1;

        if !self.dirs.contains(&directory) {
            return Err(FtpError::from_reply(550, "550 No such directory"));
        }

        let mut listing = Vec::new();
        for dir in &self.dirs {
            if dir != &directory && paths::parent_folder(dir) == directory {
                listing.push(ListedResource {
                    path: directory.clone(),
                    is_directory: true,
                    name: paths::name_of(dir).to_string(),
                    size: 0,
                    owner: Some("owner".into()),
                    group: Some("group".into()),
                    mode: Some("rwxr-xr-x".into()),
                    mtime: LISTED_MTIME,
                });
            }
        }
        for (file, contents) in &self.files {
            if paths::parent_folder(file) == directory {
                listing.push(ListedResource {
                    path: directory.clone(),
                    is_directory: false,
                    name: paths::name_of(file).to_string(),
                    size: contents.len() as u64,
                    owner: Some("owner".into()),
                    group: Some("group".into()),
                    mode: Some("rw-r--r--".into()),
                    mtime: LISTED_MTIME,
                });
            }
        }
        listing.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(listing)
    }

    async fn create_directory(&mut self, directory: &str) -> FtpResult<()> {
        let directory = paths::canonicalize_folder(directory);
        self.mutations.push(format!("MKD {}", directory));
        self.dirs.insert(directory);
        Ok(())
    }

    async fn delete_directory(&mut self, directory: &str, recursive: bool) -> FtpResult<()> {
        let directory = paths::canonicalize_folder(directory);
        let (sub_dirs, sub_files) = self.subtree_of(&directory);

        // Files go first, bottom-up, exactly as the real client does.
        for file in &sub_files {
            self.mutations.push(format!("DELE {}", file));
            self.files.remove(file);
        }
        if !recursive && !sub_dirs.is_empty() {
            return Err(FtpError::from_reply(550, "550 Directory not empty"));
        }
        for dir in sub_dirs {
            self.dirs.remove(&dir);
        }
        self.mutations.push(format!("RMD {}", directory));
        self.dirs.remove(&directory);
        Ok(())
    }

    async fn copy_directory(
        &mut self,
        source: &str,
        target: &str,
        overwrite: bool,
    ) -> FtpResult<()> {
        let source = paths::canonicalize_folder(source);
        let target = paths::canonicalize_folder(target);
        if !overwrite && (self.dirs.contains(&target) || self.files.contains_key(target.trim_end_matches('/'))) {
            return Err(FtpError::already_exists(format!(
                "resource '{}' already exists",
                target
            )));
        }
        self.mutations.push(format!("COPY {} {}", source, target));
        self.dirs.insert(target.clone());
        let (sub_dirs, sub_files) = self.subtree_of(&source);
        for dir in sub_dirs {
            self.dirs.insert(dir.replacen(&source, &target, 1));
        }
        for file in sub_files {
            let contents = self.files[&file].clone();
            self.files.insert(file.replacen(&source, &target, 1), contents);
        }
        Ok(())
    }

    async fn rename_resource(
        &mut self,
        source: &str,
        target: &str,
        overwrite: bool,
    ) -> FtpResult<()> {
        if !overwrite && self.resource_exists(target).await? {
            return Err(FtpError::already_exists(format!(
                "resource '{}' already exists",
                target
            )));
        }
        self.mutations.push(format!("RNFR {} RNTO {}", source, target));

        let file_source = paths::canonicalize_file(source);
        if let Some(contents) = self.files.remove(&file_source) {
            self.files.insert(paths::canonicalize_file(target), contents);
            return Ok(());
        }

        let source = paths::canonicalize_folder(source);
        let target = paths::canonicalize_folder(target);
        if !self.dirs.remove(&source) {
            return Err(FtpError::from_reply(550, "550 No such resource"));
        }
        self.dirs.insert(target.clone());
        let (sub_dirs, sub_files) = self.subtree_of(&source);
        for dir in sub_dirs {
            self.dirs.remove(&dir);
            self.dirs.insert(dir.replacen(&source, &target, 1));
        }
        for file in sub_files {
            let contents = self.files.remove(&file).unwrap();
            self.files.insert(file.replacen(&source, &target, 1), contents);
        }
        Ok(())
    }

    async fn create_file(&mut self, file: &str, overwrite: bool) -> FtpResult<()> {
        if !overwrite && self.resource_exists(file).await? {
            return Err(FtpError::already_exists(format!(
                "resource '{}' already exists",
                file
            )));
        }
        self.mutations.push(format!("STOR {}", file));
        self.files.insert(paths::canonicalize_file(file), Vec::new());
        Ok(())
    }

    async fn delete_file(&mut self, file: &str) -> FtpResult<()> {
        let file = paths::canonicalize_file(file);
        self.mutations.push(format!("DELE {}", file));
        match self.files.remove(&file) {
            Some(_) => Ok(()),
            None => Err(FtpError::from_reply(550, "550 No such file")),
        }
    }

    async fn copy_file(&mut self, source: &str, target: &str, overwrite: bool) -> FtpResult<()> {
        if !overwrite && self.resource_exists(target).await? {
            return Err(FtpError::already_exists(format!(
                "resource '{}' already exists",
                target
            )));
        }
        let contents = self
            .files
            .get(&paths::canonicalize_file(source))
            .cloned()
            .ok_or_else(|| FtpError::from_reply(550, "550 No such file"))?;
        self.mutations.push(format!("COPY {} {}", source, target));
        self.files.insert(paths::canonicalize_file(target), contents);
        Ok(())
    }

    async fn upload_file(
        &mut self,
        target: &str,
        local_source: &Path,
        overwrite: bool,
    ) -> FtpResult<()> {
        let contents = std::fs::read(local_source)
            .map_err(|e| FtpError::does_not_exist(format!("local source: {}", e)))?;
        if !overwrite && self.resource_exists(target).await? {
            return Err(FtpError::already_exists(format!(
                "resource '{}' already exists",
                target
            )));
        }
        self.mutations.push(format!("STOR {}", target));
        self.files.insert(paths::canonicalize_file(target), contents);
        Ok(())
    }

    async fn download_file(&mut self, source: &str, local_target: &Path) -> FtpResult<()> {
        self.download_calls += 1;
        let contents = self
            .files
            .get(&paths::canonicalize_file(source))
            .cloned()
            .ok_or_else(|| FtpError::from_reply(550, "550 No such file"))?;
        std::fs::write(local_target, contents)
            .map_err(|e| FtpError::local_resource(format!("write local target: {}", e)))
    }

    async fn replace_file(&mut self, target: &str, local_source: &Path) -> FtpResult<()> {
        self.upload_file(target, local_source, true).await
    }

    async fn set_file_contents(&mut self, file: &str, contents: &[u8]) -> FtpResult<usize> {
        self.mutations.push(format!("STOR {}", file));
        self.files
            .insert(paths::canonicalize_file(file), contents.to_vec());
        Ok(contents.len())
    }

    async fn get_file_contents(&mut self, file: &str) -> FtpResult<Vec<u8>> {
        self.files
            .get(&paths::canonicalize_file(file))
            .cloned()
            .ok_or_else(|| FtpError::from_reply(550, "550 No such file"))
    }

    async fn get_file_size(&mut self, file: &str) -> FtpResult<u64> {
        self.files
            .get(&paths::canonicalize_file(file))
            .map(|c| c.len() as u64)
            .ok_or_else(|| FtpError::from_reply(550, "550 No such file"))
    }

    async fn get_modification_time(&mut self, resource: &str) -> FtpResult<i64> {
        if self.files.contains_key(&paths::canonicalize_file(resource)) {
            Ok(EXACT_MTIME)
        } else {
            Err(FtpError::from_reply(550, "550 MDTM unsupported here"))
        }
    }
}

fn driver_with(mock: MockFtp) -> FtpDriver<MockFtp> {
    FtpDriver::with_client(DriverConfig::default(), mock)
}

// ─── Cache behavior ──────────────────────────────────────────────────

#[tokio::test]
async fn second_listing_does_not_contact_the_server() {
    let mock = MockFtp::with_tree(&["/docs"], &[("/docs/a.txt", b"aa"), ("/docs/b.txt", b"b")]);
    let mut driver = driver_with(mock);

    let first = driver
        .files_in_folder("/docs/", &ListQuery::default())
        .await
        .unwrap();
    let second = driver
        .files_in_folder("/docs/", &ListQuery::default())
        .await
        .unwrap();

    assert_eq!(first, vec!["/docs/a.txt", "/docs/b.txt"]);
    assert_eq!(first, second);
    assert_eq!(driver.client().list_calls_for("/docs/"), 1);
}

#[tokio::test]
async fn mutation_refreshes_the_affected_folder() {
    let mock = MockFtp::with_tree(&[], &[("/old.txt", b"x")]);
    let mut driver = driver_with(mock);

    assert_eq!(
        driver.files_in_folder("/", &ListQuery::default()).await.unwrap(),
        vec!["/old.txt"]
    );

    driver.create_file("fresh.txt", "/").await.unwrap();

    // The cache was force-refreshed by the mutation; this read must not
    // trigger another fetch and still see the new file.
    let calls_after_mutation = driver.client().list_calls_for("/");
    let listing = driver.files_in_folder("/", &ListQuery::default()).await.unwrap();
    assert_eq!(listing, vec!["/fresh.txt", "/old.txt"]);
    assert_eq!(driver.client().list_calls_for("/"), calls_after_mutation);
}

#[tokio::test]
async fn single_entry_miss_forces_owning_folder_refresh() {
    let mock = MockFtp::with_tree(&["/d"], &[("/d/known.txt", b"data")]);
    let mut driver = driver_with(mock);

    let entry = driver.file_info_by_identifier("/d/known.txt").await.unwrap();
    assert_eq!(entry.identifier, "/d/known.txt");
    assert_eq!(entry.size, 4);
    assert_eq!(driver.client().list_calls_for("/d/"), 1);

    // Cached now, no further fetch.
    driver.file_info_by_identifier("/d/known.txt").await.unwrap();
    assert_eq!(driver.client().list_calls_for("/d/"), 1);

    // A miss may be stale state, so the owning folder must be re-fetched.
    let err = driver
        .file_info_by_identifier("/d/ghost.txt")
        .await
        .unwrap_err();
    assert_eq!(err.kind, FtpErrorKind::DoesNotExist);
    assert_eq!(driver.client().list_calls_for("/d/"), 2);
}

#[tokio::test]
async fn entry_metadata_is_fully_derived() {
    let mock = MockFtp::with_tree(&["/m"], &[("/m/photo.jpg", b"123456")]);
    let mut driver = driver_with(mock);

    let entry = driver.file_info_by_identifier("/m/photo.jpg").await.unwrap();
    assert_eq!(entry.name, "photo.jpg");
    assert!(!entry.is_directory);
    assert_eq!(entry.size, 6);
    assert_eq!(entry.mime_type.as_deref(), Some("image/jpeg"));
    assert_eq!(entry.mtime, LISTED_MTIME);
    assert_eq!(entry.ctime, 0);
    assert_eq!(entry.atime, 0);
    assert!(entry.mode.read && entry.mode.write);
    assert_eq!(entry.identifier_hash, paths::hash_identifier("/m/photo.jpg"));
    assert_eq!(entry.folder_hash, paths::hash_identifier("/m/"));
}

#[tokio::test]
async fn exact_modification_time_overrides_listing_but_degrades_silently() {
    let mock = MockFtp::with_tree(&["/t", "/t/sub"], &[("/t/f.txt", b"f")]);
    let config = DriverConfig {
        exact_modification_time: true,
        ..Default::default()
    };
    let mut driver = FtpDriver::with_client(config, mock);

    let snapshot = driver.fetch_folder("/t/", false).await.unwrap();
    let file = snapshot.get("/t/f.txt").unwrap();
    assert_eq!(file.mtime, EXACT_MTIME);
    // MDTM fails for folders; the listing time stays.
    let folder = snapshot.get("/t/sub/").unwrap();
    assert_eq!(folder.mtime, LISTED_MTIME);
}

#[tokio::test]
async fn folder_metadata_and_identifier_composition() {
    let mock = MockFtp::with_tree(&["/p"], &[("/p/doc.txt", b"doc")]);
    let mut driver = driver_with(mock);

    assert_eq!(driver.file_in_folder("doc.txt", "/p/"), "/p/doc.txt");
    assert_eq!(driver.folder_in_folder("sub", "/p"), "/p/sub/");
    assert!(driver.is_within("/p/", "/p/doc.txt"));
    assert!(!driver.is_within("/p/", "/q/doc.txt"));

    let info = driver.folder_info_by_identifier("/p/").await.unwrap();
    assert_eq!(info.identifier, "/p/");
    assert_eq!(info.name, "p");

    let err = driver.folder_info_by_identifier("/ghost/").await.unwrap_err();
    assert_eq!(err.kind, FtpErrorKind::DoesNotExist);

    // Folders answer the default pair; files answer their listed mode.
    let folder_mode = driver.permissions("/p/").await.unwrap();
    assert!(folder_mode.read && folder_mode.write);
    let file_mode = driver.permissions("/p/doc.txt").await.unwrap();
    assert!(file_mode.read && file_mode.write);

    assert!(driver.file_exists_in_folder("doc.txt", "/p/").await.unwrap());
    assert!(!driver.folder_exists_in_folder("doc.txt", "/p/").await.unwrap());

    assert!(!driver.is_folder_empty("/p/").await.unwrap());
}

// ─── Listing queries ─────────────────────────────────────────────────

#[tokio::test]
async fn listing_supports_paging_filter_and_recursion() {
    let mock = MockFtp::with_tree(
        &["/r", "/r/sub"],
        &[
            ("/r/a.txt", b"1"),
            ("/r/b.log", b"2"),
            ("/r/c.txt", b"3"),
            ("/r/sub/d.txt", b"4"),
        ],
    );
    let mut driver = driver_with(mock);

    let all = driver.files_in_folder("/r/", &ListQuery::default()).await.unwrap();
    assert_eq!(all, vec!["/r/a.txt", "/r/b.log", "/r/c.txt"]);

    let paged = driver
        .files_in_folder(
            "/r/",
            &ListQuery {
                start: 1,
                count: 1,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(paged, vec!["/r/b.log"]);

    let filtered = driver
        .files_in_folder(
            "/r/",
            &ListQuery {
                filter: Some("*.txt".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(filtered, vec!["/r/a.txt", "/r/c.txt"]);

    let recursive = driver
        .files_in_folder(
            "/r/",
            &ListQuery {
                recursive: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(
        recursive,
        vec!["/r/a.txt", "/r/b.log", "/r/c.txt", "/r/sub/d.txt"]
    );

    let folders = driver
        .folders_in_folder("/r/", &ListQuery::default())
        .await
        .unwrap();
    assert_eq!(folders, vec!["/r/sub/"]);

    assert_eq!(driver.count_files_in_folder("/r/", true).await.unwrap(), 4);
    assert_eq!(driver.count_folders_in_folder("/r/", false).await.unwrap(), 1);
}

#[tokio::test]
async fn listing_missing_folder_is_an_error() {
    let mut driver = driver_with(MockFtp::new());
    let err = driver
        .files_in_folder("/nope/", &ListQuery::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind, FtpErrorKind::DoesNotExist);
}

// ─── Identifier map ──────────────────────────────────────────────────

#[tokio::test]
async fn rename_folder_maps_folder_and_descendants() {
    let mock = MockFtp::with_tree(&["/a"], &[("/a/x.txt", b"x")]);
    let mut driver = driver_with(mock);

    let map = driver.rename_folder("/a/", "b").await.unwrap();

    let as_pairs: Vec<(&str, &str)> = map
        .iter()
        .map(|(o, n)| (o.as_str(), n.as_str()))
        .collect();
    assert!(as_pairs.contains(&("/a/", "/b/")));
    assert!(as_pairs.contains(&("/a/x.txt", "/b/x.txt")));
    assert_eq!(map.len(), 2);

    assert!(driver.client().has_dir("/b/"));
    assert!(!driver.client().has_dir("/a/"));
    assert!(driver.client().files.contains_key("/b/x.txt"));
}

#[tokio::test]
async fn identifier_map_lists_descendants_before_their_folder() {
    let mock = MockFtp::with_tree(
        &["/a", "/a/sub"],
        &[("/a/x.txt", b"x"), ("/a/sub/deep.txt", b"d")],
    );
    let mut driver = driver_with(mock);

    let map = driver.move_folder("/a/", "/", "moved").await.unwrap();
    let olds: Vec<&str> = map.iter().map(|(o, _)| o.as_str()).collect();

    // Each folder's pair comes after every pair beneath it.
    assert!(olds.iter().position(|&o| o == "/a/sub/deep.txt").unwrap()
        < olds.iter().position(|&o| o == "/a/sub/").unwrap());
    assert!(olds.iter().position(|&o| o == "/a/sub/").unwrap()
        < olds.iter().position(|&o| o == "/a/").unwrap());
    assert_eq!(map.len(), 4);

    assert!(driver.client().has_dir("/moved/sub/"));
    assert!(driver.client().files.contains_key("/moved/sub/deep.txt"));
}

#[tokio::test]
async fn renaming_a_file_maps_nothing_but_itself() {
    let mock = MockFtp::with_tree(&[], &[("/solo.txt", b"s")]);
    let mut driver = driver_with(mock);

    let new_identifier = driver.rename_file("/solo.txt", "renamed.txt").await.unwrap();
    assert_eq!(new_identifier, "/renamed.txt");
    assert!(driver.client().files.contains_key("/renamed.txt"));
}

// ─── Overwrite discipline ────────────────────────────────────────────

#[tokio::test]
async fn copy_folder_conflict_runs_no_mutating_command() {
    let mock = MockFtp::with_tree(&["/src", "/dst"], &[("/src/x.txt", b"x")]);
    let mut driver = driver_with(mock);

    let err = driver.copy_folder("/src/", "/", "dst").await.unwrap_err();
    assert_eq!(err.kind, FtpErrorKind::AlreadyExists);
    assert!(driver.client().mutations.is_empty());
}

#[tokio::test]
async fn copy_folder_clones_the_tree() {
    let mock = MockFtp::with_tree(
        &["/src", "/src/inner"],
        &[("/src/x.txt", b"x"), ("/src/inner/y.txt", b"y")],
    );
    let mut driver = driver_with(mock);

    let target = driver.copy_folder("/src/", "/", "dup").await.unwrap();
    assert_eq!(target, "/dup/");
    assert!(driver.client().has_dir("/dup/inner/"));
    assert!(driver.client().files.contains_key("/dup/x.txt"));
    assert!(driver.client().files.contains_key("/dup/inner/y.txt"));
    // Source intact.
    assert!(driver.client().files.contains_key("/src/x.txt"));
}

#[tokio::test]
async fn copying_a_missing_folder_is_does_not_exist() {
    let mut driver = driver_with(MockFtp::new());
    let err = driver.copy_folder("/ghost/", "/", "copy").await.unwrap_err();
    assert_eq!(err.kind, FtpErrorKind::DoesNotExist);
}

// ─── Deletion ────────────────────────────────────────────────────────

#[tokio::test]
async fn non_recursive_delete_of_nested_folder_fails_loudly() {
    let mock = MockFtp::with_tree(&["/d", "/d/inner"], &[("/d/f.txt", b"f")]);
    let mut driver = driver_with(mock);

    let err = driver.delete_folder("/d/", false).await.unwrap_err();
    assert_eq!(err.kind, FtpErrorKind::Connection);
    // Not a silent partial delete: the folder is still there.
    assert!(driver.client().has_dir("/d/"));
    assert!(driver.client().has_dir("/d/inner/"));
}

#[tokio::test]
async fn recursive_delete_clears_cache_and_tree() {
    let mock = MockFtp::with_tree(&["/d", "/d/inner"], &[("/d/inner/f.txt", b"f")]);
    let mut driver = driver_with(mock);

    driver.files_in_folder("/d/", &ListQuery::default()).await.unwrap();
    driver.delete_folder("/d/", true).await.unwrap();

    assert!(!driver.client().has_dir("/d/"));
    let err = driver
        .files_in_folder("/d/", &ListQuery::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind, FtpErrorKind::DoesNotExist);
}

// ─── Contents and temp copies ────────────────────────────────────────

#[tokio::test]
async fn contents_round_trip_and_refresh() {
    let mock = MockFtp::with_tree(&[], &[]);
    let mut driver = driver_with(mock);

    driver.set_file_contents("/c.txt", b"hello world").await.unwrap();
    assert_eq!(driver.get_file_contents("/c.txt").await.unwrap(), b"hello world");

    let entry = driver.file_info_by_identifier("/c.txt").await.unwrap();
    assert_eq!(entry.size, 11);
}

#[tokio::test]
async fn local_processing_copy_is_reused_within_the_session() {
    let mock = MockFtp::with_tree(&[], &[("/big.bin", b"payload")]);
    let mut driver = driver_with(mock);

    let first = driver.file_for_local_processing("/big.bin").await.unwrap();
    let second = driver.file_for_local_processing("/big.bin").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(driver.client().download_calls, 1);
    assert_eq!(std::fs::read(&first).unwrap(), b"payload");
}

// ─── Hashing ─────────────────────────────────────────────────────────

#[tokio::test]
async fn local_hash_fallback_digests_a_temp_copy() {
    let mock = MockFtp::with_tree(&[], &[("/h.txt", b"hello world")]);
    let mut driver = driver_with(mock);

    assert_eq!(
        driver.hash("/h.txt", "sha1").await.unwrap(),
        "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed"
    );
    assert_eq!(
        driver.hash("/h.txt", "md5").await.unwrap(),
        "5eb63bbbe01eeed093cb22bb8f5acdc3"
    );
    // Two hashes, one download: the temp copy is reused.
    assert_eq!(driver.client().download_calls, 1);
}

#[tokio::test]
async fn unknown_hash_algorithm_is_a_caller_error() {
    let mock = MockFtp::with_tree(&[], &[("/h.txt", b"x")]);
    let mut driver = driver_with(mock);

    let err = driver.hash("/h.txt", "crc32").await.unwrap_err();
    assert_eq!(err.kind, FtpErrorKind::Configuration);
    assert_eq!(driver.client().download_calls, 0);
}

// ─── Remote hash offload ─────────────────────────────────────────────

/// Minimal scripted HTTP/1.1 endpoint: serves the queued bodies in
/// order (repeating the last one) and counts requests.
async fn spawn_http(bodies: Vec<&'static str>) -> (SocketAddr, Arc<Mutex<usize>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(Mutex::new(0usize));
    let counter = hits.clone();

    tokio::spawn(async move {
        loop {
            let (mut stream, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => return,
            };
            let mut request = vec![0u8; 4096];
            let _ = stream.read(&mut request).await;

            let body = {
                let mut hits = counter.lock().await;
                let body = bodies[(*hits).min(bodies.len() - 1)];
                *hits += 1;
                body
            };
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });

    (addr, hits)
}

fn remote_config(addr: SocketAddr) -> DriverConfig {
    DriverConfig {
        public_url: format!("http://{}", addr),
        remote_service: RemoteServiceConfig {
            enable: true,
            encryption_key: "secret".into(),
            ..Default::default()
        },
        ..Default::default()
    }
}

#[tokio::test]
async fn remote_hash_answers_without_downloading() {
    let (addr, hits) = spawn_http(vec![r#"{"result":true,"hash":"cafebabe"}"#]).await;
    let mock = MockFtp::with_tree(&[], &[("/r.bin", b"irrelevant")]);
    let mut driver = FtpDriver::with_client(remote_config(addr), mock);

    assert_eq!(driver.hash("/r.bin", "sha1").await.unwrap(), "cafebabe");
    assert_eq!(*hits.lock().await, 1);
    assert_eq!(driver.client().download_calls, 0);
}

#[tokio::test]
async fn malformed_reply_redeploys_endpoint_and_retries_once() {
    let (addr, hits) = spawn_http(vec![
        "this is not json",
        r#"{"result":true,"hash":"deadbeef"}"#,
    ])
    .await;
    let mock = MockFtp::with_tree(&[], &[("/r.bin", b"irrelevant")]);
    let mut driver = FtpDriver::with_client(remote_config(addr), mock);

    assert_eq!(driver.hash("/r.bin", "sha1").await.unwrap(), "deadbeef");
    assert_eq!(*hits.lock().await, 2);

    // The endpoint was redeployed with the shared secret embedded.
    let script = driver
        .client()
        .files
        .get("/.remote-hash-service.php")
        .cloned()
        .expect("endpoint redeployed");
    let script = String::from_utf8(script).unwrap();
    assert!(script.contains(&format!("'{}'", hex_md5("secret"))));
    assert!(!script.contains("###ENCRYPTION_KEY###"));
}

#[tokio::test]
async fn second_malformed_reply_is_a_hard_error() {
    let (addr, hits) = spawn_http(vec!["broken", "still broken"]).await;
    let mock = MockFtp::with_tree(&[], &[("/r.bin", b"irrelevant")]);
    let mut driver = FtpDriver::with_client(remote_config(addr), mock);

    let err = driver.hash("/r.bin", "sha1").await.unwrap_err();
    assert_eq!(err.kind, FtpErrorKind::Connection);
    assert_eq!(*hits.lock().await, 2);
}

#[tokio::test]
async fn service_refusal_does_not_redeploy() {
    let (addr, hits) =
        spawn_http(vec![r#"{"result":false,"message":"File not found."}"#]).await;
    let mock = MockFtp::with_tree(&[], &[]);
    let mut driver = FtpDriver::with_client(remote_config(addr), mock);

    let err = driver.hash("/gone.bin", "sha1").await.unwrap_err();
    assert_eq!(err.kind, FtpErrorKind::Connection);
    assert_eq!(err.message, "File not found.");
    assert_eq!(*hits.lock().await, 1);
    assert!(driver.client().mutations.is_empty());
}

fn hex_md5(input: &str) -> String {
    use md5::{Digest, Md5};
    hex::encode(Md5::digest(input.as_bytes()))
}
