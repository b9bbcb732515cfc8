//! Per-folder listing cache.
//!
//! One snapshot per folder identifier, valid only as a whole: a refresh
//! replaces the entire snapshot, never merges into it, so the cache can
//! never mix stale and fresh entries. The cache is private to its
//! owning driver/session: no locking, no sharing.

use crate::vfs::entry::ResourceEntry;
use std::collections::HashMap;
use std::sync::Arc;

/// Immutable listing of one folder.
#[derive(Debug, Default)]
pub struct FolderSnapshot {
    entries: Vec<ResourceEntry>,
}

impl FolderSnapshot {
    pub fn new(entries: Vec<ResourceEntry>) -> Self {
        Self { entries }
    }

    pub fn get(&self, identifier: &str) -> Option<&ResourceEntry> {
        self.entries.iter().find(|e| e.identifier == identifier)
    }

    pub fn entries(&self) -> &[ResourceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Folder identifier → snapshot.
#[derive(Debug, Default)]
pub struct DirectoryCache {
    folders: HashMap<String, Arc<FolderSnapshot>>,
}

impl DirectoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, folder: &str) -> Option<Arc<FolderSnapshot>> {
        self.folders.get(folder).cloned()
    }

    /// Replace the snapshot for `folder` wholesale.
    pub fn insert(&mut self, folder: String, snapshot: FolderSnapshot) -> Arc<FolderSnapshot> {
        let snapshot = Arc::new(snapshot);
        self.folders.insert(folder, snapshot.clone());
        snapshot
    }

    /// Drop the snapshot for one folder.
    pub fn invalidate(&mut self, folder: &str) {
        self.folders.remove(folder);
    }

    /// Drop the snapshots of a folder and everything below it. Used
    /// when a subtree's identifiers stop being valid (rename, move,
    /// delete).
    pub fn invalidate_subtree(&mut self, folder: &str) {
        self.folders
            .retain(|cached, _| !cached.starts_with(folder));
    }

    pub fn clear(&mut self) {
        self.folders.clear();
    }
}
