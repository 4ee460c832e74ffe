//! Storage backend abstraction for photo trees
//!
//! The tree never touches a filesystem, a blob store or a web service
//! directly. It asks a `PhotoStorage` implementation to list a folder and to
//! read a file's leading bytes, and caches what it gets back. Implementations
//! must therefore be stable: listing the same folder twice without an
//! underlying change has to return equivalent content.

use crate::error::{GeoPhotoError, Result};
use crate::tree::{Entry, Folder, MediaFile};
use async_trait::async_trait;
use bytes::Bytes;
use geophoto_types::point::{Cartographic, Point3d};
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Trait for photo storage implementations
#[async_trait]
pub trait PhotoStorage: Send + Sync {
    /// List the subfolders and photos of `folder`.
    ///
    /// Child entries must be created with `folder` as their parent
    /// (`Folder::new_child`, `MediaFile::builder`). `include_subfolders` is a
    /// hint that the caller is about to descend; backends that can list a
    /// whole subtree cheaply may use it, others can ignore it.
    async fn read_folder_contents(
        &self,
        folder: &Arc<Folder>,
        include_subfolders: bool,
    ) -> Result<Vec<Entry>>;

    /// Read the contents of a photo, or only its first `byte_count` bytes.
    async fn file_contents(&self, file: &MediaFile, byte_count: Option<usize>) -> Result<Bytes>;
}

/// A photo held by `MemoryStorage`.
#[derive(Debug, Clone, Default)]
pub struct MemoryFile {
    pub name: String,
    pub create_time: String,
    pub geo_location: Option<Cartographic>,
    pub spatial: Option<Point3d>,
    pub contents: Bytes,
}

impl MemoryFile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn create_time(mut self, create_time: impl Into<String>) -> Self {
        self.create_time = create_time.into();
        self
    }

    pub fn geo_location(mut self, geo_location: Cartographic) -> Self {
        self.geo_location = Some(geo_location);
        self
    }

    pub fn spatial(mut self, spatial: Point3d) -> Self {
        self.spatial = Some(spatial);
        self
    }

    pub fn contents(mut self, contents: impl Into<Bytes>) -> Self {
        self.contents = contents.into();
        self
    }
}

#[derive(Debug, Clone)]
enum MemoryNode {
    Folder { name: String, create_time: String },
    File(MemoryFile),
}

/// Storage backend statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageStats {
    /// Number of folder listings served
    pub folder_reads: usize,
    /// Number of file reads served
    pub file_reads: usize,
}

/// In-memory storage backend keyed by folder path.
///
/// Folder paths are the slash-joined names from the root folder, e.g.
/// `"photos/2019/alps"`. Listings only return direct children; deeper
/// folders are listed when the tree asks for them.
///
/// ```rust
/// use geophoto::storage::{MemoryFile, MemoryStorage};
/// use geophoto_types::point::Point3d;
///
/// let storage = MemoryStorage::new()
///     .with_folder("photos", "2019")
///     .with_file("photos", MemoryFile::new("a.jpg").spatial(Point3d::new(0.0, 0.0, 0.0)))
///     .with_file("photos/2019", MemoryFile::new("b.jpg"));
/// assert_eq!(storage.stats().folder_reads, 0);
/// ```
#[derive(Debug, Default)]
pub struct MemoryStorage {
    nodes: FxHashMap<String, Vec<MemoryNode>>,
    failing: FxHashSet<String>,
    folder_reads: AtomicUsize,
    file_reads: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subfolder named `name` under the folder at `parent_path`.
    pub fn with_folder(self, parent_path: &str, name: &str) -> Self {
        self.with_folder_created(parent_path, name, "")
    }

    pub fn with_folder_created(mut self, parent_path: &str, name: &str, create_time: &str) -> Self {
        self.nodes
            .entry(parent_path.to_string())
            .or_default()
            .push(MemoryNode::Folder {
                name: name.to_string(),
                create_time: create_time.to_string(),
            });
        self
    }

    /// Add a photo under the folder at `parent_path`.
    pub fn with_file(mut self, parent_path: &str, file: MemoryFile) -> Self {
        self.nodes
            .entry(parent_path.to_string())
            .or_default()
            .push(MemoryNode::File(file));
        self
    }

    /// Make every listing of `path` fail, to exercise error propagation.
    pub fn with_failing_folder(mut self, path: &str) -> Self {
        self.failing.insert(path.to_string());
        self
    }

    pub fn stats(&self) -> StorageStats {
        StorageStats {
            folder_reads: self.folder_reads.load(Ordering::Relaxed),
            file_reads: self.file_reads.load(Ordering::Relaxed),
        }
    }

    fn find_file(&self, path: &str, name: &str) -> Option<&MemoryFile> {
        self.nodes.get(path)?.iter().find_map(|node| match node {
            MemoryNode::File(file) if file.name == name => Some(file),
            _ => None,
        })
    }
}

#[async_trait]
impl PhotoStorage for MemoryStorage {
    async fn read_folder_contents(
        &self,
        folder: &Arc<Folder>,
        _include_subfolders: bool,
    ) -> Result<Vec<Entry>> {
        self.folder_reads.fetch_add(1, Ordering::Relaxed);

        let path = folder.path();
        if self.failing.contains(&path) {
            return Err(GeoPhotoError::storage(path, "folder listing failed"));
        }

        let Some(nodes) = self.nodes.get(&path) else {
            return Ok(Vec::new());
        };

        let entries = nodes
            .iter()
            .map(|node| match node {
                MemoryNode::Folder { name, create_time } => {
                    Entry::Folder(Folder::new_child(folder, name.clone(), create_time.clone()))
                }
                MemoryNode::File(file) => {
                    let mut builder = MediaFile::builder(folder, file.name.clone())
                        .create_time(file.create_time.clone());
                    if let Some(geo) = file.geo_location {
                        builder = builder.geo_location(geo);
                    }
                    if let Some(spatial) = file.spatial {
                        builder = builder.spatial(spatial);
                    }
                    Entry::File(builder.build())
                }
            })
            .collect();

        Ok(entries)
    }

    async fn file_contents(&self, file: &MediaFile, byte_count: Option<usize>) -> Result<Bytes> {
        self.file_reads.fetch_add(1, Ordering::Relaxed);

        let path = file.require_parent()?.path();
        let stored = self
            .find_file(&path, file.name())
            .ok_or_else(|| GeoPhotoError::storage(file.path(), "file not found"))?;

        let contents = match byte_count {
            Some(count) if count < stored.contents.len() => stored.contents.slice(..count),
            _ => stored.contents.clone(),
        };
        Ok(contents)
    }
}
