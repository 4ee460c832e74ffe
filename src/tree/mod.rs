//! The photo tree: folders and the geotagged photos they contain.
//!
//! Folders own their children through `Arc`; every entry points back to its
//! folder through a `Weak`, so dropping the root releases the whole tree.
//! `Entry` is a closed sum type, traversal code matches on it exhaustively.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

mod folder;
mod media;

pub use folder::Folder;
pub use media::{MediaFile, MediaFileBuilder, PhotoDetails};

/// A node of the photo tree.
#[derive(Debug, Clone)]
pub enum Entry {
    Folder(Arc<Folder>),
    File(Arc<MediaFile>),
}

impl Entry {
    pub fn name(&self) -> &str {
        self.info().name()
    }

    pub fn create_time(&self) -> &str {
        self.info().create_time()
    }

    pub fn visible(&self) -> bool {
        self.info().visible()
    }

    pub fn set_visible(&self, visible: bool) {
        self.info().set_visible(visible);
    }

    /// The folder containing this entry, `None` for the root or a dropped parent.
    pub fn parent(&self) -> Option<Arc<Folder>> {
        self.info().parent()
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, Entry::Folder(_))
    }

    pub fn as_folder(&self) -> Option<&Arc<Folder>> {
        match self {
            Entry::Folder(folder) => Some(folder),
            Entry::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&Arc<MediaFile>> {
        match self {
            Entry::File(file) => Some(file),
            Entry::Folder(_) => None,
        }
    }

    fn info(&self) -> &EntryInfo {
        match self {
            Entry::Folder(folder) => folder.info(),
            Entry::File(file) => file.info(),
        }
    }
}

impl From<Arc<Folder>> for Entry {
    fn from(folder: Arc<Folder>) -> Self {
        Entry::Folder(folder)
    }
}

impl From<Arc<MediaFile>> for Entry {
    fn from(file: Arc<MediaFile>) -> Self {
        Entry::File(file)
    }
}

/// State shared by folders and photos.
#[derive(Debug)]
pub(crate) struct EntryInfo {
    name: String,
    create_time: String,
    visible: AtomicBool,
    parent: Weak<Folder>,
}

impl EntryInfo {
    pub(crate) fn new(name: String, create_time: String, parent: Weak<Folder>) -> Self {
        Self {
            name,
            create_time,
            visible: AtomicBool::new(true),
            parent,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn create_time(&self) -> &str {
        &self.create_time
    }

    pub(crate) fn visible(&self) -> bool {
        self.visible.load(Ordering::Relaxed)
    }

    pub(crate) fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::Relaxed);
    }

    pub(crate) fn parent(&self) -> Option<Arc<Folder>> {
        self.parent.upgrade()
    }

    /// Slash-joined names from the root down to this entry.
    pub(crate) fn path(&self) -> String {
        match self.parent() {
            Some(parent) => format!("{}/{}", parent.path(), self.name),
            None => self.name.clone(),
        }
    }
}
