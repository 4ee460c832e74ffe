use super::{Entry, EntryInfo, MediaFile};
use crate::error::Result;
use crate::index::{Axis, AxisIndex, AxisIndexCache};
use crate::storage::PhotoStorage;
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Weak};
use tokio::sync::OnceCell;

/// A folder of the photo tree.
///
/// Contents are read from storage on first access and cached for the life of
/// the folder. Axis indexes over the folder's photos are built lazily per
/// (axis, scope) and cached the same way; neither cache is invalidated.
pub struct Folder {
    info: EntryInfo,
    storage: Arc<dyn PhotoStorage>,
    entries: OnceCell<Vec<Entry>>,
    indexes: AxisIndexCache,
}

impl Folder {
    /// Create the root folder of a tree. Contents are not read yet.
    pub fn root(
        storage: Arc<dyn PhotoStorage>,
        name: impl Into<String>,
        create_time: impl Into<String>,
    ) -> Arc<Folder> {
        Arc::new(Self {
            info: EntryInfo::new(name.into(), create_time.into(), Weak::new()),
            storage,
            entries: OnceCell::new(),
            indexes: AxisIndexCache::default(),
        })
    }

    /// Create a subfolder of `parent`, sharing its storage.
    pub fn new_child(
        parent: &Arc<Folder>,
        name: impl Into<String>,
        create_time: impl Into<String>,
    ) -> Arc<Folder> {
        Arc::new(Self {
            info: EntryInfo::new(name.into(), create_time.into(), Arc::downgrade(parent)),
            storage: parent.storage.clone(),
            entries: OnceCell::new(),
            indexes: AxisIndexCache::default(),
        })
    }

    pub(crate) fn info(&self) -> &EntryInfo {
        &self.info
    }

    pub(crate) fn storage(&self) -> &Arc<dyn PhotoStorage> {
        &self.storage
    }

    pub fn name(&self) -> &str {
        self.info.name()
    }

    pub fn create_time(&self) -> &str {
        self.info.create_time()
    }

    pub fn visible(&self) -> bool {
        self.info.visible()
    }

    pub fn set_visible(&self, visible: bool) {
        self.info.set_visible(visible);
    }

    pub fn parent(&self) -> Option<Arc<Folder>> {
        self.info.parent()
    }

    pub fn is_root(&self) -> bool {
        self.parent().is_none()
    }

    /// Slash-joined names from the root down to this folder.
    pub fn path(&self) -> String {
        self.info.path()
    }

    /// The topmost folder reachable through parent links.
    pub fn root_folder(self: &Arc<Self>) -> Arc<Folder> {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// Read this folder's contents, loading them from storage on first use.
    ///
    /// Concurrent callers share a single storage request. A failed load is
    /// not cached: the error goes to every waiting caller and the next call
    /// tries again.
    pub async fn get_contents(self: &Arc<Self>, include_subfolders: bool) -> Result<&[Entry]> {
        let entries = self
            .entries
            .get_or_try_init(|| async {
                log::debug!("Reading contents of folder '{}'", self.path());
                self.storage
                    .read_folder_contents(self, include_subfolders)
                    .await
            })
            .await?;
        Ok(entries.as_slice())
    }

    /// Contents if they have been loaded, without touching storage.
    pub fn contents(&self) -> Option<&[Entry]> {
        self.entries.get().map(Vec::as_slice)
    }

    pub fn is_loaded(&self) -> bool {
        self.entries.initialized()
    }

    /// Load this folder and every folder below it.
    pub fn load_subtree(self: &Arc<Self>) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let entries = self.get_contents(true).await?;
            for entry in entries {
                if let Entry::Folder(folder) = entry {
                    folder.load_subtree().await?;
                }
            }
            Ok(())
        })
    }

    /// Number of photos directly in this folder (0 until loaded).
    pub fn photo_count(&self) -> usize {
        self.contents()
            .map(|entries| entries.iter().filter(|e| !e.is_folder()).count())
            .unwrap_or(0)
    }

    /// Photos in traversal order, each paired with its containing folder.
    ///
    /// A folder's own photos come before anything from its subfolders. With
    /// `visible_only`, hidden photos are skipped and a hidden folder hides
    /// its whole subtree. Only loaded folders contribute.
    pub fn collect_media(
        self: &Arc<Self>,
        include_subfolders: bool,
        visible_only: bool,
    ) -> Vec<(Arc<MediaFile>, Arc<Folder>)> {
        let mut out = Vec::new();
        self.collect_media_into(include_subfolders, visible_only, &mut out);
        out
    }

    fn collect_media_into(
        self: &Arc<Self>,
        include_subfolders: bool,
        visible_only: bool,
        out: &mut Vec<(Arc<MediaFile>, Arc<Folder>)>,
    ) {
        let Some(entries) = self.contents() else {
            return;
        };

        for entry in entries {
            if let Entry::File(file) = entry
                && (!visible_only || file.visible())
            {
                out.push((file.clone(), self.clone()));
            }
        }

        if !include_subfolders {
            return;
        }

        for entry in entries {
            if let Entry::Folder(folder) = entry
                && (!visible_only || folder.visible())
            {
                folder.collect_media_into(true, visible_only, out);
            }
        }
    }

    /// Visit each photo in traversal order, awaiting the visitor between photos.
    ///
    /// The first visitor error stops the traversal and is returned.
    pub async fn traverse_media<F, Fut>(
        self: &Arc<Self>,
        mut visitor: F,
        include_subfolders: bool,
        visible_only: bool,
    ) -> Result<()>
    where
        F: FnMut(Arc<MediaFile>, Arc<Folder>) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        for (file, folder) in self.collect_media(include_subfolders, visible_only) {
            visitor(file, folder).await?;
        }
        Ok(())
    }

    /// Visit each subfolder, calling `visitor(folder, parent)`.
    ///
    /// All direct subfolders are visited before descending into the first
    /// of them. Visibility is handled as in `collect_media`.
    pub fn traverse_folders<F>(
        self: &Arc<Self>,
        mut visitor: F,
        include_subfolders: bool,
        visible_only: bool,
    ) where
        F: FnMut(&Arc<Folder>, &Arc<Folder>),
    {
        self.traverse_folders_with(&mut visitor, include_subfolders, visible_only);
    }

    fn traverse_folders_with<F>(
        self: &Arc<Self>,
        visitor: &mut F,
        include_subfolders: bool,
        visible_only: bool,
    ) where
        F: FnMut(&Arc<Folder>, &Arc<Folder>),
    {
        let Some(entries) = self.contents() else {
            return;
        };

        let subfolders = entries
            .iter()
            .filter_map(Entry::as_folder)
            .filter(|folder| !visible_only || folder.visible());

        for folder in subfolders.clone() {
            visitor(folder, self);
        }

        if !include_subfolders {
            return;
        }

        for folder in subfolders {
            folder.traverse_folders_with(visitor, true, visible_only);
        }
    }

    /// The index of this folder's visible, positioned photos sorted on `axis`.
    ///
    /// Built on first request for each (axis, scope) pair and cached. A
    /// concurrent caller waits for the build in progress instead of starting
    /// another one.
    pub async fn axis_index(
        self: &Arc<Self>,
        axis: Axis,
        include_subfolders: bool,
    ) -> Arc<AxisIndex> {
        self.indexes
            .cell(axis, include_subfolders)
            .get_or_init(|| async {
                self.indexes.record_build();
                let files = self
                    .collect_media(include_subfolders, true)
                    .into_iter()
                    .map(|(file, _)| file);
                let index = AxisIndex::from_files(axis, files);
                log::debug!(
                    "Built {:?} index for '{}' (subfolders: {}) with {} photos",
                    axis,
                    self.path(),
                    include_subfolders,
                    index.len()
                );
                Arc::new(index)
            })
            .await
            .clone()
    }

    /// How many axis indexes this folder has built so far.
    pub fn index_build_count(&self) -> usize {
        self.indexes.build_count()
    }
}

impl fmt::Debug for Folder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Folder")
            .field("name", &self.name())
            .field("visible", &self.visible())
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
