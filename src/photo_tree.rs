//! The photo tree facade.
//!
//! Ties a root folder to its configuration, reprojection pipeline and tag
//! extractor, and exposes the passes that prepare a tree for proximity
//! queries.

use crate::builder::PhotoTreeBuilder;
use crate::config::Config;
use crate::error::Result;
use crate::proximity::{Neighbor, NeighborQuery};
use crate::reproject::{ReprojectionStats, Reprojector};
use crate::storage::PhotoStorage;
use crate::tags::{TagExtractor, TagStats, assign_geo_locations};
use crate::tree::{Entry, Folder, MediaFile};
use std::fmt;
use std::sync::Arc;

/// A tree of geotagged photos with proximity search.
///
/// The tree is prepared in three passes: `load` reads folder listings from
/// storage, `assign_geo_locations` reads each photo's geographic tags and
/// `assign_spatial_positions` projects them into the project frame. After
/// that, `find_neighbors` answers "which photos were taken near this one".
///
/// # Examples
///
/// ```rust
/// use geophoto::prelude::*;
/// use std::sync::Arc;
///
/// # async fn run() -> geophoto::Result<()> {
/// let storage = MemoryStorage::new()
///     .with_file("photos", MemoryFile::new("a.jpg").spatial(Point3d::new(0.0, 0.0, 0.0)))
///     .with_file("photos", MemoryFile::new("b.jpg").spatial(Point3d::new(3.0, 0.0, 0.0)))
///     .with_file("photos", MemoryFile::new("c.jpg").spatial(Point3d::new(200.0, 0.0, 0.0)));
///
/// let tree = PhotoTree::builder(Arc::new(storage), "photos").build()?;
/// tree.load().await?;
///
/// let a = tree.find_photo("photos/a.jpg").unwrap();
/// let near = tree.find_neighbors(&a, false, None).await;
/// assert_eq!(near.len(), 1);
/// assert_eq!(near[0].file.name(), "b.jpg");
/// # Ok(())
/// # }
/// # futures::executor::block_on(run()).unwrap();
/// ```
pub struct PhotoTree {
    root: Arc<Folder>,
    config: Config,
    reprojector: Reprojector,
    extractor: Arc<dyn TagExtractor>,
}

impl PhotoTree {
    pub(crate) fn new(
        root: Arc<Folder>,
        config: Config,
        reprojector: Reprojector,
        extractor: Arc<dyn TagExtractor>,
    ) -> Self {
        Self {
            root,
            config,
            reprojector,
            extractor,
        }
    }

    /// Start building a tree whose root folder is `root_name` in `storage`.
    pub fn builder(
        storage: Arc<dyn PhotoStorage>,
        root_name: impl Into<String>,
    ) -> PhotoTreeBuilder {
        PhotoTreeBuilder::new(storage, root_name)
    }

    pub fn root(&self) -> &Arc<Folder> {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn reprojector(&self) -> &Reprojector {
        &self.reprojector
    }

    /// Read the root listing, and every folder below it when
    /// `Config::include_subfolders` is set.
    pub async fn load(&self) -> Result<()> {
        if self.config.include_subfolders {
            self.root.load_subtree().await
        } else {
            self.root.get_contents(false).await.map(|_| ())
        }
    }

    /// Read geographic tags of every loaded photo.
    pub async fn assign_geo_locations(&self) -> TagStats {
        assign_geo_locations(
            &self.root,
            self.config.include_subfolders,
            self.extractor.as_ref(),
            self.config.tag_read_bytes,
        )
        .await
    }

    /// Derive spatial positions for every loaded photo with a geographic one.
    pub async fn assign_spatial_positions(&self) -> ReprojectionStats {
        self.reprojector
            .assign_spatial_positions(&self.root, self.config.include_subfolders)
            .await
    }

    /// Run all three passes.
    pub async fn prepare(&self) -> Result<(TagStats, ReprojectionStats)> {
        self.load().await?;
        let tags = self.assign_geo_locations().await;
        let positions = self.assign_spatial_positions().await;
        log::debug!(
            "Prepared photo tree '{}': {:?}, {:?}",
            self.root.name(),
            tags,
            positions
        );
        Ok((tags, positions))
    }

    /// Photos near `file`, nearest first, using the configured radius and
    /// same-point epsilon unless `max_distance` overrides the radius.
    pub async fn find_neighbors(
        &self,
        file: &Arc<MediaFile>,
        include_all_folders: bool,
        max_distance: Option<f64>,
    ) -> Vec<Neighbor> {
        let mut query = NeighborQuery::from(&self.config);
        if let Some(max_distance) = max_distance {
            query.max_distance = max_distance;
        }
        file.find_neighbors_with(include_all_folders, &query).await
    }

    /// Every loaded photo, in traversal order.
    pub fn photos(&self, visible_only: bool) -> Vec<Arc<MediaFile>> {
        self.root
            .collect_media(true, visible_only)
            .into_iter()
            .map(|(file, _)| file)
            .collect()
    }

    /// Look up a loaded photo by its slash-joined path, root name included.
    pub fn find_photo(&self, path: &str) -> Option<Arc<MediaFile>> {
        let mut segments = path.split('/');
        if segments.next()? != self.root.name() {
            return None;
        }

        let mut folder = self.root.clone();
        let mut segments = segments.peekable();
        while let Some(segment) = segments.next() {
            let entry = folder.contents()?.iter().find(|e| e.name() == segment)?.clone();
            match entry {
                Entry::File(file) if segments.peek().is_none() => return Some(file),
                Entry::Folder(child) => folder = child,
                Entry::File(_) => return None,
            }
        }
        None
    }
}

impl fmt::Debug for PhotoTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhotoTree")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("reprojector", &self.reprojector)
            .finish()
    }
}
