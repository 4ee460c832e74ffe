use super::{EntryInfo, Folder};
use crate::error::{GeoPhotoError, Result};
use crate::storage::PhotoStorage;
use crate::tags::{GeoPhotoTags, GeoPhotoThumbnail};
use bytes::Bytes;
use geophoto_types::point::{Cartographic, Point3d};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Attributes read from a photo's tags that play no part in indexing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotoDetails {
    /// Camera heading in degrees.
    pub track: Option<f64>,
    /// Capture date, milliseconds since the Unix epoch.
    pub taken_time: Option<i64>,
    pub probably_pano: Option<bool>,
    pub thumbnail: Option<GeoPhotoThumbnail>,
}

/// A geotagged photo.
///
/// The geographic position comes from the photo's tags; the spatial position
/// is derived from it by the reprojection pipeline. Only photos with a
/// spatial position take part in proximity queries.
pub struct MediaFile {
    info: EntryInfo,
    storage: Arc<dyn PhotoStorage>,
    geo_location: RwLock<Option<Cartographic>>,
    spatial: RwLock<Option<Point3d>>,
    details: RwLock<PhotoDetails>,
    visited: AtomicBool,
}

impl MediaFile {
    /// Start building a photo that lives in `parent`.
    pub fn builder(parent: &Arc<Folder>, name: impl Into<String>) -> MediaFileBuilder {
        MediaFileBuilder {
            parent: parent.clone(),
            name: name.into(),
            create_time: String::new(),
            geo_location: None,
            spatial: None,
            details: PhotoDetails::default(),
        }
    }

    pub(crate) fn info(&self) -> &EntryInfo {
        &self.info
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

    /// The root of the tree this photo belongs to.
    pub fn root_folder(&self) -> Option<Arc<Folder>> {
        self.parent().map(|parent| parent.root_folder())
    }

    pub fn path(&self) -> String {
        self.info.path()
    }

    pub fn geo_location(&self) -> Option<Cartographic> {
        *self.geo_location.read()
    }

    pub fn set_geo_location(&self, geo_location: Option<Cartographic>) {
        *self.geo_location.write() = geo_location;
    }

    pub fn spatial(&self) -> Option<Point3d> {
        *self.spatial.read()
    }

    pub fn set_spatial(&self, spatial: Option<Point3d>) {
        *self.spatial.write() = spatial;
    }

    pub fn details(&self) -> PhotoDetails {
        self.details.read().clone()
    }

    pub fn track(&self) -> Option<f64> {
        self.details.read().track
    }

    pub fn taken_time(&self) -> Option<i64> {
        self.details.read().taken_time
    }

    pub fn probably_pano(&self) -> Option<bool> {
        self.details.read().probably_pano
    }

    /// Whether the photo should be shown as a panorama; `false` when unknown.
    pub fn is_panorama(&self) -> bool {
        self.probably_pano().unwrap_or(false)
    }

    pub fn thumbnail(&self) -> Option<GeoPhotoThumbnail> {
        self.details.read().thumbnail.clone()
    }

    pub fn visited(&self) -> bool {
        self.visited.load(Ordering::Relaxed)
    }

    pub fn set_visited(&self, visited: bool) {
        self.visited.store(visited, Ordering::Relaxed);
    }

    /// Store the position and attributes extracted from the photo's tags.
    ///
    /// The spatial position is left alone; rerun the reprojection pipeline
    /// to derive it from the new geographic position.
    pub fn apply_tags(&self, tags: &GeoPhotoTags) {
        *self.geo_location.write() = Some(tags.geo_location);
        let mut details = self.details.write();
        details.track = Some(tags.track);
        details.taken_time = Some(tags.taken_time);
        details.probably_pano = Some(tags.probably_pano);
        details.thumbnail = tags.thumbnail.clone();
    }

    /// Read the photo, or only its first `byte_count` bytes, from storage.
    pub async fn file_contents(&self, byte_count: Option<usize>) -> Result<Bytes> {
        self.storage.file_contents(self, byte_count).await
    }

    pub(crate) fn require_parent(&self) -> Result<Arc<Folder>> {
        self.parent()
            .ok_or_else(|| GeoPhotoError::FolderGone(self.name().to_string()))
    }
}

impl fmt::Debug for MediaFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaFile")
            .field("name", &self.name())
            .field("geo_location", &self.geo_location())
            .field("spatial", &self.spatial())
            .field("visible", &self.visible())
            .finish()
    }
}

/// Builder for `MediaFile`, used by storage backends while listing a folder.
#[derive(Debug)]
pub struct MediaFileBuilder {
    parent: Arc<Folder>,
    name: String,
    create_time: String,
    geo_location: Option<Cartographic>,
    spatial: Option<Point3d>,
    details: PhotoDetails,
}

impl MediaFileBuilder {
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

    pub fn track(mut self, track: f64) -> Self {
        self.details.track = Some(track);
        self
    }

    pub fn taken_time(mut self, taken_time: i64) -> Self {
        self.details.taken_time = Some(taken_time);
        self
    }

    pub fn probably_pano(mut self, probably_pano: bool) -> Self {
        self.details.probably_pano = Some(probably_pano);
        self
    }

    pub fn build(self) -> Arc<MediaFile> {
        Arc::new(MediaFile {
            info: EntryInfo::new(self.name, self.create_time, Arc::downgrade(&self.parent)),
            storage: self.parent.storage().clone(),
            geo_location: RwLock::new(self.geo_location),
            spatial: RwLock::new(self.spatial),
            details: RwLock::new(self.details),
            visited: AtomicBool::new(false),
        })
    }
}
