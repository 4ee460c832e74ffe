//! Photo tree builder
//!
//! Collects the storage backend, configuration and optional collaborators
//! (conversion service, fixed-frame transform, tag extractor) before the
//! tree is created.

use crate::config::Config;
use crate::error::Result;
use crate::photo_tree::PhotoTree;
use crate::reproject::{EcefFrame, FixedFrameTransform, GeoConverter, Reprojector};
use crate::storage::PhotoStorage;
use crate::tags::{JsonTagExtractor, TagExtractor};
use crate::tree::Folder;
use geophoto_types::point::Cartographic;
use std::fmt;
use std::sync::Arc;

/// Builder for a `PhotoTree` over a storage backend.
pub struct PhotoTreeBuilder {
    storage: Arc<dyn PhotoStorage>,
    root_name: String,
    create_time: String,
    config: Config,
    converter: Option<Arc<dyn GeoConverter>>,
    fixed_frame: Option<Arc<dyn FixedFrameTransform>>,
    extractor: Option<Arc<dyn TagExtractor>>,
}

impl PhotoTreeBuilder {
    /// Create a builder whose root folder is listed from `storage` under `root_name`.
    pub fn new(storage: Arc<dyn PhotoStorage>, root_name: impl Into<String>) -> Self {
        Self {
            storage,
            root_name: root_name.into(),
            create_time: String::new(),
            config: Config::default(),
            converter: None,
            fixed_frame: None,
            extractor: None,
        }
    }

    pub fn create_time(mut self, create_time: impl Into<String>) -> Self {
        self.create_time = create_time.into();
        self
    }

    /// Set the tree configuration (search radius, tag byte count, etc.).
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Use a geographic-conversion service when it answers the probe.
    pub fn converter(mut self, converter: Arc<dyn GeoConverter>) -> Self {
        self.converter = Some(converter);
        self
    }

    /// Replace the default fixed frame, which is anchored at `Config::ecef_anchor`.
    pub fn fixed_frame(mut self, fixed_frame: Arc<dyn FixedFrameTransform>) -> Self {
        self.fixed_frame = Some(fixed_frame);
        self
    }

    /// Decoder for photo headers. Defaults to `JsonTagExtractor`.
    pub fn tag_extractor(mut self, extractor: Arc<dyn TagExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Validate the configuration and create the tree. Nothing is read yet.
    pub fn build(self) -> Result<PhotoTree> {
        self.config.validate()?;

        let fixed_frame = self.fixed_frame.unwrap_or_else(|| {
            let anchor = self.config.ecef_anchor.unwrap_or_else(Cartographic::origin);
            let frame: Arc<dyn FixedFrameTransform> = Arc::new(EcefFrame::new(anchor));
            frame
        });
        let mut reprojector = Reprojector::new(fixed_frame);
        if let Some(converter) = self.converter {
            reprojector = reprojector.with_converter(converter);
        }

        let extractor = self
            .extractor
            .unwrap_or_else(|| Arc::new(JsonTagExtractor) as Arc<dyn TagExtractor>);
        let root = Folder::root(self.storage, self.root_name, self.create_time);

        Ok(PhotoTree::new(root, self.config, reprojector, extractor))
    }
}

impl fmt::Debug for PhotoTreeBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhotoTreeBuilder")
            .field("root_name", &self.root_name)
            .field("config", &self.config)
            .field("has_converter", &self.converter.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeoPhotoError;
    use crate::storage::MemoryStorage;

    fn storage() -> Arc<dyn PhotoStorage> {
        Arc::new(MemoryStorage::new())
    }

    #[test]
    fn test_builder_defaults() {
        let tree = PhotoTreeBuilder::new(storage(), "photos").build().unwrap();
        assert_eq!(tree.root().name(), "photos");
        assert_eq!(tree.config(), &Config::default());
        assert!(!tree.root().is_loaded());
    }

    #[test]
    fn test_builder_with_config() {
        let config = Config::default().with_max_distance(25.0).with_include_subfolders(false);
        let tree = PhotoTreeBuilder::new(storage(), "photos")
            .create_time("2019-05-03")
            .config(config.clone())
            .build()
            .unwrap();
        assert_eq!(tree.config(), &config);
        assert_eq!(tree.root().create_time(), "2019-05-03");
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let config = Config::default().with_max_distance(-1.0);
        let err = PhotoTreeBuilder::new(storage(), "photos").config(config).build().unwrap_err();
        assert!(matches!(err, GeoPhotoError::InvalidConfig(_)));
    }
}
