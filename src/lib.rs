//! Spatial proximity for trees of geotagged photos.
//!
//! Photos live in a lazily loaded folder tree backed by a storage
//! abstraction. Their geographic positions are reprojected into a planar
//! project frame, and per-folder axis indexes answer "which photos were taken
//! near this one" without scanning the whole tree.
//!
//! ```rust
//! use geophoto::prelude::*;
//! use std::sync::Arc;
//!
//! # futures::executor::block_on(async {
//! let storage = MemoryStorage::new()
//!     .with_file("photos", MemoryFile::new("a.jpg").spatial(Point3d::new(0.0, 0.0, 0.0)))
//!     .with_file("photos", MemoryFile::new("b.jpg").spatial(Point3d::new(3.0, 0.0, 0.0)));
//!
//! let tree = PhotoTree::builder(Arc::new(storage), "photos").build()?;
//! tree.load().await?;
//!
//! let a = tree.find_photo("photos/a.jpg").unwrap();
//! let near = a.find_neighbors(false, Some(10.0)).await;
//! assert_eq!(near[0].name(), "b.jpg");
//! # Ok::<(), geophoto::GeoPhotoError>(())
//! # }).unwrap();
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod index;
pub mod photo_tree;
pub mod proximity;
pub mod reproject;
pub mod storage;
pub mod tags;
pub mod tree;
pub mod validation;

pub use builder::PhotoTreeBuilder;
pub use config::Config;
pub use error::{GeoPhotoError, Result};
pub use photo_tree::PhotoTree;

pub use index::{Axis, AxisIndex};
pub use proximity::{Neighbor, NeighborQuery};
pub use reproject::{
    EcefFrame, FixedFrameTransform, GeoConverter, ReprojectionStats, ReprojectionStrategy,
    Reprojector,
};
pub use storage::{MemoryFile, MemoryStorage, PhotoStorage, StorageStats};
pub use tags::{
    GeoPhotoTags, GeoPhotoThumbnail, ImageTagValue, ImageTags, JsonTagExtractor, TagExtractor,
    TagStats,
};
pub use tree::{Entry, Folder, MediaFile, MediaFileBuilder, PhotoDetails};

pub use geophoto_types::convert::{ConvertedPoint, GeoCoordStatus};
pub use geophoto_types::point::{Cartographic, Point3d};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{GeoPhotoError, PhotoTree, PhotoTreeBuilder, Result};

    pub use crate::{Cartographic, ConvertedPoint, GeoCoordStatus, Point3d};

    pub use crate::{Config, Neighbor, NeighborQuery};

    pub use crate::{Entry, Folder, MediaFile};

    pub use crate::{MemoryFile, MemoryStorage, PhotoStorage};

    pub use crate::{GeoConverter, Reprojector, TagExtractor};
}
