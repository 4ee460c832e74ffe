//! # geophoto-types
//!
//! Coordinate types shared between the geophoto tree, its index and the
//! reprojection pipeline.
//!
//! - **Geographic positions**: `Cartographic` (longitude/latitude in degrees, height in meters)
//! - **Projected positions**: `Point3d` (planar x/y plus height in the project frame)
//! - **Conversion results**: `GeoCoordStatus`, `ConvertedPoint`
//!
//! All types are serializable with Serde and built on top of the `geo` crate's
//! point primitive.
//!
//! ## Examples
//!
//! ```rust
//! use geophoto_types::point::{Cartographic, Point3d};
//!
//! let camera = Cartographic::new(-75.1652, 39.9526, 12.0);
//! assert!(camera.is_finite());
//!
//! let spatial = Point3d::new(3.0, 4.0, 0.0);
//! assert_eq!(spatial.distance_2d(&Point3d::new(0.0, 0.0, 7.0)), 5.0);
//! ```

pub mod convert;
pub mod point;

pub use convert::{ConvertedPoint, GeoCoordStatus};
pub use point::{Cartographic, Point3d};
