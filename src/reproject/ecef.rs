//! Fixed earth-centered transform used when no conversion service is available.
//!
//! Positions go from WGS84 geodetic coordinates to earth-centered earth-fixed
//! (ECEF) coordinates, then into a local east-north-up frame tangent to the
//! ellipsoid at the anchor.

use crate::error::{GeoPhotoError, Result};
use geophoto_types::point::{Cartographic, Point3d};

/// WGS84 semi-major axis in meters.
pub const WGS84_SEMI_MAJOR_AXIS: f64 = 6_378_137.0;
/// WGS84 flattening.
pub const WGS84_FLATTENING: f64 = 1.0 / 298.257_223_563;

const WGS84_ECCENTRICITY_SQ: f64 = WGS84_FLATTENING * (2.0 - WGS84_FLATTENING);

/// Earth-centered earth-fixed coordinates of a WGS84 position.
pub fn geodetic_to_ecef(position: &Cartographic) -> Point3d {
    let (sin_lat, cos_lat) = position.latitude_radians().sin_cos();
    let (sin_lon, cos_lon) = position.longitude_radians().sin_cos();

    // Prime vertical radius of curvature.
    let n = WGS84_SEMI_MAJOR_AXIS / (1.0 - WGS84_ECCENTRICITY_SQ * sin_lat * sin_lat).sqrt();
    let h = position.height;

    Point3d::new(
        (n + h) * cos_lat * cos_lon,
        (n + h) * cos_lat * sin_lon,
        (n * (1.0 - WGS84_ECCENTRICITY_SQ) + h) * sin_lat,
    )
}

/// Converts a single geographic position into the project frame.
pub trait FixedFrameTransform: Send + Sync {
    fn to_spatial(&self, position: &Cartographic) -> Result<Point3d>;
}

/// East-north-up frame anchored at a geographic position.
///
/// x points east, y north and z up, in meters from the anchor, plus a
/// constant offset for projects whose origin is not the anchor itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EcefFrame {
    anchor: Cartographic,
    anchor_ecef: Point3d,
    offset: Point3d,
}

impl EcefFrame {
    pub fn new(anchor: Cartographic) -> Self {
        Self {
            anchor,
            anchor_ecef: geodetic_to_ecef(&anchor),
            offset: Point3d::new(0.0, 0.0, 0.0),
        }
    }

    /// Shift every transformed position by `offset`.
    pub fn with_offset(mut self, offset: Point3d) -> Self {
        self.offset = offset;
        self
    }

    pub fn anchor(&self) -> Cartographic {
        self.anchor
    }
}

impl Default for EcefFrame {
    fn default() -> Self {
        Self::new(Cartographic::origin())
    }
}

impl FixedFrameTransform for EcefFrame {
    fn to_spatial(&self, position: &Cartographic) -> Result<Point3d> {
        if !position.is_finite() {
            return Err(GeoPhotoError::Conversion(format!(
                "non-finite position ({}, {}, {})",
                position.longitude, position.latitude, position.height
            )));
        }

        let ecef = geodetic_to_ecef(position);
        let dx = ecef.x() - self.anchor_ecef.x();
        let dy = ecef.y() - self.anchor_ecef.y();
        let dz = ecef.z() - self.anchor_ecef.z();

        let (sin_lat, cos_lat) = self.anchor.latitude_radians().sin_cos();
        let (sin_lon, cos_lon) = self.anchor.longitude_radians().sin_cos();

        let east = -sin_lon * dx + cos_lon * dy;
        let north = -sin_lat * cos_lon * dx - sin_lat * sin_lon * dy + cos_lat * dz;
        let up = cos_lat * cos_lon * dx + cos_lat * sin_lon * dy + sin_lat * dz;

        Ok(Point3d::new(
            east + self.offset.x(),
            north + self.offset.y(),
            up + self.offset.z(),
        ))
    }
}
