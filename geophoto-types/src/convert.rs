use crate::point::Point3d;
use serde::{Deserialize, Serialize};

/// Per-point outcome reported by a geographic-conversion service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoCoordStatus {
    /// The point was converted.
    Success,
    /// The point lies outside the projection's useful range, but the result is usable.
    OutOfUsefulRange,
    /// The project has no geographic coordinate system defined.
    NoGcsDefined,
    /// Any other service-side failure for this point.
    OtherError,
}

impl GeoCoordStatus {
    /// Whether a point reported with this status carries a usable position.
    pub fn is_usable(self) -> bool {
        matches!(self, GeoCoordStatus::Success | GeoCoordStatus::OutOfUsefulRange)
    }
}

/// One entry of a conversion response, positionally matching the request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvertedPoint {
    pub status: GeoCoordStatus,
    pub point: Point3d,
}

impl ConvertedPoint {
    pub fn new(status: GeoCoordStatus, point: Point3d) -> Self {
        Self { status, point }
    }

    pub fn success(point: Point3d) -> Self {
        Self::new(GeoCoordStatus::Success, point)
    }

    /// The converted position, if the status says it can be used.
    pub fn usable_point(&self) -> Option<Point3d> {
        self.status.is_usable().then_some(self.point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usable_statuses() {
        assert!(GeoCoordStatus::Success.is_usable());
        assert!(GeoCoordStatus::OutOfUsefulRange.is_usable());
        assert!(!GeoCoordStatus::NoGcsDefined.is_usable());
        assert!(!GeoCoordStatus::OtherError.is_usable());
    }

    #[test]
    fn test_usable_point() {
        let p = Point3d::new(1.0, 2.0, 3.0);
        assert_eq!(ConvertedPoint::success(p).usable_point(), Some(p));
        assert_eq!(
            ConvertedPoint::new(GeoCoordStatus::NoGcsDefined, p).usable_point(),
            None
        );
    }

    #[test]
    fn test_status_serde_names() {
        let json = serde_json::to_string(&GeoCoordStatus::OutOfUsefulRange).unwrap();
        assert_eq!(json, "\"out_of_useful_range\"");
    }
}
