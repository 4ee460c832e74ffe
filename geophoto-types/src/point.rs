use geo::Point;
use serde::{Deserialize, Serialize};

/// A geographic position as read from a photo's GPS tags.
///
/// Longitude and latitude are stored in decimal degrees, height in meters
/// above the ellipsoid.
///
/// # Examples
///
/// ```
/// use geophoto_types::point::Cartographic;
///
/// let origin = Cartographic::origin();
/// assert_eq!(origin.longitude, 0.0);
///
/// let philly = Cartographic::new(-75.1652, 39.9526, 12.0);
/// assert!((philly.latitude_radians() - 39.9526_f64.to_radians()).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cartographic {
    /// Longitude in degrees, positive east.
    pub longitude: f64,
    /// Latitude in degrees, positive north.
    pub latitude: f64,
    /// Height in meters.
    pub height: f64,
}

impl Cartographic {
    pub fn new(longitude: f64, latitude: f64, height: f64) -> Self {
        Self {
            longitude,
            latitude,
            height,
        }
    }

    /// The (0, 0, 0) position, used to probe conversion services.
    pub fn origin() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn longitude_radians(&self) -> f64 {
        self.longitude.to_radians()
    }

    pub fn latitude_radians(&self) -> f64 {
        self.latitude.to_radians()
    }

    /// All three components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.longitude.is_finite() && self.latitude.is_finite() && self.height.is_finite()
    }

    /// The horizontal part as a `geo::Point` (x = longitude, y = latitude).
    pub fn to_point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

/// A projected position in the project's local spatial coordinate system.
///
/// The planar axes are `x` and `y`; `z` carries the height. Proximity
/// queries only look at the planar part.
///
/// # Examples
///
/// ```
/// use geophoto_types::point::Point3d;
///
/// let a = Point3d::new(0.0, 0.0, 10.0);
/// let b = Point3d::new(3.0, 4.0, 50.0);
/// assert_eq!(a.distance_squared_2d(&b), 25.0);
/// assert_eq!(a.distance_2d(&b), 5.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3d {
    /// The planar position.
    pub point: Point<f64>,
    /// Height in the project frame.
    pub z: f64,
}

impl Point3d {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            point: Point::new(x, y),
            z,
        }
    }

    /// Create a 3D point from a planar point and a height.
    pub fn from_point_and_height(point: Point<f64>, z: f64) -> Self {
        Self { point, z }
    }

    pub fn x(&self) -> f64 {
        self.point.x()
    }

    pub fn y(&self) -> f64 {
        self.point.y()
    }

    pub fn z(&self) -> f64 {
        self.z
    }

    /// Project this point to 2D by discarding the height.
    pub fn to_2d(&self) -> Point<f64> {
        self.point
    }

    /// Squared planar distance, ignoring height.
    #[inline]
    pub fn distance_squared_2d(&self, other: &Point3d) -> f64 {
        let dx = self.x() - other.x();
        let dy = self.y() - other.y();
        dx * dx + dy * dy
    }

    /// Planar distance, ignoring height.
    #[inline]
    pub fn distance_2d(&self, other: &Point3d) -> f64 {
        self.distance_squared_2d(other).sqrt()
    }

    /// Straight-line distance including the height difference.
    pub fn distance_3d(&self, other: &Point3d) -> f64 {
        let dz = self.z - other.z;
        (self.distance_squared_2d(other) + dz * dz).sqrt()
    }
}
