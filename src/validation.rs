//! Validation for geographic positions read from photo tags.

use crate::error::{GeoPhotoError, Result};
use geophoto_types::point::Cartographic;

/// Lowest accepted height, in meters (Mariana Trench).
pub const MIN_HEIGHT: f64 = -11_000.0;

/// Highest accepted height, in meters (Kármán line).
pub const MAX_HEIGHT: f64 = 100_000.0;

/// Validates the horizontal part of a geographic position.
///
/// Longitude: [-180.0, 180.0], Latitude: [-90.0, 90.0]
///
/// # Examples
///
/// ```
/// use geophoto::validation::validate_lon_lat;
///
/// assert!(validate_lon_lat(-75.16, 39.95).is_ok());
/// assert!(validate_lon_lat(200.0, 40.0).is_err());
/// assert!(validate_lon_lat(-74.0, 95.0).is_err());
/// ```
pub fn validate_lon_lat(longitude: f64, latitude: f64) -> Result<()> {
    if !longitude.is_finite() {
        return Err(GeoPhotoError::InvalidInput(format!(
            "Longitude must be finite, got: {}",
            longitude
        )));
    }

    if !latitude.is_finite() {
        return Err(GeoPhotoError::InvalidInput(format!(
            "Latitude must be finite, got: {}",
            latitude
        )));
    }

    if !(-180.0..=180.0).contains(&longitude) {
        return Err(GeoPhotoError::InvalidInput(format!(
            "Longitude out of range [-180.0, 180.0]: {}",
            longitude
        )));
    }

    if !(-90.0..=90.0).contains(&latitude) {
        return Err(GeoPhotoError::InvalidInput(format!(
            "Latitude out of range [-90.0, 90.0]: {}",
            latitude
        )));
    }

    Ok(())
}

/// Validates a full geographic position including height.
///
/// # Examples
///
/// ```
/// use geophoto::validation::validate_cartographic;
/// use geophoto_types::point::Cartographic;
///
/// let rooftop = Cartographic::new(-75.16, 39.95, 120.0);
/// assert!(validate_cartographic(&rooftop).is_ok());
///
/// let orbit = Cartographic::new(-75.16, 39.95, 400_000.0);
/// assert!(validate_cartographic(&orbit).is_err());
/// ```
pub fn validate_cartographic(position: &Cartographic) -> Result<()> {
    validate_lon_lat(position.longitude, position.latitude)?;

    let h = position.height;
    if !h.is_finite() {
        return Err(GeoPhotoError::InvalidInput(format!(
            "Height must be finite, got: {}",
            h
        )));
    }

    if !(MIN_HEIGHT..=MAX_HEIGHT).contains(&h) {
        return Err(GeoPhotoError::InvalidInput(format!(
            "Height out of reasonable range [{}, {}] meters: {}",
            MIN_HEIGHT, MAX_HEIGHT, h
        )));
    }

    Ok(())
}

/// Validates a batch of positions, reporting the first bad index.
pub fn validate_cartographics(positions: &[Cartographic]) -> Result<()> {
    for (idx, position) in positions.iter().enumerate() {
        validate_cartographic(position).map_err(|e| {
            GeoPhotoError::InvalidInput(format!("Position at index {}: {}", idx, e))
        })?;
    }
    Ok(())
}
