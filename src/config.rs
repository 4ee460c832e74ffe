//! Configuration for the photo tree and its proximity queries.
//!
//! The configuration is plain serializable data so it can be loaded from
//! JSON, or TOML with the `toml` feature.

use crate::error::{GeoPhotoError, Result};
use crate::validation::validate_cartographic;
use geophoto_types::point::Cartographic;
use serde::{Deserialize, Serialize};

/// Default neighbor search radius, in project units (meters).
pub const DEFAULT_MAX_DISTANCE: f64 = 100.0;

/// Planar distance under which two photos are treated as the same point.
///
/// Squared, this is the 1e-6 m² threshold used to drop self-matches.
pub const DEFAULT_SAME_POINT_EPSILON: f64 = 1e-3;

/// Bytes read from each file when extracting tags. Enough for GPS headers
/// and the embedded thumbnail of a typical JPEG.
pub const DEFAULT_TAG_READ_BYTES: usize = 60_000;

/// Photo tree configuration
///
/// # Example
///
/// ```rust
/// use geophoto::Config;
///
/// let config = Config::default().with_max_distance(250.0);
/// assert!(config.validate().is_ok());
///
/// let json = r#"{
///     "default_max_distance": 50.0,
///     "tag_read_bytes": 32768
/// }"#;
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.default_max_distance, 50.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Search radius used when a query does not pass one.
    #[serde(default = "Config::default_max_distance")]
    pub default_max_distance: f64,

    /// Candidates closer than this are considered the query photo itself.
    #[serde(default = "Config::default_same_point_epsilon")]
    pub same_point_epsilon: f64,

    /// Byte count hint passed to storage when reading tags.
    #[serde(default = "Config::default_tag_read_bytes")]
    pub tag_read_bytes: usize,

    /// Whether tree-wide passes descend into subfolders.
    #[serde(default = "Config::default_include_subfolders")]
    pub include_subfolders: bool,

    /// Geographic anchor of the project frame used by the fixed-frame
    /// transform. `None` anchors the frame at (0, 0, 0).
    #[serde(default)]
    pub ecef_anchor: Option<Cartographic>,
}

impl Config {
    const fn default_max_distance() -> f64 {
        DEFAULT_MAX_DISTANCE
    }

    const fn default_same_point_epsilon() -> f64 {
        DEFAULT_SAME_POINT_EPSILON
    }

    const fn default_tag_read_bytes() -> usize {
        DEFAULT_TAG_READ_BYTES
    }

    const fn default_include_subfolders() -> bool {
        true
    }

    pub fn with_max_distance(mut self, max_distance: f64) -> Self {
        self.default_max_distance = max_distance;
        self
    }

    pub fn with_same_point_epsilon(mut self, epsilon: f64) -> Self {
        self.same_point_epsilon = epsilon;
        self
    }

    pub fn with_tag_read_bytes(mut self, bytes: usize) -> Self {
        assert!(bytes > 0, "Tag read byte count must be greater than zero");
        self.tag_read_bytes = bytes;
        self
    }

    pub fn with_include_subfolders(mut self, include: bool) -> Self {
        self.include_subfolders = include;
        self
    }

    pub fn with_ecef_anchor(mut self, anchor: Cartographic) -> Self {
        self.ecef_anchor = Some(anchor);
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.default_max_distance.is_finite() || self.default_max_distance <= 0.0 {
            return Err(GeoPhotoError::InvalidConfig(format!(
                "Default max distance must be finite and positive, got: {}",
                self.default_max_distance
            )));
        }

        if !self.same_point_epsilon.is_finite() || self.same_point_epsilon < 0.0 {
            return Err(GeoPhotoError::InvalidConfig(format!(
                "Same-point epsilon must be finite and non-negative, got: {}",
                self.same_point_epsilon
            )));
        }

        if self.same_point_epsilon >= self.default_max_distance {
            return Err(GeoPhotoError::InvalidConfig(
                "Same-point epsilon must be smaller than the default max distance".to_string(),
            ));
        }

        if self.tag_read_bytes == 0 {
            return Err(GeoPhotoError::InvalidConfig(
                "Tag read byte count must be greater than zero".to_string(),
            ));
        }

        if let Some(anchor) = &self.ecef_anchor {
            validate_cartographic(anchor)
                .map_err(|e| GeoPhotoError::InvalidConfig(format!("ECEF anchor: {}", e)))?;
        }

        Ok(())
    }

    /// Load configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load configuration from TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(toml_str).map_err(|e| GeoPhotoError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| GeoPhotoError::Other(e.to_string()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_max_distance: Self::default_max_distance(),
            same_point_epsilon: Self::default_same_point_epsilon(),
            tag_read_bytes: Self::default_tag_read_bytes(),
            include_subfolders: Self::default_include_subfolders(),
            ecef_anchor: None,
        }
    }
}
