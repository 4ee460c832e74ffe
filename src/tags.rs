//! Geographic tags read from photo headers.
//!
//! Decoding the image format itself is left to a `TagExtractor`; this module
//! maps the extracted tag set onto a position and the photo attributes the
//! tree keeps.

use crate::error::{GeoPhotoError, Result};
use crate::tree::{Folder, MediaFile};
use crate::validation::validate_cartographic;
use chrono::NaiveDate;
use geophoto_types::point::Cartographic;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Tag set produced by an extractor, keyed by tag name.
pub type ImageTags = FxHashMap<String, ImageTagValue>;

/// A single tag value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageTagValue {
    Number(f64),
    Numbers(Vec<f64>),
    Text(String),
    /// Nested tag directory, e.g. the thumbnail IFD.
    Map(ImageTags),
}

impl ImageTagValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ImageTagValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_numbers(&self) -> Option<&[f64]> {
        match self {
            ImageTagValue::Numbers(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ImageTagValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ImageTags> {
        match self {
            ImageTagValue::Map(map) => Some(map),
            _ => None,
        }
    }
}

/// Decodes the tag set from the leading bytes of a photo.
pub trait TagExtractor: Send + Sync {
    fn read_tags(&self, bytes: &[u8]) -> Result<ImageTags>;
}

impl<F> TagExtractor for F
where
    F: Fn(&[u8]) -> Result<ImageTags> + Send + Sync,
{
    fn read_tags(&self, bytes: &[u8]) -> Result<ImageTags> {
        self(bytes)
    }
}

/// Extractor for photos whose header is a JSON object of tags.
///
/// Handy for fixtures and for sidecar files exported by other tools.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTagExtractor;

impl TagExtractor for JsonTagExtractor {
    fn read_tags(&self, bytes: &[u8]) -> Result<ImageTags> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Location of the embedded thumbnail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPhotoThumbnail {
    pub compression: f64,
    pub x_resolution: f64,
    pub y_resolution: f64,
    pub resolution_unit: f64,
    /// Byte offset of the thumbnail JPEG within the file.
    pub offset: f64,
    pub byte_count: f64,
}

impl GeoPhotoThumbnail {
    /// Read the descriptor from the `thumbnail` directory; every field is required.
    pub fn from_tags(tags: &ImageTags) -> Option<Self> {
        let directory = tags.get("thumbnail")?.as_map()?;
        let number = |name: &str| directory.get(name).and_then(ImageTagValue::as_number);

        Some(Self {
            compression: number("Compression")?,
            x_resolution: number("XResolution")?,
            y_resolution: number("YResolution")?,
            resolution_unit: number("ResolutionUnit")?,
            offset: number("JpegIFOffset")?,
            byte_count: number("JpegIFByteCount")?,
        })
    }
}

/// The subset of a photo's tags the tree cares about.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoPhotoTags {
    pub geo_location: Cartographic,
    /// Camera heading in degrees, 0 when untagged.
    pub track: f64,
    /// GPS date in milliseconds since the Unix epoch, 0 when untagged.
    pub taken_time: i64,
    pub probably_pano: bool,
    pub thumbnail: Option<GeoPhotoThumbnail>,
}

impl GeoPhotoTags {
    /// Interpret the tag set of the photo called `name`.
    ///
    /// Fails with `NoGeographicTag` when latitude or longitude is missing.
    pub fn from_tags(name: &str, tags: &ImageTags) -> Result<Self> {
        let longitude = degrees_minutes_seconds(tags, "GPSLongitude", "E");
        let latitude = degrees_minutes_seconds(tags, "GPSLatitude", "N");
        let (Some(longitude), Some(latitude)) = (longitude, latitude) else {
            return Err(GeoPhotoError::NoGeographicTag {
                name: name.to_string(),
            });
        };

        Ok(Self {
            geo_location: Cartographic::new(
                longitude,
                latitude,
                number_or_zero(tags, "GPSAltitude"),
            ),
            track: number_or_zero(tags, "GPSTrack"),
            taken_time: gps_date(tags),
            probably_pano: probably_pano(tags),
            thumbnail: GeoPhotoThumbnail::from_tags(tags),
        })
    }
}

/// Decimal degrees from a `[degrees, minutes, seconds]` tag and its `Ref` tag.
fn degrees_minutes_seconds(tags: &ImageTags, base_name: &str, positive_ref: &str) -> Option<f64> {
    let dms = tags.get(base_name)?.as_numbers()?;
    if dms.len() < 3 {
        return None;
    }
    let reference = tags.get(&format!("{}Ref", base_name))?.as_text()?;
    let sign = if reference == positive_ref { 1.0 } else { -1.0 };
    Some(sign * (dms[0] + dms[1] / 60.0 + dms[2] / 3600.0))
}

fn number_or_zero(tags: &ImageTags, name: &str) -> f64 {
    tags.get(name).and_then(ImageTagValue::as_number).unwrap_or(0.0)
}

fn gps_date(tags: &ImageTags) -> i64 {
    let Some(stamp) = tags.get("GPSDateStamp").and_then(ImageTagValue::as_text) else {
        return 0;
    };
    ["%Y:%m:%d", "%Y-%m-%d"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(stamp.trim(), format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc().timestamp_millis())
        .unwrap_or(0)
}

/// Panoramas are taken to have a 2:1 aspect ratio. Missing dimensions count as a panorama.
fn probably_pano(tags: &ImageTags) -> bool {
    let width = tags.get("PixelXDimension").and_then(ImageTagValue::as_number);
    let height = tags.get("PixelYDimension").and_then(ImageTagValue::as_number);
    match (width, height) {
        (Some(width), Some(height)) => width == 2.0 * height,
        _ => true,
    }
}

impl MediaFile {
    /// Read the first `byte_count` bytes of the photo and interpret its tags.
    pub async fn read_geo_tags(
        &self,
        extractor: &dyn TagExtractor,
        byte_count: usize,
    ) -> Result<GeoPhotoTags> {
        let bytes = self.file_contents(Some(byte_count)).await?;
        let tags = extractor.read_tags(&bytes)?;
        GeoPhotoTags::from_tags(self.name(), &tags)
    }
}

/// Outcome of a geo-tag pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagStats {
    /// Photos that received a geographic position.
    pub tagged: usize,
    /// Photos without latitude or longitude tags.
    pub missing: usize,
    /// Photos that could not be read, decoded or validated.
    pub failed: usize,
}

/// Read geographic tags for every loaded photo in scope.
///
/// Per-photo failures are logged and counted; the pass always completes.
/// Spatial positions are not touched.
pub async fn assign_geo_locations(
    folder: &Arc<Folder>,
    include_subfolders: bool,
    extractor: &dyn TagExtractor,
    byte_count: usize,
) -> TagStats {
    let mut stats = TagStats::default();

    for (file, _) in folder.collect_media(include_subfolders, false) {
        let tags = match file.read_geo_tags(extractor, byte_count).await {
            Ok(tags) => tags,
            Err(GeoPhotoError::NoGeographicTag { name }) => {
                log::debug!("Photo '{}' has no geographic tag", name);
                stats.missing += 1;
                continue;
            }
            Err(e) => {
                log::warn!("Failed to read tags of '{}': {}", file.path(), e);
                stats.failed += 1;
                continue;
            }
        };

        if let Err(e) = validate_cartographic(&tags.geo_location) {
            log::warn!("Ignoring position of '{}': {}", file.path(), e);
            stats.failed += 1;
            continue;
        }

        file.apply_tags(&tags);
        stats.tagged += 1;
    }

    log::debug!(
        "Geo-tag pass over '{}': {} tagged, {} missing, {} failed",
        folder.path(),
        stats.tagged,
        stats.missing,
        stats.failed
    );
    stats
}
