//! Coordinate reprojection: geographic positions to spatial positions.
//!
//! A `Reprojector` picks one strategy per pass. When a conversion service is
//! attached and answers a probe, every position in scope goes out in a single
//! batch. Otherwise each position is transformed on its own through the
//! fixed earth-centered frame. A failing batch falls back to the fixed frame
//! for the same points; a pass never aborts.

mod converter;
mod ecef;

pub use converter::GeoConverter;
pub use ecef::{
    EcefFrame, FixedFrameTransform, WGS84_FLATTENING, WGS84_SEMI_MAJOR_AXIS, geodetic_to_ecef,
};

use crate::tree::{Folder, MediaFile};
use crate::validation::validate_cartographic;
use geophoto_types::convert::GeoCoordStatus;
use geophoto_types::point::Cartographic;
use std::sync::Arc;

/// How a pass computed its spatial positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReprojectionStrategy {
    /// One batched request to the conversion service.
    Converter,
    /// Per-point fixed-frame transform.
    #[default]
    FixedFrame,
}

/// Outcome of a reprojection pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReprojectionStats {
    /// Positions written from the conversion service.
    pub converted: usize,
    /// Positions written by the fixed-frame transform.
    pub fallback: usize,
    /// Positions skipped as invalid or untransformable.
    pub rejected: usize,
    pub strategy: ReprojectionStrategy,
}

/// Assigns spatial positions to the photos of a tree.
#[derive(Clone)]
pub struct Reprojector {
    converter: Option<Arc<dyn GeoConverter>>,
    fixed_frame: Arc<dyn FixedFrameTransform>,
}

impl Reprojector {
    pub fn new(fixed_frame: Arc<dyn FixedFrameTransform>) -> Self {
        Self {
            converter: None,
            fixed_frame,
        }
    }

    /// Prefer `converter` whenever its probe succeeds.
    pub fn with_converter(mut self, converter: Arc<dyn GeoConverter>) -> Self {
        self.converter = Some(converter);
        self
    }

    pub fn has_converter(&self) -> bool {
        self.converter.is_some()
    }

    /// The conversion service to use for this pass, if it is usable.
    ///
    /// Probes with the origin; usable means exactly one answer whose status
    /// is not `NoGcsDefined`.
    async fn usable_converter(&self) -> Option<&Arc<dyn GeoConverter>> {
        let converter = self.converter.as_ref()?;
        match converter.geographic_to_spatial(&[Cartographic::origin()]).await {
            Ok(probe) if probe.len() == 1 && probe[0].status != GeoCoordStatus::NoGcsDefined => {
                Some(converter)
            }
            Ok(probe) => {
                log::debug!(
                    "Conversion service unusable ({} probe results, status {:?})",
                    probe.len(),
                    probe.first().map(|p| p.status)
                );
                None
            }
            Err(e) => {
                log::debug!("Conversion service probe failed: {}", e);
                None
            }
        }
    }

    /// Set the spatial position of every in-scope photo that has a geographic one.
    ///
    /// Hidden photos are included. Positions that fail validation are
    /// skipped and leave the photo's spatial position untouched.
    pub async fn assign_spatial_positions(
        &self,
        folder: &Arc<Folder>,
        include_subfolders: bool,
    ) -> ReprojectionStats {
        let mut stats = ReprojectionStats::default();
        let mut batch: Vec<(Arc<MediaFile>, Cartographic)> = Vec::new();

        let gathered = folder
            .traverse_media(
                |file, _folder| {
                    if let Some(position) = file.geo_location() {
                        match validate_cartographic(&position) {
                            Ok(()) => batch.push((file, position)),
                            Err(e) => {
                                log::warn!("Skipping '{}': {}", file.path(), e);
                                stats.rejected += 1;
                            }
                        }
                    }
                    async { Ok(()) }
                },
                include_subfolders,
                false,
            )
            .await;
        if let Err(e) = gathered {
            log::warn!("Gathering positions under '{}' failed: {}", folder.path(), e);
        }

        if batch.is_empty() {
            return stats;
        }

        if let Some(converter) = self.usable_converter().await {
            stats.strategy = ReprojectionStrategy::Converter;
            let positions: Vec<Cartographic> =
                batch.iter().map(|(_, position)| *position).collect();

            match converter.geographic_to_spatial(&positions).await {
                Ok(results) if results.len() == batch.len() => {
                    for ((file, _), result) in batch.iter().zip(&results) {
                        if let Some(point) = result.usable_point() {
                            file.set_spatial(Some(point));
                            stats.converted += 1;
                        }
                    }
                    log::debug!(
                        "Converted {} of {} positions under '{}'",
                        stats.converted,
                        batch.len(),
                        folder.path()
                    );
                    return stats;
                }
                Ok(results) => {
                    log::warn!(
                        "Conversion service returned {} results for {} positions, \
                         using fixed frame",
                        results.len(),
                        batch.len()
                    );
                }
                Err(e) => {
                    log::warn!("Batched conversion failed, using fixed frame: {}", e);
                }
            }
        }

        stats.strategy = ReprojectionStrategy::FixedFrame;
        for (file, position) in &batch {
            match self.fixed_frame.to_spatial(position) {
                Ok(point) => {
                    file.set_spatial(Some(point));
                    stats.fallback += 1;
                }
                Err(e) => {
                    log::warn!("Fixed-frame transform of '{}' failed: {}", file.path(), e);
                    stats.rejected += 1;
                }
            }
        }
        stats
    }
}

impl Default for Reprojector {
    fn default() -> Self {
        Self::new(Arc::new(EcefFrame::default()))
    }
}

impl std::fmt::Debug for Reprojector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reprojector")
            .field("has_converter", &self.has_converter())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GeoPhotoError, Result};
    use crate::storage::{MemoryFile, MemoryStorage};
    use async_trait::async_trait;
    use geophoto_types::convert::ConvertedPoint;
    use geophoto_types::point::Point3d;
    use parking_lot::Mutex;

    /// Scripted conversion service recording the size of every request.
    #[derive(Default)]
    struct ScriptedConverter {
        probe: Option<GeoCoordStatus>,
        statuses: Vec<GeoCoordStatus>,
        fail_batch: bool,
        drop_last: bool,
        requests: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl GeoConverter for ScriptedConverter {
        async fn geographic_to_spatial(
            &self,
            positions: &[Cartographic],
        ) -> Result<Vec<ConvertedPoint>> {
            let is_probe = self.requests.lock().is_empty();
            self.requests.lock().push(positions.len());

            if is_probe {
                return match self.probe {
                    Some(status) => {
                        Ok(vec![ConvertedPoint::new(status, Point3d::new(0.0, 0.0, 0.0))])
                    }
                    None => Err(GeoPhotoError::Conversion("service offline".into())),
                };
            }
            if self.fail_batch {
                return Err(GeoPhotoError::Conversion("batch rejected".into()));
            }

            let mut out: Vec<ConvertedPoint> = positions
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    let status = self.statuses.get(i).copied().unwrap_or(GeoCoordStatus::Success);
                    let point = Point3d::new(p.longitude * 1000.0, p.latitude * 1000.0, p.height);
                    ConvertedPoint::new(status, point)
                })
                .collect();
            if self.drop_last {
                out.pop();
            }
            Ok(out)
        }
    }

    fn located(name: &str, longitude: f64, latitude: f64, height: f64) -> MemoryFile {
        MemoryFile::new(name).geo_location(Cartographic::new(longitude, latitude, height))
    }

    async fn tree() -> Arc<Folder> {
        let storage = MemoryStorage::new()
            .with_file("root", located("a.jpg", 1.0, 2.0, 3.0))
            .with_file("root", MemoryFile::new("untagged.jpg"))
            .with_folder("root", "sub")
            .with_file("root/sub", located("b.jpg", 4.0, 5.0, 6.0))
            .with_file("root/sub", located("c.jpg", 7.0, 8.0, 9.0));
        let root = Folder::root(Arc::new(storage), "root", "");
        root.load_subtree().await.unwrap();
        root
    }

    fn spatial_of(root: &Arc<Folder>) -> Vec<(String, Option<Point3d>)> {
        root.collect_media(true, false)
            .into_iter()
            .map(|(f, _)| (f.name().to_string(), f.spatial()))
            .collect()
    }

    #[tokio::test]
    async fn test_batched_statuses_written_positionally() {
        let root = tree().await;
        let converter = Arc::new(ScriptedConverter {
            probe: Some(GeoCoordStatus::Success),
            statuses: vec![
                GeoCoordStatus::Success,
                GeoCoordStatus::NoGcsDefined,
                GeoCoordStatus::OutOfUsefulRange,
            ],
            ..Default::default()
        });
        let reprojector = Reprojector::default().with_converter(converter.clone());

        let stats = reprojector.assign_spatial_positions(&root, true).await;
        assert_eq!(stats.strategy, ReprojectionStrategy::Converter);
        assert_eq!(stats.converted, 2);
        assert_eq!(*converter.requests.lock(), [1, 3]);

        let spatial = spatial_of(&root);
        assert_eq!(spatial[0], ("a.jpg".to_string(), Some(Point3d::new(1000.0, 2000.0, 3.0))));
        assert_eq!(spatial[1].1, None);
        assert_eq!(spatial[2].1, None);
        assert_eq!(spatial[3], ("c.jpg".to_string(), Some(Point3d::new(7000.0, 8000.0, 9.0))));
    }

    #[tokio::test]
    async fn test_no_gcs_probe_skips_batch() {
        let root = tree().await;
        let converter = Arc::new(ScriptedConverter {
            probe: Some(GeoCoordStatus::NoGcsDefined),
            ..Default::default()
        });
        let reprojector = Reprojector::default().with_converter(converter.clone());

        let stats = reprojector.assign_spatial_positions(&root, true).await;
        assert_eq!(*converter.requests.lock(), [1]);
        assert_eq!(stats.strategy, ReprojectionStrategy::FixedFrame);
        assert_eq!(stats.fallback, 3);
        assert!(spatial_of(&root).iter().filter(|(_, s)| s.is_some()).count() == 3);
    }

    #[tokio::test]
    async fn test_failed_probe_and_no_converter_use_fixed_frame() {
        let root = tree().await;
        let offline = Arc::new(ScriptedConverter::default());
        let stats = Reprojector::default()
            .with_converter(offline)
            .assign_spatial_positions(&root, false)
            .await;
        assert_eq!(stats.strategy, ReprojectionStrategy::FixedFrame);
        assert_eq!(stats.fallback, 1);

        let stats = Reprojector::default().assign_spatial_positions(&root, true).await;
        assert_eq!(stats.fallback, 3);
    }

    #[tokio::test]
    async fn test_batch_failure_falls_back() {
        let root = tree().await;
        let failing = Arc::new(ScriptedConverter {
            probe: Some(GeoCoordStatus::Success),
            fail_batch: true,
            ..Default::default()
        });
        let stats = Reprojector::default()
            .with_converter(failing.clone())
            .assign_spatial_positions(&root, true)
            .await;
        assert_eq!(stats.strategy, ReprojectionStrategy::FixedFrame);
        assert_eq!(stats.converted, 0);
        assert_eq!(stats.fallback, 3);
        assert_eq!(*failing.requests.lock(), [1, 3]);
    }

    #[tokio::test]
    async fn test_length_mismatch_falls_back() {
        let root = tree().await;
        let short = Arc::new(ScriptedConverter {
            probe: Some(GeoCoordStatus::Success),
            drop_last: true,
            ..Default::default()
        });
        let stats = Reprojector::default()
            .with_converter(short)
            .assign_spatial_positions(&root, true)
            .await;
        assert_eq!(stats.converted, 0);
        assert_eq!(stats.fallback, 3);
    }

    #[tokio::test]
    async fn test_hidden_included_and_invalid_rejected() {
        let storage = MemoryStorage::new()
            .with_file("root", located("hidden.jpg", 0.001, 0.0, 0.0))
            .with_file("root", located("bad.jpg", 200.0, 0.0, 0.0));
        let root = Folder::root(Arc::new(storage), "root", "");
        root.get_contents(false).await.unwrap();
        root.contents().unwrap()[0].set_visible(false);

        let stats = Reprojector::default().assign_spatial_positions(&root, false).await;
        assert_eq!(stats.fallback, 1);
        assert_eq!(stats.rejected, 1);

        let spatial = spatial_of(&root);
        let hidden = spatial[0].1.unwrap();
        assert!(hidden.x() > 100.0 && hidden.x() < 120.0);
        assert!(spatial[1].1.is_none());
    }

    #[tokio::test]
    async fn test_pass_is_idempotent() {
        let root = tree().await;
        let reprojector = Reprojector::default();

        reprojector.assign_spatial_positions(&root, true).await;
        let first = spatial_of(&root);
        let stats = reprojector.assign_spatial_positions(&root, true).await;
        assert_eq!(spatial_of(&root), first);
        assert_eq!(stats.fallback, 3);
    }

    #[tokio::test]
    async fn test_empty_scope_does_not_probe() {
        let root = Folder::root(Arc::new(MemoryStorage::new()), "root", "");
        root.get_contents(true).await.unwrap();
        let converter = Arc::new(ScriptedConverter {
            probe: Some(GeoCoordStatus::Success),
            ..Default::default()
        });

        let stats = Reprojector::default()
            .with_converter(converter.clone())
            .assign_spatial_positions(&root, true)
            .await;
        assert_eq!(stats, ReprojectionStats::default());
        assert!(converter.requests.lock().is_empty());
    }
}
