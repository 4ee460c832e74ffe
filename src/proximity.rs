//! Proximity queries: photos taken near a given photo.
//!
//! A query takes the x window and the y window around the photo from the
//! scope's axis indexes, intersects them, and cuts the circle out of the
//! resulting square with an exact planar distance test.

use crate::config::{Config, DEFAULT_MAX_DISTANCE, DEFAULT_SAME_POINT_EPSILON};
use crate::index::Axis;
use crate::tree::{Folder, MediaFile};
use geophoto_types::point::Point3d;
use rustc_hash::FxHashSet;
use std::sync::Arc;

/// Parameters of a neighbor search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborQuery {
    /// Search radius in project units.
    pub max_distance: f64,
    /// Candidates at or under this distance count as the query photo itself.
    pub same_point_epsilon: f64,
}

impl NeighborQuery {
    pub fn new(max_distance: f64) -> Self {
        Self {
            max_distance,
            ..Default::default()
        }
    }

    /// Override the same-point epsilon. Negative or non-finite values are
    /// ignored with a warning.
    pub fn with_same_point_epsilon(mut self, epsilon: f64) -> Self {
        if is_valid_epsilon(epsilon) {
            self.same_point_epsilon = epsilon;
        } else {
            log::warn!("Ignoring same-point epsilon {}", epsilon);
        }
        self
    }

    /// The epsilon a search applies, the default if the field was set to an
    /// unusable value.
    fn effective_epsilon(&self) -> f64 {
        if is_valid_epsilon(self.same_point_epsilon) {
            self.same_point_epsilon
        } else {
            log::warn!(
                "Same-point epsilon {} is unusable, using {}",
                self.same_point_epsilon,
                DEFAULT_SAME_POINT_EPSILON
            );
            DEFAULT_SAME_POINT_EPSILON
        }
    }
}

fn is_valid_epsilon(epsilon: f64) -> bool {
    epsilon.is_finite() && epsilon >= 0.0
}

impl Default for NeighborQuery {
    fn default() -> Self {
        Self {
            max_distance: DEFAULT_MAX_DISTANCE,
            same_point_epsilon: DEFAULT_SAME_POINT_EPSILON,
        }
    }
}

impl From<&Config> for NeighborQuery {
    fn from(config: &Config) -> Self {
        Self {
            max_distance: config.default_max_distance,
            same_point_epsilon: config.same_point_epsilon,
        }
    }
}

/// A photo found by a neighbor search.
#[derive(Debug, Clone)]
pub struct Neighbor {
    pub file: Arc<MediaFile>,
    /// Planar distance to the query photo.
    pub distance: f64,
}

/// Scores x-window candidates against the y window and the search circle.
struct DistanceFilter {
    y_candidates: FxHashSet<*const MediaFile>,
    center: Point3d,
    max_distance_sq: f64,
    epsilon_sq: f64,
}

impl DistanceFilter {
    fn new(y_window: &[Arc<MediaFile>], center: Point3d, query: &NeighborQuery) -> Self {
        Self {
            y_candidates: y_window.iter().map(Arc::as_ptr).collect(),
            center,
            max_distance_sq: query.max_distance * query.max_distance,
            epsilon_sq: query.effective_epsilon().powi(2),
        }
    }

    /// Squared distance of an accepted candidate, `None` if rejected.
    fn score(&self, candidate: &Arc<MediaFile>) -> Option<f64> {
        if !self.y_candidates.contains(&Arc::as_ptr(candidate)) {
            return None;
        }
        let d2 = self.center.distance_squared_2d(&candidate.spatial()?);
        (d2 > self.epsilon_sq && d2 <= self.max_distance_sq).then_some(d2)
    }
}

impl MediaFile {
    /// Photos within `max_distance` (default 100) of this one, nearest first.
    ///
    /// The search covers this photo's folder, or the whole tree when
    /// `include_all_folders` is set. Photos without a spatial position, or
    /// hidden ones, neither match nor can be queried.
    pub async fn find_neighbors(
        self: &Arc<Self>,
        include_all_folders: bool,
        max_distance: Option<f64>,
    ) -> Vec<Arc<MediaFile>> {
        let query = NeighborQuery::new(max_distance.unwrap_or(DEFAULT_MAX_DISTANCE));
        self.find_neighbors_with(include_all_folders, &query)
            .await
            .into_iter()
            .map(|neighbor| neighbor.file)
            .collect()
    }

    /// Same as `find_neighbors`, with explicit parameters and distances.
    ///
    /// An infinite `max_distance` returns every other positioned photo in
    /// scope; zero, negative or NaN returns nothing.
    pub async fn find_neighbors_with(
        self: &Arc<Self>,
        include_all_folders: bool,
        query: &NeighborQuery,
    ) -> Vec<Neighbor> {
        if query.max_distance.is_nan() || query.max_distance <= 0.0 {
            log::warn!(
                "Rejecting neighbor query for '{}' with distance {}",
                self.name(),
                query.max_distance
            );
            return Vec::new();
        }
        let Some(center) = self.spatial() else {
            return Vec::new();
        };
        let Some(scope) = self.search_scope(include_all_folders) else {
            return Vec::new();
        };

        let x_index = scope.axis_index(Axis::X, include_all_folders).await;
        let y_index = scope.axis_index(Axis::Y, include_all_folders).await;

        let Some(x_rank) = x_index.rank_of(self) else {
            return Vec::new();
        };
        let Some(y_rank) = y_index.rank_of(self) else {
            return Vec::new();
        };

        let x_window = x_index.window(x_rank, query.max_distance);
        let y_window = y_index.window(y_rank, query.max_distance);

        let filter = DistanceFilter::new(y_window, center, query);
        let mut scored: Vec<(f64, Arc<MediaFile>)> = x_window
            .iter()
            .filter_map(|candidate| filter.score(candidate).map(|d2| (d2, candidate.clone())))
            .collect();

        scored.sort_by(|a, b| a.0.total_cmp(&b.0));

        scored
            .into_iter()
            .map(|(d2, file)| Neighbor {
                file,
                distance: d2.sqrt(),
            })
            .collect()
    }

    fn search_scope(&self, include_all_folders: bool) -> Option<Arc<Folder>> {
        let parent = self.parent()?;
        Some(if include_all_folders {
            parent.root_folder()
        } else {
            parent
        })
    }
}
