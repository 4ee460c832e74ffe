//! Axis-sorted indexes over a folder's photos.
//!
//! An `AxisIndex` keeps photos ordered by one planar coordinate of their
//! spatial position. Proximity queries look up a photo's rank, widen a window
//! around it while neighbors stay within the search distance, and slice that
//! window out. Two such windows (x and y) intersected give the square around
//! the photo; the circle is cut out of it afterwards.

use crate::tree::MediaFile;
use geophoto_types::point::Point3d;
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::OnceCell;

/// A planar axis of the project frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// The coordinate of `point` along this axis.
    #[inline]
    pub fn coordinate(self, point: &Point3d) -> f64 {
        match self {
            Axis::X => point.x(),
            Axis::Y => point.y(),
        }
    }

    fn slot(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }
}

/// Photos ordered by one spatial coordinate, ascending.
///
/// Equal coordinates keep the order in which photos were inserted. Photos
/// without a spatial position are never stored.
#[derive(Debug, Clone)]
pub struct AxisIndex {
    axis: Axis,
    keys: Vec<f64>,
    files: Vec<Arc<MediaFile>>,
}

impl AxisIndex {
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            keys: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Build an index from photos in traversal order.
    pub fn from_files(axis: Axis, files: impl IntoIterator<Item = Arc<MediaFile>>) -> Self {
        let mut pairs: Vec<(f64, Arc<MediaFile>)> = files
            .into_iter()
            .filter_map(|file| Self::key_for(axis, &file).map(|key| (key, file)))
            .collect();

        // Stable, so ties stay in traversal order.
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let (keys, files) = pairs.into_iter().unzip();
        Self { axis, keys, files }
    }

    fn key_for(axis: Axis, file: &MediaFile) -> Option<f64> {
        let spatial = file.spatial()?;
        let key = axis.coordinate(&spatial);
        if key.is_finite() {
            Some(key)
        } else {
            log::warn!(
                "Skipping '{}' in {:?} index: non-finite coordinate {}",
                file.name(),
                axis,
                key
            );
            None
        }
    }

    /// Insert a photo after any photos with the same key.
    ///
    /// Returns `false` if the photo has no usable spatial position.
    pub fn insert(&mut self, file: Arc<MediaFile>) -> bool {
        let Some(key) = Self::key_for(self.axis, &file) else {
            return false;
        };
        let at = self.keys.partition_point(|k| *k <= key);
        self.keys.insert(at, key);
        self.files.insert(at, file);
        true
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The photo at `rank`.
    pub fn get(&self, rank: usize) -> Option<&Arc<MediaFile>> {
        self.files.get(rank)
    }

    /// The coordinate the photo at `rank` was indexed under.
    pub fn key(&self, rank: usize) -> Option<f64> {
        self.keys.get(rank).copied()
    }

    /// The rank of `file`, compared by identity.
    ///
    /// Looks in the run of equal keys first. If the photo's position changed
    /// after the index was built, falls back to a linear scan.
    pub fn rank_of(&self, file: &MediaFile) -> Option<usize> {
        let same = |candidate: &Arc<MediaFile>| std::ptr::eq(Arc::as_ptr(candidate), file);

        if let Some(spatial) = file.spatial() {
            let key = self.axis.coordinate(&spatial);
            let lo = self.keys.partition_point(|k| *k < key);
            let hi = self.keys.partition_point(|k| *k <= key);
            if let Some(offset) = self.files[lo..hi].iter().position(same) {
                return Some(lo + offset);
            }
        }

        self.files.iter().position(same)
    }

    /// Photos with ranks in `range`, clamped to the index bounds.
    pub fn range(&self, range: RangeInclusive<usize>) -> &[Arc<MediaFile>] {
        let (start, end) = range.into_inner();
        if self.files.is_empty() || start > end || start >= self.files.len() {
            return &[];
        }
        let end = end.min(self.files.len() - 1);
        &self.files[start..=end]
    }

    /// Inclusive rank bounds of the photos within `max_distance` of the photo
    /// at `rank` along this axis.
    ///
    /// Scans outward from `rank` in both directions; each step compares the
    /// key at the scan position itself against the key at `rank`.
    pub fn window_bounds(&self, rank: usize, max_distance: f64) -> Option<(usize, usize)> {
        let center = *self.keys.get(rank)?;

        let mut low = rank;
        while low > 0 && center - self.keys[low - 1] <= max_distance {
            low -= 1;
        }

        let mut high = rank;
        while high + 1 < self.keys.len() && self.keys[high + 1] - center <= max_distance {
            high += 1;
        }

        Some((low, high))
    }

    /// Photos within `max_distance` of the photo at `rank` along this axis,
    /// the photo at `rank` included.
    pub fn window(&self, rank: usize, max_distance: f64) -> &[Arc<MediaFile>] {
        match self.window_bounds(rank, max_distance) {
            Some((low, high)) => self.range(low..=high),
            None => &[],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<MediaFile>> + '_ {
        self.files.iter()
    }
}

/// The four lazily built indexes of a folder: {x, y} × {direct, subtree}.
#[derive(Debug, Default)]
pub(crate) struct AxisIndexCache {
    cells: [OnceCell<Arc<AxisIndex>>; 4],
    builds: AtomicUsize,
}

impl AxisIndexCache {
    pub(crate) fn cell(&self, axis: Axis, include_subfolders: bool) -> &OnceCell<Arc<AxisIndex>> {
        &self.cells[axis.slot() * 2 + usize::from(include_subfolders)]
    }

    pub(crate) fn record_build(&self) {
        self.builds.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn build_count(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryFile, MemoryStorage};
    use crate::tree::Folder;

    fn folder_with(points: &[(f64, f64)]) -> Arc<Folder> {
        let mut storage = MemoryStorage::new();
        for (i, (x, y)) in points.iter().enumerate() {
            storage = storage.with_file(
                "root",
                MemoryFile::new(format!("p{}.jpg", i)).spatial(Point3d::new(*x, *y, 0.0)),
            );
        }
        Folder::root(Arc::new(storage), "root", "")
    }

    async fn files_of(points: &[(f64, f64)]) -> (Arc<Folder>, Vec<Arc<MediaFile>>) {
        let root = folder_with(points);
        let files = root
            .get_contents(false)
            .await
            .unwrap()
            .iter()
            .filter_map(|e| e.as_file().cloned())
            .collect();
        (root, files)
    }

    fn names(files: &[Arc<MediaFile>]) -> Vec<&str> {
        files.iter().map(|f| f.name()).collect()
    }

    #[tokio::test]
    async fn test_from_files_sorted_with_stable_ties() {
        let (_root, files) = files_of(&[(5.0, 0.0), (1.0, 0.0), (5.0, 1.0), (3.0, 2.0)]).await;
        let index = AxisIndex::from_files(Axis::X, files);

        let ordered: Vec<_> = index.iter().map(|f| f.name()).collect();
        assert_eq!(ordered, ["p1.jpg", "p3.jpg", "p0.jpg", "p2.jpg"]);
        assert_eq!(index.key(0), Some(1.0));
        assert_eq!(index.key(3), Some(5.0));
    }

    #[tokio::test]
    async fn test_y_axis_sorts_on_y() {
        let (_root, files) = files_of(&[(0.0, 9.0), (100.0, -1.0), (50.0, 4.0)]).await;
        let index = AxisIndex::from_files(Axis::Y, files);
        let ordered: Vec<_> = index.iter().map(|f| f.name()).collect();
        assert_eq!(ordered, ["p1.jpg", "p2.jpg", "p0.jpg"]);
    }

    #[tokio::test]
    async fn test_insert_keeps_ties_in_insertion_order() {
        let (_root, files) = files_of(&[(2.0, 0.0), (2.0, 0.0), (1.0, 0.0)]).await;
        let mut index = AxisIndex::new(Axis::X);
        for file in &files {
            assert!(index.insert(file.clone()));
        }
        assert_eq!(names(index.range(0..=2)), ["p2.jpg", "p0.jpg", "p1.jpg"]);
    }

    #[tokio::test]
    async fn test_unpositioned_files_are_skipped() {
        let root = Folder::root(
            Arc::new(
                MemoryStorage::new()
                    .with_file(
                        "root",
                        MemoryFile::new("placed.jpg").spatial(Point3d::new(1.0, 1.0, 0.0)),
                    )
                    .with_file("root", MemoryFile::new("untagged.jpg")),
            ),
            "root",
            "",
        );
        let files: Vec<_> = root
            .get_contents(false)
            .await
            .unwrap()
            .iter()
            .filter_map(|e| e.as_file().cloned())
            .collect();

        let index = AxisIndex::from_files(Axis::X, files.clone());
        assert_eq!(index.len(), 1);
        assert_eq!(index.rank_of(&files[1]), None);

        let mut manual = AxisIndex::new(Axis::X);
        assert!(!manual.insert(files[1].clone()));
        assert!(manual.is_empty());
    }

    #[tokio::test]
    async fn test_rank_of_uses_identity() {
        let (_root, files) = files_of(&[(2.0, 0.0), (2.0, 0.0), (2.0, 0.0)]).await;
        let index = AxisIndex::from_files(Axis::X, files.clone());
        for (i, file) in files.iter().enumerate() {
            assert_eq!(index.rank_of(file), Some(i));
        }
    }

    #[tokio::test]
    async fn test_rank_of_after_position_change() {
        let (_root, files) = files_of(&[(1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]).await;
        let index = AxisIndex::from_files(Axis::X, files.clone());

        files[0].set_spatial(Some(Point3d::new(99.0, 0.0, 0.0)));
        assert_eq!(index.rank_of(&files[0]), Some(0));
    }

    #[tokio::test]
    async fn test_range_is_clamped() {
        let (_root, files) = files_of(&[(1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]).await;
        let index = AxisIndex::from_files(Axis::X, files);

        assert_eq!(index.range(1..=10).len(), 2);
        assert!(index.range(5..=10).is_empty());
        assert_eq!(index.range(0..=0).len(), 1);
        assert!(AxisIndex::new(Axis::X).range(0..=3).is_empty());
    }

    #[tokio::test]
    async fn test_window_includes_lowest_rank() {
        // Every lower neighbor is in range, down to rank 0.
        let (_root, files) = files_of(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]).await;
        let index = AxisIndex::from_files(Axis::X, files);
        assert_eq!(index.window_bounds(3, 10.0), Some((0, 3)));
    }

    #[tokio::test]
    async fn test_window_boundaries_are_inclusive() {
        let (_root, files) =
            files_of(&[(-10.5, 0.0), (-10.0, 0.0), (0.0, 0.0), (10.0, 0.0), (10.5, 0.0)]).await;
        let index = AxisIndex::from_files(Axis::X, files);

        assert_eq!(index.window_bounds(2, 10.0), Some((1, 3)));
        assert_eq!(names(index.window(2, 10.0)), ["p1.jpg", "p2.jpg", "p3.jpg"]);
    }

    #[tokio::test]
    async fn test_upper_scan_compares_upper_position() {
        // Measuring the upper side from the lower cutoff would also take in
        // 120 here; measured at the scan position it stops at 60.
        let (_root, files) = files_of(&[(0.0, 0.0), (50.0, 0.0), (60.0, 0.0), (120.0, 0.0)]).await;
        let index = AxisIndex::from_files(Axis::X, files);

        assert_eq!(index.window_bounds(1, 15.0), Some((1, 2)));
        assert_eq!(index.window_bounds(0, 55.0), Some((0, 1)));
        assert_eq!(index.window_bounds(2, 60.0), Some((0, 3)));
    }

    #[tokio::test]
    async fn test_window_out_of_range_rank() {
        let (_root, files) = files_of(&[(0.0, 0.0)]).await;
        let index = AxisIndex::from_files(Axis::X, files);
        assert_eq!(index.window_bounds(4, 1.0), None);
        assert!(index.window(4, 1.0).is_empty());
    }

    #[tokio::test]
    async fn test_folder_index_is_memoized_per_axis_and_scope() {
        let root = folder_with(&[(0.0, 0.0), (1.0, 1.0)]);
        root.get_contents(false).await.unwrap();
        assert_eq!(root.index_build_count(), 0);

        let first = root.axis_index(Axis::X, false).await;
        let second = root.axis_index(Axis::X, false).await;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(root.index_build_count(), 1);

        let y = root.axis_index(Axis::Y, false).await;
        let x_all = root.axis_index(Axis::X, true).await;
        assert!(!Arc::ptr_eq(&first, &x_all));
        assert_eq!(y.axis(), Axis::Y);
        assert_eq!(root.index_build_count(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_index_requests_build_once() {
        let root = folder_with(&[(0.0, 0.0), (1.0, 1.0)]);
        root.get_contents(false).await.unwrap();

        let (a, b) = futures::join!(root.axis_index(Axis::Y, true), root.axis_index(Axis::Y, true));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(root.index_build_count(), 1);
    }

    #[tokio::test]
    async fn test_folder_index_skips_hidden_files() {
        let root = folder_with(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        let entries = root.get_contents(false).await.unwrap();
        entries[1].set_visible(false);

        let index = root.axis_index(Axis::X, false).await;
        assert_eq!(index.len(), 2);
        assert_eq!(names(index.range(0..=1)), ["p0.jpg", "p2.jpg"]);
    }
}
