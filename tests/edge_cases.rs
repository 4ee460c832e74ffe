use geophoto::prelude::*;
use geophoto::{Axis, GeoPhotoError};
use std::sync::Arc;

fn at(name: &str, x: f64, y: f64) -> MemoryFile {
    MemoryFile::new(name).spatial(Point3d::new(x, y, 0.0))
}

async fn loaded(storage: MemoryStorage) -> Arc<Folder> {
    let root = Folder::root(Arc::new(storage), "root", "");
    root.load_subtree().await.unwrap();
    root
}

fn photo(folder: &Arc<Folder>, index: usize) -> Arc<MediaFile> {
    folder.contents().unwrap()[index].as_file().unwrap().clone()
}

/// Test 1: Large folder against a brute-force scan
#[tokio::test]
async fn test_large_folder_matches_brute_force() {
    let mut storage = MemoryStorage::new();
    let mut points = Vec::new();
    for i in 0..2_000 {
        let x = ((i * 7_919) % 1_000) as f64 * 0.9;
        let y = ((i * 104_729) % 997) as f64 * 1.1;
        points.push(Point3d::new(x, y, 0.0));
        storage = storage.with_file("root", at(&format!("p{}", i), x, y));
    }
    let root = loaded(storage).await;

    for q in [0usize, 17, 999, 1_500, 1_999] {
        let found = photo(&root, q).find_neighbors(false, Some(25.0)).await;
        let expected = points
            .iter()
            .enumerate()
            .filter(|(i, p)| {
                let d2 = p.distance_squared_2d(&points[q]);
                *i != q && d2 > 1e-6 && d2 <= 625.0
            })
            .count();
        assert_eq!(found.len(), expected, "query p{}", q);
    }
}

/// Test 2: Many photos at the same spot
#[tokio::test]
async fn test_stacked_duplicates() {
    let mut storage = MemoryStorage::new();
    for i in 0..50 {
        storage = storage.with_file("root", at(&format!("dup{}", i), 5.0, 5.0));
    }
    storage = storage.with_file("root", at("beside", 6.0, 5.0));
    let root = loaded(storage).await;

    let found = photo(&root, 10).find_neighbors(false, None).await;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name(), "beside");

    let from_beside = photo(&root, 50).find_neighbors(false, Some(2.0)).await;
    assert_eq!(from_beside.len(), 50);
}

/// Test 3: Extreme coordinate values in the project frame
#[tokio::test]
async fn test_extreme_coordinates() {
    let root = loaded(
        MemoryStorage::new()
            .with_file("root", at("far_west", -1.0e12, 0.0))
            .with_file("root", at("far_west_2", -1.0e12 + 4096.0, 0.0))
            .with_file("root", at("origin", 0.0, 0.0))
            .with_file("root", at("bad", f64::NAN, 0.0)),
    )
    .await;

    let found = photo(&root, 0).find_neighbors(false, Some(5_000.0)).await;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name(), "far_west_2");

    // Non-finite positions never enter an index.
    assert!(photo(&root, 3).find_neighbors(false, None).await.is_empty());
    assert_eq!(root.axis_index(Axis::X, false).await.len(), 3);
}

/// Test 4: Empty and photo-less trees
#[tokio::test]
async fn test_empty_trees() {
    let root = loaded(MemoryStorage::new().with_folder("root", "empty")).await;
    assert!(root.axis_index(Axis::Y, true).await.is_empty());
    assert!(root.collect_media(true, false).is_empty());

    let tree = PhotoTree::builder(Arc::new(MemoryStorage::new()), "root").build().unwrap();
    let (tags, positions) = tree.prepare().await.unwrap();
    assert_eq!(tags.tagged + tags.missing + tags.failed, 0);
    assert_eq!(positions.fallback + positions.converted + positions.rejected, 0);
}

/// Test 5: Storage failures surface from load but not from passes
#[tokio::test]
async fn test_storage_failures() {
    let storage = MemoryStorage::new()
        .with_folder("root", "broken")
        .with_failing_folder("root/broken")
        .with_file("root", at("a", 0.0, 0.0));
    let tree = PhotoTree::builder(Arc::new(storage), "root").build().unwrap();

    let err = tree.load().await.unwrap_err();
    assert!(matches!(err, GeoPhotoError::Storage { ref path, .. } if path == "root/broken"));

    // The root listing succeeded and is usable.
    assert_eq!(tree.photos(true).len(), 1);
    let stats = tree.assign_geo_locations().await;
    assert_eq!(stats.failed, 1);
}

/// Test 6: Queries on an orphaned photo
#[tokio::test]
async fn test_orphaned_photo() {
    let root = loaded(
        MemoryStorage::new()
            .with_file("root", at("a", 0.0, 0.0))
            .with_file("root", at("b", 1.0, 0.0)),
    )
    .await;
    let a = photo(&root, 0);
    drop(root);

    assert!(a.parent().is_none());
    assert!(a.find_neighbors(false, None).await.is_empty());
    assert!(matches!(
        a.file_contents(None).await,
        Err(GeoPhotoError::FolderGone(_))
    ));
}

/// Test 7: Configuration edge cases
#[test]
fn test_config_rejects_bad_values() {
    assert!(Config::default().with_same_point_epsilon(-1.0).validate().is_err());
    assert!(Config::default().with_max_distance(f64::INFINITY).validate().is_err());
    assert!(
        Config::default()
            .with_ecef_anchor(Cartographic::new(0.0, 91.0, 0.0))
            .validate()
            .is_err()
    );
    assert!(Config::from_json(r#"{"default_max_distance": 0.0}"#).is_err());
    assert!(Config::from_json("not json").is_err());
}
