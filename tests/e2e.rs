mod common;

use common::init_logging;
use lidar_mcc::filter::SurfaceOutlierFilter;
use lidar_mcc::store::io::write_xyz;
use lidar_mcc::store::{DirectoryStore, PointStore};
use lidar_mcc::synthetic::{generate, is_above_terrain, TerrainOptions};
use lidar_mcc::{MccError, MccParams, MultiscaleClassifier, RunRequest};

#[test]
fn synthetic_terrain_separates_objects_from_ground() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let cloud = generate(&TerrainOptions::default());
    let n_ground = cloud.ground.count();
    let n_objects = cloud.objects.count();
    write_xyz(&dir.path().join("cloud.xyz"), &cloud.into_point_set()).unwrap();

    let mut store = DirectoryStore::open(dir.path()).unwrap();
    let params = MccParams {
        convergence_threshold: 0.01,
        ..MccParams::default()
    };
    let mcc = MultiscaleClassifier::new(params, SurfaceOutlierFilter::default()).unwrap();
    let report = mcc
        .run(&mut store, &RunRequest::new("cloud", "ground", "nonground"))
        .unwrap();

    assert!(report.is_conserved());
    assert_eq!(report.input.points, n_ground + n_objects);
    assert_eq!(report.scales.len(), 3);

    let ground = store.load("ground").unwrap();
    let nonground = store.load("nonground").unwrap();
    assert_eq!(ground.count() + nonground.count(), n_ground + n_objects);

    let objects_found = nonground.iter().filter(|p| is_above_terrain(p, 1.0)).count();
    let ground_lost = nonground.iter().filter(|p| !is_above_terrain(p, 1.0)).count();
    assert!(
        objects_found as f64 >= 0.8 * n_objects as f64,
        "only {objects_found} of {n_objects} object returns classified as non-ground"
    );
    assert!(
        ground_lost as f64 <= 0.05 * n_ground as f64,
        "{ground_lost} of {n_ground} terrain returns classified as non-ground"
    );
}

#[test]
fn existing_outputs_need_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let opts = TerrainOptions {
        width: 20.0,
        height: 20.0,
        trees: 2,
        buildings: 0,
        ..TerrainOptions::default()
    };
    write_xyz(
        &dir.path().join("small.xyz"),
        &generate(&opts).into_point_set(),
    )
    .unwrap();

    let mut store = DirectoryStore::open(dir.path()).unwrap();
    let mcc =
        MultiscaleClassifier::new(MccParams::default(), SurfaceOutlierFilter::default()).unwrap();
    let request = RunRequest::new("small", "g", "ng");
    let first = mcc.run(&mut store, &request).unwrap();
    assert!(dir.path().join("g.xyz").is_file());
    assert!(dir.path().join("ng.xyz").is_file());

    let err = mcc.run(&mut store, &request).unwrap_err();
    assert!(matches!(err, MccError::OutputExists(ref n) if n == "g"));

    let second = mcc.run(&mut store, &request.clone().with_overwrite(true)).unwrap();
    assert_eq!(first.ground_points, second.ground_points);
    assert_eq!(store.count("g").unwrap(), second.ground_points);
}
