//! End-to-end extraction tests over synthetic GeoTIFF stacks

mod common;

use std::fs;
use std::path::PathBuf;

use zonalstack::catalog::{DateStrategy, RasterCatalog};
use zonalstack::config::{CliOverrides, FileConfig, JobConfig};
use zonalstack::{decode_raster, geometry, pipeline, ZonalError};

use common::{square_feature, workspace, write_raster, write_raster_dated, write_zones};

/// 4x4 scene at origin (0, 40) with 10m cells and uniform band values
fn uniform_scene(path: &PathBuf, vv: f32, vh: f32) {
    let bands = [vec![vv; 16], vec![vh; 16]];
    write_raster(path, 4, 4, (0.0, 40.0), 10.0, &bands);
}

fn config_for(dir: &PathBuf, zones: &PathBuf) -> JobConfig {
    let cli = CliOverrides {
        raster_dir: Some(dir.clone()),
        polygon_file: Some(zones.clone()),
        ..Default::default()
    };
    JobConfig::resolve(cli, FileConfig::default()).unwrap()
}

fn run_to_csv(config: &JobConfig) -> String {
    let catalog = RasterCatalog::scan(
        &config.raster_dir,
        &config.extension,
        &config.date_strategy,
    )
    .unwrap();
    let polygons = geometry::load_polygons(&config.polygon_file, &config.label_field).unwrap();

    let table = pipeline::run(config, &catalog, &polygons).unwrap();
    table.write(&config.output_path).unwrap();
    fs::read_to_string(&config.output_path).unwrap()
}

#[test]
fn two_rasters_three_zones_in_fixed_order() {
    let dir = workspace("scenario");

    // First scene carries a nodata pixel that must not skew the mean
    let mut bands = [vec![5.0f32; 16], vec![50.0f32; 16]];
    bands[0][0] = 0.0;
    bands[1][0] = 0.0;
    write_raster(&dir.join("s1_20200101.tif"), 4, 4, (0.0, 40.0), 10.0, &bands);
    uniform_scene(&dir.join("s1_20200115.tif"), 7.5, 75.0);

    // Zone B lies entirely outside both scenes
    let zones = dir.join("zones.geojson");
    write_zones(
        &zones,
        &[
            square_feature("A", 0.0, 20.0, 20.0, 40.0),
            square_feature("B", 1000.0, 1000.0, 1100.0, 1100.0),
            square_feature("C", 20.0, 0.0, 40.0, 20.0),
        ],
    );

    let config = config_for(&dir, &zones);
    let csv = run_to_csv(&config);

    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 7); // header + 2 rasters x 3 zones
    assert_eq!(lines[0], "Date,Fields,VV,VH");
    assert_eq!(lines[1], "2020/01/01,A,5,50");
    assert_eq!(lines[2], "2020/01/01,B,NaN,NaN");
    assert_eq!(lines[3], "2020/01/01,C,5,50");
    assert_eq!(lines[4], "2020/01/15,A,7.5,75");
    assert_eq!(lines[5], "2020/01/15,B,NaN,NaN");
    assert_eq!(lines[6], "2020/01/15,C,7.5,75");

    // Default output path lands inside the raster directory
    assert_eq!(config.output_path, dir.join("data_mean_by_polygon_S1.csv"));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn reruns_produce_byte_identical_output() {
    let dir = workspace("determinism");
    uniform_scene(&dir.join("a_20210301.tif"), 1.25, 2.5);
    uniform_scene(&dir.join("b_20210401.tif"), 3.0, 4.0);

    let zones = dir.join("zones.geojson");
    write_zones(
        &zones,
        &[
            square_feature("north", 0.0, 20.0, 40.0, 40.0),
            square_feature("south", 0.0, 0.0, 40.0, 20.0),
        ],
    );

    let config = config_for(&dir, &zones);
    let first = run_to_csv(&config);
    let second = run_to_csv(&config);

    assert_eq!(first, second);
    assert!(first.contains("2021/03/01,north,1.25,2.5"));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn band_selection_narrows_the_columns() {
    let dir = workspace("bands");
    uniform_scene(&dir.join("s1_20200101.tif"), 5.0, 50.0);

    let zones = dir.join("zones.geojson");
    write_zones(&zones, &[square_feature("A", 0.0, 20.0, 20.0, 40.0)]);

    let mut config = config_for(&dir, &zones);
    config.bands = Some(vec![2]);

    let csv = run_to_csv(&config);
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "Date,Fields,VH");
    assert_eq!(lines[1], "2020/01/01,A,50");

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn broken_zone_keeps_its_rows() {
    let dir = workspace("broken-zone");
    uniform_scene(&dir.join("s1_20200101.tif"), 5.0, 50.0);

    let zones = dir.join("zones.geojson");
    let broken = r#"{"type":"Feature","properties":{"AREA":"bad"},"geometry":null}"#.to_string();
    write_zones(
        &zones,
        &[square_feature("A", 0.0, 20.0, 20.0, 40.0), broken],
    );

    let config = config_for(&dir, &zones);
    let csv = run_to_csv(&config);

    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1], "2020/01/01,A,5,50");
    assert_eq!(lines[2], "2020/01/01,bad,NaN,NaN");

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn metadata_strategy_reads_the_datetime_tag() {
    let dir = workspace("metadata-date");
    let bands = [vec![1.0f32; 16], vec![2.0f32; 16]];

    // No date token in either file name
    let dated = dir.join("scene_alpha.tif");
    write_raster_dated(&dated, 4, 4, (0.0, 40.0), 10.0, &bands, "2020:06:15 10:30:00");
    let undated = dir.join("scene_beta.tif");
    write_raster(&undated, 4, 4, (0.0, 40.0), 10.0, &bands);

    let strategy = DateStrategy::Metadata;
    assert_eq!(strategy.derive(&dated).unwrap().to_string(), "2020/06/15");
    assert!(matches!(
        strategy.derive(&undated),
        Err(ZonalError::DateParse { .. })
    ));

    // The catalog keeps the stamped file and skips the other
    let catalog = RasterCatalog::scan(&dir, "tif", &strategy).unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.sources[0].date.to_string(), "2020/06/15");

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn fixture_rasters_decode_with_georeferencing() {
    let dir = workspace("decode");
    let path = dir.join("s1_20200101.tif");
    uniform_scene(&path, 5.0, 50.0);

    let grid = decode_raster(&path).unwrap();
    assert_eq!((grid.width, grid.height), (4, 4));
    assert_eq!(grid.band_count(), 2);
    assert_eq!(grid.band_names, vec!["VV", "VH"]);
    assert_eq!(grid.nodata, Some(0.0));
    assert_eq!(grid.transform.origin_x, 0.0);
    assert_eq!(grid.transform.origin_y, 40.0);
    assert_eq!(grid.transform.pixel_width, 10.0);
    assert_eq!(grid.transform.pixel_height, -10.0);
    assert_eq!(grid.value(0, 0, 0), Some(5.0));
    assert_eq!(grid.value(1, 3, 3), Some(50.0));

    fs::remove_dir_all(&dir).unwrap();
}
