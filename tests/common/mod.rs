//! Shared fixtures for integration tests
//!
//! Builds small little-endian GeoTIFF files byte by byte (float32
//! samples, single strip, chunky layout) and GeoJSON zone files, inside
//! a per-test temp workspace.

use std::fs;
use std::path::{Path, PathBuf};

use zonalstack::tiff::constants::{field_types, tags};

/// Creates a fresh workspace directory for one test
pub fn workspace(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("zonalstack-it-{}", name));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn push_entry(buf: &mut Vec<u8>, tag: u16, field_type: u16, count: u32, value: [u8; 4]) {
    buf.extend_from_slice(&tag.to_le_bytes());
    buf.extend_from_slice(&field_type.to_le_bytes());
    buf.extend_from_slice(&count.to_le_bytes());
    buf.extend_from_slice(&value);
}

fn long_value(v: u32) -> [u8; 4] {
    v.to_le_bytes()
}

fn short_value(v: u16) -> [u8; 4] {
    let mut out = [0u8; 4];
    out[..2].copy_from_slice(&v.to_le_bytes());
    out
}

/// Writes a 2-band float32 GeoTIFF
///
/// Bands are row-major planes of `width * height` values, stored
/// interleaved in a single uncompressed strip. The file carries
/// ModelPixelScale/ModelTiepoint tags anchoring pixel (0,0) to
/// `origin`, a GDAL_NODATA tag of "0" and band descriptions VV and VH.
pub fn write_raster(
    path: &Path,
    width: u32,
    height: u32,
    origin: (f64, f64),
    pixel_size: f64,
    bands: &[Vec<f32>; 2],
) {
    build_raster(path, width, height, origin, pixel_size, bands, None);
}

/// Same as `write_raster` but also stamps the TIFF DateTime tag
///
/// # Arguments
/// * `datetime` - Timestamp in TIFF form, e.g. "2020:06:15 10:30:00"
pub fn write_raster_dated(
    path: &Path,
    width: u32,
    height: u32,
    origin: (f64, f64),
    pixel_size: f64,
    bands: &[Vec<f32>; 2],
    datetime: &str,
) {
    build_raster(path, width, height, origin, pixel_size, bands, Some(datetime));
}

fn build_raster(
    path: &Path,
    width: u32,
    height: u32,
    origin: (f64, f64),
    pixel_size: f64,
    bands: &[Vec<f32>; 2],
    datetime: Option<&str>,
) {
    assert_eq!(bands[0].len(), (width * height) as usize);
    assert_eq!(bands[1].len(), (width * height) as usize);

    let xml = "<GDALMetadata>\
               <Item name=\"DESCRIPTION\" sample=\"0\" role=\"description\">VV</Item>\
               <Item name=\"DESCRIPTION\" sample=\"1\" role=\"description\">VH</Item>\
               </GDALMetadata>\0";
    let datetime_bytes: Option<Vec<u8>> = datetime.map(|dt| {
        let mut bytes = dt.as_bytes().to_vec();
        bytes.push(0);
        bytes
    });

    let entry_count: u16 = 14 + datetime_bytes.is_some() as u16;
    let ifd_size = 2 + entry_count as u32 * 12 + 4;
    let data_start = 8 + ifd_size;

    let scale_offset = data_start;
    let tiepoint_offset = scale_offset + 3 * 8;
    let xml_offset = tiepoint_offset + 6 * 8;
    let datetime_offset = xml_offset + xml.len() as u32;
    let strip_offset =
        datetime_offset + datetime_bytes.as_ref().map(|b| b.len() as u32).unwrap_or(0);
    let strip_bytes = width * height * 2 * 4;

    let mut buf = Vec::new();

    // Header: little-endian classic TIFF, IFD at offset 8
    buf.extend_from_slice(&[0x49, 0x49]);
    buf.extend_from_slice(&42u16.to_le_bytes());
    buf.extend_from_slice(&8u32.to_le_bytes());

    buf.extend_from_slice(&entry_count.to_le_bytes());
    push_entry(&mut buf, tags::IMAGE_WIDTH, field_types::LONG, 1, long_value(width));
    push_entry(&mut buf, tags::IMAGE_LENGTH, field_types::LONG, 1, long_value(height));
    push_entry(&mut buf, tags::BITS_PER_SAMPLE, field_types::SHORT, 2, [32, 0, 32, 0]);
    push_entry(&mut buf, tags::COMPRESSION, field_types::SHORT, 1, short_value(1));
    push_entry(&mut buf, tags::STRIP_OFFSETS, field_types::LONG, 1, long_value(strip_offset));
    push_entry(&mut buf, tags::SAMPLES_PER_PIXEL, field_types::SHORT, 1, short_value(2));
    push_entry(&mut buf, tags::ROWS_PER_STRIP, field_types::LONG, 1, long_value(height));
    push_entry(&mut buf, tags::STRIP_BYTE_COUNTS, field_types::LONG, 1, long_value(strip_bytes));
    push_entry(&mut buf, tags::PLANAR_CONFIGURATION, field_types::SHORT, 1, short_value(1));
    if let Some(bytes) = &datetime_bytes {
        push_entry(&mut buf, tags::DATE_TIME, field_types::ASCII, bytes.len() as u32, long_value(datetime_offset));
    }
    push_entry(&mut buf, tags::SAMPLE_FORMAT, field_types::SHORT, 2, [3, 0, 3, 0]);
    push_entry(&mut buf, tags::MODEL_PIXEL_SCALE_TAG, field_types::DOUBLE, 3, long_value(scale_offset));
    push_entry(&mut buf, tags::MODEL_TIEPOINT_TAG, field_types::DOUBLE, 6, long_value(tiepoint_offset));
    push_entry(&mut buf, tags::GDAL_METADATA, field_types::ASCII, xml.len() as u32, long_value(xml_offset));
    push_entry(&mut buf, tags::GDAL_NODATA, field_types::ASCII, 2, [b'0', 0, 0, 0]);

    // No further IFDs
    buf.extend_from_slice(&0u32.to_le_bytes());

    // ModelPixelScale: x and y cell size, z unused
    for v in [pixel_size, pixel_size, 0.0] {
        buf.extend_from_slice(&v.to_le_bytes());
    }
    // ModelTiepoint: raster (0,0,0) maps to world (origin, 0)
    for v in [0.0, 0.0, 0.0, origin.0, origin.1, 0.0] {
        buf.extend_from_slice(&v.to_le_bytes());
    }
    buf.extend_from_slice(xml.as_bytes());
    if let Some(bytes) = &datetime_bytes {
        buf.extend_from_slice(bytes);
    }

    // Pixel data, chunky: VV then VH per pixel
    for i in 0..(width * height) as usize {
        buf.extend_from_slice(&bands[0][i].to_le_bytes());
        buf.extend_from_slice(&bands[1][i].to_le_bytes());
    }

    fs::write(path, buf).unwrap();
}

/// GeoJSON Feature for an axis-aligned square zone
pub fn square_feature(label: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> String {
    format!(
        r#"{{"type":"Feature","properties":{{"AREA":"{label}"}},"geometry":{{"type":"Polygon","coordinates":[[[{x0},{y0}],[{x1},{y0}],[{x1},{y1}],[{x0},{y1}],[{x0},{y0}]]]}}}}"#
    )
}

/// Writes a FeatureCollection of the given features
pub fn write_zones(path: &Path, features: &[String]) {
    let body = format!(
        r#"{{"type":"FeatureCollection","features":[{}]}}"#,
        features.join(",")
    );
    fs::write(path, body).unwrap();
}
