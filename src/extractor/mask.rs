//! Polygon masking and per-band means
//!
//! The core reduction: for one grid and one polygon, average every band
//! over the pixels whose center falls inside the polygon, skipping the
//! nodata sentinel. An empty mask yields NaN per band rather than an
//! error, so zones outside the scene still appear in the output.

use log::{debug, warn};

use crate::errors::ZonalResult;
use crate::extractor::region::Region;
use crate::geometry::Polygon;
use crate::raster::RasterGrid;

/// Mean pixel value per band under one polygon
///
/// # Arguments
/// * `grid` - Decoded raster
/// * `polygon` - Zone to mask with
/// * `nodata` - Sentinel excluded from the aggregate
///
/// # Returns
/// One mean per band, NaN where no valid pixel was covered, or
/// `GeometryError` when the zone has no geometry
pub fn polygon_band_means(
    grid: &RasterGrid,
    polygon: &Polygon,
    nodata: f64,
) -> ZonalResult<Vec<f64>> {
    let geometry = polygon.require_geometry()?;
    let bands = grid.band_count();

    let mut sums = vec![0.0f64; bands];
    let mut counts = vec![0u64; bands];

    let window = Region::from_bbox(&grid.transform, geometry.bbox(), grid.width, grid.height);

    if let Some(window) = window {
        debug!(
            "Zone '{}' covers a {} pixel window",
            polygon.label,
            window.pixel_count()
        );

        for row in window.row_start..window.row_end {
            for col in window.col_start..window.col_end {
                let (x, y) = grid.transform.pixel_center(col, row);
                if !geometry.contains(x, y) {
                    continue;
                }

                for band in 0..bands {
                    let value = grid.bands[band][row * grid.width + col];
                    if value == nodata || value.is_nan() {
                        continue;
                    }
                    sums[band] += value;
                    counts[band] += 1;
                }
            }
        }
    }

    let means: Vec<f64> = sums
        .iter()
        .zip(&counts)
        .map(|(&sum, &count)| match count {
            0 => f64::NAN,
            n => sum / n as f64,
        })
        .collect();

    if counts.iter().all(|&c| c == 0) {
        warn!("Zone '{}' covers no valid pixels in this scene", polygon.label);
    }

    Ok(means)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{PolygonGeometry, PolygonPart};
    use crate::raster::GeoTransform;

    fn zone(label: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon {
        Polygon {
            label: label.to_string(),
            geometry: Some(PolygonGeometry {
                parts: vec![PolygonPart {
                    exterior: vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)],
                    holes: vec![],
                }],
            }),
        }
    }

    /// 4x4 grid, origin (0, 40), 10m cells, two bands
    fn grid_4x4() -> RasterGrid {
        let band0: Vec<f64> = (1..=16).map(|v| v as f64).collect();
        let band1: Vec<f64> = (1..=16).map(|v| (v * 10) as f64).collect();
        RasterGrid {
            width: 4,
            height: 4,
            bands: vec![band0, band1],
            transform: GeoTransform::new(0.0, 40.0, 10.0, -10.0),
            nodata: Some(0.0),
            band_names: vec!["VV".to_string(), "VH".to_string()],
        }
    }

    #[test]
    fn means_cover_pixel_centers_inside() {
        let grid = grid_4x4();
        // Covers pixel centers (5,35), (15,35), (5,25), (15,25):
        // values 1, 2, 5, 6 in band 0
        let polygon = zone("a", 0.0, 20.0, 20.0, 40.0);

        let means = polygon_band_means(&grid, &polygon, 0.0).unwrap();
        assert_eq!(means.len(), 2);
        assert!((means[0] - 3.5).abs() < 1e-12);
        assert!((means[1] - 35.0).abs() < 1e-12);
    }

    #[test]
    fn nodata_pixels_are_excluded() {
        let mut grid = grid_4x4();
        grid.bands[0][0] = 0.0; // pixel (0,0) becomes nodata in band 0

        let polygon = zone("a", 0.0, 20.0, 20.0, 40.0);
        let means = polygon_band_means(&grid, &polygon, 0.0).unwrap();

        // Band 0 averages 2, 5, 6; band 1 is untouched
        assert!((means[0] - 13.0 / 3.0).abs() < 1e-12);
        assert!((means[1] - 35.0).abs() < 1e-12);
    }

    #[test]
    fn disjoint_zone_yields_nan() {
        let grid = grid_4x4();
        let polygon = zone("far", 1000.0, 1000.0, 1100.0, 1100.0);

        let means = polygon_band_means(&grid, &polygon, 0.0).unwrap();
        assert!(means.iter().all(|m| m.is_nan()));
    }

    #[test]
    fn all_nodata_zone_yields_nan() {
        let mut grid = grid_4x4();
        for plane in &mut grid.bands {
            plane.fill(0.0);
        }

        let polygon = zone("a", 0.0, 20.0, 20.0, 40.0);
        let means = polygon_band_means(&grid, &polygon, 0.0).unwrap();
        assert!(means.iter().all(|m| m.is_nan()));
    }

    #[test]
    fn missing_geometry_is_an_error() {
        let grid = grid_4x4();
        let polygon = Polygon {
            label: "broken".to_string(),
            geometry: None,
        };

        assert!(polygon_band_means(&grid, &polygon, 0.0).is_err());
    }
}
