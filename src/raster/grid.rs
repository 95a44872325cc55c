//! Decoded raster grid
//!
//! A raster decoded once into per-band `f64` planes, together with its
//! geotransform and nodata sentinel. All polygons of a scene are masked
//! against the same grid, so each file is opened and decoded exactly
//! once per run.

use crate::errors::{ZonalError, ZonalResult};
use crate::raster::GeoTransform;

/// An in-memory raster: band planes plus georeferencing
#[derive(Debug, Clone)]
pub struct RasterGrid {
    /// Width in pixels (columns)
    pub width: usize,
    /// Height in pixels (rows)
    pub height: usize,
    /// One row-major plane per band
    pub bands: Vec<Vec<f64>>,
    /// Affine pixel/geo mapping
    pub transform: GeoTransform,
    /// Nodata sentinel from file metadata, if any
    pub nodata: Option<f64>,
    /// Display name per band, aligned with `bands`
    pub band_names: Vec<String>,
}

impl RasterGrid {
    /// Number of bands
    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    /// Value of one pixel in one band
    ///
    /// # Returns
    /// None when the coordinates fall outside the grid
    pub fn value(&self, band: usize, col: usize, row: usize) -> Option<f64> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.bands.get(band).map(|plane| plane[row * self.width + col])
    }

    /// Restrict the grid to a 1-based selection of bands, in the given order
    ///
    /// # Arguments
    /// * `selection` - 1-based band numbers, e.g. `[1, 2]`
    pub fn select_bands(&mut self, selection: &[usize]) -> ZonalResult<()> {
        let mut bands = Vec::with_capacity(selection.len());
        let mut names = Vec::with_capacity(selection.len());

        for &number in selection {
            if number == 0 || number > self.bands.len() {
                return Err(ZonalError::GenericError(format!(
                    "Band {} out of range (raster has {} bands)",
                    number,
                    self.bands.len()
                )));
            }
            bands.push(self.bands[number - 1].clone());
            names.push(self.band_names[number - 1].clone());
        }

        self.bands = bands;
        self.band_names = names;
        Ok(())
    }
}
