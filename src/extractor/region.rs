//! Pixel windows
//!
//! Rectangular pixel regions of a raster, built from geographic bounding
//! boxes and clamped to the image extent.

use crate::raster::GeoTransform;

/// A rectangular pixel window, end-exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub col_start: usize,
    pub row_start: usize,
    pub col_end: usize,
    pub row_end: usize,
}

impl Region {
    /// Window covering a geographic bounding box, clamped to the raster
    ///
    /// # Returns
    /// None when the box lies entirely outside the raster
    pub fn from_bbox(
        transform: &GeoTransform,
        bbox: (f64, f64, f64, f64),
        width: usize,
        height: usize,
    ) -> Option<Self> {
        let (min_x, min_y, max_x, max_y) = bbox;

        // North-up: min_y maps to the bottom row, max_y to the top row
        let (c0, r0) = transform.geo_to_pixel(min_x, max_y);
        let (c1, r1) = transform.geo_to_pixel(max_x, min_y);

        let col_start = c0.floor().max(0.0) as usize;
        let row_start = r0.floor().max(0.0) as usize;
        let col_end = (c1.ceil().max(0.0) as usize).min(width);
        let row_end = (r1.ceil().max(0.0) as usize).min(height);

        if col_start >= col_end || row_start >= row_end {
            return None;
        }

        Some(Region { col_start, row_start, col_end, row_end })
    }

    pub fn pixel_count(&self) -> usize {
        (self.col_end - self.col_start) * (self.row_end - self.row_start)
    }
}
