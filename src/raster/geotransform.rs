//! Affine geotransform for georeferenced rasters
//!
//! Maps between pixel coordinates (col, row) and the coordinate space the
//! polygons live in. North-up images only; the pipeline assumes inputs
//! are co-registered and never reprojects.

/// Affine transformation coefficients for a north-up raster
///
/// ```text
/// x = origin_x + col * pixel_width
/// y = origin_y + row * pixel_height   (pixel_height is negative)
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    /// X coordinate of the upper-left corner
    pub origin_x: f64,
    /// Y coordinate of the upper-left corner
    pub origin_y: f64,
    /// Pixel width (cell size in X direction)
    pub pixel_width: f64,
    /// Pixel height (cell size in Y direction, negative for north-up)
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Create a new GeoTransform
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self { origin_x, origin_y, pixel_width, pixel_height }
    }

    /// Build from GeoTIFF ModelPixelScale and ModelTiepoint values
    ///
    /// The tiepoint anchors raster position (i, j) to world position
    /// (x, y); the scale gives cell sizes. Y scale is stored positive in
    /// the tag and negated here.
    pub fn from_scale_and_tiepoint(pixel_scale: &[f64], tiepoint: &[f64]) -> Option<Self> {
        if pixel_scale.len() < 2 || tiepoint.len() < 6 {
            return None;
        }

        let pixel_width = pixel_scale[0];
        let pixel_height = -pixel_scale[1];
        let origin_x = tiepoint[3] - tiepoint[0] * pixel_width;
        let origin_y = tiepoint[4] - tiepoint[1] * pixel_height;

        Some(Self::new(origin_x, origin_y, pixel_width, pixel_height))
    }

    /// Convert geographic coordinates to fractional pixel coordinates
    ///
    /// Returns (col, row); use `.floor()` for integer indices.
    pub fn geo_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        let col = (x - self.origin_x) / self.pixel_width;
        let row = (y - self.origin_y) / self.pixel_height;
        (col, row)
    }

    /// Geographic coordinates of the center of pixel (col, row)
    pub fn pixel_center(&self, col: usize, row: usize) -> (f64, f64) {
        let x = self.origin_x + (col as f64 + 0.5) * self.pixel_width;
        let y = self.origin_y + (row as f64 + 0.5) * self.pixel_height;
        (x, y)
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, -1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_geo_roundtrip() {
        let gt = GeoTransform::new(100.0, 200.0, 10.0, -10.0);

        let (x, y) = gt.pixel_center(5, 10);
        let (col, row) = gt.geo_to_pixel(x, y);

        assert!((col - 5.5).abs() < 1e-10);
        assert!((row - 10.5).abs() < 1e-10);
    }

    #[test]
    fn from_geotiff_tags() {
        // Tiepoint anchors pixel (0,0) to world (500000, 4600000)
        let scale = [10.0, 10.0, 0.0];
        let tiepoint = [0.0, 0.0, 0.0, 500000.0, 4600000.0, 0.0];

        let gt = GeoTransform::from_scale_and_tiepoint(&scale, &tiepoint).unwrap();
        assert_eq!(gt.origin_x, 500000.0);
        assert_eq!(gt.origin_y, 4600000.0);
        assert_eq!(gt.pixel_width, 10.0);
        assert_eq!(gt.pixel_height, -10.0);
    }

    #[test]
    fn incomplete_tags_rejected() {
        assert!(GeoTransform::from_scale_and_tiepoint(&[10.0], &[0.0; 6]).is_none());
        assert!(GeoTransform::from_scale_and_tiepoint(&[10.0, 10.0], &[0.0; 3]).is_none());
    }
}
