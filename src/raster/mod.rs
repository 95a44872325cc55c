//! Raster domain types
//!
//! Decoded band planes, the affine geotransform and the strip decoder
//! that produces them from GeoTIFF files.

pub mod decode;
pub mod geotransform;
pub mod grid;

pub use decode::decode_raster;
pub use geotransform::GeoTransform;
pub use grid::RasterGrid;
