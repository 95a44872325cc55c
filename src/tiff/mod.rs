//! GeoTIFF structure parsing
//!
//! Header and IFD parsing for TIFF/BigTIFF plus extraction of the
//! GeoTIFF and GDAL tags the pipeline needs (georeferencing, nodata,
//! band descriptions, acquisition timestamp).

pub mod constants;
pub mod geo;
pub mod ifd;
pub mod metadata;
pub mod reader;

pub use ifd::{Ifd, IfdEntry, Tiff};
pub use reader::TiffReader;
