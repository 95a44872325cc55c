//! Zonal statistics over temporal GeoTIFF stacks
//!
//! Computes per-polygon mean pixel values for every raster of a dated
//! stack and serializes them as one long-format table: one row per
//! (acquisition date, zone), one column per band.
//!
//! The library is organized in layers: `tiff` and `compression` read the
//! file format, `raster` decodes pixels into band planes, `geometry` and
//! `extractor` do the masking, `catalog`, `table` and `pipeline` drive a
//! run. The `commands` module exposes the same functionality to the CLI
//! binary.

pub mod catalog;
pub mod commands;
pub mod compression;
pub mod config;
pub mod errors;
pub mod extractor;
pub mod geometry;
pub mod io;
pub mod pipeline;
pub mod raster;
pub mod table;
pub mod tiff;
pub mod utils;

pub use catalog::{DateStrategy, RasterCatalog, SceneDate};
pub use config::JobConfig;
pub use errors::{ZonalError, ZonalResult};
pub use extractor::polygon_band_means;
pub use geometry::{load_polygons, Polygon};
pub use raster::{decode_raster, GeoTransform, RasterGrid};
pub use table::{ResultTable, RowRecord};
