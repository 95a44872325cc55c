//! Raster stack discovery
//!
//! Walks the input directory, collects the GeoTIFF files of the temporal
//! stack and derives an acquisition date for each one. The catalog order
//! is the processing and output order, so it is fixed here once.

pub mod date;

use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{ZonalError, ZonalResult};

pub use date::{DateStrategy, SceneDate};

/// One raster of the stack, with its derived acquisition date
#[derive(Debug, Clone)]
pub struct RasterSource {
    pub path: PathBuf,
    pub date: SceneDate,
}

/// The ordered set of rasters a run will process
pub struct RasterCatalog {
    pub sources: Vec<RasterSource>,
}

impl RasterCatalog {
    /// Scans a directory tree for rasters and derives their dates
    ///
    /// Files are matched by extension (case-insensitive) and sorted
    /// lexicographically by full path. Files whose date cannot be
    /// derived are skipped with a warning; a missing or unreadable
    /// root directory is fatal.
    ///
    /// # Arguments
    /// * `root` - Directory holding the raster stack
    /// * `extension` - File extension to match, without the dot
    /// * `strategy` - How acquisition dates are derived
    pub fn scan(root: &Path, extension: &str, strategy: &DateStrategy) -> ZonalResult<Self> {
        if !root.is_dir() {
            return Err(ZonalError::InputNotFound(root.display().to_string()));
        }

        let mut paths = Vec::new();
        collect_files(root, extension, &mut paths)?;
        paths.sort();

        let mut sources = Vec::with_capacity(paths.len());
        for path in paths {
            match strategy.derive(&path) {
                Ok(date) => sources.push(RasterSource { path, date }),
                Err(e) => warn!("Skipping raster: {}", e),
            }
        }

        info!("Catalog holds {} rasters under {}", sources.len(), root.display());
        Ok(RasterCatalog { sources })
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

fn collect_files(dir: &Path, extension: &str, out: &mut Vec<PathBuf>) -> ZonalResult<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            collect_files(&path, extension, out)?;
        } else if has_extension(&path, extension) {
            out.push(path);
        }
    }
    Ok(())
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}
