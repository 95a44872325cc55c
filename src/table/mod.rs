//! Result table accumulation and serialization
//!
//! Collects one row per (raster, polygon) pair in a fixed order and
//! writes the whole table once at the end of the run. Failed pairs keep
//! their row with a missing-value marker so the row count always equals
//! rasters times polygons.

use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::SceneDate;
use crate::errors::{ZonalError, ZonalResult};

/// Marker written for undefined aggregates. Parses back as `f64::NAN`.
pub const MISSING_VALUE: &str = "NaN";

/// Default output file name under the raster root directory
pub const DEFAULT_OUTPUT_NAME: &str = "data_mean_by_polygon_S1.csv";

/// One output row: a dated, labelled set of band means
#[derive(Debug, Clone)]
pub struct RowRecord {
    pub date: SceneDate,
    pub label: String,
    pub means: Vec<f64>,
}

impl RowRecord {
    /// Row for a pair whose extraction failed or was skipped
    pub fn missing(date: SceneDate, label: String) -> Self {
        RowRecord { date, label, means: Vec::new() }
    }
}

/// The accumulated result table, owned until serialization
pub struct ResultTable {
    band_columns: Vec<String>,
    rows: Vec<RowRecord>,
}

impl ResultTable {
    /// # Arguments
    /// * `band_columns` - Column headers after Date and Fields
    pub fn new(band_columns: Vec<String>) -> Self {
        ResultTable { band_columns, rows: Vec::new() }
    }

    pub fn push(&mut self, row: RowRecord) {
        self.rows.push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Renders the table as delimited text
    ///
    /// Values use Rust's default float formatting, which always emits a
    /// `.` decimal separator independent of host locale. Rows shorter
    /// than the band column set are padded with the missing marker.
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str("Date,Fields");
        for column in &self.band_columns {
            out.push(',');
            out.push_str(column);
        }
        out.push('\n');

        for row in &self.rows {
            out.push_str(&row.date.to_string());
            out.push(',');
            out.push_str(&row.label);
            for i in 0..self.band_columns.len() {
                out.push(',');
                match row.means.get(i) {
                    Some(v) if v.is_finite() => out.push_str(&v.to_string()),
                    _ => out.push_str(MISSING_VALUE),
                }
            }
            out.push('\n');
        }

        out
    }

    /// Writes the table to disk atomically
    ///
    /// The content goes to a temporary sibling file first and is renamed
    /// into place, so a failed write never leaves a truncated table. The
    /// in-memory table stays intact on failure and the write can be
    /// retried.
    pub fn write(&self, path: &Path) -> ZonalResult<()> {
        let tmp = temp_sibling(path);

        fs::write(&tmp, self.render()).map_err(|e| {
            ZonalError::OutputWrite(format!("writing {}: {}", tmp.display(), e))
        })?;
        fs::rename(&tmp, path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            ZonalError::OutputWrite(format!("renaming into {}: {}", path.display(), e))
        })?;

        info!("Wrote {} rows to {}", self.rows.len(), path.display());
        Ok(())
    }
}

/// Default output path for a given raster root
pub fn default_output_path(raster_dir: &Path) -> PathBuf {
    raster_dir.join(DEFAULT_OUTPUT_NAME)
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    name.push_str(".tmp");
    path.with_file_name(name)
}
