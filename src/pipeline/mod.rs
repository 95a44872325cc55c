//! Extraction pipeline
//!
//! Drives the whole run: rasters are processed in parallel, each decoded
//! exactly once, masked against every zone in order, and the resulting
//! rows are collected into the table in catalog order. Per-pair failures
//! produce a missing-value row; only discovery and the final write can
//! abort a run.

use log::{error, info, warn};
use rayon::prelude::*;

use crate::catalog::{RasterCatalog, RasterSource};
use crate::config::JobConfig;
use crate::errors::{ZonalError, ZonalResult};
use crate::extractor::polygon_band_means;
use crate::geometry::Polygon;
use crate::raster::decode_raster;
use crate::table::{ResultTable, RowRecord};
use crate::utils::progress::ProgressTracker;

/// Everything one raster contributes to the run
struct RasterOutcome {
    /// One row per zone, in zone order
    rows: Vec<RowRecord>,
    /// Band names when the raster decoded, None when it did not
    band_names: Option<Vec<String>>,
}

/// Runs extraction over the full catalog and returns the filled table
///
/// Row order is the catalog order crossed with zone order, independent
/// of scheduling. The row count is always rasters times zones.
pub fn run(
    config: &JobConfig,
    catalog: &RasterCatalog,
    polygons: &[Polygon],
) -> ZonalResult<ResultTable> {
    if let Some(jobs) = config.jobs {
        // A scoped pool keeps the global one untouched for embedders
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .map_err(|e| ZonalError::GenericError(format!("Could not build worker pool: {}", e)))?;
        return pool.install(|| run_inner(config, catalog, polygons));
    }

    run_inner(config, catalog, polygons)
}

fn run_inner(
    config: &JobConfig,
    catalog: &RasterCatalog,
    polygons: &[Polygon],
) -> ZonalResult<ResultTable> {
    info!(
        "Extracting {} rasters x {} zones",
        catalog.len(),
        polygons.len()
    );
    let progress = ProgressTracker::new(catalog.len() as u64, "Extracting zonal means");

    // collect() preserves the catalog order regardless of which worker
    // finishes first
    let outcomes: Vec<RasterOutcome> = catalog
        .sources
        .par_iter()
        .map(|source| {
            let outcome = process_raster(config, source, polygons);
            progress.increment(1);
            outcome
        })
        .collect();

    progress.finish();

    // The first decoded raster defines the band columns
    let band_columns = outcomes
        .iter()
        .find_map(|o| o.band_names.clone())
        .unwrap_or_default();
    if band_columns.is_empty() && !outcomes.is_empty() {
        warn!("No raster could be decoded, the table will carry no band columns");
    }

    let mut table = ResultTable::new(band_columns);
    for outcome in outcomes {
        for row in outcome.rows {
            table.push(row);
        }
    }

    Ok(table)
}

/// Decodes one raster and masks every zone against it
///
/// Never fails: a raster that cannot be decoded yields missing-value
/// rows for all zones, keeping the table rectangular.
fn process_raster(config: &JobConfig, source: &RasterSource, polygons: &[Polygon]) -> RasterOutcome {
    let mut grid = match decode_raster(&source.path) {
        Ok(grid) => grid,
        Err(e) => {
            error!("Could not decode {}: {}", source.path.display(), e);
            return missing_outcome(source, polygons);
        }
    };

    if let Some(selection) = &config.bands {
        if let Err(e) = grid.select_bands(selection) {
            error!("Band selection failed for {}: {}", source.path.display(), e);
            return missing_outcome(source, polygons);
        }
    }

    let nodata = config.effective_nodata(grid.nodata);

    let rows = polygons
        .iter()
        .map(|polygon| match polygon_band_means(&grid, polygon, nodata) {
            Ok(means) => RowRecord {
                date: source.date,
                label: polygon.label.clone(),
                means,
            },
            Err(e) => {
                warn!(
                    "Extraction failed for zone '{}' on {}: {}",
                    polygon.label,
                    source.path.display(),
                    e
                );
                RowRecord::missing(source.date, polygon.label.clone())
            }
        })
        .collect();

    RasterOutcome {
        rows,
        band_names: Some(grid.band_names.clone()),
    }
}

fn missing_outcome(source: &RasterSource, polygons: &[Polygon]) -> RasterOutcome {
    RasterOutcome {
        rows: polygons
            .iter()
            .map(|p| RowRecord::missing(source.date, p.label.clone()))
            .collect(),
        band_names: None,
    }
}
