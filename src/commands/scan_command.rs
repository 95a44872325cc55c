//! Catalog inspection command
//!
//! Dry run for a stack: lists every raster the extraction would process
//! together with its derived date, without decoding any pixels. Useful
//! for checking the date strategy before a long run.

use clap::ArgMatches;
use log::info;
use std::path::PathBuf;

use crate::catalog::{DateStrategy, RasterCatalog};
use crate::commands::command_traits::Command;
use crate::commands::extract_command::{cli_overrides, file_config};
use crate::config;
use crate::errors::{ZonalError, ZonalResult};
use crate::geometry;

/// Command that lists the catalog a run would operate on
///
/// Unlike extraction it needs no polygon file, so it resolves only the
/// catalog-related settings.
pub struct ScanCommand {
    raster_dir: PathBuf,
    extension: String,
    date_strategy: DateStrategy,
    polygon_file: Option<PathBuf>,
    label_field: String,
}

impl ScanCommand {
    pub fn new(args: &ArgMatches) -> ZonalResult<Self> {
        let cli = cli_overrides(args)?;
        let file = file_config(args)?;

        let raster_dir = cli
            .raster_dir
            .or(file.raster_dir)
            .ok_or_else(|| ZonalError::GenericError("No raster directory given".to_string()))?;

        let date_strategy = if cli.date_from_metadata || file.date_from_metadata.unwrap_or(false) {
            DateStrategy::Metadata
        } else {
            match cli.date_pattern.or(file.date_pattern) {
                Some(pattern) => DateStrategy::from_pattern(&pattern)?,
                None => DateStrategy::filename_default(),
            }
        };

        Ok(ScanCommand {
            raster_dir,
            extension: cli
                .extension
                .or(file.extension)
                .unwrap_or_else(|| config::DEFAULT_EXTENSION.to_string()),
            date_strategy,
            polygon_file: cli.polygon_file.or(file.polygon_file),
            label_field: cli
                .label_field
                .or(file.label_field)
                .unwrap_or_else(|| config::DEFAULT_LABEL_FIELD.to_string()),
        })
    }
}

impl Command for ScanCommand {
    fn execute(&self) -> ZonalResult<()> {
        let catalog = RasterCatalog::scan(&self.raster_dir, &self.extension, &self.date_strategy)?;

        for source in &catalog.sources {
            info!("{}  {}", source.date, source.path.display());
        }
        info!("{} rasters in catalog", catalog.len());

        if let Some(polygon_file) = &self.polygon_file {
            let polygons = geometry::load_polygons(polygon_file, &self.label_field)?;
            info!(
                "{} zones, a full run would emit {} rows",
                polygons.len(),
                catalog.len() * polygons.len()
            );
        }

        Ok(())
    }
}
