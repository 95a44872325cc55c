//! Zonal mean extraction command
//!
//! The default command: scan the raster stack, load the zones, run the
//! extraction pipeline and write the result table.

use clap::ArgMatches;
use log::{info, warn};
use std::path::PathBuf;

use crate::catalog::RasterCatalog;
use crate::commands::command_traits::Command;
use crate::config::{CliOverrides, FileConfig, JobConfig};
use crate::errors::{ZonalError, ZonalResult};
use crate::geometry;
use crate::pipeline;

/// Command for extracting per-zone band means across a raster stack
pub struct ExtractCommand {
    config: JobConfig,
}

impl ExtractCommand {
    /// Builds the command from CLI arguments and an optional config file
    pub fn new(args: &ArgMatches) -> ZonalResult<Self> {
        let config = JobConfig::resolve(cli_overrides(args)?, file_config(args)?)?;
        Ok(ExtractCommand { config })
    }
}

impl Command for ExtractCommand {
    fn execute(&self) -> ZonalResult<()> {
        let catalog = RasterCatalog::scan(
            &self.config.raster_dir,
            &self.config.extension,
            &self.config.date_strategy,
        )?;
        if catalog.is_empty() {
            warn!(
                "No datable .{} rasters under {}",
                self.config.extension,
                self.config.raster_dir.display()
            );
        }

        let polygons = geometry::load_polygons(&self.config.polygon_file, &self.config.label_field)?;

        let table = pipeline::run(&self.config, &catalog, &polygons)?;
        table.write(&self.config.output_path)?;

        info!(
            "Done: {} rows in {}",
            table.row_count(),
            self.config.output_path.display()
        );
        Ok(())
    }
}

/// Reads the optional TOML config file named on the command line
pub fn file_config(args: &ArgMatches) -> ZonalResult<FileConfig> {
    match args.get_one::<String>("config") {
        Some(path) => FileConfig::load(PathBuf::from(path).as_path()),
        None => Ok(FileConfig::default()),
    }
}

/// Collects CLI flag values into unresolved overrides
pub fn cli_overrides(args: &ArgMatches) -> ZonalResult<CliOverrides> {
    Ok(CliOverrides {
        raster_dir: args.get_one::<String>("input").map(PathBuf::from),
        polygon_file: args.get_one::<String>("polygons").map(PathBuf::from),
        output: args.get_one::<String>("output").map(PathBuf::from),
        extension: args.get_one::<String>("extension").cloned(),
        nodata: parse_nodata(args)?,
        bands: parse_bands(args)?,
        label_field: args.get_one::<String>("label-field").cloned(),
        date_pattern: args.get_one::<String>("date-pattern").cloned(),
        date_from_metadata: args.get_flag("date-from-metadata"),
        jobs: parse_jobs(args)?,
    })
}

fn parse_nodata(args: &ArgMatches) -> ZonalResult<Option<f64>> {
    match args.get_one::<String>("nodata") {
        Some(raw) => raw
            .parse::<f64>()
            .map(Some)
            .map_err(|_| ZonalError::GenericError(format!("Invalid nodata value: {}", raw))),
        None => Ok(None),
    }
}

/// Parses a 1-based band list like "1,2"
fn parse_bands(args: &ArgMatches) -> ZonalResult<Option<Vec<usize>>> {
    let raw = match args.get_one::<String>("bands") {
        Some(raw) => raw,
        None => return Ok(None),
    };

    let mut bands = Vec::new();
    for part in raw.split(',') {
        let number = part.trim().parse::<usize>().map_err(|_| {
            ZonalError::GenericError(format!("Invalid band selection: {}", raw))
        })?;
        bands.push(number);
    }

    if bands.is_empty() {
        return Err(ZonalError::GenericError("Empty band selection".to_string()));
    }
    Ok(Some(bands))
}

fn parse_jobs(args: &ArgMatches) -> ZonalResult<Option<usize>> {
    match args.get_one::<String>("jobs") {
        Some(raw) => match raw.parse::<usize>() {
            Ok(n) if n > 0 => Ok(Some(n)),
            _ => Err(ZonalError::GenericError(format!("Invalid worker count: {}", raw))),
        },
        None => Ok(None),
    }
}
