//! Run configuration
//!
//! A run is described by a `JobConfig`, resolved from an optional TOML
//! file plus command-line flags. Flags win over the file, the file wins
//! over built-in defaults.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::DateStrategy;
use crate::errors::{ZonalError, ZonalResult};
use crate::table;

/// Default raster file extension, without the dot
pub const DEFAULT_EXTENSION: &str = "tif";

/// Default polygon label property
pub const DEFAULT_LABEL_FIELD: &str = "AREA";

/// Nodata sentinel used when neither configuration nor file metadata
/// provide one
pub const DEFAULT_NODATA: f64 = 0.0;

/// Optional settings read from a TOML file
///
/// Every field may be omitted; anything set on the command line
/// overrides the file value.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub raster_dir: Option<PathBuf>,
    pub polygon_file: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub extension: Option<String>,
    pub nodata: Option<f64>,
    pub bands: Option<Vec<usize>>,
    pub label_field: Option<String>,
    pub date_pattern: Option<String>,
    pub date_from_metadata: Option<bool>,
    pub jobs: Option<usize>,
}

impl FileConfig {
    pub fn load(path: &Path) -> ZonalResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|_| ZonalError::InputNotFound(path.display().to_string()))?;
        toml::from_str(&text)
            .map_err(|e| ZonalError::GenericError(format!("Invalid config file: {}", e)))
    }
}

/// Fully resolved settings for one run
pub struct JobConfig {
    /// Directory holding the raster stack
    pub raster_dir: PathBuf,
    /// GeoJSON file with the zones
    pub polygon_file: PathBuf,
    /// Where the result table is written
    pub output_path: PathBuf,
    /// Raster file extension, without the dot
    pub extension: String,
    /// Explicit nodata sentinel, overriding file metadata
    pub nodata: Option<f64>,
    /// 1-based band selection, all bands when None
    pub bands: Option<Vec<usize>>,
    /// Feature property used as zone label
    pub label_field: String,
    /// How acquisition dates are derived
    pub date_strategy: DateStrategy,
    /// Worker pool size, library default when None
    pub jobs: Option<usize>,
}

/// Unresolved values from the command line, before the file merge
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub raster_dir: Option<PathBuf>,
    pub polygon_file: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub extension: Option<String>,
    pub nodata: Option<f64>,
    pub bands: Option<Vec<usize>>,
    pub label_field: Option<String>,
    pub date_pattern: Option<String>,
    pub date_from_metadata: bool,
    pub jobs: Option<usize>,
}

impl JobConfig {
    /// Merges command-line overrides over file values and defaults
    pub fn resolve(cli: CliOverrides, file: FileConfig) -> ZonalResult<Self> {
        let raster_dir = cli
            .raster_dir
            .or(file.raster_dir)
            .ok_or_else(|| ZonalError::GenericError("No raster directory given".to_string()))?;
        let polygon_file = cli
            .polygon_file
            .or(file.polygon_file)
            .ok_or_else(|| ZonalError::GenericError("No polygon file given".to_string()))?;

        let output_path = cli
            .output
            .or(file.output)
            .unwrap_or_else(|| table::default_output_path(&raster_dir));

        let date_strategy = if cli.date_from_metadata || file.date_from_metadata.unwrap_or(false) {
            DateStrategy::Metadata
        } else {
            match cli.date_pattern.or(file.date_pattern) {
                Some(pattern) => DateStrategy::from_pattern(&pattern)?,
                None => DateStrategy::filename_default(),
            }
        };

        Ok(JobConfig {
            raster_dir,
            polygon_file,
            output_path,
            extension: cli
                .extension
                .or(file.extension)
                .unwrap_or_else(|| DEFAULT_EXTENSION.to_string()),
            nodata: cli.nodata.or(file.nodata),
            bands: cli.bands.or(file.bands),
            label_field: cli
                .label_field
                .or(file.label_field)
                .unwrap_or_else(|| DEFAULT_LABEL_FIELD.to_string()),
            date_strategy,
            jobs: cli.jobs.or(file.jobs),
        })
    }

    /// Sentinel for a grid: explicit setting wins, then file metadata,
    /// then the default of 0
    pub fn effective_nodata(&self, grid_nodata: Option<f64>) -> f64 {
        self.nodata.or(grid_nodata).unwrap_or(DEFAULT_NODATA)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_with_inputs() -> CliOverrides {
        CliOverrides {
            raster_dir: Some(PathBuf::from("/data/stack")),
            polygon_file: Some(PathBuf::from("/data/zones.geojson")),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_fill_the_gaps() {
        let config = JobConfig::resolve(cli_with_inputs(), FileConfig::default()).unwrap();

        assert_eq!(config.extension, "tif");
        assert_eq!(config.label_field, "AREA");
        assert_eq!(
            config.output_path,
            PathBuf::from("/data/stack/data_mean_by_polygon_S1.csv")
        );
        assert!(config.nodata.is_none());
        assert!(matches!(config.date_strategy, DateStrategy::Filename(_)));
    }

    #[test]
    fn cli_wins_over_file() {
        let mut cli = cli_with_inputs();
        cli.extension = Some("tiff".to_string());
        cli.nodata = Some(-9999.0);

        let file: FileConfig = toml::from_str(
            r#"
            extension = "geotiff"
            nodata = 0.0
            label_field = "NAME"
            "#,
        )
        .unwrap();

        let config = JobConfig::resolve(cli, file).unwrap();
        assert_eq!(config.extension, "tiff");
        assert_eq!(config.nodata, Some(-9999.0));
        assert_eq!(config.label_field, "NAME");
    }

    #[test]
    fn metadata_strategy_beats_pattern() {
        let mut cli = cli_with_inputs();
        cli.date_from_metadata = true;
        cli.date_pattern = Some(r"(\d{8})".to_string());

        let config = JobConfig::resolve(cli, FileConfig::default()).unwrap();
        assert!(matches!(config.date_strategy, DateStrategy::Metadata));
    }

    #[test]
    fn nodata_precedence() {
        let mut cli = cli_with_inputs();
        cli.nodata = Some(-1.0);
        let config = JobConfig::resolve(cli, FileConfig::default()).unwrap();
        assert_eq!(config.effective_nodata(Some(255.0)), -1.0);

        let config = JobConfig::resolve(cli_with_inputs(), FileConfig::default()).unwrap();
        assert_eq!(config.effective_nodata(Some(255.0)), 255.0);
        assert_eq!(config.effective_nodata(None), 0.0);
    }

    #[test]
    fn missing_inputs_are_errors() {
        assert!(JobConfig::resolve(CliOverrides::default(), FileConfig::default()).is_err());
    }

    #[test]
    fn unknown_file_keys_rejected() {
        let parsed: Result<FileConfig, _> = toml::from_str("no_such_key = 1");
        assert!(parsed.is_err());
    }
}
