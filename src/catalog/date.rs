//! Acquisition date derivation
//!
//! Each raster in the stack carries its acquisition date either in the
//! file name (an 8-digit `YYYYMMDD` token, the usual satellite product
//! convention) or in the TIFF DateTime tag. Patterns apply to the
//! basename only, so a date-like run in the directory part never leaks
//! into the result.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::path::Path;

use crate::errors::{ZonalError, ZonalResult};
use crate::tiff::{geo, TiffReader};

lazy_static! {
    /// First standalone 8-digit run in a file name
    static ref DEFAULT_DATE_PATTERN: Regex =
        Regex::new(r"(?:^|\D)(\d{8})(?:\D|$)").unwrap();
}

/// Calendar date of one raster acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SceneDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl SceneDate {
    /// Parses an 8-character `YYYYMMDD` token, validating it as a real
    /// calendar date
    pub fn from_token(token: &str) -> Option<Self> {
        if token.len() != 8 || !token.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let year: i32 = token[0..4].parse().ok()?;
        let month: u32 = token[4..6].parse().ok()?;
        let day: u32 = token[6..8].parse().ok()?;

        // Rejects impossible dates like 20201340
        NaiveDate::from_ymd_opt(year, month, day)?;

        Some(SceneDate { year, month, day })
    }
}

impl fmt::Display for SceneDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}/{:02}/{:02}", self.year, self.month, self.day)
    }
}

/// How acquisition dates are derived from raster files
pub enum DateStrategy {
    /// Apply a pattern to the file basename and parse the captured token
    Filename(Regex),
    /// Read the TIFF DateTime tag (306)
    Metadata,
}

impl DateStrategy {
    /// Default strategy: first 8-digit run in the basename
    pub fn filename_default() -> Self {
        DateStrategy::Filename(DEFAULT_DATE_PATTERN.clone())
    }

    /// Filename strategy with a user-supplied pattern
    ///
    /// The pattern's first capture group (or, without groups, the whole
    /// match) must yield an 8-digit `YYYYMMDD` token.
    pub fn from_pattern(pattern: &str) -> ZonalResult<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| ZonalError::GenericError(format!("Invalid date pattern: {}", e)))?;
        Ok(DateStrategy::Filename(regex))
    }

    /// Derives the acquisition date for one raster file
    ///
    /// # Returns
    /// The date, or `DateParse` naming the file when no valid date can
    /// be derived
    pub fn derive(&self, path: &Path) -> ZonalResult<SceneDate> {
        match self {
            DateStrategy::Filename(regex) => derive_from_filename(regex, path),
            DateStrategy::Metadata => derive_from_metadata(path),
        }
    }
}

fn derive_from_filename(regex: &Regex, path: &Path) -> ZonalResult<SceneDate> {
    let basename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let captures = regex.captures(&basename).ok_or_else(|| ZonalError::DateParse {
        path: path.display().to_string(),
        reason: format!("no date token in basename '{}'", basename),
    })?;

    let token = captures
        .get(1)
        .or_else(|| captures.get(0))
        .map(|m| m.as_str())
        .unwrap_or_default();

    SceneDate::from_token(token).ok_or_else(|| ZonalError::DateParse {
        path: path.display().to_string(),
        reason: format!("token '{}' is not a valid YYYYMMDD date", token),
    })
}

fn derive_from_metadata(path: &Path) -> ZonalResult<SceneDate> {
    let mut reader = TiffReader::new();
    let file = std::fs::File::open(path)
        .map_err(|_| ZonalError::InputNotFound(path.display().to_string()))?;
    let mut source = std::io::BufReader::new(file);
    let tiff = reader.read(&mut source)?;

    let ifd = tiff.main_ifd().ok_or_else(|| ZonalError::DateParse {
        path: path.display().to_string(),
        reason: "no IFD in file".to_string(),
    })?;

    let datetime = geo::read_datetime(&reader, &mut source, ifd).ok_or_else(|| {
        ZonalError::DateParse {
            path: path.display().to_string(),
            reason: "no DateTime tag in file".to_string(),
        }
    })?;

    // TIFF DateTime format: "YYYY:MM:DD HH:MM:SS"
    let date_part: String = datetime.chars().take(10).filter(|c| c.is_ascii_digit()).collect();
    SceneDate::from_token(&date_part).ok_or_else(|| ZonalError::DateParse {
        path: path.display().to_string(),
        reason: format!("DateTime tag '{}' is not a valid timestamp", datetime),
    })
}
