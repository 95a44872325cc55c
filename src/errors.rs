//! Error types for the extraction pipeline
//!
//! One error enum covers the whole run: TIFF-level decoding problems,
//! input discovery failures, per-file date derivation failures and
//! per-pair geometry failures. Only input discovery and the final table
//! write are fatal; everything else is reported and the run continues.

use std::fmt;
use std::io;

/// Pipeline-wide error type
#[derive(Debug)]
pub enum ZonalError {
    /// I/O error
    IoError(io::Error),
    /// Invalid TIFF header
    InvalidHeader,
    /// Invalid byte order marker
    InvalidByteOrder(u16),
    /// Unsupported TIFF version
    UnsupportedVersion(u16),
    /// Tag not found
    TagNotFound(u16),
    /// Unsupported field type
    UnsupportedFieldType(u16),
    /// Unsupported compression method
    UnsupportedCompression(u64),
    /// Unsupported sample format / bit depth combination
    UnsupportedSampleFormat(u16, u16),
    /// Image dimensions not found
    MissingDimensions,
    /// Raster directory or polygon file missing or unreadable (fatal)
    InputNotFound(String),
    /// A raster identifier did not yield a valid calendar date (per-file)
    DateParse { path: String, reason: String },
    /// A polygon geometry is invalid or cannot be rasterized (per-pair)
    GeometryError(String),
    /// Final table serialization failed (fatal, table stays intact)
    OutputWrite(String),
    /// Generic error with message
    GenericError(String),
}

impl fmt::Display for ZonalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZonalError::IoError(e) => write!(f, "I/O error: {}", e),
            ZonalError::InvalidHeader => write!(f, "Invalid TIFF header"),
            ZonalError::InvalidByteOrder(v) => write!(f, "Invalid byte order marker: {:#06x}", v),
            ZonalError::UnsupportedVersion(v) => write!(f, "Unsupported TIFF version: {}", v),
            ZonalError::TagNotFound(tag) => write!(f, "Tag not found: {}", tag),
            ZonalError::UnsupportedFieldType(ft) => write!(f, "Unsupported field type: {}", ft),
            ZonalError::UnsupportedCompression(c) => write!(f, "Unsupported compression method: {}", c),
            ZonalError::UnsupportedSampleFormat(sf, bits) => {
                write!(f, "Unsupported sample format {} with {} bits per sample", sf, bits)
            }
            ZonalError::MissingDimensions => write!(f, "Image dimensions not found"),
            ZonalError::InputNotFound(path) => write!(f, "Input not found or unreadable: {}", path),
            ZonalError::DateParse { path, reason } => {
                write!(f, "Cannot derive date for '{}': {}", path, reason)
            }
            ZonalError::GeometryError(msg) => write!(f, "Geometry error: {}", msg),
            ZonalError::OutputWrite(msg) => write!(f, "Output write failed: {}", msg),
            ZonalError::GenericError(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for ZonalError {}

impl From<io::Error> for ZonalError {
    fn from(error: io::Error) -> Self {
        ZonalError::IoError(error)
    }
}

impl From<String> for ZonalError {
    fn from(msg: String) -> Self {
        ZonalError::GenericError(msg)
    }
}

/// Result type for pipeline operations
pub type ZonalResult<T> = Result<T, ZonalError>;
