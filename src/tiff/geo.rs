//! GeoTIFF tag extraction
//!
//! Pulls georeferencing, nodata and acquisition timestamp information out
//! of a parsed IFD.

use log::debug;

use crate::errors::{ZonalError, ZonalResult};
use crate::io::seekable::SeekableReader;
use crate::raster::GeoTransform;
use crate::tiff::constants::tags;
use crate::tiff::ifd::Ifd;
use crate::tiff::reader::TiffReader;

/// Reads the affine geotransform from ModelPixelScale + ModelTiepoint
///
/// # Arguments
/// * `reader` - TIFF reader with byte order already detected
/// * `source` - Seekable reader over the file contents
/// * `ifd` - IFD of the image
///
/// # Returns
/// The geotransform, or an error when the tags are missing or incomplete
pub fn read_geotransform(
    reader: &TiffReader,
    source: &mut dyn SeekableReader,
    ifd: &Ifd,
) -> ZonalResult<GeoTransform> {
    let pixel_scale = reader.read_tag_doubles(source, ifd, tags::MODEL_PIXEL_SCALE_TAG)?;
    let tiepoint = reader.read_tag_doubles(source, ifd, tags::MODEL_TIEPOINT_TAG)?;

    GeoTransform::from_scale_and_tiepoint(&pixel_scale, &tiepoint)
        .ok_or_else(|| ZonalError::GenericError("Incomplete GeoTIFF georeferencing".to_string()))
}

/// Reads the nodata sentinel from the GDAL_NODATA ASCII tag, if present
///
/// GDAL stores the value as text (for example "0" or "nan").
pub fn read_nodata(
    reader: &TiffReader,
    source: &mut dyn SeekableReader,
    ifd: &Ifd,
) -> Option<f64> {
    if !ifd.has_tag(tags::GDAL_NODATA) {
        return None;
    }

    match reader.read_tag_ascii(source, ifd, tags::GDAL_NODATA) {
        Ok(text) => {
            let trimmed = text.trim();
            match trimmed.parse::<f64>() {
                Ok(value) => {
                    debug!("GDAL_NODATA tag: {}", value);
                    Some(value)
                }
                Err(_) if trimmed.eq_ignore_ascii_case("nan") => Some(f64::NAN),
                Err(_) => {
                    debug!("Unparseable GDAL_NODATA tag: '{}'", trimmed);
                    None
                }
            }
        }
        Err(_) => None,
    }
}

/// Reads the TIFF DateTime tag ("YYYY:MM:DD HH:MM:SS"), if present
pub fn read_datetime(
    reader: &TiffReader,
    source: &mut dyn SeekableReader,
    ifd: &Ifd,
) -> Option<String> {
    if !ifd.has_tag(tags::DATE_TIME) {
        return None;
    }

    reader.read_tag_ascii(source, ifd, tags::DATE_TIME).ok()
}
