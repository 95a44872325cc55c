//! Strip-based raster decoding
//!
//! Reads a strip-organized GeoTIFF into a `RasterGrid`: all strips are
//! decompressed, samples are converted to `f64` planes and the GeoTIFF
//! tags are resolved into a geotransform, nodata sentinel and band names.
//!
//! Tiled layouts and predictors are not part of the temporal stacks this
//! tool targets and are rejected with a clear error.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use log::{debug, warn};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use crate::compression;
use crate::errors::{ZonalError, ZonalResult};
use crate::raster::grid::RasterGrid;
use crate::tiff::constants::{planar_config, predictor, sample_format, tags};
use crate::tiff::{geo, metadata, TiffReader};

/// Decodes a GeoTIFF file into an in-memory grid
///
/// The file is read exactly once; the returned grid is reused for every
/// polygon masked against this raster.
///
/// # Arguments
/// * `path` - Path to the GeoTIFF file
///
/// # Returns
/// The decoded grid or an error describing why the file is unusable
pub fn decode_raster(path: &Path) -> ZonalResult<RasterGrid> {
    let file = File::open(path)
        .map_err(|_| ZonalError::InputNotFound(path.display().to_string()))?;
    let mut source = BufReader::with_capacity(1024 * 1024, file);

    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut source)?;
    let ifd = tiff
        .main_ifd()
        .ok_or_else(|| ZonalError::GenericError("No IFDs found in TIFF file".to_string()))?;

    if ifd.has_tag(tags::TILE_WIDTH) || ifd.has_tag(tags::TILE_LENGTH) {
        return Err(ZonalError::GenericError(
            "Tiled TIFF layout is not supported, expected strips".to_string(),
        ));
    }

    let pred = ifd.get_tag_value(tags::PREDICTOR).unwrap_or(predictor::NONE as u64);
    if pred != predictor::NONE as u64 {
        return Err(ZonalError::GenericError(format!("Unsupported predictor: {}", pred)));
    }

    let (width, height) = ifd.dimensions().ok_or(ZonalError::MissingDimensions)?;
    let (width, height) = (width as usize, height as usize);
    let samples = ifd.samples_per_pixel() as usize;

    // Sample layout: every band must share one format and bit depth
    let bits = match ifd.has_tag(tags::BITS_PER_SAMPLE) {
        true => reader.read_tag_values(&mut source, ifd, tags::BITS_PER_SAMPLE)?,
        false => vec![8; samples],
    };
    let format = match ifd.has_tag(tags::SAMPLE_FORMAT) {
        true => reader.read_tag_values(&mut source, ifd, tags::SAMPLE_FORMAT)?,
        false => vec![sample_format::UNSIGNED as u64; samples],
    };
    let bits_per_sample = bits.first().copied().unwrap_or(8) as u16;
    let fmt = format.first().copied().unwrap_or(sample_format::UNSIGNED as u64) as u16;
    if bits.iter().any(|&b| b as u16 != bits_per_sample) || format.iter().any(|&f| f as u16 != fmt) {
        return Err(ZonalError::UnsupportedSampleFormat(fmt, bits_per_sample));
    }
    let bytes_per_sample = (bits_per_sample as usize) / 8;
    if bytes_per_sample == 0 {
        return Err(ZonalError::UnsupportedSampleFormat(fmt, bits_per_sample));
    }

    let planar = ifd
        .get_tag_value(tags::PLANAR_CONFIGURATION)
        .unwrap_or(planar_config::CHUNKY as u64) as u16;

    // Read and decompress every strip in file order
    let compression_code = ifd.get_tag_value(tags::COMPRESSION).unwrap_or(1);
    let handler = compression::create_handler(compression_code)?;
    debug!("Decoding {} with compression: {}", path.display(), handler.name());

    let strip_offsets = reader.read_tag_values(&mut source, ifd, tags::STRIP_OFFSETS)?;
    let strip_byte_counts = reader.read_tag_values(&mut source, ifd, tags::STRIP_BYTE_COUNTS)?;
    if strip_offsets.len() != strip_byte_counts.len() {
        return Err(ZonalError::GenericError(
            "StripOffsets and StripByteCounts disagree".to_string(),
        ));
    }

    let mut raw = Vec::with_capacity(width * height * samples * bytes_per_sample);
    for (&offset, &byte_count) in strip_offsets.iter().zip(&strip_byte_counts) {
        source.seek(SeekFrom::Start(offset))?;
        let mut compressed = vec![0u8; byte_count as usize];
        source.read_exact(&mut compressed)?;
        raw.extend(handler.decompress(&compressed)?);
    }

    let expected = width * height * samples * bytes_per_sample;
    if raw.len() < expected {
        return Err(ZonalError::GenericError(format!(
            "Truncated image data: {} bytes, expected {}",
            raw.len(),
            expected
        )));
    }

    // Convert raw samples into per-band f64 planes
    let little = reader
        .byte_order_handler()
        .map(|h| h.is_little_endian())
        .unwrap_or(true);
    let bands = if little {
        planes_from_raw::<LittleEndian>(&raw, width, height, samples, bytes_per_sample, fmt, planar)?
    } else {
        planes_from_raw::<BigEndian>(&raw, width, height, samples, bytes_per_sample, fmt, planar)?
    };

    let transform = geo::read_geotransform(&reader, &mut source, ifd)?;
    let nodata = geo::read_nodata(&reader, &mut source, ifd);

    let band_names = match ifd.has_tag(tags::GDAL_METADATA) {
        true => match reader.read_tag_ascii(&mut source, ifd, tags::GDAL_METADATA) {
            Ok(xml) => metadata::band_names_from_metadata(&xml, samples),
            Err(e) => {
                warn!("Could not read GDALMetadata from {}: {}", path.display(), e);
                metadata::default_band_names(samples)
            }
        },
        false => metadata::default_band_names(samples),
    };

    Ok(RasterGrid {
        width,
        height,
        bands,
        transform,
        nodata,
        band_names,
    })
}

/// Splits raw interleaved or planar sample bytes into f64 band planes
fn planes_from_raw<E: ByteOrder>(
    raw: &[u8],
    width: usize,
    height: usize,
    samples: usize,
    bytes_per_sample: usize,
    fmt: u16,
    planar: u16,
) -> ZonalResult<Vec<Vec<f64>>> {
    let pixels = width * height;
    let mut bands = vec![vec![0.0f64; pixels]; samples];

    for band in 0..samples {
        let plane = &mut bands[band];
        for i in 0..pixels {
            let sample_index = match planar {
                p if p == planar_config::PLANAR as u16 => band * pixels + i,
                _ => i * samples + band, // chunky
            };
            let at = sample_index * bytes_per_sample;
            plane[i] = read_sample::<E>(&raw[at..at + bytes_per_sample], fmt, bytes_per_sample)?;
        }
    }

    Ok(bands)
}

/// Converts one sample to f64 according to its format and size
fn read_sample<E: ByteOrder>(bytes: &[u8], fmt: u16, size: usize) -> ZonalResult<f64> {
    let value = match (fmt, size) {
        (f, 1) if f == sample_format::UNSIGNED => bytes[0] as f64,
        (f, 2) if f == sample_format::UNSIGNED => E::read_u16(bytes) as f64,
        (f, 4) if f == sample_format::UNSIGNED => E::read_u32(bytes) as f64,
        (f, 1) if f == sample_format::SIGNED => bytes[0] as i8 as f64,
        (f, 2) if f == sample_format::SIGNED => E::read_i16(bytes) as f64,
        (f, 4) if f == sample_format::SIGNED => E::read_i32(bytes) as f64,
        (f, 4) if f == sample_format::IEEEFP => E::read_f32(bytes) as f64,
        (f, 8) if f == sample_format::IEEEFP => E::read_f64(bytes),
        (f, s) => return Err(ZonalError::UnsupportedSampleFormat(f, (s * 8) as u16)),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunky_float_samples_split_into_planes() {
        // 2x1 pixels, 2 bands interleaved: (1.0, 10.0), (2.0, 20.0)
        let mut raw = Vec::new();
        for v in [1.0f32, 10.0, 2.0, 20.0] {
            raw.extend_from_slice(&v.to_le_bytes());
        }

        let bands = planes_from_raw::<LittleEndian>(
            &raw, 2, 1, 2, 4, sample_format::IEEEFP, planar_config::CHUNKY,
        )
        .unwrap();

        assert_eq!(bands[0], vec![1.0, 2.0]);
        assert_eq!(bands[1], vec![10.0, 20.0]);
    }

    #[test]
    fn planar_uint16_samples_split_into_planes() {
        // 2x1 pixels, 2 bands planar: band 0 = [3, 4], band 1 = [30, 40]
        let mut raw = Vec::new();
        for v in [3u16, 4, 30, 40] {
            raw.extend_from_slice(&v.to_le_bytes());
        }

        let bands = planes_from_raw::<LittleEndian>(
            &raw, 2, 1, 2, 2, sample_format::UNSIGNED, planar_config::PLANAR,
        )
        .unwrap();

        assert_eq!(bands[0], vec![3.0, 4.0]);
        assert_eq!(bands[1], vec![30.0, 40.0]);
    }

    #[test]
    fn signed_and_unsigned_conversion() {
        let bytes = (-5i16).to_le_bytes();
        let v = read_sample::<LittleEndian>(&bytes, sample_format::SIGNED, 2).unwrap();
        assert_eq!(v, -5.0);

        let bytes = 65535u16.to_le_bytes();
        let v = read_sample::<LittleEndian>(&bytes, sample_format::UNSIGNED, 2).unwrap();
        assert_eq!(v, 65535.0);
    }

    #[test]
    fn exotic_formats_rejected() {
        assert!(read_sample::<LittleEndian>(&[0; 8], sample_format::UNSIGNED, 8).is_err());
    }
}
