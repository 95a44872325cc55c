//! Strip decompression handlers
//!
//! Strategy pattern for the compression schemes the decoder accepts:
//! none, Deflate (zlib) and Zstandard. Each handler turns a compressed
//! strip into raw sample bytes.

use std::io::Read;

use flate2::read::ZlibDecoder;

use crate::errors::{ZonalError, ZonalResult};
use crate::tiff::constants::compression;

/// Trait for strip decompression strategies
pub trait CompressionHandler: Send + Sync {
    /// Decompress a strip of image data
    fn decompress(&self, data: &[u8]) -> ZonalResult<Vec<u8>>;

    /// TIFF compression code this handler implements
    fn code(&self) -> u64;

    /// Human-readable name of the compression method
    fn name(&self) -> &'static str;
}

/// Handler for uncompressed data
pub struct NoneHandler;

impl CompressionHandler for NoneHandler {
    fn decompress(&self, data: &[u8]) -> ZonalResult<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn code(&self) -> u64 {
        compression::NONE as u64
    }

    fn name(&self) -> &'static str {
        "None"
    }
}

/// Handler for Adobe Deflate (zlib) compression
pub struct DeflateHandler;

impl CompressionHandler for DeflateHandler {
    fn decompress(&self, data: &[u8]) -> ZonalResult<Vec<u8>> {
        let mut decoder = ZlibDecoder::new(data);
        let mut output = Vec::new();
        decoder
            .read_to_end(&mut output)
            .map_err(|e| ZonalError::GenericError(format!("Deflate decompression failed: {}", e)))?;
        Ok(output)
    }

    fn code(&self) -> u64 {
        compression::DEFLATE as u64
    }

    fn name(&self) -> &'static str {
        "Adobe Deflate"
    }
}

/// Handler for Zstandard compression
pub struct ZstdHandler;

impl CompressionHandler for ZstdHandler {
    fn decompress(&self, data: &[u8]) -> ZonalResult<Vec<u8>> {
        zstd::stream::decode_all(data)
            .map_err(|e| ZonalError::GenericError(format!("Zstd decompression failed: {}", e)))
    }

    fn code(&self) -> u64 {
        compression::ZSTD as u64
    }

    fn name(&self) -> &'static str {
        "Zstandard"
    }
}

/// Creates the handler for a TIFF compression code
///
/// # Arguments
/// * `code` - Value of the Compression tag
///
/// # Returns
/// The matching handler, or `UnsupportedCompression` for anything else
pub fn create_handler(code: u64) -> ZonalResult<Box<dyn CompressionHandler>> {
    match code as u16 {
        compression::NONE => Ok(Box::new(NoneHandler)),
        compression::DEFLATE => Ok(Box::new(DeflateHandler)),
        compression::ZSTD => Ok(Box::new(ZstdHandler)),
        _ => Err(ZonalError::UnsupportedCompression(code)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn none_passes_through() {
        let handler = NoneHandler;
        assert_eq!(handler.decompress(&[1, 2, 3]).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn deflate_roundtrip() {
        let raw = b"strip of sample bytes".to_vec();
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&raw).unwrap();
        let compressed = encoder.finish().unwrap();

        let handler = DeflateHandler;
        assert_eq!(handler.decompress(&compressed).unwrap(), raw);
    }

    #[test]
    fn zstd_roundtrip() {
        let raw = b"another strip of sample bytes".to_vec();
        let compressed = zstd::stream::encode_all(&raw[..], 0).unwrap();

        let handler = ZstdHandler;
        assert_eq!(handler.decompress(&compressed).unwrap(), raw);
    }

    #[test]
    fn unknown_code_rejected() {
        assert!(create_handler(5).is_err()); // LZW not supported
    }
}
