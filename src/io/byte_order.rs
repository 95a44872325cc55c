//! Byte order handling for TIFF files
//!
//! Strategy pattern for reading little-endian and big-endian TIFF data
//! through a common handler trait.

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use std::io::Result;

use crate::errors::{ZonalError, ZonalResult};
use crate::io::seekable::SeekableReader;

/// Represents the byte order of a TIFF file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian byte order (II)
    LittleEndian,
    /// Big-endian byte order (MM)
    BigEndian,
}

impl ByteOrder {
    /// Detects the byte order from the first two header bytes
    pub fn detect(reader: &mut dyn SeekableReader) -> ZonalResult<Self> {
        let marker = reader.read_u16::<LittleEndian>()?;
        match marker {
            0x4949 => Ok(ByteOrder::LittleEndian), // "II" (Intel)
            0x4D4D => Ok(ByteOrder::BigEndian),    // "MM" (Motorola)
            _ => Err(ZonalError::InvalidByteOrder(marker)),
        }
    }

    /// Returns a string representation of this byte order
    pub fn name(&self) -> &'static str {
        match self {
            ByteOrder::LittleEndian => "Little Endian (II)",
            ByteOrder::BigEndian => "Big Endian (MM)",
        }
    }

    /// Creates the appropriate handler for this byte order
    pub fn create_handler(&self) -> Box<dyn ByteOrderHandler> {
        match self {
            ByteOrder::LittleEndian => Box::new(LittleEndianHandler),
            ByteOrder::BigEndian => Box::new(BigEndianHandler),
        }
    }
}

/// Trait for byte order reading strategies
pub trait ByteOrderHandler: Send + Sync {
    /// Read a u16 value
    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16>;

    /// Read a u32 value
    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32>;

    /// Read a u64 value
    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64>;

    /// Read an f64 value
    fn read_f64(&self, reader: &mut dyn SeekableReader) -> Result<f64>;

    /// Whether this handler reads little-endian data
    fn is_little_endian(&self) -> bool;
}

/// Little-endian byte order handler
pub struct LittleEndianHandler;

impl ByteOrderHandler for LittleEndianHandler {
    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16> {
        reader.read_u16::<LittleEndian>()
    }

    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32> {
        reader.read_u32::<LittleEndian>()
    }

    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64> {
        reader.read_u64::<LittleEndian>()
    }

    fn read_f64(&self, reader: &mut dyn SeekableReader) -> Result<f64> {
        reader.read_f64::<LittleEndian>()
    }

    fn is_little_endian(&self) -> bool {
        true
    }
}

/// Big-endian byte order handler
pub struct BigEndianHandler;

impl ByteOrderHandler for BigEndianHandler {
    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16> {
        reader.read_u16::<BigEndian>()
    }

    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32> {
        reader.read_u32::<BigEndian>()
    }

    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64> {
        reader.read_u64::<BigEndian>()
    }

    fn read_f64(&self, reader: &mut dyn SeekableReader) -> Result<f64> {
        reader.read_f64::<BigEndian>()
    }

    fn is_little_endian(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn detects_little_endian_marker() {
        let mut cursor = Cursor::new(vec![0x49, 0x49, 42, 0]);
        assert_eq!(ByteOrder::detect(&mut cursor).unwrap(), ByteOrder::LittleEndian);
    }

    #[test]
    fn detects_big_endian_marker() {
        let mut cursor = Cursor::new(vec![0x4D, 0x4D, 0, 42]);
        assert_eq!(ByteOrder::detect(&mut cursor).unwrap(), ByteOrder::BigEndian);
    }

    #[test]
    fn rejects_unknown_marker() {
        let mut cursor = Cursor::new(vec![0x00, 0x01]);
        assert!(ByteOrder::detect(&mut cursor).is_err());
    }
}
