//! TIFF file reader implementation
//!
//! Reads TIFF and BigTIFF headers and IFD chains, using the strategy
//! pattern for byte order handling. Pixel data is decoded separately in
//! `raster::decode`; this reader only deals with structure and tags.

use byteorder::ByteOrder as _;
use byteorder::{BigEndian, LittleEndian};
use log::{debug, warn};
use std::io::SeekFrom;

use crate::errors::{ZonalError, ZonalResult};
use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{field_types, header};
use crate::tiff::ifd::{Ifd, IfdEntry, Tiff};

/// Reader for TIFF and BigTIFF files
pub struct TiffReader {
    /// Current byte order handler
    byte_order_handler: Option<Box<dyn ByteOrderHandler>>,
    /// Whether currently reading BigTIFF format
    is_big_tiff: bool,
}

impl TiffReader {
    /// Creates a new TIFF reader
    pub fn new() -> Self {
        TiffReader {
            byte_order_handler: None,
            is_big_tiff: false,
        }
    }

    /// Returns the byte order handler, with proper error handling for None
    fn handler(&self) -> ZonalResult<&dyn ByteOrderHandler> {
        self.byte_order_handler
            .as_deref()
            .ok_or_else(|| ZonalError::GenericError("Byte order not yet determined".to_string()))
    }

    /// Reads a TIFF structure from the given reader
    ///
    /// 1. Detect byte order (little/big endian)
    /// 2. Check for TIFF or BigTIFF format
    /// 3. Read all IFDs in the chain
    pub fn read(&mut self, reader: &mut dyn SeekableReader) -> ZonalResult<Tiff> {
        let byte_order = ByteOrder::detect(reader)?;
        debug!("Detected byte order: {}", byte_order.name());
        self.byte_order_handler = Some(byte_order.create_handler());

        self.is_big_tiff = self.read_format_header(reader)?;

        let mut tiff = Tiff::new(self.is_big_tiff);

        let first_ifd_offset = if self.is_big_tiff {
            self.handler()?.read_u64(reader)?
        } else {
            self.handler()?.read_u32(reader)? as u64
        };
        debug!("First IFD offset: {}", first_ifd_offset);

        let file_size = file_size(reader)?;
        if first_ifd_offset < 8 || first_ifd_offset >= file_size {
            return Err(ZonalError::GenericError(format!(
                "Invalid IFD offset: {} (file size: {})",
                first_ifd_offset, file_size
            )));
        }

        tiff.ifds = self.read_ifd_chain(reader, first_ifd_offset, file_size)?;
        debug!("Read {} IFDs from TIFF file", tiff.ifds.len());

        Ok(tiff)
    }

    /// Validates the version word and, for BigTIFF, the extended header
    ///
    /// # Returns
    /// true for BigTIFF, false for standard TIFF
    fn read_format_header(&self, reader: &mut dyn SeekableReader) -> ZonalResult<bool> {
        let handler = self.handler()?;
        let version = handler.read_u16(reader)?;

        match version {
            header::TIFF_VERSION => Ok(false),
            header::BIG_TIFF_VERSION => {
                // BigTIFF: offset size (must be 8) and a reserved zero word
                let offset_size = handler.read_u16(reader)?;
                let zeros = handler.read_u16(reader)?;
                if offset_size != header::BIGTIFF_OFFSET_SIZE || zeros != 0 {
                    return Err(ZonalError::InvalidHeader);
                }
                Ok(true)
            }
            other => Err(ZonalError::UnsupportedVersion(other)),
        }
    }

    /// Reads a chain of IFDs starting from the given offset
    fn read_ifd_chain(
        &self,
        reader: &mut dyn SeekableReader,
        first_ifd_offset: u64,
        file_size: u64,
    ) -> ZonalResult<Vec<Ifd>> {
        let mut ifds = Vec::new();
        let mut ifd_offset = first_ifd_offset;
        let mut ifd_number = 0;
        let max_ifds = 100; // Reasonable limit to prevent cyclic chains

        while ifd_offset != 0 && ifd_number < max_ifds {
            if ifd_offset >= file_size {
                warn!("IFD offset {} exceeds file size {}, stopping IFD chain", ifd_offset, file_size);
                break;
            }

            let ifd = match self.read_ifd(reader, ifd_offset, ifd_number) {
                Ok(ifd) => ifd,
                Err(e) => {
                    warn!("Error reading IFD {}: {}", ifd_number, e);
                    break;
                }
            };

            // The next-IFD pointer follows the entry array
            let entry_size = if self.is_big_tiff { 20 } else { 12 };
            let count_size = if self.is_big_tiff { 8 } else { 2 };
            let next_offset_position = ifd_offset + count_size + ifd.entries.len() as u64 * entry_size;

            if next_offset_position >= file_size {
                ifds.push(ifd);
                break;
            }

            reader.seek(SeekFrom::Start(next_offset_position))?;
            let next_ifd_offset = if self.is_big_tiff {
                self.handler()?.read_u64(reader)?
            } else {
                self.handler()?.read_u32(reader)? as u64
            };

            if next_ifd_offset != 0 && (next_ifd_offset >= file_size || next_ifd_offset < 8) {
                warn!("Invalid next IFD offset: {}, stopping IFD chain", next_ifd_offset);
                ifds.push(ifd);
                break;
            }

            ifds.push(ifd);
            ifd_offset = next_ifd_offset;
            ifd_number += 1;
        }

        Ok(ifds)
    }

    /// Reads a single IFD at the given offset
    pub fn read_ifd(&self, reader: &mut dyn SeekableReader, offset: u64, number: usize) -> ZonalResult<Ifd> {
        reader.seek(SeekFrom::Start(offset))?;

        let handler = self.handler()?;
        let entry_count = if self.is_big_tiff {
            handler.read_u64(reader)?
        } else {
            handler.read_u16(reader)? as u64
        };
        debug!("IFD #{} entry count: {}", number, entry_count);

        let mut ifd = Ifd::new(number, offset);
        for _ in 0..entry_count {
            ifd.add_entry(self.read_ifd_entry(reader)?);
        }

        Ok(ifd)
    }

    /// Reads a single IFD entry
    ///
    /// The value/offset word is kept in storage order so inline values
    /// can be decoded element by element with the file's byte order.
    /// SHORT tags in big-endian files would otherwise come out shifted.
    fn read_ifd_entry(&self, reader: &mut dyn SeekableReader) -> ZonalResult<IfdEntry> {
        let handler = self.handler()?;

        let tag = handler.read_u16(reader)?;
        let field_type = handler.read_u16(reader)?;
        let count = if self.is_big_tiff {
            handler.read_u64(reader)?
        } else {
            handler.read_u32(reader)? as u64
        };

        let word_len = if self.is_big_tiff { 8 } else { 4 };
        let mut word = [0u8; 8];
        reader.read_exact(&mut word[..word_len])?;

        let little = handler.is_little_endian();
        let value_offset = decode_word(&word[..word_len], little);

        let mut entry = IfdEntry::new(tag, field_type, count, value_offset);
        if entry.is_value_inline(self.is_big_tiff) {
            entry.inline_values =
                decode_inline_values(&word[..word_len], entry.field_type_size(), count, little);
        }
        Ok(entry)
    }

    /// Reads a tag's values as a vector of u64
    ///
    /// Handles inline and offset storage and converts integer field types
    /// to u64. Used for strip offsets, byte counts and sample layout tags.
    pub fn read_tag_values(
        &self,
        reader: &mut dyn SeekableReader,
        ifd: &Ifd,
        tag: u16,
    ) -> ZonalResult<Vec<u64>> {
        let entry = ifd.get_entry(tag).ok_or(ZonalError::TagNotFound(tag))?;

        if entry.is_value_inline(self.is_big_tiff) {
            return Ok(entry.inline_values.clone());
        }

        reader.seek(SeekFrom::Start(entry.value_offset))?;
        let handler = self.handler()?;

        let mut values = Vec::with_capacity(entry.count as usize);
        for _ in 0..entry.count {
            let value = match entry.field_type {
                field_types::BYTE | field_types::SBYTE | field_types::UNDEFINED => {
                    let mut b = [0u8; 1];
                    reader.read_exact(&mut b)?;
                    b[0] as u64
                }
                field_types::SHORT | field_types::SSHORT => handler.read_u16(reader)? as u64,
                field_types::LONG | field_types::SLONG => handler.read_u32(reader)? as u64,
                field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 => handler.read_u64(reader)?,
                other => return Err(ZonalError::UnsupportedFieldType(other)),
            };
            values.push(value);
        }

        Ok(values)
    }

    /// Reads a tag's values as a vector of f64 (DOUBLE arrays)
    ///
    /// GeoTIFF pixel scale and tiepoint tags store IEEE doubles at an
    /// external offset.
    pub fn read_tag_doubles(
        &self,
        reader: &mut dyn SeekableReader,
        ifd: &Ifd,
        tag: u16,
    ) -> ZonalResult<Vec<f64>> {
        let entry = ifd.get_entry(tag).ok_or(ZonalError::TagNotFound(tag))?;

        if entry.field_type != field_types::DOUBLE {
            return Err(ZonalError::UnsupportedFieldType(entry.field_type));
        }

        reader.seek(SeekFrom::Start(entry.value_offset))?;
        let handler = self.handler()?;

        let mut values = Vec::with_capacity(entry.count as usize);
        for _ in 0..entry.count {
            values.push(handler.read_f64(reader)?);
        }

        Ok(values)
    }

    /// Reads a tag's value as an ASCII string
    ///
    /// Handles inline and offset storage; trailing NUL bytes are trimmed.
    pub fn read_tag_ascii(
        &self,
        reader: &mut dyn SeekableReader,
        ifd: &Ifd,
        tag: u16,
    ) -> ZonalResult<String> {
        let entry = ifd.get_entry(tag).ok_or(ZonalError::TagNotFound(tag))?;

        if entry.field_type != field_types::ASCII {
            return Err(ZonalError::UnsupportedFieldType(entry.field_type));
        }

        let mut buffer: Vec<u8>;
        if entry.is_value_inline(self.is_big_tiff) {
            // Inline ASCII bytes were decoded one per element in storage order
            buffer = entry.inline_values.iter().map(|&v| v as u8).collect();
        } else {
            buffer = vec![0u8; entry.count as usize];
            reader.seek(SeekFrom::Start(entry.value_offset))?;
            reader.read_exact(&mut buffer)?;
        }

        while buffer.last() == Some(&0) {
            buffer.pop();
        }

        String::from_utf8(buffer)
            .map_err(|e| ZonalError::GenericError(format!("Invalid ASCII tag value: {}", e)))
    }

    /// Gets the current byte order handler, if detection has run
    pub fn byte_order_handler(&self) -> Option<&dyn ByteOrderHandler> {
        self.byte_order_handler.as_deref()
    }
}

impl Default for TiffReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Decodes a whole value/offset word from storage-order bytes
fn decode_word(bytes: &[u8], little: bool) -> u64 {
    if little {
        LittleEndian::read_uint(bytes, bytes.len())
    } else {
        BigEndian::read_uint(bytes, bytes.len())
    }
}

/// Decodes inline values element by element from the value/offset word
fn decode_inline_values(word: &[u8], value_size: usize, count: u64, little: bool) -> Vec<u64> {
    let value_size = value_size.max(1);
    let capacity = (word.len() / value_size) as u64;
    let count = count.min(capacity) as usize;

    let mut values = Vec::with_capacity(count);
    for i in 0..count {
        let at = i * value_size;
        let value = match value_size {
            1 => word[at] as u64,
            _ if little => LittleEndian::read_uint(&word[at..at + value_size], value_size),
            _ => BigEndian::read_uint(&word[at..at + value_size], value_size),
        };
        values.push(value);
    }
    values
}

/// Gets the total size of the underlying stream, restoring the position
fn file_size(reader: &mut dyn SeekableReader) -> ZonalResult<u64> {
    let current = reader.seek(SeekFrom::Current(0))?;
    let size = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(current))?;
    Ok(size)
}
