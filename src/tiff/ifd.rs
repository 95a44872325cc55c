//! Image File Directory (IFD) structures and methods
//!
//! An IFD stores the metadata of one image in a TIFF file as a series of
//! tag entries. Rasters in a temporal stack are single-image files, but
//! the chain is still walked so overviews and masks do not confuse the
//! decoder.

use std::collections::HashMap;

use crate::tiff::constants::field_types;

/// Represents an entry in an Image File Directory
///
/// Each entry describes one aspect of the image (dimensions, sample
/// layout, compression, georeferencing) as a tag-value pair. For small
/// values `value_offset` holds the value itself, otherwise it points to
/// the data elsewhere in the file.
#[derive(Debug, Clone)]
pub struct IfdEntry {
    /// TIFF tag identifier
    pub tag: u16,
    /// Field type
    pub field_type: u16,
    /// Number of values
    pub count: u64,
    /// Value or offset to values
    pub value_offset: u64,
    /// Inline values decoded at parse time with the file's byte order,
    /// empty when the values live at an offset
    pub inline_values: Vec<u64>,
}

impl IfdEntry {
    /// Creates a new IFD entry
    pub fn new(tag: u16, field_type: u16, count: u64, value_offset: u64) -> Self {
        Self { tag, field_type, count, value_offset, inline_values: Vec::new() }
    }

    /// First value of the entry
    ///
    /// Inline values are already byte-order corrected; for offset
    /// storage this is the offset itself.
    pub fn first_value(&self) -> u64 {
        self.inline_values.first().copied().unwrap_or(self.value_offset)
    }

    /// Size in bytes of a single value of this entry's field type
    pub fn field_type_size(&self) -> usize {
        match self.field_type {
            field_types::BYTE | field_types::ASCII | field_types::SBYTE | field_types::UNDEFINED => 1,
            field_types::SHORT | field_types::SSHORT => 2,
            field_types::LONG | field_types::SLONG | field_types::FLOAT => 4,
            field_types::RATIONAL | field_types::SRATIONAL | field_types::DOUBLE => 8,
            field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 => 8,
            _ => 1,
        }
    }

    /// Determines if the value is stored inline in `value_offset`
    /// rather than at the offset location
    ///
    /// Standard TIFF keeps up to 4 bytes inline, BigTIFF up to 8.
    pub fn is_value_inline(&self, is_big_tiff: bool) -> bool {
        let total_size = self.field_type_size() as u64 * self.count;
        let inline_size = if is_big_tiff { 8 } else { 4 };
        total_size <= inline_size
    }
}

/// Represents an Image File Directory in a TIFF file
#[derive(Debug, Clone)]
pub struct Ifd {
    /// Entries in this IFD
    pub entries: Vec<IfdEntry>,
    /// IFD number (0-based)
    pub number: usize,
    /// Offset to this IFD in the file
    pub offset: u64,
    /// Cached entries for lookup by tag
    tag_map: HashMap<u16, IfdEntry>,
}

impl Ifd {
    /// Creates a new, empty IFD
    pub fn new(number: usize, offset: u64) -> Self {
        Self {
            entries: Vec::new(),
            number,
            offset,
            tag_map: HashMap::new(),
        }
    }

    /// Adds an entry and updates the tag lookup cache
    pub fn add_entry(&mut self, entry: IfdEntry) {
        self.tag_map.insert(entry.tag, entry.clone());
        self.entries.push(entry);
    }

    /// Gets a tag's first value, byte-order corrected for inline storage
    pub fn get_tag_value(&self, tag: u16) -> Option<u64> {
        self.tag_map.get(&tag).map(|entry| entry.first_value())
    }

    /// Checks if this IFD has a specific tag
    pub fn has_tag(&self, tag: u16) -> bool {
        self.tag_map.contains_key(&tag)
    }

    /// Gets an IFD entry by tag
    pub fn get_entry(&self, tag: u16) -> Option<&IfdEntry> {
        self.tag_map.get(&tag)
    }

    /// Gets the image dimensions (width, height) if both tags are present
    pub fn dimensions(&self) -> Option<(u64, u64)> {
        let width = self.get_tag_value(super::constants::tags::IMAGE_WIDTH)?;
        let height = self.get_tag_value(super::constants::tags::IMAGE_LENGTH)?;
        Some((width, height))
    }

    /// Number of samples per pixel (default 1 if not specified)
    pub fn samples_per_pixel(&self) -> u64 {
        self.get_tag_value(super::constants::tags::SAMPLES_PER_PIXEL).unwrap_or(1)
    }
}

/// Parsed TIFF file: format flag plus the IFD chain
#[derive(Debug, Clone)]
pub struct Tiff {
    /// Whether the file uses the BigTIFF layout
    pub is_big_tiff: bool,
    /// All IFDs found in the file
    pub ifds: Vec<Ifd>,
}

impl Tiff {
    /// Creates an empty TIFF structure
    pub fn new(is_big_tiff: bool) -> Self {
        Self { is_big_tiff, ifds: Vec::new() }
    }

    /// The IFD describing the full-resolution image
    ///
    /// The first IFD is the main image by convention; reduced-resolution
    /// overviews come later in the chain.
    pub fn main_ifd(&self) -> Option<&Ifd> {
        self.ifds.first()
    }
}
