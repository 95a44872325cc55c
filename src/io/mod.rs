//! Low-level I/O support
//!
//! Seekable reader abstraction and byte order handling shared by the
//! TIFF parsing and raster decoding code.

pub mod byte_order;
pub mod seekable;

pub use byte_order::{ByteOrder, ByteOrderHandler};
pub use seekable::SeekableReader;
