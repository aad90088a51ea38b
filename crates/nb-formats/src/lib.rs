//! Format codecs for the noteblock tracker.
//!
//! Reads NBS (Note Block Studio) files of every published layout into the
//! song IR and writes songs back out as NBS version 4.

mod nbs_format;
mod nbs_io;

pub use nbs_format::{
    load_nbs, nbs_version, save_nbs, write_nbs, NbsLayout, CLASSIC_NBS_VERSION, MAX_NBS_VERSION,
    NBS_VERSION,
};

use thiserror::Error;

/// Failure while reading bytes of an NBS file.
#[derive(Debug, Error)]
pub enum ReadError {
    /// A primitive read ran past the end of the buffer
    #[error("Unexpected end of file while reading {what} at offset {offset}")]
    UnexpectedEof { what: &'static str, offset: usize },
    /// A string length is negative or longer than the rest of the buffer
    #[error("Invalid string length {len} at offset {offset} ({remaining} bytes remain)")]
    InvalidStringLength { len: i32, offset: usize, remaining: usize },
    /// Version byte outside 1-5
    #[error("Unsupported NBS version {0}")]
    UnsupportedVersion(u8),
    /// Accumulated tick or layer deltas left the addressable range
    #[error("{what} index overflows at offset {offset}")]
    IndexOverflow { what: &'static str, offset: usize },
    #[error("Malformed binary data: {0}")]
    Binary(#[from] binrw::Error),
}

/// Error type for format encoding and decoding.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Decoding failed; no song is produced
    #[error("Failed to parse NBS file: {0}")]
    Parse(#[source] ReadError),
    /// A note references an instrument missing from the song's table
    #[error("note at tick {tick} in layer {layer} references unknown instrument {instrument}")]
    UnknownInstrument { tick: u32, layer: usize, instrument: u8 },
    /// Song length does not fit the 16-bit length field
    #[error("song length {0} exceeds the 65535 ticks the format can address")]
    SongTooLong(u32),
    #[error("{0} layers exceed the 65535 the format can address")]
    TooManyLayers(usize),
    #[error("string of {0} bytes is too long to encode")]
    StringTooLong(usize),
    #[error("Failed to write NBS data: {0}")]
    Write(#[from] binrw::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FormatError {
    /// The file ended before a complete structure was read.
    pub fn is_truncated(&self) -> bool {
        matches!(self, FormatError::Parse(ReadError::UnexpectedEof { .. }))
    }

    /// The bytes are not laid out like an NBS file.
    pub fn is_invalid_format(&self) -> bool {
        matches!(
            self,
            FormatError::Parse(
                ReadError::InvalidStringLength { .. }
                    | ReadError::UnsupportedVersion(_)
                    | ReadError::IndexOverflow { .. }
            )
        )
    }
}
