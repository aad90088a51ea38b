//! Little-endian cursors over NBS byte streams.

use std::io::{Cursor, Write};

use binrw::{binrw, BinRead, BinReaderExt, BinWrite, BinWriterExt};
use log::warn;
use nb_ir::Note;

use crate::{FormatError, ReadError};

/// Fixed tail of a v4+ note record, after the layer jump.
#[binrw]
#[brw(little)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct NoteRecord {
    pub instrument: u8,
    pub key: u8,
    pub velocity: u8,
    pub panning: u8,
    pub pitch: i16,
}

impl NoteRecord {
    pub const SIZE: usize = 6;

    pub fn into_note(self, tick: u32) -> Note {
        Note {
            tick,
            key: self.key,
            instrument: self.instrument,
            velocity: self.velocity,
            panning: self.panning,
            pitch: self.pitch,
        }
    }
}

impl From<&Note> for NoteRecord {
    fn from(note: &Note) -> Self {
        Self {
            instrument: note.instrument,
            key: note.key,
            velocity: note.velocity,
            panning: note.panning,
            pitch: note.pitch,
        }
    }
}

// ---------------------------------------------------------------------------
// NbsReader — bounds-checked cursor over a byte slice
// ---------------------------------------------------------------------------

pub(crate) struct NbsReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> NbsReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { cursor: Cursor::new(data) }
    }

    pub fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    pub fn remaining(&self) -> usize {
        self.cursor.get_ref().len().saturating_sub(self.position())
    }

    pub fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }

    fn require(&self, n: usize, what: &'static str) -> Result<(), ReadError> {
        if self.remaining() < n {
            return Err(ReadError::UnexpectedEof { what, offset: self.position() });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, ReadError> {
        self.require(1, "byte")?;
        Ok(self.cursor.read_le::<u8>()?)
    }

    /// Read a short whose value is a count, length or delta.
    pub fn read_u16(&mut self) -> Result<u16, ReadError> {
        self.require(2, "short")?;
        Ok(self.cursor.read_le::<u16>()?)
    }

    pub fn read_i16(&mut self) -> Result<i16, ReadError> {
        self.require(2, "short")?;
        Ok(self.cursor.read_le::<i16>()?)
    }

    pub fn read_i32(&mut self) -> Result<i32, ReadError> {
        self.require(4, "int")?;
        Ok(self.cursor.read_le::<i32>()?)
    }

    /// Read an int32-length-prefixed string, one byte per character.
    pub fn read_string(&mut self) -> Result<String, ReadError> {
        self.require(4, "string length")?;
        let len = self.cursor.read_le::<i32>()?;
        let offset = self.position();
        let remaining = self.remaining();
        if len < 0 || len as usize > remaining {
            return Err(ReadError::InvalidStringLength { len, offset, remaining });
        }

        let end = offset + len as usize;
        let text = self.cursor.get_ref()[offset..end].iter().map(|&b| char::from(b)).collect();
        self.cursor.set_position(end as u64);
        Ok(text)
    }

    pub fn read_note_record(&mut self) -> Result<NoteRecord, ReadError> {
        self.require(NoteRecord::SIZE, "note")?;
        Ok(NoteRecord::read(&mut self.cursor)?)
    }
}

// ---------------------------------------------------------------------------
// NbsWriter — growable little-endian buffer
// ---------------------------------------------------------------------------

pub(crate) struct NbsWriter {
    cursor: Cursor<Vec<u8>>,
}

impl NbsWriter {
    pub fn new() -> Self {
        Self { cursor: Cursor::new(Vec::new()) }
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.cursor.into_inner()
    }

    pub fn write_u8(&mut self, v: u8) -> Result<(), FormatError> {
        Ok(self.cursor.write_le(&v)?)
    }

    pub fn write_u16(&mut self, v: u16) -> Result<(), FormatError> {
        Ok(self.cursor.write_le(&v)?)
    }

    pub fn write_i16(&mut self, v: i16) -> Result<(), FormatError> {
        Ok(self.cursor.write_le(&v)?)
    }

    pub fn write_i32(&mut self, v: i32) -> Result<(), FormatError> {
        Ok(self.cursor.write_le(&v)?)
    }

    /// Write an int32-length-prefixed string, one byte per character.
    ///
    /// Characters above U+00FF keep only their low byte.
    pub fn write_string(&mut self, s: &str) -> Result<(), FormatError> {
        let bytes: Vec<u8> = s.chars().map(|c| c as u32 as u8).collect();
        if s.chars().any(|c| c as u32 > 0xFF) {
            warn!("string {:?} has characters outside Latin-1; they are truncated to one byte", s);
        }
        let len = i32::try_from(bytes.len()).map_err(|_| FormatError::StringTooLong(bytes.len()))?;
        self.write_i32(len)?;
        Ok(self.cursor.write_all(&bytes)?)
    }

    pub fn write_note_record(&mut self, record: &NoteRecord) -> Result<(), FormatError> {
        Ok(record.write(&mut self.cursor)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian_primitives() {
        let data = [0x01, 0x34, 0x12, 0xFF, 0xFF, 0x78, 0x56, 0x34, 0x12];
        let mut r = NbsReader::new(&data);
        assert_eq!(r.read_u8().unwrap(), 1);
        assert_eq!(r.read_u16().unwrap(), 0x1234);
        assert_eq!(r.read_i16().unwrap(), -1);
        assert_eq!(r.read_i32().unwrap(), 0x1234_5678);
        assert!(r.is_at_end());
    }

    #[test]
    fn short_read_reports_offset() {
        let mut r = NbsReader::new(&[0x01, 0x02, 0x03]);
        r.read_u16().unwrap();
        let err = r.read_i16().unwrap_err();
        assert!(matches!(err, ReadError::UnexpectedEof { what: "short", offset: 2 }));
        assert!(err.to_string().starts_with("Unexpected end of file while reading short"));
    }

    #[test]
    fn string_is_byte_per_char() {
        let mut data = 3i32.to_le_bytes().to_vec();
        data.extend_from_slice(&[b'a', 0xE9, b'z']);
        let mut r = NbsReader::new(&data);
        assert_eq!(r.read_string().unwrap(), "aéz");
    }

    #[test]
    fn negative_string_length_rejected() {
        let data = (-4i32).to_le_bytes();
        let err = NbsReader::new(&data).read_string().unwrap_err();
        assert!(matches!(err, ReadError::InvalidStringLength { len: -4, .. }));
    }

    #[test]
    fn oversized_string_length_rejected() {
        let mut data = 10i32.to_le_bytes().to_vec();
        data.extend_from_slice(b"abc");
        let err = NbsReader::new(&data).read_string().unwrap_err();
        assert!(matches!(err, ReadError::InvalidStringLength { len: 10, remaining: 3, .. }));
    }

    #[test]
    fn missing_string_length_is_eof() {
        let err = NbsReader::new(&[0, 0]).read_string().unwrap_err();
        assert!(matches!(err, ReadError::UnexpectedEof { what: "string length", .. }));
    }

    #[test]
    fn writer_layout() {
        let mut w = NbsWriter::new();
        w.write_u8(4).unwrap();
        w.write_i16(-2).unwrap();
        w.write_string("hi").unwrap();
        assert_eq!(w.into_inner(), [4, 0xFE, 0xFF, 2, 0, 0, 0, b'h', b'i']);
    }

    #[test]
    fn writer_truncates_wide_chars() {
        let mut w = NbsWriter::new();
        w.write_string("é♪").unwrap();
        // U+266A keeps its low byte 0x6A
        assert_eq!(w.into_inner(), [2, 0, 0, 0, 0xE9, 0x6A]);
    }

    #[test]
    fn note_record_layout() {
        let record = NoteRecord { instrument: 15, key: 45, velocity: 80, panning: 50, pitch: 200 };
        let mut w = NbsWriter::new();
        w.write_note_record(&record).unwrap();
        let bytes = w.into_inner();
        assert_eq!(bytes, [15, 45, 80, 50, 200, 0]);

        let mut r = NbsReader::new(&bytes);
        assert_eq!(r.read_note_record().unwrap(), record);
    }
}
