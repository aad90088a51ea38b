//! Note events and key naming.

use alloc::format;
use alloc::string::String;

/// Key assigned to freshly created notes (F♯4).
pub const DEFAULT_KEY: u8 = 45;
/// Full note volume.
pub const DEFAULT_VELOCITY: u8 = 100;
/// Panning of freshly created notes (center).
pub const DEFAULT_PANNING: u8 = 100;
/// No fine-pitch offset.
pub const DEFAULT_PITCH: i16 = 0;

/// Lowest key a vanilla note block can play (F♯3).
pub const NOTE_BLOCK_MIN_KEY: u8 = 33;
/// Highest key a vanilla note block can play (F♯5).
pub const NOTE_BLOCK_MAX_KEY: u8 = 57;

const SEMITONE_NAMES: [&str; 12] = ["A", "A♯", "B", "C", "C♯", "D", "D♯", "E", "F", "F♯", "G", "G♯"];

/// A single note event on a layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Note {
    /// Tick this note sits on within its layer
    pub tick: u32,
    /// Pitch as a piano key index (0 = A0, 33 = F♯3)
    pub key: u8,
    /// Instrument id, resolved against `Song::instruments`
    pub instrument: u8,
    /// Volume 0-100
    pub velocity: u8,
    /// Stereo position 0-100, 100 = center. The codec keeps any byte
    /// value unchanged.
    pub panning: u8,
    /// Fine pitch in cents
    pub pitch: i16,
}

impl Note {
    /// Create a note with default velocity, panning and pitch.
    pub const fn new(tick: u32, key: u8, instrument: u8) -> Self {
        Self {
            tick,
            key,
            instrument,
            velocity: DEFAULT_VELOCITY,
            panning: DEFAULT_PANNING,
            pitch: DEFAULT_PITCH,
        }
    }

    /// True if the key is inside the vanilla note block range.
    pub fn in_note_block_range(&self) -> bool {
        (NOTE_BLOCK_MIN_KEY..=NOTE_BLOCK_MAX_KEY).contains(&self.key)
    }
}

/// Name of a key, e.g. `key_name(45) == "F♯4"`.
pub fn key_name(key: u8) -> String {
    let octave = (key as u32 + 9) / 12;
    format!("{}{}", SEMITONE_NAMES[key as usize % 12], octave)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_note_has_defaults() {
        let note = Note::new(3, 40, 2);
        assert_eq!(note.tick, 3);
        assert_eq!(note.velocity, 100);
        assert_eq!(note.panning, 100);
        assert_eq!(note.pitch, 0);
    }

    #[test]
    fn key_names_across_range() {
        assert_eq!(key_name(0), "A0");
        assert_eq!(key_name(3), "C1");
        assert_eq!(key_name(NOTE_BLOCK_MIN_KEY), "F♯3");
        assert_eq!(key_name(DEFAULT_KEY), "F♯4");
        assert_eq!(key_name(48), "A4");
        assert_eq!(key_name(NOTE_BLOCK_MAX_KEY), "F♯5");
    }

    #[test]
    fn note_block_range() {
        assert!(Note::new(0, 33, 0).in_note_block_range());
        assert!(Note::new(0, 57, 0).in_note_block_range());
        assert!(!Note::new(0, 32, 0).in_note_block_range());
        assert!(!Note::new(0, 58, 0).in_note_block_range());
    }
}
