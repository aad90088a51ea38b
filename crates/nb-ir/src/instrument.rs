//! Instrument catalog.

use alloc::string::String;
use alloc::vec::Vec;

/// Number of built-in note block sounds. Fixed by the file format.
pub const VANILLA_INSTRUMENT_COUNT: u8 = 16;

/// Built-in instrument names, indexed by instrument id.
///
/// The order is part of the file format: notes reference instruments by
/// this index.
pub const VANILLA_INSTRUMENT_NAMES: [&str; VANILLA_INSTRUMENT_COUNT as usize] = [
    "Harp",
    "Double Bass",
    "Bass Drum",
    "Snare Drum",
    "Click",
    "Guitar",
    "Flute",
    "Bell",
    "Chime",
    "Xylophone",
    "Iron Xylophone",
    "Cow Bell",
    "Didgeridoo",
    "Bit",
    "Banjo",
    "Pling",
];

/// An instrument descriptor. Notes refer to it by `id`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instrument {
    /// Index referenced by note records (0-15 for built-in sounds)
    pub id: u8,
    /// Display name
    pub name: String,
}

impl Instrument {
    /// Create an instrument descriptor.
    pub fn new(id: u8, name: &str) -> Self {
        Self {
            id,
            name: String::from(name),
        }
    }

    /// True for one of the 16 built-in sounds.
    pub fn is_vanilla(&self) -> bool {
        self.id < VANILLA_INSTRUMENT_COUNT
    }
}

/// The 16 built-in instruments with ids 0-15.
pub fn vanilla_instruments() -> Vec<Instrument> {
    VANILLA_INSTRUMENT_NAMES
        .iter()
        .enumerate()
        .map(|(id, name)| Instrument::new(id as u8, name))
        .collect()
}
