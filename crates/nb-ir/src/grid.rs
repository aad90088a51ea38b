//! Piano-roll arrangement used by the editor.
//!
//! The editor edits a fixed 25-row grid per track (F♯3 to F♯5), one
//! instrument per track, and tempo in BPM. `Arrangement` converts between
//! that view and a `Song`.

use alloc::collections::BTreeSet;
use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use crate::instrument::VANILLA_INSTRUMENT_NAMES;
use crate::note::{key_name, Note, NOTE_BLOCK_MAX_KEY, NOTE_BLOCK_MIN_KEY};
use crate::song::{Song, DEFAULT_TIME_SIGNATURE};
use crate::tempo::Tempo;

/// Number of pitch rows in the grid.
pub const GRID_ROWS: u8 = NOTE_BLOCK_MAX_KEY - NOTE_BLOCK_MIN_KEY + 1;
/// Grid length for new arrangements.
pub const DEFAULT_LENGTH: u32 = 64;
pub const DEFAULT_BPM: u16 = 120;
pub const MIN_BPM: u16 = 20;
pub const MAX_BPM: u16 = 300;

/// A cell position: pitch row (0 = F♯3) and tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GridPos {
    pub row: u8,
    pub tick: u32,
}

impl GridPos {
    /// Create a cell position. Rows past the top of the grid clamp to it.
    pub const fn new(row: u8, tick: u32) -> Self {
        let row = if row >= GRID_ROWS { GRID_ROWS - 1 } else { row };
        Self { row, tick }
    }

    /// Piano key for this row. A row set past the grid plays its top key.
    pub const fn key(self) -> u8 {
        let row = if self.row >= GRID_ROWS { GRID_ROWS - 1 } else { self.row };
        NOTE_BLOCK_MIN_KEY + row
    }

    /// Row for a key, clamped into the grid.
    pub fn row_for_key(key: u8) -> u8 {
        key.clamp(NOTE_BLOCK_MIN_KEY, NOTE_BLOCK_MAX_KEY) - NOTE_BLOCK_MIN_KEY
    }
}

/// Display name of a grid row, e.g. `row_name(0) == "F♯3"`.
pub fn row_name(row: u8) -> String {
    key_name(NOTE_BLOCK_MIN_KEY + row.min(GRID_ROWS - 1))
}

/// One editor track: a single instrument painting cells on the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridTrack {
    pub instrument: u8,
    /// Volume 0-100
    pub volume: u8,
    pub cells: BTreeSet<GridPos>,
}

impl Default for GridTrack {
    fn default() -> Self {
        Self {
            instrument: 0,
            volume: 100,
            cells: BTreeSet::new(),
        }
    }
}

impl GridTrack {
    pub fn new(instrument: u8) -> Self {
        Self { instrument, ..Self::default() }
    }

    /// Paint a cell. Any other cell on the same tick is cleared first.
    pub fn paint(&mut self, pos: GridPos) {
        self.cells.retain(|c| c.tick != pos.tick);
        self.cells.insert(pos);
    }

    /// Clear a cell. Returns true if it was painted.
    pub fn erase(&mut self, pos: GridPos) -> bool {
        self.cells.remove(&pos)
    }

    pub fn is_painted(&self, pos: GridPos) -> bool {
        self.cells.contains(&pos)
    }
}

/// The editor's view of a song.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Arrangement {
    pub name: String,
    pub author: String,
    pub original_author: String,
    pub description: String,
    pub bpm: u16,
    pub time_signature: u8,
    /// Visible grid length in ticks
    pub length: u32,
    pub tracks: Vec<GridTrack>,
}

impl Default for Arrangement {
    fn default() -> Self {
        Self {
            name: String::from("My Song"),
            author: String::from("Player"),
            original_author: String::new(),
            description: String::new(),
            bpm: DEFAULT_BPM,
            time_signature: DEFAULT_TIME_SIGNATURE,
            length: DEFAULT_LENGTH,
            tracks: vec![GridTrack::default()],
        }
    }
}

impl Arrangement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a song with one layer per track.
    ///
    /// Layers are named after the track instrument. Notes get default
    /// velocity, panning and pitch.
    pub fn to_song(&self) -> Song {
        let mut song = Song::with_name(&self.name);
        song.author.clone_from(&self.author);
        song.original_author.clone_from(&self.original_author);
        song.description.clone_from(&self.description);
        song.tempo = Tempo::from_bpm(self.bpm as f64);
        song.time_signature = self.time_signature;

        for (index, track) in self.tracks.iter().enumerate() {
            let layer = song.add_layer();
            layer.name = VANILLA_INSTRUMENT_NAMES
                .get(track.instrument as usize)
                .map_or_else(|| format!("Track {}", index + 1), |n| String::from(*n));
            layer.set_volume_percent(track.volume);

            for pos in &track.cells {
                song.place_note(index, Note::new(pos.tick, pos.key(), track.instrument));
            }
        }

        let length = song.size().max(self.length);
        song.set_size(length);
        song
    }

    /// Build the editor view of a song.
    ///
    /// BPM is clamped to 20-300, keys outside the grid are clamped to its
    /// edge rows, and each track takes the instrument of its first note.
    pub fn from_song(song: &Song) -> Self {
        let bpm = libm::round(song.tempo.bpm().clamp(MIN_BPM as f64, MAX_BPM as f64)) as u16;

        let mut tracks: Vec<GridTrack> = song
            .layers()
            .iter()
            .map(|layer| {
                let mut track = GridTrack::new(layer.notes().next().map_or(0, |n| n.instrument));
                track.volume = layer.volume_percent();
                track.cells = layer
                    .notes()
                    .map(|n| GridPos::new(GridPos::row_for_key(n.key), n.tick))
                    .collect();
                track
            })
            .collect();
        if tracks.is_empty() {
            tracks.push(GridTrack::default());
        }

        Self {
            name: non_empty_or(&song.name, "Imported Song"),
            author: non_empty_or(&song.author, "Unknown"),
            original_author: song.original_author.clone(),
            description: song.description.clone(),
            bpm,
            time_signature: if song.time_signature == 0 {
                DEFAULT_TIME_SIGNATURE
            } else {
                song.time_signature
            },
            length: song.size().max(DEFAULT_LENGTH),
            tracks,
        }
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        String::from(fallback)
    } else {
        String::from(value)
    }
}
