//! Layers: named tracks holding at most one note per tick.

use alloc::collections::btree_map::Entry;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;

use crate::note::Note;

/// A track in the song. Its index in `Song::layers` is its id.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    /// Display label
    pub name: String,
    /// Normalized volume 0.0-1.0
    pub volume: f32,
    pub(crate) notes: BTreeMap<u32, Note>,
}

impl Layer {
    /// Create an empty layer for position `index`, named "Layer {index + 1}".
    pub fn new(index: usize) -> Self {
        Self {
            name: format!("Layer {}", index + 1),
            volume: 1.0,
            notes: BTreeMap::new(),
        }
    }

    /// Note at `tick`, if any.
    pub fn note(&self, tick: u32) -> Option<&Note> {
        self.notes.get(&tick)
    }

    pub fn note_mut(&mut self, tick: u32) -> Option<&mut Note> {
        self.notes.get_mut(&tick)
    }

    /// Notes in tick order.
    pub fn notes(&self) -> impl Iterator<Item = &Note> {
        self.notes.values()
    }

    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Highest occupied tick.
    pub fn last_tick(&self) -> Option<u32> {
        self.notes.keys().next_back().copied()
    }

    /// Delete the note at `tick`. Does not shrink the song.
    pub fn remove_note(&mut self, tick: u32) -> Option<Note> {
        self.notes.remove(&tick)
    }

    /// Volume as an integer percentage, rounded and clamped to 0-100.
    pub fn volume_percent(&self) -> u8 {
        let pct = libm::roundf(self.volume * 100.0);
        if pct.is_nan() {
            return 0;
        }
        pct.clamp(0.0, 100.0) as u8
    }

    /// Set the volume from a percentage. Values above 100 clamp to full volume.
    pub fn set_volume_percent(&mut self, pct: u8) {
        self.volume = pct.min(100) as f32 / 100.0;
    }

    /// Insert or replace the note at `note.tick`. The owning song keeps its
    /// size in sync, see `Song::set_note`.
    pub(crate) fn insert(&mut self, note: Note) -> &mut Note {
        match self.notes.entry(note.tick) {
            Entry::Occupied(mut slot) => {
                slot.insert(note);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(note),
        }
    }
}
