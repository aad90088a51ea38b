//! Song structure: metadata, instruments and layers.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::edit::EditError;
use crate::instrument::{vanilla_instruments, Instrument};
use crate::layer::Layer;
use crate::note::Note;
use crate::tempo::Tempo;

/// Default time signature numerator (quarter-beat denominator is implicit).
pub const DEFAULT_TIME_SIGNATURE: u8 = 4;

/// Editor usage counters. Carried through files untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UsageStats {
    pub minutes_spent: i32,
    pub left_clicks: i32,
    pub right_clicks: i32,
    pub blocks_added: i32,
    pub blocks_removed: i32,
}

/// A complete song.
#[derive(Clone, Debug, PartialEq)]
pub struct Song {
    /// Song title
    pub name: String,
    pub author: String,
    pub original_author: String,
    pub description: String,
    /// Name of the MIDI/schematic file the song was imported from
    pub midi_name: String,
    /// Playback speed
    pub tempo: Tempo,
    /// Beats per bar
    pub time_signature: u8,
    /// Usage counters
    pub stats: UsageStats,
    /// Instrument table; notes reference entries by id
    pub instruments: Vec<Instrument>,
    layers: Vec<Layer>,
    size: u32,
}

impl Default for Song {
    fn default() -> Self {
        Self {
            name: String::new(),
            author: String::new(),
            original_author: String::new(),
            description: String::new(),
            midi_name: String::new(),
            tempo: Tempo::DEFAULT,
            time_signature: DEFAULT_TIME_SIGNATURE,
            stats: UsageStats::default(),
            instruments: vanilla_instruments(),
            layers: Vec::new(),
            size: 0,
        }
    }
}

impl Song {
    /// Create an empty song with the built-in instrument table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty song with a title.
    pub fn with_name(name: &str) -> Self {
        Self {
            name: String::from(name),
            ..Self::default()
        }
    }

    // --- Size ---

    /// Length in ticks: at least one past the last occupied tick.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Set the length. Never drops below what the placed notes require.
    pub fn set_size(&mut self, size: u32) {
        self.size = size.max(self.required_size());
    }

    /// Shrink or grow the length to exactly cover the placed notes.
    pub fn fit_size(&mut self) {
        self.size = self.required_size();
    }

    fn required_size(&self) -> u32 {
        self.max_tick().map_or(0, |t| t + 1)
    }

    /// Highest occupied tick across all layers.
    pub fn max_tick(&self) -> Option<u32> {
        self.layers.iter().filter_map(Layer::last_tick).max()
    }

    // --- Layers ---

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn layer_mut(&mut self, index: usize) -> Option<&mut Layer> {
        self.layers.get_mut(index)
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Append an empty layer named after its position.
    pub fn add_layer(&mut self) -> &mut Layer {
        let index = self.layers.len();
        self.layers.push(Layer::new(index));
        &mut self.layers[index]
    }

    /// Append layers until `index` is valid.
    pub fn ensure_layer(&mut self, index: usize) -> &mut Layer {
        while self.layers.len() <= index {
            self.add_layer();
        }
        &mut self.layers[index]
    }

    /// Remove a layer; later layers shift down one position. Does not
    /// shrink the song.
    pub fn remove_layer(&mut self, index: usize) -> Result<Layer, EditError> {
        if index >= self.layers.len() {
            return Err(EditError::LayerOutOfRange { layer: index, count: self.layers.len() });
        }
        Ok(self.layers.remove(index))
    }

    // --- Notes ---

    /// Place a note on a layer, replacing any note already at `tick`.
    ///
    /// Grows the song size to `tick + 1` when needed. Returns the note so
    /// callers can adjust velocity, panning and pitch.
    pub fn set_note(
        &mut self,
        layer: usize,
        tick: u32,
        key: u8,
        instrument: u8,
    ) -> Result<&mut Note, EditError> {
        let count = self.layers.len();
        let target = self
            .layers
            .get_mut(layer)
            .ok_or(EditError::LayerOutOfRange { layer, count })?;
        if tick >= self.size {
            self.size = tick.saturating_add(1);
        }
        Ok(target.insert(Note::new(tick, key, instrument)))
    }

    /// Place a note, appending empty layers until `layer` exists.
    ///
    /// Used when reading files whose note stream references layers that
    /// have not been seen yet.
    pub fn place_note(&mut self, layer: usize, note: Note) -> &mut Note {
        if note.tick >= self.size {
            self.size = note.tick.saturating_add(1);
        }
        self.ensure_layer(layer).insert(note)
    }

    /// Delete the note at `tick` on a layer. Does not shrink the song.
    pub fn remove_note(&mut self, layer: usize, tick: u32) -> Result<Option<Note>, EditError> {
        let count = self.layers.len();
        self.layers
            .get_mut(layer)
            .map(|l| l.remove_note(tick))
            .ok_or(EditError::LayerOutOfRange { layer, count })
    }

    /// Total number of notes across all layers.
    pub fn note_count(&self) -> usize {
        self.layers.iter().map(Layer::note_count).sum()
    }

    /// Occupied ticks in ascending order, each with its notes in layer order.
    pub fn notes_by_tick(&self) -> BTreeMap<u32, Vec<(usize, &Note)>> {
        let mut columns: BTreeMap<u32, Vec<(usize, &Note)>> = BTreeMap::new();
        for (index, layer) in self.layers.iter().enumerate() {
            for (&tick, note) in &layer.notes {
                columns.entry(tick).or_default().push((index, note));
            }
        }
        columns
    }

    // --- Instruments ---

    /// Look up an instrument by id.
    pub fn instrument(&self, id: u8) -> Option<&Instrument> {
        self.instruments.iter().find(|inst| inst.id == id)
    }

    /// Playback length in seconds at the song's tempo.
    pub fn duration_seconds(&self) -> f64 {
        self.tempo.seconds_for_ticks(self.size)
    }
}
