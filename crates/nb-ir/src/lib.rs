//! Core score types for the noteblock tracker.
//!
//! This crate defines the in-memory song model: metadata, an ordered list
//! of layers, and a sparse tick → note map per layer. The NBS codec reads
//! and writes it, and the editor mutates it through `Song` methods or
//! `Edit` commands.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod edit;
mod grid;
mod instrument;
mod layer;
mod note;
pub mod song;
mod tempo;

pub use edit::{Edit, EditError};
pub use grid::{row_name, Arrangement, GridPos, GridTrack, DEFAULT_BPM, DEFAULT_LENGTH, GRID_ROWS, MAX_BPM, MIN_BPM};
pub use instrument::{vanilla_instruments, Instrument, VANILLA_INSTRUMENT_COUNT, VANILLA_INSTRUMENT_NAMES};
pub use layer::Layer;
pub use note::{
    key_name, Note, DEFAULT_KEY, DEFAULT_PANNING, DEFAULT_PITCH, DEFAULT_VELOCITY, NOTE_BLOCK_MAX_KEY,
    NOTE_BLOCK_MIN_KEY,
};
pub use song::{Song, UsageStats, DEFAULT_TIME_SIGNATURE};
pub use tempo::{Tempo, MAX_CENTI_TPS, TICKS_PER_BEAT};
