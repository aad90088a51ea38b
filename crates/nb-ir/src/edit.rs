//! Edit commands for mutating song data.

use alloc::string::String;
use thiserror::Error;

use crate::song::Song;

/// An edit command that mutates song data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Edit {
    /// Append an empty layer.
    AddLayer,
    /// Remove a layer, shifting later layers down.
    RemoveLayer { layer: usize },
    /// Place or replace a note.
    SetNote {
        layer: usize,
        tick: u32,
        key: u8,
        instrument: u8,
        velocity: u8,
        panning: u8,
        pitch: i16,
    },
    /// Delete the note at a tick, if present.
    DeleteNote { layer: usize, tick: u32 },
    RenameLayer { layer: usize, name: String },
    /// Set a layer's volume as a 0-100 percentage.
    SetLayerVolume { layer: usize, percent: u8 },
}

/// Errors produced by edits that address missing data.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("layer {layer} does not exist (song has {count} layers)")]
    LayerOutOfRange { layer: usize, count: usize },
}

impl Song {
    /// Apply an edit command.
    pub fn apply(&mut self, edit: &Edit) -> Result<(), EditError> {
        match *edit {
            Edit::AddLayer => {
                self.add_layer();
            }
            Edit::RemoveLayer { layer } => {
                self.remove_layer(layer)?;
            }
            Edit::SetNote { layer, tick, key, instrument, velocity, panning, pitch } => {
                let note = self.set_note(layer, tick, key, instrument)?;
                note.velocity = velocity;
                note.panning = panning;
                note.pitch = pitch;
            }
            Edit::DeleteNote { layer, tick } => {
                self.remove_note(layer, tick)?;
            }
            Edit::RenameLayer { layer, ref name } => {
                let count = self.layer_count();
                let target = self
                    .layer_mut(layer)
                    .ok_or(EditError::LayerOutOfRange { layer, count })?;
                target.name.clone_from(name);
            }
            Edit::SetLayerVolume { layer, percent } => {
                let count = self.layer_count();
                self.layer_mut(layer)
                    .ok_or(EditError::LayerOutOfRange { layer, count })?
                    .set_volume_percent(percent);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_note(layer: usize, tick: u32, key: u8) -> Edit {
        Edit::SetNote {
            layer,
            tick,
            key,
            instrument: 0,
            velocity: 70,
            panning: 30,
            pitch: -50,
        }
    }

    #[test]
    fn set_note_applies_all_fields() {
        let mut song = Song::new();
        song.apply(&Edit::AddLayer).unwrap();
        song.apply(&set_note(0, 12, 50)).unwrap();

        let note = song.layer(0).unwrap().note(12).unwrap();
        assert_eq!(note.key, 50);
        assert_eq!(note.velocity, 70);
        assert_eq!(note.panning, 30);
        assert_eq!(note.pitch, -50);
        assert_eq!(song.size(), 13);
    }

    #[test]
    fn delete_note_keeps_size() {
        let mut song = Song::new();
        song.apply(&Edit::AddLayer).unwrap();
        song.apply(&set_note(0, 12, 50)).unwrap();
        song.apply(&Edit::DeleteNote { layer: 0, tick: 12 }).unwrap();
        assert_eq!(song.note_count(), 0);
        assert_eq!(song.size(), 13);
    }

    #[test]
    fn rename_and_volume() {
        let mut song = Song::new();
        song.apply(&Edit::AddLayer).unwrap();
        song.apply(&Edit::RenameLayer { layer: 0, name: "Drums".into() }).unwrap();
        song.apply(&Edit::SetLayerVolume { layer: 0, percent: 250 }).unwrap();
        let layer = song.layer(0).unwrap();
        assert_eq!(layer.name, "Drums");
        assert_eq!(layer.volume_percent(), 100);
    }

    #[test]
    fn edits_on_missing_layer_fail() {
        let mut song = Song::new();
        assert_eq!(
            song.apply(&set_note(0, 0, 45)),
            Err(EditError::LayerOutOfRange { layer: 0, count: 0 })
        );
        assert!(song.apply(&Edit::RemoveLayer { layer: 0 }).is_err());
        assert!(song.apply(&Edit::DeleteNote { layer: 1, tick: 0 }).is_err());
        assert!(song.apply(&Edit::SetLayerVolume { layer: 0, percent: 1 }).is_err());
    }

    #[test]
    fn error_message_names_layer() {
        let err = EditError::LayerOutOfRange { layer: 3, count: 1 };
        assert_eq!(err.to_string(), "layer 3 does not exist (song has 1 layers)");
    }
}
