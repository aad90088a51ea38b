//! Headless controller for the noteblock tracker.
//!
//! Owns the song being edited and provides a unified API for loading,
//! editing and exporting it that the editor front end and the CLI share.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

// Re-export common types so callers don't need nb-ir/nb-formats directly.
pub use nb_formats::{FormatError, ReadError};
pub use nb_ir::{Arrangement, Edit, EditError, Song};

/// Headless tracker controller: owns a song and tracks unsaved changes.
pub struct Controller {
    song: Song,
    path: Option<PathBuf>,
    dirty: bool,
}

impl Controller {
    /// Start with an untitled song holding one empty layer.
    ///
    /// Layers without notes are exported but not restored by `load`, so an
    /// untouched song reloads with no layers.
    pub fn new() -> Self {
        let mut song = Song::with_name("Untitled");
        song.add_layer();
        Self {
            song,
            path: None,
            dirty: false,
        }
    }

    // --- Song management ---

    pub fn song(&self) -> &Song {
        &self.song
    }

    /// Mutable access; marks the song as modified.
    pub fn song_mut(&mut self) -> &mut Song {
        self.dirty = true;
        &mut self.song
    }

    /// File the song was last loaded from or saved to.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Replace the song with one decoded from NBS bytes.
    ///
    /// On failure the current song is left untouched.
    pub fn load(&mut self, data: &[u8]) -> Result<(), FormatError> {
        self.song = nb_formats::load_nbs(data)?;
        self.path = None;
        self.dirty = false;
        Ok(())
    }

    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), FormatError> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        self.load(&data)?;
        info!(
            "Loaded {}: {} layers, {} notes",
            path.display(),
            self.song.layer_count(),
            self.song.note_count()
        );
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    /// Encode the song as NBS bytes.
    pub fn export(&self) -> Result<Vec<u8>, FormatError> {
        nb_formats::save_nbs(&self.song)
    }

    pub fn save_file(&mut self, path: impl AsRef<Path>) -> Result<(), FormatError> {
        let path = path.as_ref();
        let bytes = self.export()?;
        fs::write(path, &bytes)?;
        info!("Saved {} ({} bytes)", path.display(), bytes.len());
        self.path = Some(path.to_path_buf());
        self.dirty = false;
        Ok(())
    }

    // --- Editing ---

    pub fn apply(&mut self, edit: &Edit) -> Result<(), EditError> {
        self.song.apply(edit)?;
        self.dirty = true;
        Ok(())
    }

    /// The editor's grid view of the current song.
    pub fn arrangement(&self) -> Arrangement {
        Arrangement::from_song(&self.song)
    }

    /// Replace the song with the one built from an editor grid.
    pub fn set_arrangement(&mut self, arrangement: &Arrangement) {
        self.song = arrangement.to_song();
        self.dirty = true;
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nb_ir::GridPos;

    fn edit_note(layer: usize, tick: u32) -> Edit {
        Edit::SetNote {
            layer,
            tick,
            key: 45,
            instrument: 0,
            velocity: 100,
            panning: 100,
            pitch: 0,
        }
    }

    #[test]
    fn new_controller_has_one_layer() {
        let ctrl = Controller::new();
        assert_eq!(ctrl.song().name, "Untitled");
        assert_eq!(ctrl.song().layer_count(), 1);
        assert!(!ctrl.is_dirty());
        assert!(ctrl.path().is_none());
    }

    #[test]
    fn edits_mark_dirty() {
        let mut ctrl = Controller::new();
        ctrl.apply(&edit_note(0, 4)).unwrap();
        assert!(ctrl.is_dirty());
        assert_eq!(ctrl.song().size(), 5);
    }

    #[test]
    fn failed_edit_leaves_clean_state() {
        let mut ctrl = Controller::new();
        assert!(ctrl.apply(&edit_note(3, 4)).is_err());
        assert!(!ctrl.is_dirty());
    }

    #[test]
    fn failed_load_keeps_current_song() {
        let mut ctrl = Controller::new();
        ctrl.apply(&edit_note(0, 9)).unwrap();
        let err = ctrl.load(&[0, 0, 4]).unwrap_err();
        assert!(err.is_truncated());
        assert_eq!(ctrl.song().size(), 10);
        assert!(ctrl.is_dirty());
    }

    #[test]
    fn export_then_load() {
        let mut ctrl = Controller::new();
        ctrl.apply(&edit_note(0, 2)).unwrap();
        let bytes = ctrl.export().unwrap();

        let mut other = Controller::new();
        other.load(&bytes).unwrap();
        assert_eq!(other.song(), ctrl.song());
        assert!(!other.is_dirty());
    }

    #[test]
    fn save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.nbs");

        let mut ctrl = Controller::new();
        ctrl.apply(&edit_note(0, 7)).unwrap();
        ctrl.save_file(&path).unwrap();
        assert!(!ctrl.is_dirty());
        assert_eq!(ctrl.path(), Some(path.as_path()));

        let mut other = Controller::new();
        other.load_file(&path).unwrap();
        assert_eq!(other.song(), ctrl.song());
        assert_eq!(other.path(), Some(path.as_path()));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Controller::new().load_file(dir.path().join("nope.nbs")).unwrap_err();
        assert!(matches!(err, FormatError::Io(_)));
    }

    #[test]
    fn arrangement_round_trip() {
        let mut ctrl = Controller::new();
        let mut arrangement = ctrl.arrangement();
        arrangement.tracks[0].paint(GridPos::new(12, 3));
        ctrl.set_arrangement(&arrangement);
        assert!(ctrl.is_dirty());
        assert_eq!(ctrl.song().layer(0).unwrap().note(3).unwrap().key, 45);
    }
}
