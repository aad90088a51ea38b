//! NBS (Note Block Studio) format codec.
//!
//! Reads the classic layout and versions 1-5, writes version 4. The note
//! stream is sparse: each occupied tick is a jump from the previous one,
//! followed by layer jumps for every note on that tick. A jump of zero ends
//! the tick (for layers) or the stream (for ticks).

use std::io::Write;

use log::{debug, warn};
use nb_ir::{Note, Song, Tempo, UsageStats, VANILLA_INSTRUMENT_COUNT};

use crate::nbs_io::{NbsReader, NbsWriter, NoteRecord};
use crate::{FormatError, ReadError};

/// Version written by `save_nbs`.
pub const NBS_VERSION: u8 = 4;
/// Newest layout `load_nbs` understands.
pub const MAX_NBS_VERSION: u8 = 5;
/// Pseudo-version for files predating the version byte.
pub const CLASSIC_NBS_VERSION: u8 = 0;

/// Largest tick or layer index the 16-bit fields can address.
const MAX_INDEX: u32 = u16::MAX as u32;

/// Which optional fields a given NBS version carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NbsLayout {
    pub version: u8,
}

impl NbsLayout {
    pub const fn new(version: u8) -> Self {
        Self { version }
    }

    /// Song length short after the vanilla instrument count.
    pub const fn has_song_length(self) -> bool {
        self.version >= 3
    }

    /// Loop on/off, max loop count and loop start in the header.
    pub const fn has_loop(self) -> bool {
        self.version >= 4
    }

    /// Velocity, panning and fine pitch in each note record.
    pub const fn has_note_dynamics(self) -> bool {
        self.version >= 4
    }

    pub const fn has_layer_lock(self) -> bool {
        self.version >= 4
    }

    pub const fn has_layer_stereo(self) -> bool {
        self.version >= 2
    }
}

struct Header {
    layout: NbsLayout,
    layer_count: u16,
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Load an NBS file from bytes.
///
/// Decoding is all-or-nothing: any failure yields `FormatError::Parse` and
/// no song.
pub fn load_nbs(data: &[u8]) -> Result<Song, FormatError> {
    read_song(data).map_err(|e| {
        debug!("[NBS] parse failed: {}", e);
        FormatError::Parse(e)
    })
}

/// Report the layout version of an NBS file without decoding it.
///
/// Classic files report `CLASSIC_NBS_VERSION`.
pub fn nbs_version(data: &[u8]) -> Result<u8, FormatError> {
    let mut r = NbsReader::new(data);
    read_version(&mut r).map(|(layout, _)| layout.version).map_err(FormatError::Parse)
}

fn read_song(data: &[u8]) -> Result<Song, ReadError> {
    let mut r = NbsReader::new(data);
    let mut song = Song::new();

    let header = read_header(&mut r, &mut song)?;
    read_notes(&mut r, &mut song, header.layout)?;
    read_layers(&mut r, &mut song, &header)?;
    read_custom_instruments(&mut r)?;

    debug!(
        "[NBS] loaded v{}: {} layers, {} notes, size {}",
        header.layout.version,
        song.layer_count(),
        song.note_count(),
        song.size(),
    );
    Ok(song)
}

/// Read the format marker and version. Returns the layout and, for classic
/// files, the song length that took the marker's place.
fn read_version(r: &mut NbsReader) -> Result<(NbsLayout, Option<u16>), ReadError> {
    let marker = r.read_u16()?;
    if marker != 0 {
        return Ok((NbsLayout::new(CLASSIC_NBS_VERSION), Some(marker)));
    }

    let version = r.read_u8()?;
    if version == CLASSIC_NBS_VERSION || version > MAX_NBS_VERSION {
        return Err(ReadError::UnsupportedVersion(version));
    }
    Ok((NbsLayout::new(version), None))
}

fn read_header(r: &mut NbsReader, song: &mut Song) -> Result<Header, ReadError> {
    let (layout, classic_size) = read_version(r)?;

    let mut size = classic_size;
    if layout.version != CLASSIC_NBS_VERSION {
        let vanilla_count = r.read_u8()?;
        if vanilla_count != VANILLA_INSTRUMENT_COUNT {
            debug!("[NBS] file declares {} vanilla instruments", vanilla_count);
        }
        if layout.has_song_length() {
            size = Some(r.read_u16()?);
        }
    }

    let layer_count = r.read_u16()?;
    song.name = r.read_string()?;
    song.author = r.read_string()?;
    song.original_author = r.read_string()?;
    song.description = r.read_string()?;
    song.tempo = Tempo::from_centi_ticks_per_second(r.read_i16()?.max(0) as u16);
    let _auto_save = r.read_u8()?;
    let _auto_save_interval = r.read_u8()?;
    song.time_signature = r.read_u8()?;
    song.stats = UsageStats {
        minutes_spent: r.read_i32()?,
        left_clicks: r.read_i32()?,
        right_clicks: r.read_i32()?,
        blocks_added: r.read_i32()?,
        blocks_removed: r.read_i32()?,
    };
    song.midi_name = r.read_string()?;

    if layout.has_loop() {
        let _loop_on = r.read_u8()?;
        let _max_loop_count = r.read_u8()?;
        let _loop_start = r.read_u16()?;
    }

    // Without a stored length, placing notes determines it.
    if let Some(size) = size {
        song.set_size(size as u32);
    }

    Ok(Header { layout, layer_count })
}

fn read_notes(r: &mut NbsReader, song: &mut Song, layout: NbsLayout) -> Result<(), ReadError> {
    // Both cursors start one before index 0.
    let mut tick: i64 = -1;
    loop {
        let tick_jump = r.read_u16()?;
        if tick_jump == 0 {
            break;
        }
        tick += tick_jump as i64;
        let note_tick = u32::try_from(tick)
            .map_err(|_| ReadError::IndexOverflow { what: "tick", offset: r.position() })?;

        let mut layer: i64 = -1;
        loop {
            let layer_jump = r.read_u16()?;
            if layer_jump == 0 {
                break;
            }
            layer += layer_jump as i64;
            if layer > MAX_INDEX as i64 {
                return Err(ReadError::IndexOverflow { what: "layer", offset: r.position() });
            }

            let note = if layout.has_note_dynamics() {
                r.read_note_record()?.into_note(note_tick)
            } else {
                let instrument = r.read_u8()?;
                let key = r.read_u8()?;
                Note::new(note_tick, key, instrument)
            };
            song.place_note(layer as usize, note);
        }
    }
    Ok(())
}

fn read_layers(r: &mut NbsReader, song: &mut Song, header: &Header) -> Result<(), ReadError> {
    let layout = header.layout;
    for index in 0..header.layer_count as usize {
        if r.is_at_end() {
            warn!(
                "[NBS] file ends after {} of {} layer records",
                index, header.layer_count
            );
            return Ok(());
        }

        let name = r.read_string()?;
        if layout.has_layer_lock() {
            let _locked = r.read_u8()?;
        }
        let volume = r.read_u8()?;
        if layout.has_layer_stereo() {
            let _stereo = r.read_u8()?;
        }

        match song.layer_mut(index) {
            Some(layer) => {
                layer.name = name;
                layer.set_volume_percent(volume);
            }
            None => debug!("[NBS] layer {} ({:?}) holds no notes; metadata skipped", index, name),
        }
    }
    Ok(())
}

/// Custom instrument definitions are not imported; only the count is read.
fn read_custom_instruments(r: &mut NbsReader) -> Result<(), ReadError> {
    if r.is_at_end() {
        return Ok(());
    }
    let count = r.read_u8()?;
    if count > 0 {
        warn!("[NBS] {} custom instruments are not imported", count);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Encode a song as NBS version 4.
///
/// Fails before writing anything if a note references an instrument that
/// is not in the song's table or the song exceeds the format's 16-bit
/// limits.
pub fn save_nbs(song: &Song) -> Result<Vec<u8>, FormatError> {
    validate(song)?;

    let mut w = NbsWriter::new();
    write_header(&mut w, song)?;
    write_notes(&mut w, song)?;
    write_layers(&mut w, song)?;
    // No custom instruments.
    w.write_u8(0)?;

    let bytes = w.into_inner();
    debug!(
        "[NBS] saved {} layers, {} notes in {} bytes",
        song.layer_count(),
        song.note_count(),
        bytes.len(),
    );
    Ok(bytes)
}

/// Encode a song as NBS version 4 into a writer.
pub fn write_nbs(out: &mut impl Write, song: &Song) -> Result<(), FormatError> {
    let bytes = save_nbs(song)?;
    out.write_all(&bytes)?;
    Ok(())
}

fn validate(song: &Song) -> Result<(), FormatError> {
    if song.size() > MAX_INDEX {
        return Err(FormatError::SongTooLong(song.size()));
    }
    if song.layer_count() > MAX_INDEX as usize {
        return Err(FormatError::TooManyLayers(song.layer_count()));
    }
    for (index, layer) in song.layers().iter().enumerate() {
        if let Some(note) = layer.notes().find(|n| song.instrument(n.instrument).is_none()) {
            return Err(FormatError::UnknownInstrument {
                tick: note.tick,
                layer: index,
                instrument: note.instrument,
            });
        }
    }
    Ok(())
}

fn write_header(w: &mut NbsWriter, song: &Song) -> Result<(), FormatError> {
    w.write_u16(0)?; // new-format marker
    w.write_u8(NBS_VERSION)?;
    w.write_u8(VANILLA_INSTRUMENT_COUNT)?;
    w.write_u16(song.size() as u16)?;
    w.write_u16(song.layer_count() as u16)?;
    w.write_string(&song.name)?;
    w.write_string(&song.author)?;
    w.write_string(&song.original_author)?;
    w.write_string(&song.description)?;
    w.write_i16(song.tempo.centi_ticks_per_second() as i16)?;
    w.write_u8(0)?; // auto-save off
    w.write_u8(0)?; // auto-save interval
    w.write_u8(song.time_signature)?;
    w.write_i32(song.stats.minutes_spent)?;
    w.write_i32(song.stats.left_clicks)?;
    w.write_i32(song.stats.right_clicks)?;
    w.write_i32(song.stats.blocks_added)?;
    w.write_i32(song.stats.blocks_removed)?;
    w.write_string(&song.midi_name)?;
    w.write_u8(0)?; // loop off
    w.write_u8(0)?; // max loop count
    w.write_u16(0) // loop start tick
}

fn write_notes(w: &mut NbsWriter, song: &Song) -> Result<(), FormatError> {
    let mut last_tick: i64 = -1;
    for (tick, column) in song.notes_by_tick() {
        w.write_u16((tick as i64 - last_tick) as u16)?;
        last_tick = tick as i64;

        let mut last_layer: i64 = -1;
        for (layer, note) in column {
            w.write_u16((layer as i64 - last_layer) as u16)?;
            last_layer = layer as i64;
            w.write_note_record(&NoteRecord::from(note))?;
        }
        w.write_u16(0)?; // end of tick
    }
    w.write_u16(0) // end of notes
}

fn write_layers(w: &mut NbsWriter, song: &Song) -> Result<(), FormatError> {
    for layer in song.layers() {
        w.write_string(&layer.name)?;
        w.write_u8(0)?; // unlocked
        w.write_u8(layer.volume_percent())?;
        w.write_u8(100)?; // centered
    }
    Ok(())
}
