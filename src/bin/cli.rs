//! noteblock CLI: inspect, dump and convert NBS songs.
//!
//! Usage:
//!   nb-cli info song.nbs
//!   nb-cli dump song.nbs
//!   nb-cli roundtrip in.nbs out.nbs
//!   nb-cli new out.nbs --name "Tune" --bpm 140 --layers 3

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::debug;
use nb_ir::{
    key_name, Arrangement, GridTrack, DEFAULT_BPM, MAX_BPM, MIN_BPM, VANILLA_INSTRUMENT_COUNT,
};
use nb_master::Controller;

#[derive(Parser)]
#[command(name = "nb-cli")]
#[command(about = "Inspect and convert note block songs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print song metadata and layer summary
    Info {
        /// Path to the NBS file
        file: PathBuf,
    },
    /// Print every note, tick by tick
    Dump {
        /// Path to the NBS file
        file: PathBuf,
    },
    /// Decode a file and encode it again
    Roundtrip {
        input: PathBuf,
        output: PathBuf,
    },
    /// Write a new song with no notes
    New {
        output: PathBuf,

        #[arg(long, default_value = "My Song")]
        name: String,

        #[arg(long, default_value = "Player")]
        author: String,

        /// Tempo in beats per minute (clamped to 20-300)
        #[arg(long, default_value_t = DEFAULT_BPM)]
        bpm: u16,

        /// Number of tracks to create. Layers that hold no notes are not
        /// kept when the file is loaded again.
        #[arg(long, default_value_t = 1)]
        layers: usize,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Info { file } => info(&file),
        Commands::Dump { file } => dump(&file),
        Commands::Roundtrip { input, output } => roundtrip(&input, &output),
        Commands::New {
            output,
            name,
            author,
            bpm,
            layers,
        } => new_song(&output, name, author, bpm, layers),
    }
}

fn open(path: &Path) -> Result<Controller> {
    let mut ctrl = Controller::new();
    ctrl.load_file(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    Ok(ctrl)
}

fn info(path: &Path) -> Result<()> {
    let ctrl = open(path)?;
    let song = ctrl.song();

    println!("Title:     {}", song.name);
    println!("Author:    {}", song.author);
    if !song.original_author.is_empty() {
        println!("Original:  {}", song.original_author);
    }
    if !song.description.is_empty() {
        println!("About:     {}", song.description);
    }
    println!(
        "Tempo:     {:.2} ticks/s ({:.1} BPM)",
        song.tempo.ticks_per_second(),
        song.tempo.bpm()
    );
    println!("Length:    {} ticks ({:.1}s)", song.size(), song.duration_seconds());
    println!("Time sig:  {}/4", song.time_signature);
    println!("Notes:     {}", song.note_count());
    println!();

    for (index, layer) in song.layers().iter().enumerate() {
        println!(
            "  {:>3}  {:<24} vol {:>3}%  {} notes",
            index,
            layer.name,
            layer.volume_percent(),
            layer.note_count()
        );
    }
    Ok(())
}

fn dump(path: &Path) -> Result<()> {
    let ctrl = open(path)?;
    let song = ctrl.song();

    for (tick, notes) in song.notes_by_tick() {
        for (layer, note) in notes {
            let instrument = song
                .instrument(note.instrument)
                .map(|inst| inst.name.as_str())
                .unwrap_or("?");
            println!(
                "{:>6}  L{:<3} {:<4} {:<16} vel {:>3} pan {:>3} pitch {:>5}",
                tick,
                layer,
                key_name(note.key),
                instrument,
                note.velocity,
                note.panning,
                note.pitch
            );
        }
    }
    Ok(())
}

fn roundtrip(input: &Path, output: &Path) -> Result<()> {
    let mut ctrl = open(input)?;
    ctrl.save_file(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let before = std::fs::metadata(input)?.len();
    let after = std::fs::metadata(output)?.len();
    println!(
        "{} -> {} ({} bytes -> {} bytes)",
        input.display(),
        output.display(),
        before,
        after
    );
    Ok(())
}

fn new_song(output: &Path, name: String, author: String, bpm: u16, layers: usize) -> Result<()> {
    let mut arrangement = Arrangement {
        name,
        author,
        bpm: bpm.clamp(MIN_BPM, MAX_BPM),
        ..Arrangement::new()
    };
    arrangement.tracks = (0..layers.max(1))
        .map(|i| GridTrack::new((i % VANILLA_INSTRUMENT_COUNT as usize) as u8))
        .collect();
    debug!("New arrangement with {} tracks", arrangement.tracks.len());

    let mut ctrl = Controller::new();
    ctrl.set_arrangement(&arrangement);
    ctrl.save_file(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Wrote {}", output.display());
    Ok(())
}
