use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nb_formats::{load_nbs, save_nbs};
use nb_ir::{Note, Song};

/// A dense song: 16 layers, a note every other tick for 4096 ticks.
fn dense_song() -> Song {
    let mut song = Song::with_name("Bench");
    for _ in 0..16 {
        song.add_layer();
    }
    for tick in (0..4096u32).step_by(2) {
        for layer in 0..16usize {
            let key = 33 + ((tick as usize + layer) % 25) as u8;
            song.place_note(layer, Note::new(tick, key, (layer % 16) as u8));
        }
    }
    song
}

fn bench_save(c: &mut Criterion) {
    let song = dense_song();
    c.bench_function("save_nbs dense", |b| b.iter(|| save_nbs(black_box(&song))));
}

fn bench_load(c: &mut Criterion) {
    let bytes = save_nbs(&dense_song()).unwrap();
    c.bench_function("load_nbs dense", |b| b.iter(|| load_nbs(black_box(&bytes))));
}

criterion_group!(benches, bench_save, bench_load);
criterion_main!(benches);
