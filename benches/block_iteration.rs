//! Benchmarks for block iteration and event assembly.
//!
//! Run with: cargo bench --bench block_iteration

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use corsikaio::parsing::{BLOCK_SIZE_BYTES, iter_blocks};
use corsikaio::{CorsikaFile, CorsikaOptions, DataKind};

fn tagged_block(tag: &[u8; 4]) -> Vec<u8> {
    let mut block = vec![0u8; BLOCK_SIZE_BYTES];
    block[..4].copy_from_slice(tag);
    block
}

fn set_word(block: &mut [u8], position: usize, value: f32) {
    let offset = (position - 1) * 4;
    block[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

/// A run with `n_events` events of `data_blocks` full particle blocks each.
fn synthetic_run(n_events: usize, data_blocks: usize) -> Vec<u8> {
    let mut runh = tagged_block(b"RUNH");
    set_word(&mut runh, 2, 1.0);
    set_word(&mut runh, 4, 7.41);

    let mut data = vec![0u8; BLOCK_SIZE_BYTES];
    for (i, chunk) in data.chunks_exact_mut(4).enumerate() {
        chunk.copy_from_slice(&(1.0 + i as f32).to_le_bytes());
    }

    let mut out = runh;
    for i in 0..n_events {
        let mut evth = tagged_block(b"EVTH");
        set_word(&mut evth, 2, (i + 1) as f32);
        set_word(&mut evth, 46, 7.41);
        out.extend_from_slice(&evth);
        for _ in 0..data_blocks {
            out.extend_from_slice(&data);
        }
        let mut evte = tagged_block(b"EVTE");
        set_word(&mut evte, 2, (i + 1) as f32);
        out.extend_from_slice(&evte);
    }
    let mut rune = tagged_block(b"RUNE");
    set_word(&mut rune, 2, 1.0);
    set_word(&mut rune, 3, n_events as f32);
    out.extend_from_slice(&rune);
    out
}

fn bench_block_iteration(c: &mut Criterion) {
    let buf = synthetic_run(100, 20);

    c.bench_function("iter_blocks_raw", |b| {
        b.iter(|| {
            let mut n = 0usize;
            for block in iter_blocks(black_box(&buf), false).unwrap() {
                let block = block.unwrap();
                n += block.len();
            }
            black_box(n)
        })
    });
}

fn bench_event_assembly(c: &mut Criterion) {
    let buf = synthetic_run(100, 20);

    c.bench_function("events_raw_floats", |b| {
        b.iter(|| {
            let mut f = CorsikaFile::from_bytes(black_box(buf.clone())).unwrap();
            let mut n = 0usize;
            while let Some(event) = f.next_event().unwrap() {
                n += event.data.len();
            }
            black_box(n)
        })
    });

    c.bench_function("events_particles", |b| {
        let options = CorsikaOptions {
            data_kind: DataKind::Particles,
            ..CorsikaOptions::default()
        };
        b.iter(|| {
            let mut f = CorsikaFile::from_bytes_with(black_box(buf.clone()), options).unwrap();
            let mut n = 0usize;
            while let Some(event) = f.next_event().unwrap() {
                n += event.data.len();
            }
            black_box(n)
        })
    });
}

criterion_group!(benches, bench_block_iteration, bench_event_assembly);
criterion_main!(benches);
