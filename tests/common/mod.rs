//! Builders for synthetic CORSIKA block streams.
#![allow(dead_code)]

use corsikaio::parsing::{BLOCK_SIZE_BYTES, BLOCK_SIZE_BYTES_THIN};

pub fn block_size(thinning: bool) -> usize {
    if thinning {
        BLOCK_SIZE_BYTES_THIN
    } else {
        BLOCK_SIZE_BYTES
    }
}

/// A zeroed block of `size` bytes with `tag` in the first word.
pub fn tagged_block(tag: &[u8; 4], size: usize) -> Vec<u8> {
    let mut block = vec![0u8; size];
    block[..4].copy_from_slice(tag);
    block
}

/// Store `value` at the 1-based word `position`.
pub fn set_word(block: &mut [u8], position: usize, value: f32) {
    let offset = (position - 1) * 4;
    block[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

pub fn runh_sized(version: f32, size: usize) -> Vec<u8> {
    let mut block = tagged_block(b"RUNH", size);
    set_word(&mut block, 2, 1.0); // run_number
    set_word(&mut block, 4, version);
    block
}

pub fn evth_sized(version: f32, event_number: f32, size: usize) -> Vec<u8> {
    let mut block = tagged_block(b"EVTH", size);
    set_word(&mut block, 2, event_number);
    set_word(&mut block, 4, 3.0); // total_energy, arbitrary
    set_word(&mut block, 46, version);
    block
}

pub fn evte_sized(event_number: f32, size: usize) -> Vec<u8> {
    let mut block = tagged_block(b"EVTE", size);
    set_word(&mut block, 2, event_number);
    block
}

pub fn rune_sized(run_number: f32, n_events: f32, size: usize) -> Vec<u8> {
    let mut block = tagged_block(b"RUNE", size);
    set_word(&mut block, 2, run_number);
    set_word(&mut block, 3, n_events);
    block
}

pub fn runh(version: f32) -> Vec<u8> {
    runh_sized(version, BLOCK_SIZE_BYTES)
}

pub fn evth(version: f32, event_number: f32) -> Vec<u8> {
    evth_sized(version, event_number, BLOCK_SIZE_BYTES)
}

pub fn evte(event_number: f32) -> Vec<u8> {
    evte_sized(event_number, BLOCK_SIZE_BYTES)
}

pub fn rune(run_number: f32, n_events: f32) -> Vec<u8> {
    rune_sized(run_number, n_events, BLOCK_SIZE_BYTES)
}

/// Untagged data block with the given rows packed at the front; the
/// remaining row slots stay zero and are dropped by the decoder.
pub fn data_block(rows: &[&[f32]], row_words: usize, size: usize) -> Vec<u8> {
    assert_eq!(size % (row_words * 4), 0);
    let mut block = vec![0u8; size];
    let mut offset = 0;
    for row in rows {
        assert_eq!(row.len(), row_words);
        for value in *row {
            block[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
            offset += 4;
        }
    }
    block
}

/// `LONG` block: 13-word sub-header followed by 10-word rows.
pub fn long_block(rows: &[[f32; 10]], size: usize) -> Vec<u8> {
    let mut block = tagged_block(b"LONG", size);
    let mut offset = 52;
    for row in rows {
        for value in row {
            block[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
            offset += 4;
        }
    }
    block
}

/// Concatenate blocks into a raw stream.
pub fn raw_stream(blocks: &[Vec<u8>]) -> Vec<u8> {
    blocks.concat()
}

/// Wrap blocks into FORTRAN sequential records of up to `per_record`
/// blocks each: 4-byte length marker, payload, repeated marker.
pub fn fortran_stream(blocks: &[Vec<u8>], per_record: usize) -> Vec<u8> {
    let mut out = Vec::new();
    for chunk in blocks.chunks(per_record) {
        let payload: Vec<u8> = chunk.concat();
        let marker = (payload.len() as u32).to_le_bytes();
        out.extend_from_slice(&marker);
        out.extend_from_slice(&payload);
        out.extend_from_slice(&marker);
    }
    out
}

/// A well-formed run with `n_events` empty events.
pub fn simple_run(version: f32, n_events: usize) -> Vec<Vec<u8>> {
    let mut blocks = vec![runh(version)];
    for i in 0..n_events {
        blocks.push(evth(version, (i + 1) as f32));
        blocks.push(evte((i + 1) as f32));
    }
    blocks.push(rune(1.0, n_events as f32));
    blocks
}
