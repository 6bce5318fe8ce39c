mod common;

use std::fs;
use std::io::Write;

use common::*;
use corsikaio::parsing::{Compression, detect_compression};
use corsikaio::{CorsikaFile, Result};
use flate2::Compression as GzLevel;
use flate2::write::GzEncoder;

#[test]
fn opens_plain_file() -> Result<()> {
    let path = std::env::temp_dir().join("corsikaio_plain_test.dat");
    fs::write(&path, raw_stream(&simple_run(7.41, 3)))?;

    let mut f = CorsikaFile::open(&path)?;
    assert_eq!(f.version(), 7.41);
    let mut n = 0;
    while f.next_event()?.is_some() {
        n += 1;
    }
    assert_eq!(n, 3);

    fs::remove_file(path)?;
    Ok(())
}

#[test]
fn opens_gzip_compressed_file() -> Result<()> {
    let path = std::env::temp_dir().join("corsikaio_gzip_test.dat.gz");
    let stream = fortran_stream(&simple_run(7.41, 2), 4);

    let mut encoder = GzEncoder::new(Vec::new(), GzLevel::default());
    encoder.write_all(&stream)?;
    fs::write(&path, encoder.finish()?)?;

    let mut f = CorsikaFile::open(&path)?;
    assert_eq!(f.version(), 7.41);
    assert_eq!(f.run_end()?.float("n_events"), Some(2.0));
    let mut n = 0;
    while f.next_event()?.is_some() {
        n += 1;
    }
    assert_eq!(n, 2);

    fs::remove_file(path)?;
    Ok(())
}

#[test]
fn from_bytes_decompresses_gzip() -> Result<()> {
    let stream = raw_stream(&simple_run(6.5, 1));
    let mut encoder = GzEncoder::new(Vec::new(), GzLevel::default());
    encoder.write_all(&stream)?;
    let compressed = encoder.finish()?;

    let mut f = CorsikaFile::from_bytes(compressed)?;
    assert_eq!(f.version(), 6.5);
    assert!(f.next_event()?.is_some());
    Ok(())
}

/// Build a zstd frame that stores `payload` uncompressed in a single raw
/// block. Valid per RFC 8878, so any conforming decoder accepts it, and it
/// needs no encoder at test time.
fn zstd_stored_frame(payload: &[u8]) -> Vec<u8> {
    let mut out = vec![0x28, 0xb5, 0x2f, 0xfd];
    out.push(0x00); // descriptor: no content size, no dictionary, no checksum
    out.push(0x38); // window descriptor: 128 KiB
    let block_header = ((payload.len() as u32) << 3) | 0b001; // raw, last block
    out.extend_from_slice(&block_header.to_le_bytes()[..3]);
    out.extend_from_slice(payload);
    out
}

#[test]
fn opens_zstd_compressed_file() -> Result<()> {
    let path = std::env::temp_dir().join("corsikaio_zstd_test.dat.zst");
    let stream = fortran_stream(&simple_run(7.41, 2), 4);
    fs::write(&path, zstd_stored_frame(&stream))?;

    let mut f = CorsikaFile::open(&path)?;
    assert_eq!(f.version(), 7.41);
    assert_eq!(f.run_end()?.float("n_events"), Some(2.0));
    let mut n = 0;
    while f.next_event()?.is_some() {
        n += 1;
    }
    assert_eq!(n, 2);

    fs::remove_file(path)?;
    Ok(())
}

#[test]
fn from_bytes_decompresses_zstd() -> Result<()> {
    let stream = raw_stream(&simple_run(6.5, 1));
    let mut f = CorsikaFile::from_bytes(zstd_stored_frame(&stream))?;
    assert_eq!(f.version(), 6.5);
    assert!(f.next_event()?.is_some());
    assert!(f.next_event()?.is_none());
    Ok(())
}

#[test]
fn detects_compression_magics() {
    assert_eq!(
        detect_compression(&[0x1f, 0x8b, 0x08, 0x00]),
        Compression::Gzip
    );
    assert_eq!(
        detect_compression(&[0x28, 0xb5, 0x2f, 0xfd]),
        Compression::Zstd
    );
    assert_eq!(detect_compression(b"RUNH"), Compression::None);
    assert_eq!(detect_compression(&[]), Compression::None);
}
