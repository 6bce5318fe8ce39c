//! Compression auto-detection and transparent decompression.
//!
//! CORSIKA output is frequently stored gzip- or zstd-compressed. The
//! wrapper is detected from magic bytes (gzip `1f 8b`, zstd `28 b5 2f fd`)
//! and the whole stream is decompressed into memory; everything downstream
//! operates on the plain block stream.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use flate2::read::GzDecoder;
use ruzstd::decoding::StreamingDecoder;

use crate::{Error, Result};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xb5, 0x2f, 0xfd];

/// Compression wrapper detected from a stream's leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// gzip stream (`1f 8b`)
    Gzip,
    /// zstd frame (`28 b5 2f fd`)
    Zstd,
    /// plain, uncompressed stream
    None,
}

/// Detect the compression wrapper from the first bytes of a stream.
pub fn detect_compression(magic: &[u8]) -> Compression {
    if magic.len() >= 2 && magic[..2] == GZIP_MAGIC {
        Compression::Gzip
    } else if magic.len() >= 4 && magic[..4] == ZSTD_MAGIC {
        Compression::Zstd
    } else {
        Compression::None
    }
}

/// Read a possibly compressed file fully into memory.
///
/// The OS file handle is closed before this function returns; all further
/// access goes through the returned buffer.
pub fn read_decompressed(path: &Path) -> Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let mut magic = [0u8; 4];
    let n = file.read(&mut magic)?;
    file.seek(SeekFrom::Start(0))?;

    let mut out = Vec::new();
    match detect_compression(&magic[..n]) {
        Compression::Gzip => {
            GzDecoder::new(BufReader::new(file)).read_to_end(&mut out)?;
        }
        Compression::Zstd => {
            let mut decoder = StreamingDecoder::new(BufReader::new(file))
                .map_err(|e| Error::Decompression(e.to_string()))?;
            decoder.read_to_end(&mut out)?;
        }
        Compression::None => {
            file.read_to_end(&mut out)?;
        }
    }
    Ok(out)
}

/// Decompress an in-memory buffer if it carries a known compression magic;
/// plain data is returned unchanged.
pub fn decompress_bytes(data: Vec<u8>) -> Result<Vec<u8>> {
    match detect_compression(&data) {
        Compression::Gzip => {
            let mut out = Vec::new();
            GzDecoder::new(data.as_slice()).read_to_end(&mut out)?;
            Ok(out)
        }
        Compression::Zstd => {
            let mut decoder = StreamingDecoder::new(data.as_slice())
                .map_err(|e| Error::Decompression(e.to_string()))?;
            let mut out = Vec::new();
            decoder.read_to_end(&mut out)?;
            Ok(out)
        }
        Compression::None => Ok(data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn magic_detection() {
        assert_eq!(detect_compression(&[0x1f, 0x8b, 0x08]), Compression::Gzip);
        assert_eq!(
            detect_compression(&[0x28, 0xb5, 0x2f, 0xfd]),
            Compression::Zstd
        );
        assert_eq!(detect_compression(b"RUNH"), Compression::None);
        assert_eq!(detect_compression(&[]), Compression::None);
    }

    #[test]
    fn gzip_bytes_round_trip() {
        let payload = b"RUNH plus some more bytes".to_vec();
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&payload).unwrap();
        let compressed = encoder.finish().unwrap();

        assert_eq!(decompress_bytes(compressed).unwrap(), payload);
    }

    #[test]
    fn plain_bytes_pass_through() {
        let payload = b"RUNH".to_vec();
        assert_eq!(decompress_bytes(payload.clone()).unwrap(), payload);
    }
}
