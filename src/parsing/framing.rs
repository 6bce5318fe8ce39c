//! Physical file framing detection and block iteration.
//!
//! CORSIKA writes its output either as a flat concatenation of fixed-size
//! blocks, or wrapped in FORTRAN sequential records where each record is
//! prefixed and suffixed by a 4-byte little-endian length marker and the
//! payload is a whole number of blocks. [`BlockCursor`] normalizes both
//! shapes into one logical block stream with exact truncation detection:
//! running out of bytes anywhere except a record boundary is an error,
//! never a clean end of stream.

use crate::{Error, Result};
use crate::subblocks::common::read_u32;

/// Words per sub-block without thinning.
pub const BLOCK_SIZE_WORDS: usize = 273;
/// Bytes per sub-block without thinning.
pub const BLOCK_SIZE_BYTES: usize = BLOCK_SIZE_WORDS * 4;
/// Words per sub-block with thinning.
pub const BLOCK_SIZE_WORDS_THIN: usize = 312;
/// Bytes per sub-block with thinning.
pub const BLOCK_SIZE_BYTES_THIN: usize = BLOCK_SIZE_WORDS_THIN * 4;

/// Size of a FORTRAN record marker in bytes.
pub const RECORD_MARKER_BYTES: usize = 4;

/// Block size in bytes for the given thinning mode.
pub const fn block_size_bytes(thinning: bool) -> usize {
    if thinning {
        BLOCK_SIZE_BYTES_THIN
    } else {
        BLOCK_SIZE_BYTES
    }
}

/// Physical on-disk framing of a CORSIKA file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// Flat concatenation of blocks; the file starts with `RUNH` directly.
    Raw,
    /// FORTRAN sequential records: 4-byte length marker, payload,
    /// repeated 4-byte length marker.
    FortranRecords,
}

/// Detect the framing of a (decompressed) CORSIKA byte stream.
///
/// If the first 4 bytes equal the ASCII tag `RUNH` the stream is a flat
/// block concatenation; anything else is interpreted as the first FORTRAN
/// record marker.
pub fn detect_framing(buf: &[u8]) -> Result<Framing> {
    if buf.len() < 4 {
        return Err(Error::Truncated {
            expected: 4,
            actual: buf.len(),
        });
    }
    let framing = if &buf[..4] == b"RUNH" {
        Framing::Raw
    } else {
        Framing::FortranRecords
    };
    log::debug!("detected {framing:?} framing");
    Ok(framing)
}

/// Pull-based cursor over the logical block stream of one buffer.
///
/// The cursor holds only positions, not the buffer itself; the same buffer
/// must be passed to every [`next_block`](Self::next_block) call. Side
/// queries (run-end search, header scans) use their own cursor over the
/// same buffer, so the primary cursor is never disturbed.
#[derive(Debug, Clone)]
pub struct BlockCursor {
    framing: Framing,
    block_size: usize,
    pos: usize,
    /// Payload bytes left in the current FORTRAN record.
    remaining_in_record: usize,
}

impl BlockCursor {
    /// Create a cursor at the start of `buf`, detecting the framing.
    pub fn new(buf: &[u8], thinning: bool) -> Result<Self> {
        Ok(Self::with_framing(detect_framing(buf)?, thinning))
    }

    /// Create a cursor at position 0 with a known framing.
    pub fn with_framing(framing: Framing, thinning: bool) -> Self {
        BlockCursor {
            framing,
            block_size: block_size_bytes(thinning),
            pos: 0,
            remaining_in_record: 0,
        }
    }

    /// The framing this cursor was created with.
    pub fn framing(&self) -> Framing {
        self.framing
    }

    /// Block size in bytes.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Current byte position in the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Produce the next block, or `Ok(None)` on clean exhaustion at a
    /// record boundary.
    ///
    /// Any short read — fewer bytes than a marker or block needs, or a
    /// record length that is not a multiple of the block size — is a fatal
    /// truncation error, not end-of-stream.
    pub fn next_block<'a>(&mut self, buf: &'a [u8]) -> Result<Option<&'a [u8]>> {
        match self.framing {
            Framing::Raw => self.next_raw(buf),
            Framing::FortranRecords => self.next_framed(buf),
        }
    }

    fn next_raw<'a>(&mut self, buf: &'a [u8]) -> Result<Option<&'a [u8]>> {
        let available = buf.len() - self.pos;
        if available == 0 {
            return Ok(None);
        }
        if available < self.block_size {
            return Err(Error::Truncated {
                expected: self.block_size,
                actual: available,
            });
        }
        let block = &buf[self.pos..self.pos + self.block_size];
        self.pos += self.block_size;
        Ok(Some(block))
    }

    fn next_framed<'a>(&mut self, buf: &'a [u8]) -> Result<Option<&'a [u8]>> {
        // Zero-length records are legal; skip until one carries payload.
        while self.remaining_in_record == 0 {
            let available = buf.len() - self.pos;
            if available == 0 {
                return Ok(None);
            }
            if available < RECORD_MARKER_BYTES {
                return Err(Error::Truncated {
                    expected: RECORD_MARKER_BYTES,
                    actual: available,
                });
            }
            let record_len = read_u32(buf, self.pos) as usize;
            self.pos += RECORD_MARKER_BYTES;

            if record_len % self.block_size != 0 {
                return Err(Error::RecordSizeMismatch {
                    record_len,
                    block_size: self.block_size,
                });
            }
            let needed = record_len + RECORD_MARKER_BYTES;
            let available = buf.len() - self.pos;
            if available < needed {
                return Err(Error::Truncated {
                    expected: needed,
                    actual: available,
                });
            }
            self.remaining_in_record = record_len;
            if record_len == 0 {
                self.pos += RECORD_MARKER_BYTES;
            }
        }

        let block = &buf[self.pos..self.pos + self.block_size];
        self.pos += self.block_size;
        self.remaining_in_record -= self.block_size;
        if self.remaining_in_record == 0 {
            // discard the trailing record marker
            self.pos += RECORD_MARKER_BYTES;
        }
        Ok(Some(block))
    }
}

/// Iterator adapter over [`BlockCursor`] for a borrowed buffer.
///
/// Yields `Err` once on the first framing error and then stops.
pub struct BlockIter<'a> {
    buf: &'a [u8],
    cursor: BlockCursor,
    failed: bool,
}

/// Iterate the logical blocks of a (decompressed) CORSIKA byte stream.
pub fn iter_blocks(buf: &[u8], thinning: bool) -> Result<BlockIter<'_>> {
    Ok(BlockIter {
        buf,
        cursor: BlockCursor::new(buf, thinning)?,
        failed: false,
    })
}

impl<'a> Iterator for BlockIter<'a> {
    type Item = Result<&'a [u8]>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.cursor.next_block(self.buf) {
            Ok(block) => block.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(tag: &[u8; 4]) -> Vec<u8> {
        let mut b = vec![0u8; BLOCK_SIZE_BYTES];
        b[..4].copy_from_slice(tag);
        b
    }

    fn fortran_wrap(blocks: &[Vec<u8>], blocks_per_record: usize) -> Vec<u8> {
        let mut out = Vec::new();
        for chunk in blocks.chunks(blocks_per_record) {
            let record_len = (chunk.len() * BLOCK_SIZE_BYTES) as u32;
            out.extend_from_slice(&record_len.to_le_bytes());
            for b in chunk {
                out.extend_from_slice(b);
            }
            out.extend_from_slice(&record_len.to_le_bytes());
        }
        out
    }

    #[test]
    fn raw_stream_is_split_into_blocks() {
        let blocks = vec![block(b"RUNH"), block(b"EVTH"), block(b"RUNE")];
        let buf: Vec<u8> = blocks.concat();
        let tags: Vec<[u8; 4]> = iter_blocks(&buf, false)
            .unwrap()
            .map(|b| b.unwrap()[..4].try_into().unwrap())
            .collect();
        assert_eq!(tags, vec![*b"RUNH", *b"EVTH", *b"RUNE"]);
    }

    #[test]
    fn framed_stream_yields_same_blocks_as_raw() {
        let blocks: Vec<Vec<u8>> = [b"RUNH", b"EVTH", b"EVTE", b"RUNE"]
            .iter()
            .map(|t| block(t))
            .collect();
        let raw: Vec<u8> = blocks.concat();
        let framed = fortran_wrap(&blocks, 3);

        let from_raw: Vec<Vec<u8>> = iter_blocks(&raw, false)
            .unwrap()
            .map(|b| b.unwrap().to_vec())
            .collect();
        let from_framed: Vec<Vec<u8>> = iter_blocks(&framed, false)
            .unwrap()
            .map(|b| b.unwrap().to_vec())
            .collect();
        assert_eq!(from_raw, from_framed);
    }

    #[test]
    fn detection_prefers_runh() {
        assert_eq!(detect_framing(b"RUNHxxxx").unwrap(), Framing::Raw);
        let marker = 1092u32.to_le_bytes();
        assert_eq!(
            detect_framing(&marker).unwrap(),
            Framing::FortranRecords
        );
    }

    #[test]
    fn raw_truncated_mid_block_errors() {
        let mut buf = block(b"RUNH");
        buf.extend_from_slice(&block(b"EVTH")[..100]);
        let mut cursor = BlockCursor::new(&buf, false).unwrap();
        assert!(cursor.next_block(&buf).unwrap().is_some());
        assert!(matches!(
            cursor.next_block(&buf),
            Err(Error::Truncated {
                expected: BLOCK_SIZE_BYTES,
                actual: 100
            })
        ));
    }

    #[test]
    fn framed_short_payload_errors() {
        let blocks = vec![block(b"RUNH"), block(b"RUNE")];
        let mut framed = fortran_wrap(&blocks, 2);
        framed.truncate(framed.len() - 200);
        let mut cursor = BlockCursor::new(&framed, false).unwrap();
        assert!(matches!(cursor.next_block(&framed), Err(Error::Truncated { .. })));
    }

    #[test]
    fn framed_unaligned_record_length_errors() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&100u32.to_le_bytes());
        buf.extend_from_slice(&[0u8; 104]);
        let mut cursor = BlockCursor::new(&buf, false).unwrap();
        assert!(matches!(
            cursor.next_block(&buf),
            Err(Error::RecordSizeMismatch {
                record_len: 100,
                block_size: BLOCK_SIZE_BYTES
            })
        ));
    }

    #[test]
    fn clean_exhaustion_at_record_boundary() {
        let blocks = vec![block(b"RUNH"), block(b"RUNE")];
        let framed = fortran_wrap(&blocks, 1);
        let mut cursor = BlockCursor::new(&framed, false).unwrap();
        assert!(cursor.next_block(&framed).unwrap().is_some());
        assert!(cursor.next_block(&framed).unwrap().is_some());
        assert!(cursor.next_block(&framed).unwrap().is_none());
        // stays exhausted
        assert!(cursor.next_block(&framed).unwrap().is_none());
    }

    #[test]
    fn thin_blocks_use_thin_size() {
        let mut buf = vec![0u8; 2 * BLOCK_SIZE_BYTES_THIN];
        buf[..4].copy_from_slice(b"RUNH");
        let mut cursor = BlockCursor::new(&buf, true).unwrap();
        assert_eq!(
            cursor.next_block(&buf).unwrap().unwrap().len(),
            BLOCK_SIZE_BYTES_THIN
        );
    }

    #[test]
    fn empty_records_are_skipped() {
        let zero = 0u32.to_le_bytes();
        let mut buf = Vec::new();
        buf.extend_from_slice(&zero);
        buf.extend_from_slice(&zero);
        buf.extend_from_slice(&fortran_wrap(&[block(b"RUNH")], 1));
        let mut cursor = BlockCursor::new(&buf, false).unwrap();
        let b = cursor.next_block(&buf).unwrap().unwrap();
        assert_eq!(&b[..4], b"RUNH");
        assert!(cursor.next_block(&buf).unwrap().is_none());
    }
}
