//! High level reader for CORSIKA binary output files.

use std::path::Path;

use crate::event::{AssembleOptions, Assembled, DataKind, Event, assemble_next};
use crate::parsing::{
    BlockCursor, Framing, RECORD_MARKER_BYTES, decompress_bytes, read_decompressed,
};
use crate::subblocks::common::read_u32;
use crate::subblocks::{
    self, EVTH_VERSION_POSITION, RUNH_VERSION_POSITION, read_version,
};
use crate::types::Record;
use crate::{Error, Result};

/// Open-time configuration for a [`CorsikaFile`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CorsikaOptions {
    /// Whether the file was produced with the THIN option (312-word
    /// blocks and a per-row weight). Not auto-detected.
    pub thinning: bool,
    /// How to decode the data rows of each event.
    pub data_kind: DataKind,
    /// Apply the MMCS wavelength/mother-particle reinterpretation to
    /// photon rows. Only meaningful with [`DataKind::CherenkovPhotons`].
    pub mmcs: bool,
}

/// A reader iterating over the events of one CORSIKA run.
///
/// The file is decompressed and read fully into memory at open time; the
/// OS handle is closed before `open` returns. Forward iteration walks the
/// block stream lazily, while [`run_end`](Self::run_end) and
/// [`read_headers`](Self::read_headers) use independent cursors over the
/// same buffer and never disturb the iteration position.
///
/// # Example
///
/// ```no_run
/// use corsikaio::{CorsikaFile, Result};
///
/// fn main() -> Result<()> {
///     let mut f = CorsikaFile::open("DAT000001")?;
///     println!("CORSIKA version {}", f.version());
///     for event in &mut f {
///         let event = event?;
///         println!(
///             "event {:?}: {} data rows",
///             event.header.float("event_number"),
///             event.data.len(),
///         );
///     }
///     println!("events in run: {:?}", f.run_end()?.float("n_events"));
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct CorsikaFile {
    buffer: Vec<u8>,
    cursor: BlockCursor,
    options: CorsikaOptions,
    run_header: Record,
    version: f32,
    run_end: Option<Record>,
    finished: bool,
}

impl CorsikaFile {
    /// Open a (possibly gzip- or zstd-compressed) CORSIKA file with
    /// default options: standard block size, data rows as raw floats.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, CorsikaOptions::default())
    }

    /// Open a CORSIKA file with explicit options.
    pub fn open_with<P: AsRef<Path>>(path: P, options: CorsikaOptions) -> Result<Self> {
        Self::from_bytes_with(read_decompressed(path.as_ref())?, options)
    }

    /// Open a particle-output file (`DATnnnnnn`), decoding data rows as
    /// [`ParticleRow`](crate::ParticleRow)s.
    pub fn open_particle<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(
            path,
            CorsikaOptions {
                data_kind: DataKind::Particles,
                ..CorsikaOptions::default()
            },
        )
    }

    /// Open a Cherenkov-output file (`CERnnnnnn`), decoding data rows as
    /// [`PhotonRow`](crate::PhotonRow)s. With `mmcs`, photon rows are
    /// additionally split into wavelength and mother particle id.
    pub fn open_cherenkov<P: AsRef<Path>>(path: P, mmcs: bool) -> Result<Self> {
        Self::open_with(
            path,
            CorsikaOptions {
                data_kind: DataKind::CherenkovPhotons,
                mmcs,
                ..CorsikaOptions::default()
            },
        )
    }

    /// Read a run from an in-memory buffer (possibly still compressed)
    /// with default options.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_bytes_with(data, CorsikaOptions::default())
    }

    /// Read a run from an in-memory buffer with explicit options.
    pub fn from_bytes_with(data: Vec<u8>, options: CorsikaOptions) -> Result<Self> {
        let buffer = decompress_bytes(data)?;
        let mut cursor = BlockCursor::new(&buffer, options.thinning)?;

        let first = match cursor.next_block(&buffer)? {
            Some(block) => block,
            None => {
                return Err(Error::Truncated {
                    expected: cursor.block_size(),
                    actual: 0,
                });
            }
        };
        if &first[..4] != b"RUNH" {
            let mut found = [0u8; 4];
            found.copy_from_slice(&first[..4]);
            return Err(Error::MissingRunHeader { found });
        }

        let version = read_version(first, RUNH_VERSION_POSITION)?;
        let run_header = subblocks::decode_run_header(first, options.thinning)?;

        Ok(CorsikaFile {
            buffer,
            cursor,
            options,
            run_header,
            version,
            run_end: None,
            finished: false,
        })
    }

    /// The run's format version, rounded to 4 decimals (e.g. `7.41`).
    pub fn version(&self) -> f32 {
        self.version
    }

    /// The decoded `RUNH` record.
    pub fn run_header(&self) -> &Record {
        &self.run_header
    }

    /// The physical framing detected at open time.
    pub fn framing(&self) -> Framing {
        self.cursor.framing()
    }

    /// The options this file was opened with.
    pub fn options(&self) -> CorsikaOptions {
        self.options
    }

    fn assemble_options(&self) -> AssembleOptions {
        AssembleOptions {
            thinning: self.options.thinning,
            data_kind: self.options.data_kind,
            mmcs: self.options.mmcs,
        }
    }

    /// Produce the next event, or `Ok(None)` once the `RUNE` block has
    /// been reached.
    ///
    /// Exhausting the block stream without a `RUNE` block is a truncation
    /// error: a well-formed run always ends with `RUNE`.
    pub fn next_event(&mut self) -> Result<Option<Event>> {
        if self.finished {
            return Ok(None);
        }
        let options = self.assemble_options();
        match assemble_next(&self.buffer, &mut self.cursor, self.version, options)? {
            Assembled::Event(event) => Ok(Some(event)),
            Assembled::RunEnd(end) => {
                self.run_end = Some(end);
                self.finished = true;
                Ok(None)
            }
        }
    }

    /// The decoded `RUNE` record.
    ///
    /// If forward iteration has not reached the run end yet, the block is
    /// located by searching backward from the end of the file in block
    /// (or record, for framed files) strides. The result is cached; the
    /// forward-iteration position is never moved.
    pub fn run_end(&mut self) -> Result<&Record> {
        match self.run_end {
            Some(ref end) => Ok(end),
            None => {
                let end = self.locate_run_end()?;
                Ok(self.run_end.insert(end))
            }
        }
    }

    fn locate_run_end(&self) -> Result<Record> {
        let block_size = self.cursor.block_size();
        match self.cursor.framing() {
            Framing::Raw => self.scan_region_backward(0, self.buffer.len(), block_size),
            Framing::FortranRecords => {
                let mut record_end = self.buffer.len();
                while record_end > 0 {
                    if record_end < 2 * RECORD_MARKER_BYTES {
                        return Err(Error::Truncated {
                            expected: 2 * RECORD_MARKER_BYTES,
                            actual: record_end,
                        });
                    }
                    let record_len =
                        read_u32(&self.buffer, record_end - RECORD_MARKER_BYTES) as usize;
                    if record_len % block_size != 0 {
                        return Err(Error::RecordSizeMismatch {
                            record_len,
                            block_size,
                        });
                    }
                    let payload_end = record_end - RECORD_MARKER_BYTES;
                    let Some(payload_start) = payload_end.checked_sub(record_len) else {
                        return Err(Error::Truncated {
                            expected: record_len + 2 * RECORD_MARKER_BYTES,
                            actual: record_end,
                        });
                    };
                    if payload_start < RECORD_MARKER_BYTES {
                        return Err(Error::Truncated {
                            expected: record_len + 2 * RECORD_MARKER_BYTES,
                            actual: record_end,
                        });
                    }
                    match self.scan_region_backward(payload_start, payload_end, block_size) {
                        Ok(record) => return Ok(record),
                        Err(Error::RunEndNotFound) => {}
                        Err(e) => return Err(e),
                    }
                    record_end = payload_start - RECORD_MARKER_BYTES;
                }
                Err(Error::RunEndNotFound)
            }
        }
    }

    /// Scan `[start, end)` backward in block strides for a `RUNE` block.
    fn scan_region_backward(&self, start: usize, end: usize, block_size: usize) -> Result<Record> {
        let n_blocks = (end - start) / block_size;
        for i in (0..n_blocks).rev() {
            let offset = start + i * block_size;
            let block = &self.buffer[offset..offset + block_size];
            if &block[..4] == b"RUNE" {
                return subblocks::decode_run_end(block, self.options.thinning);
            }
        }
        Err(Error::RunEndNotFound)
    }

    /// Scan the whole file for `EVTH` blocks and return their decoded
    /// records, without disturbing the forward-iteration position.
    ///
    /// Data rows can accidentally start with the `EVTH` byte pattern, so a
    /// block only counts when its version word matches the run's version,
    /// and `EVTH`/`EVTE` alternation is enforced: two matching `EVTH`
    /// blocks without an intervening `EVTE` are a protocol violation.
    pub fn read_headers(&mut self) -> Result<Vec<Record>> {
        let mut cursor = BlockCursor::with_framing(self.cursor.framing(), self.options.thinning);
        let mut headers = Vec::new();
        let mut end_found = true;

        while let Some(block) = cursor.next_block(&self.buffer)? {
            match &block[..4] {
                b"RUNE" => {
                    self.run_end = Some(subblocks::decode_run_end(block, self.options.thinning)?);
                    break;
                }
                b"EVTH" => {
                    if read_version(block, EVTH_VERSION_POSITION)? != self.version {
                        continue;
                    }
                    if !end_found {
                        return Err(Error::UnexpectedBlock {
                            expected: "EVTE",
                            found: *b"EVTH",
                        });
                    }
                    headers.push(subblocks::decode_event_header(block, self.options.thinning)?);
                    end_found = false;
                }
                b"EVTE" => {
                    end_found = true;
                }
                _ => {}
            }
        }

        Ok(headers)
    }
}

impl Iterator for CorsikaFile {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event().transpose()
    }
}
