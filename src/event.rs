//! Event types and the block-to-event assembly state machine.

use crate::parsing::BlockCursor;
use crate::subblocks::{
    self, LONGITUDINAL_HEADER_BYTES, LongitudinalRow, MmcsPhotonRow, ParticleRow, PhotonRow,
    parse_cherenkov_photons, parse_data_rows, parse_longitudinal, parse_particles,
};
use crate::types::Record;
use crate::{Error, Result};

/// Selects the decoder applied to an event's data blocks.
///
/// CORSIKA writes the same 7-word (8 with thinning) packed rows whether the
/// file holds particles or Cherenkov photon bunches; only the meaning of
/// the columns differs, and the file itself does not say which it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataKind {
    /// Decode rows as plain float arrays
    #[default]
    RawFloats,
    /// Decode rows as particles (`DATnnnnnn` files)
    Particles,
    /// Decode rows as Cherenkov photon bunches (`CERnnnnnn` files)
    CherenkovPhotons,
}

/// Data rows decoded as plain float arrays.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawRows {
    row_words: usize,
    values: Vec<f32>,
}

impl RawRows {
    fn from_rows(rows: Vec<Vec<f32>>, row_words: usize) -> Self {
        let mut values = Vec::with_capacity(rows.len() * row_words);
        for row in rows {
            values.extend(row);
        }
        RawRows { row_words, values }
    }

    /// Number of words per row (7, or 8 with thinning).
    pub fn row_words(&self) -> usize {
        self.row_words
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        if self.row_words == 0 {
            0
        } else {
            self.values.len() / self.row_words
        }
    }

    /// Whether there are no rows.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over the rows as float slices.
    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.values.chunks_exact(self.row_words.max(1))
    }
}

/// The decoded data blocks of one event.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventData {
    /// Plain float rows ([`DataKind::RawFloats`])
    Raw(RawRows),
    /// Particle rows ([`DataKind::Particles`])
    Particles(Vec<ParticleRow>),
    /// Cherenkov photon rows ([`DataKind::CherenkovPhotons`])
    Photons(Vec<PhotonRow>),
    /// Cherenkov photon rows after the opt-in MMCS reinterpretation
    MmcsPhotons(Vec<MmcsPhotonRow>),
}

impl EventData {
    /// Number of data rows, regardless of the decoding mode.
    pub fn len(&self) -> usize {
        match self {
            EventData::Raw(rows) => rows.len(),
            EventData::Particles(rows) => rows.len(),
            EventData::Photons(rows) => rows.len(),
            EventData::MmcsPhotons(rows) => rows.len(),
        }
    }

    /// Whether the event carries no data rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One air-shower event: header, data rows, longitudinal profile, end.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Event {
    /// Decoded `EVTH` record
    pub header: Record,
    /// Decoded particle/photon data rows
    pub data: EventData,
    /// Longitudinal profile rows accumulated from `LONG` blocks
    pub longitudinal: Vec<LongitudinalRow>,
    /// Decoded `EVTE` record
    pub end: Record,
}

/// Outcome of one step of the run-level state machine.
#[derive(Debug)]
pub(crate) enum Assembled {
    /// A complete `EVTH`..`EVTE` group was decoded.
    Event(Event),
    /// The `RUNE` block was reached; iteration is over.
    RunEnd(Record),
}

/// Decoder configuration for the event assembler.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AssembleOptions {
    pub thinning: bool,
    pub data_kind: DataKind,
    pub mmcs: bool,
}

/// Walk blocks from `cursor` until one event (or the run end) is complete.
///
/// The caller must be positioned between events: the next block has to be
/// `EVTH` or `RUNE`. Stream exhaustion anywhere inside this function is a
/// truncation error; a clean run only ever ends via `RUNE`.
pub(crate) fn assemble_next(
    buf: &[u8],
    cursor: &mut BlockCursor,
    version: f32,
    options: AssembleOptions,
) -> Result<Assembled> {
    let block_size = cursor.block_size();
    let block = require_block(buf, cursor, block_size)?;

    if &block[..4] == b"RUNE" {
        return Ok(Assembled::RunEnd(subblocks::decode_run_end(
            block,
            options.thinning,
        )?));
    }
    if &block[..4] != b"EVTH" {
        return Err(Error::UnexpectedBlock {
            expected: "EVTH or RUNE",
            found: first_four(block),
        });
    }

    let header = subblocks::decode_event_header(block, options.thinning)?;

    let mut data_bytes: Vec<u8> = Vec::new();
    let mut long_bytes: Vec<u8> = Vec::new();

    loop {
        let block = require_block(buf, cursor, block_size)?;
        match &block[..4] {
            b"EVTE" => {
                let end = subblocks::decode_event_end(block, version, options.thinning)?;
                let data = decode_data(&data_bytes, options)?;
                let longitudinal = parse_longitudinal(&long_bytes)?;
                return Ok(Assembled::Event(Event {
                    header,
                    data,
                    longitudinal,
                    end,
                }));
            }
            b"LONG" => {
                // Rows never span blocks; thinned blocks end in a partial
                // slot too small for a row, which is dropped here.
                let payload = &block[LONGITUDINAL_HEADER_BYTES..];
                let row_size = subblocks::longitudinal::LONGITUDINAL_ROW_WORDS * 4;
                let whole = payload.len() - payload.len() % row_size;
                long_bytes.extend_from_slice(&payload[..whole]);
            }
            _ => {
                data_bytes.extend_from_slice(block);
            }
        }
    }
}

fn decode_data(bytes: &[u8], options: AssembleOptions) -> Result<EventData> {
    match options.data_kind {
        DataKind::RawFloats => {
            let row_words = subblocks::data::data_row_words(options.thinning);
            let rows = parse_data_rows(bytes, row_words)?;
            Ok(EventData::Raw(RawRows::from_rows(rows, row_words)))
        }
        DataKind::Particles => Ok(EventData::Particles(parse_particles(
            bytes,
            options.thinning,
        )?)),
        DataKind::CherenkovPhotons => {
            let photons = parse_cherenkov_photons(bytes, options.thinning)?;
            if options.mmcs {
                Ok(EventData::MmcsPhotons(
                    photons.iter().map(PhotonRow::to_mmcs).collect(),
                ))
            } else {
                Ok(EventData::Photons(photons))
            }
        }
    }
}

fn require_block<'a>(
    buf: &'a [u8],
    cursor: &mut BlockCursor,
    block_size: usize,
) -> Result<&'a [u8]> {
    match cursor.next_block(buf)? {
        Some(block) => Ok(block),
        None => Err(Error::Truncated {
            expected: block_size,
            actual: 0,
        }),
    }
}

fn first_four(block: &[u8]) -> [u8; 4] {
    let mut tag = [0u8; 4];
    tag.copy_from_slice(&block[..4]);
    tag
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::{BLOCK_SIZE_BYTES, Framing};
    use crate::subblocks::EVTH_VERSION_POSITION;

    const OPTIONS: AssembleOptions = AssembleOptions {
        thinning: false,
        data_kind: DataKind::RawFloats,
        mmcs: false,
    };

    fn block(tag: &[u8; 4]) -> Vec<u8> {
        let mut b = vec![0u8; BLOCK_SIZE_BYTES];
        b[..4].copy_from_slice(tag);
        b
    }

    fn evth(version: f32) -> Vec<u8> {
        let mut b = block(b"EVTH");
        let offset = (EVTH_VERSION_POSITION - 1) * 4;
        b[offset..offset + 4].copy_from_slice(&version.to_le_bytes());
        b
    }

    fn cursor() -> BlockCursor {
        BlockCursor::with_framing(Framing::Raw, false)
    }

    #[test]
    fn assembles_one_event_then_run_end() {
        let mut buf = Vec::new();
        buf.extend(evth(7.5));
        buf.extend(block(&[0u8; 4]));
        buf.extend(block(b"EVTE"));
        buf.extend(block(b"RUNE"));

        let mut cur = cursor();
        match assemble_next(&buf, &mut cur, 7.5, OPTIONS).unwrap() {
            Assembled::Event(event) => {
                assert_eq!(event.header.get("event_header").unwrap().as_tag(), Some("EVTH"));
                // data block was all zeros, so every row is padding
                assert!(event.data.is_empty());
                assert!(event.longitudinal.is_empty());
            }
            other => panic!("expected event, got {other:?}"),
        }
        match assemble_next(&buf, &mut cur, 7.5, OPTIONS).unwrap() {
            Assembled::RunEnd(end) => {
                assert_eq!(end.get("run_end").unwrap().as_tag(), Some("RUNE"));
            }
            other => panic!("expected run end, got {other:?}"),
        }
    }

    #[test]
    fn long_blocks_feed_the_longitudinal_table_only() {
        let mut long_block = block(b"LONG");
        // two 10-word rows right after the 13-word sub-header
        for (i, v) in (0..20).map(|i| (i, (i + 1) as f32)) {
            let offset = LONGITUDINAL_HEADER_BYTES + 4 * i;
            long_block[offset..offset + 4].copy_from_slice(&v.to_le_bytes());
        }

        let mut buf = Vec::new();
        buf.extend(evth(7.5));
        buf.extend(long_block);
        buf.extend(block(b"EVTE"));

        let mut cur = cursor();
        match assemble_next(&buf, &mut cur, 7.5, OPTIONS).unwrap() {
            Assembled::Event(event) => {
                assert!(event.data.is_empty());
                assert_eq!(event.longitudinal.len(), 2);
                assert_eq!(event.longitudinal[0].vertical_depth, 1.0);
                assert_eq!(event.longitudinal[1].vertical_depth, 11.0);
            }
            other => panic!("expected event, got {other:?}"),
        }
    }

    #[test]
    fn missing_evte_is_truncation() {
        let mut buf = Vec::new();
        buf.extend(evth(7.5));
        buf.extend(block(&[0u8; 4]));

        let mut cur = cursor();
        assert!(matches!(
            assemble_next(&buf, &mut cur, 7.5, OPTIONS),
            Err(Error::Truncated { .. })
        ));
    }

    #[test]
    fn stray_block_between_events_is_a_protocol_violation() {
        let buf = block(b"LONG");
        let mut cur = cursor();
        assert!(matches!(
            assemble_next(&buf, &mut cur, 7.5, OPTIONS),
            Err(Error::UnexpectedBlock {
                expected: "EVTH or RUNE",
                ..
            })
        ));
    }

    #[test]
    fn exhaustion_between_events_is_truncation() {
        let buf: Vec<u8> = Vec::new();
        let mut cur = cursor();
        assert!(matches!(
            assemble_next(&buf, &mut cur, 7.5, OPTIONS),
            Err(Error::Truncated { .. })
        ));
    }
}
