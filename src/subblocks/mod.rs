//! Sub-block layouts and record decoders.
//!
//! Every CORSIKA sub-block is a fixed-size run of 4-byte words tagged by
//! its first word (`RUNH`, `EVTH`, `EVTE`, `RUNE`, `LONG`, or untagged
//! particle/photon data). This module holds the per-kind, per-version
//! field layouts and the decoders that turn raw block bytes into
//! [`Record`](crate::Record)s and typed rows.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`common`] | Field descriptions, layout compilation, byte helpers |
//! | [`run_header`] | `RUNH` layouts (6.5, 7.x) |
//! | [`event_header`] | `EVTH` layouts (6.5, 7.3/7.4, 7.5+) |
//! | [`event_end`] | `EVTE` layouts (6.5, 7.x) |
//! | [`run_end`] | `RUNE` layout |
//! | [`data`] | particle / Cherenkov-photon rows |
//! | [`longitudinal`] | `LONG` sub-header and profile rows |

pub mod common;
pub mod data;
pub mod event_end;
pub mod event_header;
pub mod longitudinal;
pub mod run_end;
pub mod run_header;

pub use common::{CompiledField, CompiledLayout, ElementType, Field, FieldShape, build_layout};
pub use data::{
    MmcsPhotonRow, ParticleRow, PhotonRow, parse_cherenkov_photons, parse_data_rows,
    parse_particles,
};
pub use event_end::event_end_layout;
pub use event_header::event_header_layout;
pub use longitudinal::{
    LONGITUDINAL_HEADER_BYTES, LongitudinalRow, longitudinal_header_layout, parse_longitudinal,
};
pub use run_end::run_end_layout;
pub use run_header::run_header_layout;

use crate::{Record, Result};
use common::{read_f32, validate_buffer_size};

/// 1-based word position of the version float inside a `RUNH` block.
pub const RUNH_VERSION_POSITION: usize = 4;
/// 1-based word position of the version float inside an `EVTH` block.
pub const EVTH_VERSION_POSITION: usize = 46;

/// Result of a versioned layout lookup.
///
/// `fallback` is set when the requested version key had no registered
/// layout and the newest known layout was substituted. The substitution is
/// deterministic; minor undocumented point releases usually keep the last
/// known layout, but this is a heuristic, so the decoders report it via
/// `log::warn!`.
#[derive(Debug, Clone, Copy)]
pub struct LayoutLookup {
    /// The resolved layout
    pub layout: &'static CompiledLayout,
    /// Whether the latest layout was substituted for an unknown version
    pub fallback: bool,
}

/// Registry key for a raw version float: rounded to one decimal and scaled
/// by ten (7.41 maps to 74).
pub(crate) fn version_key(version: f32) -> i32 {
    (version as f64 * 10.0).round() as i32
}

/// Read the format version float stored at the given 1-based word position
/// of a header block, rounded to 4 decimal digits to absorb float noise
/// from upstream writers.
pub fn read_version(block: &[u8], position: usize) -> Result<f32> {
    validate_buffer_size(block, position * 4)?;
    let raw = read_f32(block, (position - 1) * 4);
    Ok(((raw as f64 * 1e4).round() / 1e4) as f32)
}

fn warn_fallback(kind: &str, version: f32) {
    log::warn!("no registered {kind} layout for version {version}, using the latest known layout");
}

/// Decode a `RUNH` block. The version is resolved from the block itself
/// (word 4).
pub fn decode_run_header(block: &[u8], thinning: bool) -> Result<Record> {
    let version = read_version(block, RUNH_VERSION_POSITION)?;
    let lookup = run_header_layout(version, thinning);
    if lookup.fallback {
        warn_fallback("run header", version);
    }
    lookup.layout.decode(block)
}

/// Decode an `EVTH` block. The version is resolved from the block itself
/// (word 46).
pub fn decode_event_header(block: &[u8], thinning: bool) -> Result<Record> {
    let version = read_version(block, EVTH_VERSION_POSITION)?;
    let lookup = event_header_layout(version, thinning);
    if lookup.fallback {
        warn_fallback("event header", version);
    }
    lookup.layout.decode(block)
}

/// Decode an `EVTE` block. `EVTE` carries no version word; pass the run's
/// version, which is fixed for the whole file.
pub fn decode_event_end(block: &[u8], version: f32, thinning: bool) -> Result<Record> {
    let lookup = event_end_layout(version, thinning);
    if lookup.fallback {
        warn_fallback("event end", version);
    }
    lookup.layout.decode(block)
}

/// Decode a `RUNE` block.
pub fn decode_run_end(block: &[u8], thinning: bool) -> Result<Record> {
    run_end_layout(thinning).decode(block)
}
