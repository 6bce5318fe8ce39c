//! `LONG` sub-block layouts and longitudinal data-row decoding.
//!
//! A `LONG` block starts with a 13-word sub-header followed by packed
//! 10-word rows of the longitudinal particle-number profile. Only the row
//! bytes after the sub-header contribute to an event's longitudinal table.

use std::sync::LazyLock;

use crate::{Error, Result};

use super::common::{CompiledLayout, Field, build_layout, read_f32};

/// Size of the `LONG` sub-header in words.
pub const LONGITUDINAL_HEADER_WORDS: usize = 13;
/// Size of the `LONG` sub-header in bytes.
pub const LONGITUDINAL_HEADER_BYTES: usize = LONGITUDINAL_HEADER_WORDS * 4;
/// Number of words per longitudinal data row.
pub const LONGITUDINAL_ROW_WORDS: usize = 10;

fn header_fields() -> Vec<Field> {
    vec![
        Field::tag(1, "long"),
        Field::scalar(2, "event_number"),
        Field::scalar(3, "particle_id"),
        Field::with_unit(4, "total_energy", "GeV"),
        Field::scalar(5, "n_longitudinal"),
        Field::scalar(6, "longitudinal_id"),
        Field::with_unit(7, "first_interaction_height", "g/cm2"),
        Field::with_unit(8, "zenith", "rad"),
        Field::with_unit(9, "azimuth", "rad"),
        Field::with_unit(10, "energy_cutoff_hadrons", "GeV"),
        Field::with_unit(11, "energy_cutoff_muons", "GeV"),
        Field::with_unit(12, "energy_cutoff_electrons", "GeV"),
        Field::with_unit(13, "energy_cutoff_photons", "GeV"),
    ]
}

static HEADER_LAYOUT: LazyLock<CompiledLayout> =
    LazyLock::new(|| build_layout(&header_fields(), LONGITUDINAL_HEADER_BYTES));

/// Layout of the 13-word sub-header at the start of every `LONG` block.
pub fn longitudinal_header_layout() -> &'static CompiledLayout {
    &HEADER_LAYOUT
}

/// One row of the longitudinal particle-number profile.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LongitudinalRow {
    /// Atmospheric depth in g/cm2
    pub vertical_depth: f32,
    /// Number of photons
    pub n_photons: f32,
    /// Number of positrons
    pub n_e_plus: f32,
    /// Number of electrons
    pub n_e_minus: f32,
    /// Number of positive muons
    pub n_mu_plus: f32,
    /// Number of negative muons
    pub n_mu_minus: f32,
    /// Number of hadrons
    pub n_hadrons: f32,
    /// Number of charged particles
    pub n_charged: f32,
    /// Number of nuclei
    pub n_nuclei: f32,
    /// Number of Cherenkov photons
    pub n_cherenkov: f32,
}

/// Decode accumulated longitudinal bytes (the parts of `LONG` blocks after
/// the sub-header) into rows, dropping all-zero padding rows.
pub fn parse_longitudinal(bytes: &[u8]) -> Result<Vec<LongitudinalRow>> {
    let row_size = LONGITUDINAL_ROW_WORDS * 4;
    if bytes.len() % row_size != 0 {
        return Err(Error::LayoutMismatch {
            expected: row_size,
            actual: bytes.len() % row_size,
        });
    }

    let mut rows = Vec::with_capacity(bytes.len() / row_size);
    for chunk in bytes.chunks_exact(row_size) {
        let values: Vec<f32> = (0..LONGITUDINAL_ROW_WORDS)
            .map(|i| read_f32(chunk, 4 * i))
            .collect();
        if values.iter().all(|&v| v == 0.0) {
            continue;
        }
        rows.push(LongitudinalRow {
            vertical_depth: values[0],
            n_photons: values[1],
            n_e_plus: values[2],
            n_e_minus: values[3],
            n_mu_plus: values[4],
            n_mu_minus: values[5],
            n_hadrons: values[6],
            n_charged: values[7],
            n_nuclei: values[8],
            n_cherenkov: values[9],
        });
    }
    Ok(rows)
}
