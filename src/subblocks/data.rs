//! Particle and Cherenkov-photon data-row decoding.
//!
//! Data sub-blocks are flat runs of packed rows, 7 words each (8 with
//! thinning, which appends a weight). CORSIKA zero-pads the unused slots
//! of the final block of a data stream, so rows whose fields are all zero
//! are padding and are dropped.

use crate::{Error, Result};

use super::common::read_f32;

/// Number of words per particle/photon row without thinning.
pub const DATA_ROW_WORDS: usize = 7;
/// Number of words per particle/photon row with thinning.
pub const DATA_ROW_WORDS_THIN: usize = 8;

/// One particle from a particle-output (`DATnnnnnn`) file.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParticleRow {
    /// Packed particle id, generation, and observation level
    pub particle_description: f32,
    /// Momentum x component in GeV/c
    pub px: f32,
    /// Momentum y component in GeV/c
    pub py: f32,
    /// Momentum z component in GeV/c
    pub pz: f32,
    /// Position x in cm
    pub x: f32,
    /// Position y in cm
    pub y: f32,
    /// Arrival time in ns
    pub t: f32,
    /// Thinning weight, present only in thinned output
    pub thinning_level: Option<f32>,
}

/// One Cherenkov photon bunch from a Cherenkov-output (`CERnnnnnn`) file.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhotonRow {
    /// Number of photons in the bunch
    pub n_photons: f32,
    /// Position x in cm
    pub x: f32,
    /// Position y in cm
    pub y: f32,
    /// Direction cosine to the x axis
    pub u: f32,
    /// Direction cosine to the y axis
    pub v: f32,
    /// Arrival time in ns
    pub t: f32,
    /// Production height in cm
    pub production_height: f32,
    /// Thinning weight, present only in thinned output
    pub thinning_level: Option<f32>,
}

/// One Cherenkov photon after the MMCS reinterpretation.
///
/// MMCS (the MAGIC Monte Carlo System variant of CORSIKA) packs the
/// wavelength and the parent particle id into the integer and fractional
/// parts of the photon-count word. [`PhotonRow::to_mmcs`] performs the
/// split; it is an opt-in reinterpretation, never the default, because its
/// correctness cannot be verified from the data alone.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MmcsPhotonRow {
    /// Always 1.0 after the split
    pub n_photons: f32,
    /// Position x in cm
    pub x: f32,
    /// Position y in cm
    pub y: f32,
    /// Direction cosine to the x axis
    pub u: f32,
    /// Direction cosine to the y axis
    pub v: f32,
    /// Arrival time in ns
    pub t: f32,
    /// Wavelength in nm
    pub wavelength: f32,
    /// Parent particle id
    pub mother_particle: u16,
    /// Production height in cm
    pub production_height: f32,
}

impl PhotonRow {
    /// Split the packed `n_photons` word into wavelength and parent
    /// particle id, MMCS style.
    pub fn to_mmcs(&self) -> MmcsPhotonRow {
        MmcsPhotonRow {
            n_photons: 1.0,
            x: self.x,
            y: self.y,
            u: self.u,
            v: self.v,
            t: self.t,
            wavelength: self.n_photons % 1000.0,
            mother_particle: (self.n_photons / 100_000.0) as u16,
            production_height: self.production_height,
        }
    }
}

/// Row width in words for the given thinning mode.
pub const fn data_row_words(thinning: bool) -> usize {
    if thinning {
        DATA_ROW_WORDS_THIN
    } else {
        DATA_ROW_WORDS
    }
}

/// Split accumulated data-block bytes into rows of `row_words` floats,
/// dropping all-zero padding rows.
///
/// Returns `Err(LayoutMismatch)` if the byte length is not a whole number
/// of rows; accumulated event data is always whole blocks, so a remainder
/// means the framing layer is broken.
pub fn parse_data_rows(bytes: &[u8], row_words: usize) -> Result<Vec<Vec<f32>>> {
    let row_size = row_words * 4;
    if bytes.len() % row_size != 0 {
        return Err(Error::LayoutMismatch {
            expected: row_size,
            actual: bytes.len() % row_size,
        });
    }

    let mut rows = Vec::with_capacity(bytes.len() / row_size);
    for chunk in bytes.chunks_exact(row_size) {
        let row: Vec<f32> = (0..row_words).map(|i| read_f32(chunk, 4 * i)).collect();
        if row.iter().any(|&v| v != 0.0) {
            rows.push(row);
        }
    }
    Ok(rows)
}

/// Decode accumulated data bytes as particle rows.
pub fn parse_particles(bytes: &[u8], thinning: bool) -> Result<Vec<ParticleRow>> {
    let rows = parse_data_rows(bytes, data_row_words(thinning))?;
    Ok(rows
        .into_iter()
        .map(|row| ParticleRow {
            particle_description: row[0],
            px: row[1],
            py: row[2],
            pz: row[3],
            x: row[4],
            y: row[5],
            t: row[6],
            thinning_level: if thinning { Some(row[7]) } else { None },
        })
        .collect())
}

/// Decode accumulated data bytes as Cherenkov photon rows.
pub fn parse_cherenkov_photons(bytes: &[u8], thinning: bool) -> Result<Vec<PhotonRow>> {
    let rows = parse_data_rows(bytes, data_row_words(thinning))?;
    Ok(rows
        .into_iter()
        .map(|row| PhotonRow {
            n_photons: row[0],
            x: row[1],
            y: row[2],
            u: row[3],
            v: row[4],
            t: row[5],
            production_height: row[6],
            thinning_level: if thinning { Some(row[7]) } else { None },
        })
        .collect())
}
