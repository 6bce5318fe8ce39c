//! Versioned `RUNH` (run header) field layouts.
//!
//! The run header layout changed between CORSIKA 6.5 and the 7.x series;
//! within 7.x it is stable. Newer layouts only append or insert fields at
//! previously unused positions, so fields shared between versions keep
//! identical byte offsets.

use std::sync::LazyLock;

use super::LayoutLookup;
use super::common::{CompiledLayout, Field, build_layout};
use crate::parsing::{BLOCK_SIZE_BYTES, BLOCK_SIZE_BYTES_THIN};

fn fields_65() -> Vec<Field> {
    vec![
        Field::tag(1, "run_header"),
        Field::scalar(2, "run_number"),
        Field::scalar(3, "date"),
        Field::scalar(4, "version"),
        Field::scalar(5, "n_observation_levels"),
        Field::vector_with_unit(6, "observation_height", "cm", 10),
        Field::scalar(16, "energy_spectrum_slope"),
        Field::with_unit(17, "energy_min", "GeV"),
        Field::with_unit(18, "energy_max", "GeV"),
        Field::scalar(19, "egs4_flag"),
        Field::scalar(20, "nkg_flag"),
        Field::with_unit(21, "energy_cutoff_hadrons", "GeV"),
        Field::with_unit(22, "energy_cutoff_muons", "GeV"),
        Field::with_unit(23, "energy_cutoff_electrons", "GeV"),
        Field::with_unit(24, "energy_cutoff_photons", "GeV"),
        Field::vector(25, "physical_constants_and_interaction_flags", 50),
        Field::vector(95, "cka", 40),
        Field::vector(135, "ceta", 5),
        Field::vector(140, "cstrba", 11),
        Field::vector(255, "aatm", 5),
        Field::vector(260, "batm", 5),
        Field::vector(265, "catm", 5),
        Field::scalar(270, "nflain"),
        Field::scalar(271, "nfdif"),
        Field::scalar(272, "nflpi0_100nflpif"),
        Field::scalar(273, "nflche_100nfragm"),
    ]
}

// The CORSIKA user guide (up to and including 7.69) states NSHOW is at
// position 94; it is actually at 93, confirmed upstream by the CORSIKA
// authors.
fn fields_7x() -> Vec<Field> {
    vec![
        Field::tag(1, "run_header"),
        Field::scalar(2, "run_number"),
        Field::scalar(3, "date"),
        Field::scalar(4, "version"),
        Field::scalar(5, "n_observation_levels"),
        Field::vector_with_unit(6, "observation_height", "cm", 10),
        Field::scalar(16, "energy_spectrum_slope"),
        Field::with_unit(17, "energy_min", "GeV"),
        Field::with_unit(18, "energy_max", "GeV"),
        Field::scalar(19, "egs4_flag"),
        Field::scalar(20, "nkg_flag"),
        Field::with_unit(21, "energy_cutoff_hadrons", "GeV"),
        Field::with_unit(22, "energy_cutoff_muons", "GeV"),
        Field::with_unit(23, "energy_cutoff_electrons", "GeV"),
        Field::with_unit(24, "energy_cutoff_photons", "GeV"),
        Field::vector(25, "physical_constants_and_interaction_flags", 50),
        Field::with_unit(75, "inclined_observation_plane_x", "cm"),
        Field::with_unit(76, "inclined_observation_plane_y", "cm"),
        Field::with_unit(77, "inclined_observation_plane_z", "cm"),
        Field::with_unit(78, "inclined_observation_plane_theta", "deg"),
        Field::with_unit(79, "inclined_observation_plane_phi", "deg"),
        Field::scalar(93, "n_showers"),
        Field::vector(95, "cka", 40),
        Field::vector(135, "ceta", 5),
        Field::vector(140, "cstrba", 11),
        Field::with_unit(248, "x_scatter", "cm"),
        Field::with_unit(249, "y_scatter", "cm"),
        Field::vector(255, "aatm", 5),
        Field::vector(260, "batm", 5),
        Field::vector(265, "catm", 5),
        Field::scalar(270, "nflain"),
        Field::scalar(271, "nfdif"),
        Field::scalar(272, "nflpi0_100nflpif"),
        Field::scalar(273, "nflche_100nfragm"),
    ]
}

static LAYOUT_65: LazyLock<CompiledLayout> =
    LazyLock::new(|| build_layout(&fields_65(), BLOCK_SIZE_BYTES));
static LAYOUT_65_THIN: LazyLock<CompiledLayout> =
    LazyLock::new(|| build_layout(&fields_65(), BLOCK_SIZE_BYTES_THIN));
static LAYOUT_7X: LazyLock<CompiledLayout> =
    LazyLock::new(|| build_layout(&fields_7x(), BLOCK_SIZE_BYTES));
static LAYOUT_7X_THIN: LazyLock<CompiledLayout> =
    LazyLock::new(|| build_layout(&fields_7x(), BLOCK_SIZE_BYTES_THIN));

/// Look up the run header layout for a format version.
///
/// Registered version keys are 6.5 and 7.4 through 7.7. Any other key
/// resolves to the newest 7.x layout with
/// [`fallback`](LayoutLookup::fallback) set; callers are expected to let
/// [`decode_run_header`](super::decode_run_header) warn about it.
pub fn run_header_layout(version: f32, thinning: bool) -> LayoutLookup {
    let (standard, thin) = match super::version_key(version) {
        65 => (&LAYOUT_65, &LAYOUT_65_THIN),
        74..=77 => (&LAYOUT_7X, &LAYOUT_7X_THIN),
        _ => {
            return LayoutLookup {
                layout: if thinning { &LAYOUT_7X_THIN } else { &LAYOUT_7X },
                fallback: true,
            };
        }
    };
    LayoutLookup {
        layout: if thinning { thin } else { standard },
        fallback: false,
    }
}
