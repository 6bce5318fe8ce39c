//! Versioned `EVTE` (event end) field layouts.
//!
//! The `EVTE` block carries no version word of its own; the layout is
//! selected with the run's version, which is fixed for the whole file.
//! The 7.x layout adds the longitudinal fit parameters at word 256.

use std::sync::LazyLock;

use super::LayoutLookup;
use super::common::{CompiledLayout, Field, build_layout};
use crate::parsing::{BLOCK_SIZE_BYTES, BLOCK_SIZE_BYTES_THIN};

fn fields_65() -> Vec<Field> {
    vec![
        Field::tag(1, "event_end"),
        Field::scalar(2, "event_number"),
        Field::scalar(3, "n_photons_weighted"),
        Field::scalar(4, "n_electrons_weighted"),
        Field::scalar(5, "n_hadrons_weighted"),
        Field::scalar(6, "n_muons_weighted"),
        Field::scalar(7, "n_particles_written"),
        Field::scalar(262, "chi_square_longitudinal"),
        Field::scalar(263, "n_photons_written"),
        Field::scalar(264, "n_electrons_written"),
        Field::scalar(265, "n_hadrons_written"),
        Field::scalar(266, "n_muons_written"),
        Field::scalar(267, "n_em_particles_preshower"),
    ]
}

fn fields_7x() -> Vec<Field> {
    let mut fields = fields_65();
    fields.insert(7, Field::vector(256, "longitudinal_fit_parameters", 6));
    fields
}

static LAYOUT_65: LazyLock<CompiledLayout> =
    LazyLock::new(|| build_layout(&fields_65(), BLOCK_SIZE_BYTES));
static LAYOUT_65_THIN: LazyLock<CompiledLayout> =
    LazyLock::new(|| build_layout(&fields_65(), BLOCK_SIZE_BYTES_THIN));
static LAYOUT_7X: LazyLock<CompiledLayout> =
    LazyLock::new(|| build_layout(&fields_7x(), BLOCK_SIZE_BYTES));
static LAYOUT_7X_THIN: LazyLock<CompiledLayout> =
    LazyLock::new(|| build_layout(&fields_7x(), BLOCK_SIZE_BYTES_THIN));

/// Look up the event end layout for a format version.
///
/// Registered version keys are 6.5 and 7.4 through 7.7; anything else
/// resolves to the 7.x layout with [`fallback`](LayoutLookup::fallback)
/// set.
pub fn event_end_layout(version: f32, thinning: bool) -> LayoutLookup {
    let (standard, thin, fallback) = match super::version_key(version) {
        65 => (&LAYOUT_65, &LAYOUT_65_THIN, false),
        74..=77 => (&LAYOUT_7X, &LAYOUT_7X_THIN, false),
        _ => (&LAYOUT_7X, &LAYOUT_7X_THIN, true),
    };
    LayoutLookup {
        layout: if thinning { thin } else { standard },
        fallback,
    }
}
