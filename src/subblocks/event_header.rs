//! Versioned `EVTH` (event header) field layouts.
//!
//! The event header grew over the CORSIKA releases: 7.3 appended the CONEX
//! fields to the 6.5 list, 7.5 appended the AUGERHIT/MULTITHIN/ICECUBE
//! fields to that. Each newer field list is built by extending the older
//! one, which guarantees shared fields keep identical offsets.

use std::sync::LazyLock;

use super::LayoutLookup;
use super::common::{CompiledLayout, Field, build_layout};
use crate::parsing::{BLOCK_SIZE_BYTES, BLOCK_SIZE_BYTES_THIN};

fn fields_65() -> Vec<Field> {
    vec![
        Field::tag(1, "event_header"),
        Field::scalar(2, "event_number"),
        Field::scalar(3, "particle_id"),
        Field::with_unit(4, "total_energy", "GeV"),
        Field::with_unit(5, "starting_altitude", "g/cm2"),
        Field::scalar(6, "first_target_id"),
        Field::with_unit(7, "first_interaction_height", "cm"),
        Field::with_unit(8, "momentum_x", "GeV/c"),
        Field::with_unit(9, "momentum_y", "GeV/c"),
        Field::with_unit(10, "momentum_minus_z", "GeV/c"),
        Field::with_unit(11, "zenith", "rad"),
        Field::with_unit(12, "azimuth", "rad"),
        Field::scalar(13, "n_random_sequences"),
        Field::matrix(14, "random_seeds", 10, 3),
        Field::scalar(44, "run_number"),
        Field::scalar(45, "date"),
        Field::scalar(46, "version"),
        Field::scalar(47, "n_observation_levels"),
        Field::vector_with_unit(48, "observation_height", "cm", 10),
        Field::scalar(58, "energy_spectrum_slope"),
        Field::with_unit(59, "energy_min", "GeV"),
        Field::with_unit(60, "energy_max", "GeV"),
        Field::with_unit(61, "energy_cutoff_hadrons", "GeV"),
        Field::with_unit(62, "energy_cutoff_muons", "GeV"),
        Field::with_unit(63, "energy_cutoff_electrons", "GeV"),
        Field::with_unit(64, "energy_cutoff_photons", "GeV"),
        Field::scalar(65, "nflain"),
        Field::scalar(66, "nfdif"),
        Field::scalar(67, "nflpi0"),
        Field::scalar(68, "nflpif"),
        Field::scalar(69, "nflche"),
        Field::scalar(70, "nfragm"),
        Field::with_unit(71, "earth_magnetic_field_x", "uT"),
        Field::with_unit(72, "earth_magnetic_field_z", "uT"),
        Field::scalar(73, "egs4_flag"),
        Field::scalar(74, "nkg_flag"),
        Field::scalar(75, "low_energy_hadron_model"),
        Field::scalar(76, "high_energy_hadron_model"),
        Field::scalar(77, "cerenkov_flag"),
        Field::scalar(78, "neutrino_flag"),
        Field::scalar(79, "curved_flag"),
        Field::scalar(80, "computer"),
        Field::with_unit(81, "theta_min", "deg"),
        Field::with_unit(82, "theta_max", "deg"),
        Field::with_unit(83, "phi_min", "deg"),
        Field::with_unit(84, "phi_max", "deg"),
        Field::scalar(85, "cherenkov_bunch_size"),
        Field::scalar(86, "n_cherenkov_detectors_x"),
        Field::scalar(87, "n_cherenkov_detectors_y"),
        Field::with_unit(88, "cherenkov_detector_grid_spacing_x", "cm"),
        Field::with_unit(89, "cherenkov_detector_grid_spacing_y", "cm"),
        Field::with_unit(90, "cherenkov_detector_length_x", "cm"),
        Field::with_unit(91, "cherenkov_detector_length_y", "cm"),
        Field::scalar(92, "cherenkov_output_flag"),
        Field::with_unit(93, "angle_array_x_magnetic_north", "rad"),
        Field::scalar(94, "additional_muon_information_flag"),
        Field::scalar(95, "egs4_multpliple_scattering_step_length_factor"),
        Field::with_unit(96, "cherenkov_wavelength_min", "nm"),
        Field::with_unit(97, "cherenkov_wavelength_max", "nm"),
        Field::scalar(98, "n_reuse"),
        Field::vector(99, "reuse_x", 20),
        Field::vector(119, "reuse_y", 20),
        Field::scalar(139, "sybill_interaction_flag"),
        Field::scalar(140, "sybill_cross_section_flag"),
        Field::scalar(141, "qgsjet_interaction_flag"),
        Field::scalar(142, "qgsjet_cross_section_flag"),
        Field::scalar(143, "dpmjet_interaction_flag"),
        Field::scalar(144, "dpmjet_cross_section_flag"),
        Field::scalar(145, "venus_nexus_epos_cross_section_flag"),
        Field::scalar(146, "muon_multiple_scattering_flag"),
        Field::with_unit(147, "nkg_radial_distribution_range", "cm"),
        Field::scalar(148, "energy_fraction_if_thinning_level_hadronic"),
        Field::scalar(149, "energy_fraction_if_thinning_level_em"),
        Field::scalar(150, "actual_weight_limit_thinning_hadronic"),
        Field::scalar(151, "actual_weight_limit_thinning_em"),
        Field::with_unit(152, "max_radius_radial_thinning_cutting", "cm"),
        Field::with_unit(153, "viewcone_inner_angle", "deg"),
        Field::with_unit(154, "viewcone_outer_angle", "deg"),
        Field::with_unit(155, "transition_energy_low_high_energy_model", "GeV"),
    ]
}

fn fields_73() -> Vec<Field> {
    let mut fields = fields_65();
    fields.extend([
        Field::scalar(156, "skimming_incidence_flag"),
        Field::with_unit(157, "horizontal_shower_exis_altitude", "cm"),
        Field::with_unit(158, "starting_height", "cm"),
        Field::scalar(159, "explicit_charm_generation_flag"),
        Field::scalar(160, "electromagnetic_subshower_hadronic_origin_output_flag"),
        Field::with_unit(161, "conex_min_vertical_depth", "g/cm2"),
        Field::with_unit(162, "conex_high_energy_treshold_hadrons", "GeV"),
        Field::with_unit(163, "conex_high_energy_treshold_muons", "GeV"),
        Field::with_unit(164, "conex_high_energy_treshold_em", "GeV"),
        Field::with_unit(165, "conex_low_energy_treshold_hadrons", "GeV"),
        Field::with_unit(166, "conex_low_energy_treshold_muons", "GeV"),
        Field::with_unit(167, "conex_low_energy_treshold_em", "GeV"),
        Field::scalar(168, "observaton_level_curvature_flag"),
        Field::scalar(169, "conex_weight_limit_thinning_hadronic"),
        Field::scalar(170, "conex_weight_limit_thinning_em"),
        Field::scalar(171, "conex_weight_limit_sampling_hadronic"),
        Field::scalar(172, "conex_weight_limit_sampling_muons"),
        Field::scalar(173, "conex_weight_limit_sampling_em"),
    ]);
    fields
}

fn fields_75() -> Vec<Field> {
    let mut fields = fields_73();
    fields.extend([
        Field::with_unit(174, "augerhit_stripes_half_width", "cm"),
        Field::with_unit(175, "augerhit_detector_distance", "cm"),
        Field::scalar(176, "augerhit_reserved"),
        Field::scalar(177, "n_multithin"),
        Field::vector(178, "multithin_energy_fraction_hadronic", 6),
        Field::vector(184, "multithin_weight_limit_hadronic", 6),
        Field::vector(190, "multithin_energy_fraction_em", 6),
        Field::vector(196, "multithin_weight_limit_em", 6),
        Field::matrix(202, "multithin_random_seeds", 6, 3),
        Field::with_unit(220, "icecube_energy_threshold", "GeV"),
        Field::scalar(221, "icecube_gzip_flag"),
        Field::scalar(222, "icecube_pipe_flag"),
    ]);
    fields
}

static LAYOUT_65: LazyLock<CompiledLayout> =
    LazyLock::new(|| build_layout(&fields_65(), BLOCK_SIZE_BYTES));
static LAYOUT_65_THIN: LazyLock<CompiledLayout> =
    LazyLock::new(|| build_layout(&fields_65(), BLOCK_SIZE_BYTES_THIN));
static LAYOUT_73: LazyLock<CompiledLayout> =
    LazyLock::new(|| build_layout(&fields_73(), BLOCK_SIZE_BYTES));
static LAYOUT_73_THIN: LazyLock<CompiledLayout> =
    LazyLock::new(|| build_layout(&fields_73(), BLOCK_SIZE_BYTES_THIN));
static LAYOUT_75: LazyLock<CompiledLayout> =
    LazyLock::new(|| build_layout(&fields_75(), BLOCK_SIZE_BYTES));
static LAYOUT_75_THIN: LazyLock<CompiledLayout> =
    LazyLock::new(|| build_layout(&fields_75(), BLOCK_SIZE_BYTES_THIN));

/// Look up the event header layout for a format version.
///
/// Registered version keys are 6.5 and 7.3 through 7.7 (7.3/7.4 share one
/// layout, 7.5/7.6/7.7 another). Any other key resolves to the newest
/// layout with [`fallback`](LayoutLookup::fallback) set.
pub fn event_header_layout(version: f32, thinning: bool) -> LayoutLookup {
    let (standard, thin, fallback) = match super::version_key(version) {
        65 => (&LAYOUT_65, &LAYOUT_65_THIN, false),
        73 | 74 => (&LAYOUT_73, &LAYOUT_73_THIN, false),
        75..=77 => (&LAYOUT_75, &LAYOUT_75_THIN, false),
        _ => (&LAYOUT_75, &LAYOUT_75_THIN, true),
    };
    LayoutLookup {
        layout: if thinning { thin } else { standard },
        fallback,
    }
}
