//! `RUNE` (run end) field layout.
//!
//! The run end block has kept the same three leading words across all
//! known CORSIKA releases, so there is no version table here.

use std::sync::LazyLock;

use super::common::{CompiledLayout, Field, build_layout};
use crate::parsing::{BLOCK_SIZE_BYTES, BLOCK_SIZE_BYTES_THIN};

fn fields() -> Vec<Field> {
    vec![
        Field::tag(1, "run_end"),
        Field::scalar(2, "run_number"),
        Field::scalar(3, "n_events"),
    ]
}

static LAYOUT: LazyLock<CompiledLayout> =
    LazyLock::new(|| build_layout(&fields(), BLOCK_SIZE_BYTES));
static LAYOUT_THIN: LazyLock<CompiledLayout> =
    LazyLock::new(|| build_layout(&fields(), BLOCK_SIZE_BYTES_THIN));

/// The run end layout for the given thinning mode.
pub fn run_end_layout(thinning: bool) -> &'static CompiledLayout {
    if thinning { &LAYOUT_THIN } else { &LAYOUT }
}
