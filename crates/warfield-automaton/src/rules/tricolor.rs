//! Three colours with crowding.

use rand::{Rng, RngCore};
use warfield_core::CellValue;
use warfield_space::Neighbourhood;

use super::{dominant, eater, COLOURS};
use crate::rule::Rule;

/// Colour cycle as in [`Wave`](crate::Wave), but crowded cells empty out
/// and empty cells only fill on exactly 3 or 5 of one colour.
///
/// Empty cell: a unique highest colour count of 3 or 5 fills it, else it
/// stays empty (ties included).
///
/// Coloured cell, first match wins: eater ≥ 5 → eater; more than 5
/// coloured neighbours → empty; eater ≥ 2 → eater; 2 or 3 allies → stay;
/// one eater → eater; otherwise empty.
#[derive(Clone, Copy, Debug, Default)]
pub struct Tricolor;

impl Tricolor {
    /// Coloured neighbours above which a cell dies of crowding.
    pub const CROWD_MAX: u8 = 5;
}

impl Rule for Tricolor {
    fn name(&self) -> &str {
        "tricolor"
    }

    fn max_value(&self) -> CellValue {
        CellValue::HAZARD_FAR
    }

    fn seed(&self, rng: &mut dyn RngCore) -> CellValue {
        CellValue::new(rng.gen_range(0..=3)).unwrap_or(CellValue::EMPTY)
    }

    /// No hazard stages: a blast clears the whole footprint.
    fn blast(&self, _stage: CellValue) -> CellValue {
        CellValue::EMPTY
    }

    fn next(&self, own: CellValue, n: &Neighbourhood) -> CellValue {
        let Some(e) = eater(own) else {
            return match dominant(n) {
                Some((colour, 3 | 5)) => colour,
                _ => CellValue::EMPTY,
            };
        };
        let eaters = n.count(e);
        if eaters >= 5 {
            return e;
        }
        let total: u8 = COLOURS.iter().map(|&c| n.count(c)).sum();
        if total > Self::CROWD_MAX {
            return CellValue::EMPTY;
        }
        if eaters >= 2 {
            return e;
        }
        if matches!(n.count(own), 2 | 3) {
            return own;
        }
        if eaters == 1 {
            return e;
        }
        CellValue::EMPTY
    }
}
