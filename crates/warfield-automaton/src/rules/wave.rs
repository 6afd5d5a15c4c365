//! Rock-paper-scissors colour waves.

use rand::{Rng, RngCore};
use warfield_core::CellValue;
use warfield_space::Neighbourhood;

use super::{dominant, eater};
use crate::rule::Rule;

/// Three colours chase each other around the cycle 1 ← 3, 2 ← 1, 3 ← 2.
///
/// Over the Moore neighbourhood: three or more of a cell's eater take it;
/// otherwise a coloured cell with 2, 3 or 5 like neighbours holds; otherwise
/// a colour with the strictly highest count takes the cell. Ties leave the
/// cell unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct Wave;

impl Wave {
    /// Eater neighbours needed to consume a cell.
    pub const EAT_MIN: u8 = 3;
}

impl Rule for Wave {
    fn name(&self) -> &str {
        "wave"
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
        if let Some(e) = eater(own) {
            if n.count(e) >= Self::EAT_MIN {
                return e;
            }
            if matches!(n.count(own), 2 | 3 | 5) {
                return own;
            }
        }
        match dominant(n) {
            Some((colour, _)) => colour,
            None => own,
        }
    }
}
