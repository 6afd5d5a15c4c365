//! Built-in rule variants.

mod tricolor;
mod war;
mod wave;

pub use tricolor::Tricolor;
pub use war::War;
pub use wave::Wave;

use warfield_core::CellValue;
use warfield_space::Neighbourhood;

/// The three colours of the colour rules, reusing the team values 1..=3.
pub(crate) const COLOURS: [CellValue; 3] = [
    CellValue::TEAM_A,
    CellValue::TEAM_B,
    CellValue::HAZARD_FAR,
];

/// The colour that consumes `colour` in the rock-paper-scissors cycle
/// 1 ← 3, 2 ← 1, 3 ← 2. Empty has no eater.
pub(crate) fn eater(colour: CellValue) -> Option<CellValue> {
    match colour.get() {
        1 => Some(COLOURS[2]),
        2 => Some(COLOURS[0]),
        3 => Some(COLOURS[1]),
        _ => None,
    }
}

/// The colour with the strictly highest neighbour count, with that count.
/// `None` on a tie for first place.
pub(crate) fn dominant(n: &Neighbourhood) -> Option<(CellValue, u8)> {
    let mut best: Option<(CellValue, u8)> = None;
    let mut tied = false;
    for colour in COLOURS {
        let count = n.count(colour);
        match best {
            Some((_, top)) if count == top => tied = true,
            Some((_, top)) if count < top => {}
            _ => {
                best = Some((colour, count));
                tied = false;
            }
        }
    }
    if tied {
        None
    } else {
        best
    }
}
