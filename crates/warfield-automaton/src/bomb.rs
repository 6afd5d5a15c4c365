//! The bomb footprint.
//!
//! ```text
//!      o o o
//!    o + - + o
//!    o - @ - o        @ and - = HAZARD_NEAR
//!    o + - + o        +       = HAZARD_MID
//!      o o o          o       = HAZARD_FAR
//! ```
//!
//! The corners of the 5×5 square are not part of the blast.
//! Rules without hazard stages translate each stage through
//! [`Rule::blast`](crate::Rule::blast) before it is written.

use smallvec::SmallVec;
use warfield_core::{CellCoord, CellValue};

const NEAR: CellValue = CellValue::HAZARD_NEAR;
const MID: CellValue = CellValue::HAZARD_MID;
const FAR: CellValue = CellValue::HAZARD_FAR;

/// `((dx, dy), value)` for every cell the blast writes.
pub const FOOTPRINT: [((i32, i32), CellValue); 21] = [
    // Centre and orthogonal neighbours.
    ((0, 0), NEAR),
    ((1, 0), NEAR),
    ((-1, 0), NEAR),
    ((0, 1), NEAR),
    ((0, -1), NEAR),
    // Diagonals.
    ((1, 1), MID),
    ((-1, -1), MID),
    ((-1, 1), MID),
    ((1, -1), MID),
    // Distance-2 ring, corners excluded.
    ((2, -1), FAR),
    ((2, 0), FAR),
    ((2, 1), FAR),
    ((-2, -1), FAR),
    ((-2, 0), FAR),
    ((-2, 1), FAR),
    ((-1, -2), FAR),
    ((0, -2), FAR),
    ((1, -2), FAR),
    ((-1, 2), FAR),
    ((0, 2), FAR),
    ((1, 2), FAR),
];

/// The footprint translated to absolute coordinates around `centre`.
/// Coordinates may fall off the grid.
pub fn footprint_at(centre: CellCoord) -> SmallVec<[(CellCoord, CellValue); 21]> {
    FOOTPRINT
        .iter()
        .map(|&((dx, dy), v)| (centre.offset(dx, dy), v))
        .collect()
}
