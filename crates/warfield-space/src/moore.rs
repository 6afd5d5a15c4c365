//! The Moore (8-connected) neighbourhood.

use warfield_core::{CellCoord, CellValue};

/// One of the eight Moore directions. `y` grows downwards, so
/// [`Direction::N`] is `(0, -1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Up.
    N,
    /// Down.
    S,
    /// Left.
    W,
    /// Right.
    E,
    /// Up-left.
    NW,
    /// Up-right.
    NE,
    /// Down-left.
    SW,
    /// Down-right.
    SE,
}

impl Direction {
    /// All eight directions: N, S, W, E, NW, NE, SW, SE.
    pub const ALL: [Direction; 8] = [
        Direction::N,
        Direction::S,
        Direction::W,
        Direction::E,
        Direction::NW,
        Direction::NE,
        Direction::SW,
        Direction::SE,
    ];

    /// The four orthogonal directions.
    pub const ORTHOGONAL: [Direction; 4] = [Direction::N, Direction::S, Direction::W, Direction::E];

    /// `(dx, dy)` offset of this direction.
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::N => (0, -1),
            Self::S => (0, 1),
            Self::W => (-1, 0),
            Self::E => (1, 0),
            Self::NW => (-1, -1),
            Self::NE => (1, -1),
            Self::SW => (-1, 1),
            Self::SE => (1, 1),
        }
    }

    /// Slot of this direction in [`Direction::ALL`].
    const fn slot(self) -> usize {
        match self {
            Self::N => 0,
            Self::S => 1,
            Self::W => 2,
            Self::E => 3,
            Self::NW => 4,
            Self::NE => 5,
            Self::SW => 6,
            Self::SE => 7,
        }
    }

    /// The neighbour of `at` in this direction.
    pub fn step(self, at: CellCoord) -> CellCoord {
        let (dx, dy) = self.offset();
        at.offset(dx, dy)
    }
}

/// Values of the eight cells around one cell, in [`Direction::ALL`] order.
///
/// Off-grid neighbours read as [`CellValue::EMPTY`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Neighbourhood {
    cells: [CellValue; 8],
}

impl Neighbourhood {
    /// Build from values in [`Direction::ALL`] order.
    pub fn new(cells: [CellValue; 8]) -> Self {
        Self { cells }
    }

    /// Build by setting selected directions over an all-empty background.
    pub fn with(pairs: &[(Direction, CellValue)]) -> Self {
        let mut n = Self::default();
        for &(d, v) in pairs {
            n.cells[d.slot()] = v;
        }
        n
    }

    /// Value in direction `d`.
    pub fn get(&self, d: Direction) -> CellValue {
        self.cells[d.slot()]
    }

    /// How many of the eight neighbours hold `value`.
    pub fn count(&self, value: CellValue) -> u8 {
        self.cells.iter().filter(|&&v| v == value).count() as u8
    }

    /// How many of the neighbours in `dirs` hold `value`.
    pub fn count_in(&self, dirs: &[Direction], value: CellValue) -> u8 {
        dirs.iter().filter(|&&d| self.get(d) == value).count() as u8
    }

    /// How many neighbours hold a value in `lo..=hi`.
    pub fn count_range(&self, lo: CellValue, hi: CellValue) -> u8 {
        self.cells.iter().filter(|&&v| v >= lo && v <= hi).count() as u8
    }

    /// Values in [`Direction::ALL`] order.
    pub fn values(&self) -> &[CellValue; 8] {
        &self.cells
    }
}
