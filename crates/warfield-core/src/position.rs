//! Continuous entity positions and discrete grid coordinates.

use std::fmt;

/// A continuous position in world space, used for entities.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Position {
    /// Construct a position.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The grid cell containing this position (floor of each axis).
    ///
    /// Non-finite components map to `i32::MIN`, which lies off every grid.
    pub fn cell(self) -> CellCoord {
        fn axis(v: f64) -> i32 {
            if v.is_finite() {
                // `as` saturates for out-of-range floats.
                v.floor() as i32
            } else {
                i32::MIN
            }
        }
        CellCoord::new(axis(self.x), axis(self.y))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A discrete grid coordinate. May lie outside the grid; callers that
/// index the field check bounds first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl CellCoord {
    /// Construct a coordinate.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// This coordinate shifted by `(dx, dy)`, saturating at the `i32` limits.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}

impl From<(i32, i32)> for CellCoord {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}
