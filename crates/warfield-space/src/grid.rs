//! Grid dimensions and row-major indexing.

use warfield_core::CellCoord;

use crate::error::SpaceError;

/// Dimensions of a rectangular, non-toroidal grid.
///
/// Cells are addressed by [`CellCoord`] `(x, y)` with `x` the column and
/// `y` the row, and stored row-major.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Grid {
    width: u32,
    height: u32,
}

impl Grid {
    /// Largest accepted dimension. Coordinates are `i32` and a field of
    /// `MAX_DIM × MAX_DIM` bytes is already 256 MiB.
    pub const MAX_DIM: u32 = 1 << 14;

    /// Returns `Err(SpaceError::EmptyGrid)` if either dimension is 0, or
    /// `Err(SpaceError::DimensionTooLarge)` if either exceeds [`Grid::MAX_DIM`].
    pub fn new(width: u32, height: u32) -> Result<Self, SpaceError> {
        if width == 0 || height == 0 {
            return Err(SpaceError::EmptyGrid);
        }
        for (name, value) in [("width", width), ("height", height)] {
            if value > Self::MAX_DIM {
                return Err(SpaceError::DimensionTooLarge {
                    name,
                    value,
                    max: Self::MAX_DIM,
                });
            }
        }
        Ok(Self { width, height })
    }

    /// Number of columns.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Whether `at` lies on the grid.
    pub fn contains(&self, at: CellCoord) -> bool {
        at.x >= 0 && at.y >= 0 && (at.x as u32) < self.width && (at.y as u32) < self.height
    }

    /// Row-major index of `at`, or `None` off-grid.
    pub fn index(&self, at: CellCoord) -> Option<usize> {
        if !self.contains(at) {
            return None;
        }
        Some(at.y as usize * self.width as usize + at.x as usize)
    }

    /// Inverse of [`Grid::index`]. Callers pass `i < cell_count()`.
    pub fn coord(&self, i: usize) -> CellCoord {
        let w = self.width as usize;
        CellCoord::new((i % w) as i32, (i / w) as i32)
    }

    /// All coordinates in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (0..self.cell_count()).map(move |i| self.coord(i))
    }
}
