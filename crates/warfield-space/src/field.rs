//! Double-buffered cell storage.
//!
//! [`Field`] holds two equally sized buffers. One is *current* (readable
//! and target of direct edits); the other is *scratch*, written only
//! while a step is computed. [`Field::step_with`] fills scratch from the
//! current buffer and then swaps the roles, so every cell of generation
//! N+1 is computed from generation N values only.
//!
//! ```text
//! step:   current ──read──▶ f(own, neighbourhood) ──write──▶ scratch
//! swap:   scratch becomes current, old current becomes scratch
//! ```

use warfield_core::{CellCoord, CellValue};

use crate::error::SpaceError;
use crate::grid::Grid;
use crate::moore::{Direction, Neighbourhood};

/// A `width × height` field of cell values with a scratch buffer.
#[derive(Clone, Debug)]
pub struct Field {
    grid: Grid,
    current: Vec<CellValue>,
    scratch: Vec<CellValue>,
}

impl Field {
    /// An all-empty field.
    pub fn new(width: u32, height: u32) -> Result<Self, SpaceError> {
        let grid = Grid::new(width, height)?;
        let n = grid.cell_count();
        Ok(Self {
            grid,
            current: vec![CellValue::EMPTY; n],
            scratch: vec![CellValue::EMPTY; n],
        })
    }

    /// A field whose current buffer is filled cell by cell, row-major.
    pub fn from_fn(
        width: u32,
        height: u32,
        mut f: impl FnMut(CellCoord) -> CellValue,
    ) -> Result<Self, SpaceError> {
        let mut field = Self::new(width, height)?;
        for i in 0..field.current.len() {
            field.current[i] = f(field.grid.coord(i));
        }
        Ok(field)
    }

    /// Grid geometry.
    pub fn grid(&self) -> Grid {
        self.grid
    }

    /// Width in cells.
    pub fn width(&self) -> u32 {
        self.grid.width()
    }

    /// Height in cells.
    pub fn height(&self) -> u32 {
        self.grid.height()
    }

    /// Current value at `at`; off-grid reads are [`CellValue::EMPTY`].
    pub fn get(&self, at: CellCoord) -> CellValue {
        self.grid
            .index(at)
            .map_or(CellValue::EMPTY, |i| self.current[i])
    }

    /// Write `value` into the current buffer. Returns `false` off-grid.
    pub fn set(&mut self, at: CellCoord, value: CellValue) -> bool {
        match self.grid.index(at) {
            Some(i) => {
                self.current[i] = value;
                true
            }
            None => false,
        }
    }

    /// The eight neighbours of `at` in the current buffer.
    pub fn neighbourhood(&self, at: CellCoord) -> Neighbourhood {
        let mut cells = [CellValue::EMPTY; 8];
        for (slot, d) in Direction::ALL.into_iter().enumerate() {
            cells[slot] = self.get(d.step(at));
        }
        Neighbourhood::new(cells)
    }

    /// Compute the next generation into scratch with `f(own, neighbours)`
    /// and swap buffers.
    pub fn step_with(&mut self, mut f: impl FnMut(CellValue, &Neighbourhood) -> CellValue) {
        for i in 0..self.current.len() {
            let at = self.grid.coord(i);
            let n = self.neighbourhood(at);
            self.scratch[i] = f(self.current[i], &n);
        }
        std::mem::swap(&mut self.current, &mut self.scratch);
    }

    /// The current buffer, row-major.
    pub fn cells(&self) -> &[CellValue] {
        &self.current
    }

    /// The current buffer as raw bytes, row-major.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.current.iter().map(|v| v.get()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn c(x: i32, y: i32) -> CellCoord {
        CellCoord::new(x, y)
    }

    // ── Reads and writes ────────────────────────────────────────

    #[test]
    fn buffers_share_dimensions() {
        let f = Field::new(7, 3).unwrap();
        assert_eq!(f.cells().len(), 21);
        assert_eq!(f.scratch.len(), 21);
    }

    #[test]
    fn off_grid_reads_empty_and_writes_noop() {
        let mut f = Field::from_fn(3, 3, |_| CellValue::TEAM_A).unwrap();
        assert_eq!(f.get(c(-1, 0)), CellValue::EMPTY);
        assert_eq!(f.get(c(3, 1)), CellValue::EMPTY);
        assert!(!f.set(c(0, 3), CellValue::TEAM_B));
        assert!(f.cells().iter().all(|&v| v == CellValue::TEAM_A));
    }

    #[test]
    fn corner_neighbourhood_has_five_empty_slots() {
        let f = Field::from_fn(3, 3, |_| CellValue::TEAM_B).unwrap();
        let n = f.neighbourhood(c(0, 0));
        assert_eq!(n.count(CellValue::TEAM_B), 3);
        assert_eq!(n.count(CellValue::EMPTY), 5);
    }

    // ── Lockstep stepping ───────────────────────────────────────

    #[test]
    fn step_reads_previous_generation_only() {
        // "Copy the west neighbour" on a 4×1 strip. A sequential in-place
        // update would smear TEAM_A all the way right in one step.
        let mut f = Field::new(4, 1).unwrap();
        f.set(c(0, 0), CellValue::TEAM_A);
        f.step_with(|_, n| n.get(Direction::W));
        assert_eq!(
            f.to_bytes(),
            vec![0, 1, 0, 0],
            "each cell must see its neighbour's pre-step value"
        );
    }

    #[test]
    fn mutual_neighbours_swap_in_one_step() {
        let mut f = Field::new(2, 1).unwrap();
        f.set(c(0, 0), CellValue::TEAM_A);
        f.set(c(1, 0), CellValue::TEAM_B);
        f.step_with(|own, n| {
            let other = if n.get(Direction::E) != CellValue::EMPTY {
                n.get(Direction::E)
            } else {
                n.get(Direction::W)
            };
            if other == CellValue::EMPTY {
                own
            } else {
                other
            }
        });
        assert_eq!(f.to_bytes(), vec![2, 1]);
    }

    proptest! {
        #[test]
        fn step_is_deterministic(cells in proptest::collection::vec(0u8..=2, 25)) {
            let seed = |at: CellCoord| {
                CellValue::new(cells[(at.y * 5 + at.x) as usize]).unwrap()
            };
            let mut a = Field::from_fn(5, 5, seed).unwrap();
            let mut b = Field::from_fn(5, 5, seed).unwrap();
            let rule = |own: CellValue, n: &Neighbourhood| {
                if n.count(CellValue::TEAM_A) > n.count(CellValue::TEAM_B) {
                    CellValue::TEAM_A
                } else {
                    own
                }
            };
            a.step_with(rule);
            b.step_with(rule);
            prop_assert_eq!(a.to_bytes(), b.to_bytes());
        }
    }
}
