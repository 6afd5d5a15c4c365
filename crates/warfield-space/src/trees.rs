//! The tree layer: a boolean grid stepped by the B3/S23 life rule.
//!
//! Trees live alongside the cell field with the same dimensions. Like
//! [`Field`](crate::Field) the layer is double-buffered, so a step reads
//! one generation and writes the next; off-grid neighbours are bare.
//!
//! [`Trees::to_bits`] packs the layer row-major, eight cells per byte,
//! least significant bit first. A partial last byte uses its low bits.

use warfield_core::{pack_bits, CellCoord};

use crate::error::SpaceError;
use crate::grid::Grid;
use crate::moore::Direction;

/// A `width × height` grid of tree / no-tree cells.
#[derive(Clone, Debug)]
pub struct Trees {
    grid: Grid,
    current: Vec<bool>,
    scratch: Vec<bool>,
}

impl Trees {
    /// Living neighbours a bare cell needs to grow a tree.
    pub const BIRTH: u8 = 3;

    /// A layer with no trees.
    pub fn new(width: u32, height: u32) -> Result<Self, SpaceError> {
        Ok(Self::bare(Grid::new(width, height)?))
    }

    /// A layer with no trees over already validated geometry.
    pub fn bare(grid: Grid) -> Self {
        let n = grid.cell_count();
        Self {
            grid,
            current: vec![false; n],
            scratch: vec![false; n],
        }
    }

    /// A layer filled cell by cell, row-major.
    pub fn from_fn(
        width: u32,
        height: u32,
        mut f: impl FnMut(CellCoord) -> bool,
    ) -> Result<Self, SpaceError> {
        let mut trees = Self::new(width, height)?;
        for i in 0..trees.current.len() {
            trees.current[i] = f(trees.grid.coord(i));
        }
        Ok(trees)
    }

    /// Grid geometry.
    pub fn grid(&self) -> Grid {
        self.grid
    }

    /// Whether a tree stands at `at`. Off-grid cells are bare.
    pub fn alive(&self, at: CellCoord) -> bool {
        self.grid.index(at).is_some_and(|i| self.current[i])
    }

    /// Toggle the tree at `at`. Returns `false` off-grid.
    pub fn flip(&mut self, at: CellCoord) -> bool {
        match self.grid.index(at) {
            Some(i) => {
                self.current[i] = !self.current[i];
                true
            }
            None => false,
        }
    }

    /// Trees among the eight neighbours of `at`.
    pub fn living_neighbours(&self, at: CellCoord) -> u8 {
        Direction::ALL
            .into_iter()
            .filter(|d| self.alive(d.step(at)))
            .count() as u8
    }

    /// One life generation: a bare cell with exactly three neighbours grows
    /// a tree, a tree with two or three survives, everything else is bare.
    pub fn step(&mut self) {
        for i in 0..self.current.len() {
            let n = self.living_neighbours(self.grid.coord(i));
            self.scratch[i] = n == Self::BIRTH || (n == 2 && self.current[i]);
        }
        std::mem::swap(&mut self.current, &mut self.scratch);
    }

    /// The current buffer, row-major.
    pub fn cells(&self) -> &[bool] {
        &self.current
    }

    /// Number of standing trees.
    pub fn count(&self) -> usize {
        self.current.iter().filter(|&&t| t).count()
    }

    /// The layer packed into bytes, LSB first.
    pub fn to_bits(&self) -> Vec<u8> {
        pack_bits(&self.current)
    }
}
