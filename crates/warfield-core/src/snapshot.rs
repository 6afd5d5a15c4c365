//! Owned, read-only copies of world state.

use crate::entity::Entity;
use crate::id::Generation;

/// A point-in-time copy of the field, tree layer and entity table.
///
/// Produced by the world actor in reply to a snapshot request. Taking one
/// never mutates the world, and two snapshots with no mutation between
/// them compare equal.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldSnapshot {
    /// Generation of the field at the time of the copy.
    pub generation: Generation,
    /// Field width in cells.
    pub width: u32,
    /// Field height in cells.
    pub height: u32,
    /// Row-major cell bytes, `width * height` long.
    pub cells: Vec<u8>,
    /// Row-major tree layer, `width * height` long.
    pub trees: Vec<bool>,
    /// Entities in login order.
    pub entities: Vec<Entity>,
}

impl WorldSnapshot {
    /// The byte at `(x, y)`, or `None` off-grid.
    pub fn cell(&self, x: u32, y: u32) -> Option<u8> {
        self.cells.get(self.index(x, y)?).copied()
    }

    /// Whether a tree stands at `(x, y)`, or `None` off-grid.
    pub fn tree(&self, x: u32, y: u32) -> Option<bool> {
        self.trees.get(self.index(x, y)?).copied()
    }

    /// The tree layer packed with [`pack_bits`].
    pub fn tree_bits(&self) -> Vec<u8> {
        pack_bits(&self.trees)
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| (y * self.width + x) as usize)
    }
}

/// Pack `cells` eight to a byte, least significant bit first. A partial
/// last byte uses its low bits.
pub fn pack_bits(cells: &[bool]) -> Vec<u8> {
    cells
        .chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .filter(|(_, t)| **t)
                .fold(0u8, |byte, (bit, _)| byte | (1 << bit))
        })
        .collect()
}
