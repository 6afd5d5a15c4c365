//! Spatial data structures for the warfield automaton.
//!
//! - [`Grid`]: fixed `width × height` dimensions and coordinate indexing.
//! - [`Direction`] / [`Neighbourhood`]: the eight Moore neighbours of a
//!   cell, gathered with a closed boundary (off-grid reads are empty).
//! - [`Field`]: the double-buffered cell store that makes every step
//!   read one generation and write the next.
//! - [`Trees`]: the boolean tree layer, stepped by the life rule.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod field;
pub mod grid;
pub mod moore;
pub mod trees;

pub use error::SpaceError;
pub use field::Field;
pub use grid::Grid;
pub use moore::{Direction, Neighbourhood};
pub use trees::Trees;
