//! Cell values stored in the automaton field.

use std::fmt;

use crate::error::CellValueError;

/// A single cell of the field.
///
/// The representable range is `0..=CellValue::MAX`. Construction through
/// [`CellValue::new`] rejects anything above that; values are never
/// clamped. Individual rules may narrow the range further (see the
/// automaton crate's `Rule::max_value`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellValue(u8);

impl CellValue {
    /// Neutral cell.
    pub const EMPTY: CellValue = CellValue(0);
    /// Owned by participant A (and the first colour in the colour rules).
    pub const TEAM_A: CellValue = CellValue(1);
    /// Owned by participant B (and the second colour in the colour rules).
    pub const TEAM_B: CellValue = CellValue(2);
    /// Outer blast ring and first hazard stage.
    pub const HAZARD_FAR: CellValue = CellValue(3);
    /// Blast diagonals.
    pub const HAZARD_MID: CellValue = CellValue(4);
    /// Blast centre and its four orthogonal neighbours.
    pub const HAZARD_NEAR: CellValue = CellValue(5);
    /// Last hazard stage before the cell burns out to [`CellValue::EMPTY`].
    pub const HAZARD_CEILING: CellValue = CellValue(7);
    /// Empty cell claimed equally by both teams.
    pub const CONTESTED: CellValue = CellValue(20);
    /// Largest representable value.
    pub const MAX: CellValue = CellValue::CONTESTED;

    /// Build a cell value, rejecting anything above [`CellValue::MAX`].
    pub fn new(value: u8) -> Result<Self, CellValueError> {
        Self::with_max(value, Self::MAX.0)
    }

    /// Build a cell value against a narrower ceiling.
    ///
    /// `max` is itself capped at [`CellValue::MAX`].
    pub fn with_max(value: u8, max: u8) -> Result<Self, CellValueError> {
        let max = max.min(Self::MAX.0);
        if value > max {
            return Err(CellValueError::OutOfRange { value, max });
        }
        Ok(Self(value))
    }

    /// The raw byte.
    pub fn get(self) -> u8 {
        self.0
    }

    /// Whether the cell is [`CellValue::EMPTY`] or [`CellValue::CONTESTED`].
    ///
    /// Contested cells are unowned, so transitions treat them as empty.
    pub fn is_vacant(self) -> bool {
        self == Self::EMPTY || self == Self::CONTESTED
    }

    /// Whether the cell is in one of the hazard stages `3..=7`.
    pub fn is_hazard(self) -> bool {
        (Self::HAZARD_FAR.0..=Self::HAZARD_CEILING.0).contains(&self.0)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<CellValue> for u8 {
    fn from(v: CellValue) -> u8 {
        v.0
    }
}

impl TryFrom<u8> for CellValue {
    type Error = CellValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
