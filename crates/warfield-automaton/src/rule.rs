//! The [`Rule`] strategy trait and the [`RuleKind`] selector.

use std::fmt;
use std::str::FromStr;

use rand::RngCore;
use warfield_core::CellValue;
use warfield_space::Neighbourhood;

use crate::rules::{Tricolor, War, Wave};

/// A per-cell transition strategy.
///
/// # Contract
///
/// - `next()` MUST be a pure function of its arguments: no randomness,
///   no interior state, no dependence on iteration order.
/// - `next()`, `seed()` and `blast()` MUST return values in
///   `0..=max_value()`.
///
/// # Object safety
///
/// This trait is object-safe; the automaton stores its rule as
/// `Box<dyn Rule>` so variants can be chosen at startup.
pub trait Rule: Send + 'static {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Largest value this rule produces or accepts from direct edits.
    fn max_value(&self) -> CellValue;

    /// A random initial value for one cell.
    fn seed(&self, rng: &mut dyn RngCore) -> CellValue;

    /// The value of a cell in the next generation.
    fn next(&self, own: CellValue, neighbours: &Neighbourhood) -> CellValue;

    /// What a bomb writes where the footprint calls for hazard `stage`.
    ///
    /// Rules with hazard stages keep the stage; the default does.
    fn blast(&self, stage: CellValue) -> CellValue {
        stage
    }

    /// Character used by text rendering.
    fn glyph(&self, value: CellValue) -> char {
        match value.get() {
            0 => '0',
            1 => '.',
            2 => ',',
            3 => '▓',
            4 => '▒',
            5 => '░',
            6 => '#',
            7 => '&',
            20 => 'x',
            _ => '?',
        }
    }
}

/// Which built-in rule to run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// [`War`].
    #[default]
    War,
    /// [`Wave`].
    Wave,
    /// [`Tricolor`].
    Tricolor,
}

impl RuleKind {
    /// Instantiate the rule.
    pub fn build(self) -> Box<dyn Rule> {
        match self {
            Self::War => Box::new(War),
            Self::Wave => Box::new(Wave),
            Self::Tricolor => Box::new(Tricolor),
        }
    }

    /// Lower-case name, as accepted by [`RuleKind::from_str`].
    pub fn as_str(self) -> &'static str {
        match self {
            Self::War => "war",
            Self::Wave => "wave",
            Self::Tricolor => "tricolor",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised rule name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseRuleError(pub String);

impl fmt::Display for ParseRuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown rule '{}' (expected war, wave or tricolor)",
            self.0
        )
    }
}

impl std::error::Error for ParseRuleError {}

impl FromStr for RuleKind {
    type Err = ParseRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "war" => Ok(Self::War),
            "wave" => Ok(Self::Wave),
            "tricolor" | "tricolour" => Ok(Self::Tricolor),
            _ => Err(ParseRuleError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("WAR".parse(), Ok(RuleKind::War));
        assert_eq!("Wave".parse(), Ok(RuleKind::Wave));
        assert_eq!("tricolour".parse(), Ok(RuleKind::Tricolor));
        assert!("life".parse::<RuleKind>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for kind in [RuleKind::War, RuleKind::Wave, RuleKind::Tricolor] {
            assert_eq!(kind.to_string().parse(), Ok(kind));
            assert_eq!(kind.build().name(), kind.as_str());
        }
    }
}
