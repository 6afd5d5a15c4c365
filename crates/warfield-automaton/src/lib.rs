//! Cellular-automaton kernel for warfield.
//!
//! A [`Rule`] is a pure, swappable transition strategy: given a cell's own
//! value and its Moore [`Neighbourhood`](warfield_space::Neighbourhood) it
//! returns the cell's next value. The [`Automaton`] pairs a rule with a
//! double-buffered [`Field`](warfield_space::Field) and adds the direct
//! write paths used by players: [`Automaton::alter_at`] and
//! [`Automaton::bomb`].
//!
//! # Rules
//!
//! - [`War`]: two teams claim empty cells; blasts eat team cells then burn out.
//! - [`Wave`]: three colours in a rock-paper-scissors cycle.
//! - [`Tricolor`]: stricter three-colour variant where crowding empties cells.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod automaton;
pub mod bomb;
pub mod rule;
pub mod rules;

pub use automaton::Automaton;
pub use bomb::{footprint_at, FOOTPRINT};
pub use rule::{ParseRuleError, Rule, RuleKind};
pub use rules::{Tricolor, War, Wave};
