//! Warfield: a shared-world cellular automaton served to many players.
//!
//! This is the facade crate that re-exports the public API of the warfield
//! sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use warfield::prelude::*;
//!
//! let mut automaton = Automaton::new(16, 16, RuleKind::War.build(), 42).unwrap();
//! automaton.bomb(CellCoord::new(8, 8));
//! automaton.step();
//! assert_eq!(automaton.generation(), Generation(1));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `warfield-core` | IDs, cells, entities, events, the `Codec` trait |
//! | [`space`] | `warfield-space` | Bounded grid, Moore neighbourhood, double-buffered field, tree layer |
//! | [`automaton`] | `warfield-automaton` | Rules, bomb footprint, the stepping automaton |
//! | [`engine`] | `warfield-engine` | World actor, connection hub, socket pumps, scheduler |
//! | [`wire`] | `warfield-wire` | JSON codec for client frames |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types (`warfield-core`).
pub use warfield_core as types;

/// Grid geometry and cell storage (`warfield-space`).
pub use warfield_space as space;

/// Transition rules and the automaton (`warfield-automaton`).
///
/// [`automaton::RuleKind`] selects one of the built-in rules.
pub use warfield_automaton as automaton;

/// Actors and the server (`warfield-engine`).
///
/// [`engine::Server`] wires the world, hub and scheduler together;
/// [`engine::Server::accept`] turns a stream into a connection.
pub use warfield_engine as engine;

/// JSON wire format (`warfield-wire`).
pub use warfield_wire as wire;

/// Common imports for typical warfield usage.
pub mod prelude {
    // Core types
    pub use warfield_core::{
        CellCoord, CellValue, Codec, Entity, EntityId, Frame, Generation, Inbound, PlayerAction,
        Position, WorldSnapshot,
    };

    // Errors
    pub use warfield_core::{DecodeError, RegisterError, SubmitError};

    // Automaton
    pub use warfield_automaton::{Automaton, Rule, RuleKind};

    // Engine
    pub use warfield_engine::{
        Connection, ConnectionError, ConnectionHub, NameSource, Server, ServerConfig, WorldActor,
        WorldHandle,
    };

    // Wire
    pub use warfield_wire::JsonCodec;
}
