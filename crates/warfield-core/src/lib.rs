//! Core types for the warfield shared-world simulator.
//!
//! This is the leaf crate of the workspace. It defines the vocabulary
//! every other crate speaks: entity and connection identifiers, the
//! range-checked [`CellValue`], positions, the [`Event`] tagged union
//! consumed by the world actor, one-shot [`Reply`] channels, the
//! [`Codec`] boundary to the wire format, and the error enums shared
//! across layers.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cell;
pub mod codec;
pub mod entity;
pub mod error;
pub mod event;
pub mod id;
pub mod position;
pub mod snapshot;

pub use cell::CellValue;
pub use codec::{Codec, Frame};
pub use entity::{Entity, EntityKind};
pub use error::{CellValueError, DecodeError, RegisterError, SubmitError};
pub use event::{reply_pair, Event, Inbound, Pending, PlayerAction, Reply};
pub use id::{ConnectionId, EntityId, Generation};
pub use position::{CellCoord, Position};
pub use snapshot::{pack_bits, WorldSnapshot};
