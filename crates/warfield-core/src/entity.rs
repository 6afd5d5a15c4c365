//! Entities: participants living in the world.

use std::fmt;

use crate::id::EntityId;
use crate::position::Position;

/// What an entity is. Only players exist today; the kind is carried on
/// the wire so clients can style entities.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A logged-in participant.
    #[default]
    Player,
}

impl EntityKind {
    /// Wire name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Player => "Player",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the world's entity table.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    /// Identifier assigned by the world on login.
    pub id: EntityId,
    /// Display name chosen at registration.
    pub name: String,
    /// Entity kind.
    pub kind: EntityKind,
    /// Last reported position.
    pub position: Position,
}

impl Entity {
    /// A freshly logged-in player at the origin.
    pub fn player(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: EntityKind::Player,
            position: Position::default(),
        }
    }
}
