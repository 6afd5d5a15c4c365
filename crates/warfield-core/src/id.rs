//! Strongly-typed identifiers.

use std::fmt;

/// Identifies an entity in the world's entity table.
///
/// Ids are assigned by the world from a monotonically increasing
/// counter starting at 1. The value 0 is reserved and never assigned,
/// which is why a failed login is reported as `None` rather than an id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

impl EntityId {
    /// The first id handed out by a fresh world.
    pub const FIRST: EntityId = EntityId(1);

    /// Whether this id could have been assigned by a world (i.e. is not 0).
    pub fn is_assignable(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Identifies a registered network connection.
///
/// Allocated by the hub when it admits a connection, counting up from
/// [`ConnectionId::FIRST`]. A hub never hands out the same id twice;
/// refused connections get none.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// The first id a fresh hub hands out.
    pub const FIRST: ConnectionId = ConnectionId(1);

    /// The id allocated after this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// The raw numeric value, for logging.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for ConnectionId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn#{}", self.0)
    }
}

/// Automaton generation counter.
///
/// Incremented each time the field advances one step. Direct edits and
/// bombs do not advance it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(pub u64);

impl Generation {
    /// The generation after this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
