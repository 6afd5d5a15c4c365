//! The world actor's event vocabulary and its one-shot reply channel.
//!
//! Every request to the world is one [`Event`] variant carrying exactly
//! the payload its kind needs. Requests that expect an answer carry a
//! [`Reply`], which is consumed on use so it can be written at most once;
//! the world writes every reply it is handed before taking the next event.

use std::fmt;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::error::SubmitError;
use crate::id::EntityId;
use crate::position::{CellCoord, Position};
use crate::snapshot::WorldSnapshot;

/// Sending half of a one-shot reply channel.
pub struct Reply<T> {
    tx: Sender<T>,
}

impl<T> Reply<T> {
    /// Deliver the reply. Returns `false` if the caller stopped waiting.
    pub fn send(self, value: T) -> bool {
        self.tx.try_send(value).is_ok()
    }
}

impl<T> fmt::Debug for Reply<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Reply(..)")
    }
}

/// Receiving half of a one-shot reply channel.
pub struct Pending<T> {
    rx: Receiver<T>,
}

impl<T> Pending<T> {
    /// Block until the reply arrives.
    ///
    /// Fails with [`SubmitError::Shutdown`] if the reply was dropped
    /// unsent, which only happens when the actor loop died.
    pub fn wait(self) -> Result<T, SubmitError> {
        self.rx.recv().map_err(|_| SubmitError::Shutdown)
    }

    /// Like [`Pending::wait`] but gives up after `timeout`.
    /// A timeout is reported as [`SubmitError::Timeout`].
    pub fn wait_timeout(self, timeout: Duration) -> Result<T, SubmitError> {
        self.rx.recv_timeout(timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => SubmitError::Timeout,
            RecvTimeoutError::Disconnected => SubmitError::Shutdown,
        })
    }
}

impl<T> fmt::Debug for Pending<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pending(..)")
    }
}

/// Create a linked [`Reply`] / [`Pending`] pair.
pub fn reply_pair<T>() -> (Reply<T>, Pending<T>) {
    let (tx, rx) = crossbeam_channel::bounded(1);
    (Reply { tx }, Pending { rx })
}

/// One request to the world actor.
#[derive(Debug)]
pub enum Event {
    /// Create an entity. Replies with its id, or `None` if the world is full.
    Login {
        /// Display name.
        name: String,
        /// Where the assigned id goes.
        reply: Reply<Option<EntityId>>,
    },
    /// Remove an entity. No-op if absent.
    Logout {
        /// Entity to remove.
        id: EntityId,
    },
    /// Update an entity's position. Ignored for unknown ids.
    Move {
        /// Entity to move.
        id: EntityId,
        /// New position.
        to: Position,
    },
    /// Write one cell directly. Ignored off-grid or above the rule maximum.
    DirectEdit {
        /// Target cell.
        at: CellCoord,
        /// Raw value to write.
        value: u8,
    },
    /// Stamp the bomb footprint centred on a cell.
    Bomb {
        /// Centre of the blast.
        at: CellCoord,
    },
    /// Advance the automaton one generation.
    AdvanceStep,
    /// Toggle the tree on a cell. Ignored off-grid.
    ToggleTree {
        /// Target cell.
        at: CellCoord,
    },
    /// Advance the tree layer one life generation.
    AdvanceTrees,
    /// Copy out the current world state.
    Snapshot {
        /// Where the copy goes.
        reply: Reply<WorldSnapshot>,
    },
}

impl Event {
    /// Short name of the variant, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Login { .. } => "login",
            Self::Logout { .. } => "logout",
            Self::Move { .. } => "move",
            Self::DirectEdit { .. } => "edit",
            Self::Bomb { .. } => "bomb",
            Self::AdvanceStep => "advance",
            Self::ToggleTree { .. } => "toggle-tree",
            Self::AdvanceTrees => "advance-trees",
            Self::Snapshot { .. } => "snapshot",
        }
    }
}

/// A world-affecting action decoded from a client frame.
///
/// Unlike [`Event`] it has no source: the connection that decoded it
/// supplies its own entity id.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlayerAction {
    /// Move the sender's entity.
    Move {
        /// New position.
        to: Position,
    },
    /// Drop a bomb.
    Bomb {
        /// Centre of the blast.
        at: CellCoord,
    },
    /// Set a cell directly.
    Edit {
        /// Target cell.
        at: CellCoord,
        /// Raw value.
        value: u8,
    },
    /// Plant or clear a tree.
    ToggleTree {
        /// Target cell.
        at: CellCoord,
    },
}

impl PlayerAction {
    /// Bind the action to the entity that sent it.
    pub fn into_event(self, source: EntityId) -> Event {
        match self {
            Self::Move { to } => Event::Move { id: source, to },
            Self::Bomb { at } => Event::Bomb { at },
            Self::Edit { at, value } => Event::DirectEdit { at, value },
            Self::ToggleTree { at } => Event::ToggleTree { at },
        }
    }
}

/// Everything a client frame can decode to.
#[derive(Clone, Debug, PartialEq)]
pub enum Inbound {
    /// Forwarded to the world.
    Action(PlayerAction),
    /// Appended to the chat backlog and broadcast.
    Chat(String),
    /// Liveness acknowledgement; only extends the read deadline.
    Pong,
}
