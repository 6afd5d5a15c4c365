//! The world actor: one thread, one queue, exclusive ownership of [`World`].
//!
//! The world is moved onto a dedicated thread. Producers hold cloneable
//! [`WorldHandle`]s and send [`Event`]s over a bounded channel; the loop
//! processes each event to completion, reply included, before taking the
//! next one. Nothing else can reach the world, so no lock is needed.
//!
//! Shutdown drops the shutdown sender. The loop answers whatever is
//! still queued and returns the world through its `JoinHandle`.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{select, Receiver, Sender, TrySendError};
use log::{debug, info};
use warfield_core::{reply_pair, CellCoord, EntityId, Event, Position, SubmitError, WorldSnapshot};

use crate::config::ConfigError;
use crate::world::World;

/// Cloneable submission side of the world actor.
#[derive(Clone, Debug)]
pub struct WorldHandle {
    tx: Sender<Event>,
}

impl WorldHandle {
    /// Enqueue an event, blocking while the intake is full.
    pub fn submit(&self, event: Event) -> Result<(), SubmitError> {
        self.tx.send(event).map_err(|_| SubmitError::Shutdown)
    }

    /// Enqueue an event without blocking.
    pub fn try_submit(&self, event: Event) -> Result<(), SubmitError> {
        self.tx.try_send(event).map_err(|e| match e {
            TrySendError::Full(_) => SubmitError::ChannelFull,
            TrySendError::Disconnected(_) => SubmitError::Shutdown,
        })
    }

    /// Log in and wait for the assigned id (`None` if refused).
    pub fn login(&self, name: impl Into<String>) -> Result<Option<EntityId>, SubmitError> {
        let (reply, pending) = reply_pair();
        self.submit(Event::Login {
            name: name.into(),
            reply,
        })?;
        pending.wait()
    }

    /// Log out. Fire-and-forget.
    pub fn logout(&self, id: EntityId) -> Result<(), SubmitError> {
        self.submit(Event::Logout { id })
    }

    /// Move an entity. Fire-and-forget.
    pub fn move_to(&self, id: EntityId, to: Position) -> Result<(), SubmitError> {
        self.submit(Event::Move { id, to })
    }

    /// Write one cell. Fire-and-forget.
    pub fn edit(&self, at: CellCoord, value: u8) -> Result<(), SubmitError> {
        self.submit(Event::DirectEdit { at, value })
    }

    /// Drop a bomb. Fire-and-forget.
    pub fn bomb(&self, at: CellCoord) -> Result<(), SubmitError> {
        self.submit(Event::Bomb { at })
    }

    /// Step the automaton. Fire-and-forget.
    pub fn advance(&self) -> Result<(), SubmitError> {
        self.submit(Event::AdvanceStep)
    }

    /// Plant or clear the tree on a cell. Fire-and-forget.
    pub fn toggle_tree(&self, at: CellCoord) -> Result<(), SubmitError> {
        self.submit(Event::ToggleTree { at })
    }

    /// Step the tree layer. Fire-and-forget.
    pub fn advance_trees(&self) -> Result<(), SubmitError> {
        self.submit(Event::AdvanceTrees)
    }

    /// Take a snapshot and wait for it.
    pub fn snapshot(&self) -> Result<WorldSnapshot, SubmitError> {
        let (reply, pending) = reply_pair();
        self.submit(Event::Snapshot { reply })?;
        pending.wait()
    }
}

/// Owner of the world thread.
///
/// Dropping the actor shuts the thread down.
pub struct WorldActor {
    handle: WorldHandle,
    shutdown_tx: Option<Sender<()>>,
    thread: Option<JoinHandle<World>>,
}

impl WorldActor {
    /// Move `world` onto a new `warfield-world` thread with an intake of
    /// `queue` events.
    pub fn spawn(world: World, queue: usize) -> Result<Self, ConfigError> {
        let (tx, rx) = crossbeam_channel::bounded(queue);
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(0);
        let thread = thread::Builder::new()
            .name("warfield-world".into())
            .spawn(move || run(world, rx, shutdown_rx))
            .map_err(|e| ConfigError::ThreadSpawnFailed {
                reason: format!("world thread: {e}"),
            })?;
        Ok(Self {
            handle: WorldHandle { tx },
            shutdown_tx: Some(shutdown_tx),
            thread: Some(thread),
        })
    }

    /// A new submission handle.
    pub fn handle(&self) -> WorldHandle {
        self.handle.clone()
    }

    /// Stop the loop and recover the world.
    ///
    /// Returns `None` if already shut down or if the thread panicked.
    pub fn shutdown(&mut self) -> Option<World> {
        self.shutdown_tx.take();
        let world = self.thread.take()?.join().ok();
        if world.is_some() {
            info!("world actor stopped");
        }
        world
    }
}

impl Drop for WorldActor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// The sequential event loop.
fn run(mut world: World, rx: Receiver<Event>, shutdown: Receiver<()>) -> World {
    info!("world actor started");
    loop {
        select! {
            recv(rx) -> msg => match msg {
                Ok(event) => world.handle(event),
                // Every handle dropped.
                Err(_) => break,
            },
            recv(shutdown) -> _ => break,
        }
    }
    // Answer anything already accepted so no caller is left waiting.
    let mut drained = 0usize;
    for event in rx.try_iter() {
        world.handle(event);
        drained += 1;
    }
    if drained > 0 {
        debug!("world actor drained {drained} events at shutdown");
    }
    world
}
