//! The connection hub: registry, chat backlog and fan-out broadcast.
//!
//! Like the world actor, the hub is a single thread draining a bounded
//! command queue, so the registry and its size are only ever touched by one
//! loop. Connections never see the registry; they send
//! [`HubCommand`]s through a [`HubHandle`]. Connection ids are allocated by
//! that loop too, as each connection is admitted.
//!
//! # Backpressure
//!
//! Broadcast uses `try_send` on every connection's bounded outbound queue.
//! A full queue means the consumer is not keeping up: the connection is
//! removed from the registry on the spot, its queue sender is dropped
//! (which stops its writer), and its entity is logged out. One stalled
//! peer therefore costs a broadcast one failed `try_send`, never a wait.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{select, Receiver, Sender, TrySendError};
use indexmap::IndexMap;
use log::{debug, info, warn};
use warfield_core::{
    reply_pair, Codec, ConnectionId, EntityId, Frame, RegisterError, Reply, SubmitError,
};

use crate::actor::WorldHandle;
use crate::chat::ChatBacklog;
use crate::config::{ConfigError, ServerConfig};
use crate::metrics::HubMetrics;
use crate::names::NameSource;

/// Reply to a successful registration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registration {
    /// Id allocated to the connection.
    pub id: ConnectionId,
    /// Entity created by the automatic login.
    pub entity: EntityId,
    /// Display name chosen for it.
    pub name: String,
}

/// Requests understood by the hub loop.
#[derive(Debug)]
pub enum HubCommand {
    /// Admit a connection, allocate its id, log it in and replay the chat
    /// backlog to it.
    Register {
        /// Sending half of its outbound queue. The hub becomes the only
        /// holder; dropping it closes the queue.
        outbound: Sender<Frame>,
        /// Outcome.
        reply: Reply<Result<Registration, RegisterError>>,
    },
    /// Remove a connection and log out its entity. No-op if absent.
    Unregister {
        /// Connection to remove.
        id: ConnectionId,
    },
    /// Enqueue frames on every registered connection.
    Broadcast {
        /// Frames, in order.
        frames: Vec<Frame>,
    },
    /// Record a chat line from a connection and broadcast it.
    Chat {
        /// Sender.
        from: ConnectionId,
        /// Message text.
        text: String,
    },
    /// Number of registered connections.
    Count {
        /// Where the count goes.
        reply: Reply<usize>,
    },
    /// Copy of the hub counters.
    Metrics {
        /// Where the copy goes.
        reply: Reply<HubMetrics>,
    },
}

/// Cloneable submission side of the hub.
#[derive(Clone, Debug)]
pub struct HubHandle {
    tx: Sender<HubCommand>,
}

impl HubHandle {
    fn send(&self, cmd: HubCommand) -> Result<(), SubmitError> {
        self.tx.send(cmd).map_err(|_| SubmitError::Shutdown)
    }

    /// Register a connection whose outbound queue is fed by `outbound`.
    /// The reply carries the id the hub allocated for it.
    pub fn register(&self, outbound: Sender<Frame>) -> Result<Registration, RegisterError> {
        let (reply, pending) = reply_pair();
        self.send(HubCommand::Register { outbound, reply })?;
        pending.wait()?
    }

    /// Unregister a connection. Idempotent.
    pub fn unregister(&self, id: ConnectionId) -> Result<(), SubmitError> {
        self.send(HubCommand::Unregister { id })
    }

    /// Broadcast frames to every connection.
    pub fn broadcast(&self, frames: Vec<Frame>) -> Result<(), SubmitError> {
        self.send(HubCommand::Broadcast { frames })
    }

    /// Post a chat line on behalf of `from`.
    pub fn chat(&self, from: ConnectionId, text: String) -> Result<(), SubmitError> {
        self.send(HubCommand::Chat { from, text })
    }

    /// Number of registered connections.
    pub fn count(&self) -> Result<usize, SubmitError> {
        let (reply, pending) = reply_pair();
        self.send(HubCommand::Count { reply })?;
        pending.wait()
    }

    /// Copy of the hub counters.
    pub fn metrics(&self) -> Result<HubMetrics, SubmitError> {
        let (reply, pending) = reply_pair();
        self.send(HubCommand::Metrics { reply })?;
        pending.wait()
    }
}

/// One registry row.
#[derive(Debug)]
struct Registered {
    outbound: Sender<Frame>,
    entity: EntityId,
    name: String,
}

/// Why a connection left the registry during a broadcast.
enum Dropped {
    Full,
    Gone,
}

/// State owned by the hub loop.
pub(crate) struct HubState {
    registry: IndexMap<ConnectionId, Registered>,
    next_id: ConnectionId,
    backlog: ChatBacklog,
    max_connections: usize,
    world: WorldHandle,
    names: Box<dyn NameSource>,
    codec: Arc<dyn Codec>,
    metrics: HubMetrics,
}

impl HubState {
    pub(crate) fn new(
        max_connections: usize,
        chat_backlog: usize,
        world: WorldHandle,
        names: Box<dyn NameSource>,
        codec: Arc<dyn Codec>,
    ) -> Self {
        Self {
            registry: IndexMap::new(),
            next_id: ConnectionId::FIRST,
            backlog: ChatBacklog::new(chat_backlog),
            max_connections,
            world,
            names,
            codec,
            metrics: HubMetrics::default(),
        }
    }

    pub(crate) fn handle(&mut self, cmd: HubCommand) {
        match cmd {
            HubCommand::Register { outbound, reply } => {
                reply.send(self.register(outbound));
            }
            HubCommand::Unregister { id } => self.unregister(id),
            HubCommand::Broadcast { frames } => self.broadcast(&frames),
            HubCommand::Chat { from, text } => self.chat(from, &text),
            HubCommand::Count { reply } => {
                reply.send(self.registry.len());
            }
            HubCommand::Metrics { reply } => {
                reply.send(self.metrics.clone());
            }
        }
    }

    fn register(&mut self, outbound: Sender<Frame>) -> Result<Registration, RegisterError> {
        if self.registry.len() >= self.max_connections {
            self.metrics.refusals += 1;
            warn!(
                "connection refused: limit of {} reached",
                self.max_connections
            );
            return Err(RegisterError::AtCapacity {
                max: self.max_connections,
            });
        }
        let name = self.names.next_name();
        let entity = match self.world.login(name.clone()) {
            Ok(Some(entity)) => entity,
            Ok(None) => {
                self.metrics.refusals += 1;
                warn!("connection refused: world rejected login for '{name}'");
                return Err(RegisterError::LoginFailed);
            }
            Err(_) => return Err(RegisterError::Shutdown),
        };
        let id = self.next_id;
        self.next_id = id.next();
        for frame in self.backlog.iter() {
            if outbound.try_send(frame.clone()).is_err() {
                debug!("{id}: backlog replay cut short");
                break;
            }
        }
        info!(
            "{id} registered as entity {entity} '{name}' ({} connected)",
            self.registry.len() + 1
        );
        self.registry.insert(
            id,
            Registered {
                outbound,
                entity,
                name: name.clone(),
            },
        );
        self.metrics.registrations += 1;
        Ok(Registration { id, entity, name })
    }

    fn unregister(&mut self, id: ConnectionId) {
        match self.registry.shift_remove(&id) {
            Some(r) => {
                self.metrics.unregistrations += 1;
                info!(
                    "{id} unregistered, entity {} ({} connected)",
                    r.entity,
                    self.registry.len()
                );
                self.logout(r.entity);
                // Dropping `r.outbound` closes the queue.
            }
            None => debug!("{id} already unregistered"),
        }
    }

    fn broadcast(&mut self, frames: &[Frame]) {
        self.metrics.broadcasts += 1;
        let mut departed = Vec::new();
        let mut delivered = 0u64;
        self.registry.retain(|id, r| {
            for frame in frames {
                match r.outbound.try_send(frame.clone()) {
                    Ok(()) => delivered += 1,
                    Err(TrySendError::Full(_)) => {
                        warn!("{id} evicted: outbound queue full");
                        departed.push((r.entity, Dropped::Full));
                        return false;
                    }
                    Err(TrySendError::Disconnected(_)) => {
                        debug!("{id} pruned: writer gone");
                        departed.push((r.entity, Dropped::Gone));
                        return false;
                    }
                }
            }
            true
        });
        self.metrics.frames_delivered += delivered;
        for (entity, why) in departed {
            match why {
                Dropped::Full => self.metrics.evictions += 1,
                Dropped::Gone => self.metrics.pruned += 1,
            }
            self.logout(entity);
        }
    }

    fn chat(&mut self, from: ConnectionId, text: &str) {
        let Some(sender) = self.registry.get(&from) else {
            debug!("chat from unregistered {from} dropped");
            return;
        };
        let line = format!("{}: {}", sender.name, text);
        let frame = self.codec.encode_chat(&line);
        self.metrics.chats += 1;
        self.backlog.push(frame.clone());
        self.broadcast(&[frame]);
    }

    fn logout(&self, entity: EntityId) {
        if self.world.logout(entity).is_err() {
            debug!("world gone; logout of entity {entity} skipped");
        }
    }

    pub(crate) fn metrics(&self) -> &HubMetrics {
        &self.metrics
    }
}

/// Owner of the hub thread.
///
/// Dropping the hub shuts the thread down; every outbound queue still in
/// the registry is closed as the registry is dropped.
pub struct ConnectionHub {
    handle: HubHandle,
    shutdown_tx: Option<Sender<()>>,
    thread: Option<JoinHandle<HubMetrics>>,
}

impl ConnectionHub {
    /// Spawn the `warfield-hub` thread.
    pub fn spawn(
        config: &ServerConfig,
        world: WorldHandle,
        names: Box<dyn NameSource>,
        codec: Arc<dyn Codec>,
    ) -> Result<Self, ConfigError> {
        let state = HubState::new(
            config.max_connections,
            config.chat_backlog,
            world,
            names,
            codec,
        );
        let (tx, rx) = crossbeam_channel::bounded(config.hub_queue);
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(0);
        let thread = thread::Builder::new()
            .name("warfield-hub".into())
            .spawn(move || run(state, rx, shutdown_rx))
            .map_err(|e| ConfigError::ThreadSpawnFailed {
                reason: format!("hub thread: {e}"),
            })?;
        Ok(Self {
            handle: HubHandle { tx },
            shutdown_tx: Some(shutdown_tx),
            thread: Some(thread),
        })
    }

    /// A new submission handle.
    pub fn handle(&self) -> HubHandle {
        self.handle.clone()
    }

    /// Stop the loop, closing every connection's queue. Returns the final
    /// counters, or `None` if already stopped.
    pub fn shutdown(&mut self) -> Option<HubMetrics> {
        self.shutdown_tx.take();
        let metrics = self.thread.take()?.join().ok();
        if metrics.is_some() {
            info!("hub stopped");
        }
        metrics
    }
}

impl Drop for ConnectionHub {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(mut state: HubState, rx: Receiver<HubCommand>, shutdown: Receiver<()>) -> HubMetrics {
    info!("hub started");
    loop {
        select! {
            recv(rx) -> msg => match msg {
                Ok(cmd) => state.handle(cmd),
                Err(_) => break,
            },
            recv(shutdown) -> _ => break,
        }
    }
    state.metrics().clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::WorldActor;
    use crate::world::World;
    use warfield_automaton::{Automaton, War};
    use warfield_test_utils::{field_from_rows, sequential_names, PlainCodec};

    struct Fixture {
        actor: WorldActor,
        state: HubState,
    }

    fn fixture(max_connections: usize, backlog: usize) -> Fixture {
        let field = field_from_rows(&["000", "000", "000"]);
        let world = World::with_automaton(Automaton::with_field(field, Box::new(War)), None);
        let actor = WorldActor::spawn(world, 64).unwrap();
        let state = HubState::new(
            max_connections,
            backlog,
            actor.handle(),
            Box::new(sequential_names("p")),
            Arc::new(PlainCodec),
        );
        Fixture { actor, state }
    }

    type Admitted = (Receiver<Frame>, Result<Registration, RegisterError>);

    fn register(state: &mut HubState, queue: usize) -> Admitted {
        let (tx, rx) = crossbeam_channel::bounded(queue);
        let res = state.register(tx);
        (rx, res)
    }

    /// Register and return the allocated id.
    fn admit(state: &mut HubState, queue: usize) -> (ConnectionId, Receiver<Frame>) {
        let (rx, res) = register(state, queue);
        (res.unwrap().id, rx)
    }

    fn drain(rx: &Receiver<Frame>) -> Vec<String> {
        rx.try_iter().map(|f| f.to_string()).collect()
    }

    // ── Registration ────────────────────────────────────────────

    #[test]
    fn register_logs_in_with_generated_name() {
        let mut f = fixture(4, 4);
        let (_rx, res) = register(&mut f.state, 8);
        let reg = res.unwrap();
        assert_eq!(reg.id, ConnectionId::FIRST);
        assert_eq!(reg.name, "p1");
        assert_eq!(reg.entity, EntityId(1));
        let snap = f.actor.handle().snapshot().unwrap();
        assert_eq!(snap.entities[0].name, "p1");
    }

    #[test]
    fn capacity_refusal_leaves_registry_untouched() {
        let mut f = fixture(2, 4);
        let (a, _ra) = admit(&mut f.state, 8);
        let (b, _rb) = admit(&mut f.state, 8);
        let (rc, res) = register(&mut f.state, 8);
        assert_eq!(res, Err(RegisterError::AtCapacity { max: 2 }));
        assert_eq!(f.state.registry.keys().copied().collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(f.state.metrics.refusals, 1);
        // The refused queue's sender was dropped with the command.
        assert!(rc.recv().is_err());
        // The refused connection never logged in.
        assert_eq!(f.actor.handle().snapshot().unwrap().entities.len(), 2);
    }

    #[test]
    fn unregister_is_idempotent_and_closes_queue() {
        let mut f = fixture(4, 4);
        let (id, rx) = admit(&mut f.state, 8);
        f.state.unregister(id);
        f.state.unregister(id);
        assert!(f.state.registry.is_empty());
        assert_eq!(f.state.metrics.unregistrations, 1);
        assert!(rx.recv().is_err(), "queue must be closed");
        assert!(f.actor.handle().snapshot().unwrap().entities.is_empty());
    }

    #[test]
    fn ids_are_allocated_per_admission_and_never_reused() {
        let mut f = fixture(2, 4);
        let (a, _ra) = admit(&mut f.state, 8);
        let (b, _rb) = admit(&mut f.state, 8);
        assert_eq!((a.get(), b.get()), (1, 2));
        // A refusal allocates nothing.
        let (_rc, refused) = register(&mut f.state, 8);
        assert!(refused.is_err());
        f.state.unregister(a);
        let (c, _rc) = admit(&mut f.state, 8);
        assert_eq!(c.get(), 3);
    }

    // ── Broadcast ───────────────────────────────────────────────

    #[test]
    fn broadcast_reaches_everyone_in_order() {
        let mut f = fixture(4, 4);
        let (_, ra) = admit(&mut f.state, 8);
        let (_, rb) = admit(&mut f.state, 8);
        f.state.broadcast(&[Frame::from("one"), Frame::from("two")]);
        assert_eq!(drain(&ra), vec!["one", "two"]);
        assert_eq!(drain(&rb), vec!["one", "two"]);
        assert_eq!(f.state.metrics.frames_delivered, 4);
    }

    #[test]
    fn full_queue_is_evicted_and_logged_out() {
        let mut f = fixture(4, 4);
        let (slow_rx, slow_reg) = register(&mut f.state, 1);
        let slow_reg = slow_reg.unwrap();
        let slow = slow_reg.id;
        let (fast, fast_rx) = admit(&mut f.state, 8);
        f.state.broadcast(&[Frame::from("a")]);
        f.state.broadcast(&[Frame::from("b")]);
        assert!(!f.state.registry.contains_key(&slow));
        assert!(f.state.registry.contains_key(&fast));
        assert_eq!(f.state.metrics.evictions, 1);
        assert_eq!(drain(&fast_rx), vec!["a", "b"]);
        // The slow consumer keeps what fit, then sees the queue closed.
        assert_eq!(slow_rx.recv().map(|f| f.to_string()), Ok("a".to_string()));
        assert!(slow_rx.recv().is_err());
        let entities = f.actor.handle().snapshot().unwrap().entities;
        assert!(entities.iter().all(|e| e.id != slow_reg.entity));
        // A later unregister from the evicted connection is harmless.
        f.state.unregister(slow);
        assert_eq!(f.state.metrics.unregistrations, 0);
    }

    #[test]
    fn dead_writer_is_pruned() {
        let mut f = fixture(4, 4);
        let (id, rx) = admit(&mut f.state, 8);
        drop(rx);
        f.state.broadcast(&[Frame::from("x")]);
        assert!(!f.state.registry.contains_key(&id));
        assert_eq!(f.state.metrics.pruned, 1);
    }

    // ── Chat ────────────────────────────────────────────────────

    #[test]
    fn chat_is_named_broadcast_and_replayed() {
        let mut f = fixture(4, 2);
        let (a, ra) = admit(&mut f.state, 8);
        for text in ["hi", "there", "all"] {
            f.state.chat(a, text);
        }
        assert_eq!(
            drain(&ra),
            vec!["chat p1: hi", "chat p1: there", "chat p1: all"]
        );
        // Backlog holds the last two, in order, for the newcomer only.
        let (_, rb) = admit(&mut f.state, 8);
        assert_eq!(drain(&rb), vec!["chat p1: there", "chat p1: all"]);
        assert!(drain(&ra).is_empty());
    }

    #[test]
    fn chat_from_stranger_is_dropped() {
        let mut f = fixture(4, 2);
        f.state.chat(ConnectionId::from(99), "boo");
        assert_eq!(f.state.metrics.chats, 0);
        assert!(f.state.backlog.is_empty());
    }

    // ── Thread ──────────────────────────────────────────────────

    #[test]
    fn spawned_hub_counts_and_shuts_down() {
        let f = fixture(4, 4);
        let config = ServerConfig::default();
        let mut hub = ConnectionHub::spawn(
            &config,
            f.actor.handle(),
            Box::new(sequential_names("q")),
            Arc::new(PlainCodec),
        )
        .unwrap();
        let h = hub.handle();
        let (tx, rx) = crossbeam_channel::bounded(4);
        let reg = h.register(tx).unwrap();
        assert_eq!(reg.name, "q1");
        assert_eq!(h.count(), Ok(1));
        let metrics = hub.shutdown().unwrap();
        assert_eq!(metrics.registrations, 1);
        assert!(rx.recv().is_err(), "shutdown closes queues");
        assert_eq!(h.count(), Err(SubmitError::Shutdown));
    }
}
