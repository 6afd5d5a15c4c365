//! Runtime for the warfield shared world.
//!
//! Every piece of mutable state has exactly one owning thread:
//!
//! ```text
//!   Connection (reader) ──Event──▶ WorldActor ◀──advance/snapshot── Scheduler
//!        │                            ▲                                 │
//!        │ chat / unregister          │ login / logout                  │ broadcast
//!        ▼                            │                                 ▼
//!   ConnectionHub ────────────────────┘                          ConnectionHub
//!        │ try_send (evict on full)
//!        ▼
//!   Connection (writer) ──frames──▶ socket
//! ```
//!
//! - [`WorldActor`] owns the [`World`] (entity table + automaton).
//! - [`ConnectionHub`] owns the connection registry and chat backlog.
//! - [`Connection`] runs one reader and one writer thread per socket.
//! - [`Scheduler`] advances the world and publishes snapshots.
//! - [`Server`] wires all of the above from a [`ServerConfig`].
//!
//! All communication is over bounded `crossbeam-channel` queues; no
//! locks guard world or registry state.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod actor;
pub mod chat;
pub mod config;
pub mod connection;
pub mod hub;
pub mod metrics;
pub mod names;
pub mod scheduler;
pub mod server;
pub mod world;

pub use actor::{WorldActor, WorldHandle};
pub use chat::ChatBacklog;
pub use config::{ConfigError, ServerConfig};
pub use connection::{Connection, ConnectionContext, ConnectionError, Duplex, PumpSettings};
pub use hub::{ConnectionHub, HubHandle, Registration};
pub use metrics::{HubMetrics, WorldMetrics};
pub use names::{NameSource, RandomNames};
pub use scheduler::{FireOutcome, RunningScheduler, Scheduler};
pub use server::{Server, ShutdownReport};
pub use world::World;
