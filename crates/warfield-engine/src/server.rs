//! Wiring: one world actor, one hub, one scheduler, many connections.

use std::sync::Arc;
use std::time::Instant;

use log::info;
use warfield_core::Codec;

use crate::actor::{WorldActor, WorldHandle};
use crate::config::{ConfigError, ServerConfig};
use crate::connection::{Connection, ConnectionContext, ConnectionError, Duplex, PumpSettings};
use crate::hub::{ConnectionHub, HubHandle};
use crate::metrics::{HubMetrics, WorldMetrics};
use crate::names::NameSource;
use crate::scheduler::{RunningScheduler, Scheduler};
use crate::world::World;

// ── ShutdownReport ─────────────────────────────────────────────────

/// What [`Server::shutdown`] recovered from each thread.
#[derive(Debug)]
pub struct ShutdownReport {
    /// Total time spent in the shutdown sequence.
    pub total_ms: u64,
    /// Scheduler firings that published a snapshot, if it was joined.
    pub published: Option<u64>,
    /// Final hub counters, if the hub thread was joined.
    pub hub: Option<HubMetrics>,
    /// Final world counters, if the world thread was joined.
    pub world: Option<WorldMetrics>,
}

// ── Server ─────────────────────────────────────────────────────────

/// A running warfield server.
///
/// Accepting sockets is left to the caller: hand every already-upgraded
/// stream to [`Server::accept`].
pub struct Server {
    config: ServerConfig,
    context: ConnectionContext,
    scheduler: Option<RunningScheduler>,
    hub: Option<ConnectionHub>,
    world: Option<WorldActor>,
}

impl Server {
    /// Validate `config`, build the world and start every background
    /// thread.
    pub fn start<N: NameSource>(
        config: ServerConfig,
        codec: Arc<dyn Codec>,
        names: N,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let world = WorldActor::spawn(World::new(&config)?, config.world_queue)?;
        let hub = ConnectionHub::spawn(
            &config,
            world.handle(),
            Box::new(names),
            Arc::clone(&codec),
        )?;
        let scheduler = Scheduler::new(world.handle(), hub.handle(), Arc::clone(&codec))
            .with_tree_steps(config.step_trees)
            .spawn(config.step_interval)?;
        let context = ConnectionContext {
            world: world.handle(),
            hub: hub.handle(),
            codec,
            settings: PumpSettings::from_config(&config),
        };
        info!(
            "server started: max {} connections, step every {:?}",
            config.max_connections, config.step_interval
        );
        Ok(Self {
            config,
            context,
            scheduler: Some(scheduler),
            hub: Some(hub),
            world: Some(world),
        })
    }

    /// Register `stream` and start its pumps.
    pub fn accept<S: Duplex>(&self, stream: S) -> Result<Connection, ConnectionError> {
        Connection::open(stream, &self.context)
    }

    /// The validated configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// A world submission handle.
    pub fn world(&self) -> WorldHandle {
        self.context.world.clone()
    }

    /// A hub submission handle.
    pub fn hub(&self) -> HubHandle {
        self.context.hub.clone()
    }

    /// The context handed to every connection.
    pub fn context(&self) -> &ConnectionContext {
        &self.context
    }

    /// Stop the scheduler, then the hub (closing every connection), then
    /// the world.
    pub fn shutdown(&mut self) -> ShutdownReport {
        let start = Instant::now();
        let published = self.scheduler.take().and_then(|mut s| s.shutdown());
        let hub = self.hub.take().and_then(|mut h| h.shutdown());
        let world = self
            .world
            .take()
            .and_then(|mut w| w.shutdown())
            .map(|w| w.metrics().clone());
        let report = ShutdownReport {
            total_ms: start.elapsed().as_millis() as u64,
            published,
            hub,
            world,
        };
        if report.world.is_some() {
            info!("server stopped in {} ms", report.total_ms);
        }
        report
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use warfield_test_utils::{sequential_names, PlainCodec};

    fn quiet_config() -> ServerConfig {
        ServerConfig {
            width: 8,
            height: 6,
            seed: Some(7),
            step_interval: Duration::from_secs(3600),
            ..ServerConfig::default()
        }
    }

    #[test]
    fn invalid_config_is_rejected_before_spawning() {
        let config = ServerConfig {
            max_connections: 0,
            ..quiet_config()
        };
        let res = Server::start(config, Arc::new(PlainCodec), sequential_names("p"));
        assert!(matches!(
            res,
            Err(ConfigError::ZeroCapacity {
                name: "max_connections"
            })
        ));
    }

    #[test]
    fn started_server_answers_snapshots() {
        let server =
            Server::start(quiet_config(), Arc::new(PlainCodec), sequential_names("p")).unwrap();
        let snap = server.world().snapshot().unwrap();
        assert_eq!((snap.width, snap.height), (8, 6));
        assert_eq!(snap.cells.len(), 48);
        assert_eq!(snap.trees.len(), 48);
        assert_eq!(server.hub().count(), Ok(0));
    }

    #[test]
    fn shutdown_reports_each_thread_once() {
        let mut server =
            Server::start(quiet_config(), Arc::new(PlainCodec), sequential_names("p")).unwrap();
        server.world().advance().unwrap();
        let report = server.shutdown();
        assert_eq!(report.published, Some(0));
        assert!(report.hub.is_some());
        assert_eq!(report.world.map(|m| m.steps), Some(1));
        let again = server.shutdown();
        assert!(again.world.is_none() && again.hub.is_none());
    }
}
