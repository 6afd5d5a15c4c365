//! Fixed-interval stepping and snapshot publication.
//!
//! Each firing asks the hub how many connections are registered, and with
//! nobody watching does nothing at all. Otherwise it advances the world one
//! generation (and the tree layer too, when enabled), takes a snapshot,
//! encodes it and broadcasts the frames.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{select, Receiver, Sender};
use log::{debug, info};
use warfield_core::{Codec, Generation, SubmitError};

use crate::actor::WorldHandle;
use crate::config::ConfigError;
use crate::hub::HubHandle;

/// What one firing did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FireOutcome {
    /// No connections; the world was not touched.
    Skipped,
    /// The world advanced and its snapshot was broadcast.
    Published {
        /// Generation after the step.
        generation: Generation,
        /// Frames handed to the hub.
        frames: usize,
    },
}

/// Drives the world forward on behalf of its viewers.
pub struct Scheduler {
    world: WorldHandle,
    hub: HubHandle,
    codec: Arc<dyn Codec>,
    step_trees: bool,
}

impl Scheduler {
    /// A scheduler stepping `world` and publishing through `hub`.
    pub fn new(world: WorldHandle, hub: HubHandle, codec: Arc<dyn Codec>) -> Self {
        Self {
            world,
            hub,
            codec,
            step_trees: false,
        }
    }

    /// Also advance the tree layer on every publishing firing.
    pub fn with_tree_steps(mut self, step_trees: bool) -> Self {
        self.step_trees = step_trees;
        self
    }

    /// Perform one firing synchronously.
    ///
    /// Fails only when the world or hub has shut down.
    pub fn fire_once(&self) -> Result<FireOutcome, SubmitError> {
        if self.hub.count()? == 0 {
            return Ok(FireOutcome::Skipped);
        }
        self.world.advance()?;
        if self.step_trees {
            self.world.advance_trees()?;
        }
        let snapshot = self.world.snapshot()?;
        let frames = self.codec.encode_snapshot(&snapshot);
        let count = frames.len();
        self.hub.broadcast(frames)?;
        debug!("published generation {}", snapshot.generation.0);
        Ok(FireOutcome::Published {
            generation: snapshot.generation,
            frames: count,
        })
    }

    /// Fire every `interval` on a `warfield-scheduler` thread.
    pub fn spawn(self, interval: Duration) -> Result<RunningScheduler, ConfigError> {
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(0);
        let thread = thread::Builder::new()
            .name("warfield-scheduler".into())
            .spawn(move || run(self, interval, shutdown_rx))
            .map_err(|e| ConfigError::ThreadSpawnFailed {
                reason: format!("scheduler thread: {e}"),
            })?;
        Ok(RunningScheduler {
            shutdown_tx: Some(shutdown_tx),
            thread: Some(thread),
        })
    }
}

/// Handle to a spawned scheduler. Dropping it stops the timer.
pub struct RunningScheduler {
    shutdown_tx: Option<Sender<()>>,
    thread: Option<JoinHandle<u64>>,
}

impl RunningScheduler {
    /// Stop firing. Returns the number of published firings, or `None` if
    /// already stopped.
    pub fn shutdown(&mut self) -> Option<u64> {
        self.shutdown_tx.take();
        self.thread.take()?.join().ok()
    }
}

impl Drop for RunningScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(scheduler: Scheduler, interval: Duration, shutdown: Receiver<()>) -> u64 {
    info!("scheduler started, interval {interval:?}");
    let ticker = crossbeam_channel::tick(interval);
    let mut published = 0u64;
    loop {
        select! {
            recv(ticker) -> _ => match scheduler.fire_once() {
                Ok(FireOutcome::Published { .. }) => published += 1,
                Ok(FireOutcome::Skipped) => {}
                Err(e) => {
                    info!("scheduler stopping: {e}");
                    break;
                }
            },
            recv(shutdown) -> _ => break,
        }
    }
    info!("scheduler stopped after {published} publications");
    published
}
