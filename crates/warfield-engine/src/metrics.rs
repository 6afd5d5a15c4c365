//! Counters kept by the world and hub loops.
//!
//! Both structs are plain values owned by their loop. Callers get copies
//! through the owning handle; there are no shared atomics.

/// Cumulative counters for the world actor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorldMetrics {
    /// Events taken off the intake queue.
    pub events_processed: u64,
    /// Generations stepped.
    pub steps: u64,
    /// Tree layer generations stepped.
    pub tree_steps: u64,
    /// Trees toggled.
    pub tree_toggles: u64,
    /// Successful logins.
    pub logins: u64,
    /// Logins refused because the entity table was full.
    pub login_refusals: u64,
    /// Entities removed.
    pub logouts: u64,
    /// Moves and logouts naming an entity that no longer exists.
    pub stale_drops: u64,
    /// Direct edits and tree toggles ignored for being off-grid or out of
    /// range.
    pub edits_ignored: u64,
    /// Bombs dropped.
    pub bombs: u64,
    /// Snapshots taken.
    pub snapshots: u64,
}

/// Cumulative counters for the connection hub.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HubMetrics {
    /// Connections admitted.
    pub registrations: u64,
    /// Registrations refused (capacity or failed login).
    pub refusals: u64,
    /// Connections removed on request.
    pub unregistrations: u64,
    /// Connections dropped because their queue was full.
    pub evictions: u64,
    /// Connections dropped because their writer had already gone.
    pub pruned: u64,
    /// Broadcast operations performed.
    pub broadcasts: u64,
    /// Frames successfully enqueued across all connections.
    pub frames_delivered: u64,
    /// Chat lines accepted.
    pub chats: u64,
}
