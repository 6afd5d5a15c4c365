//! Server configuration, validation, and error types.
//!
//! [`ServerConfig`] collects every startup-time constant. Nothing here is
//! reloadable: the values are read once when the world, hub, scheduler and
//! each connection are created.

use std::error::Error;
use std::fmt;
use std::time::Duration;

use warfield_automaton::RuleKind;
use warfield_space::SpaceError;

// ── ServerConfig ───────────────────────────────────────────────────

/// Startup configuration for a warfield server.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Field width in cells. Default: 48.
    pub width: u32,
    /// Field height in cells. Default: 48.
    pub height: u32,
    /// Transition rule. Default: [`RuleKind::War`].
    pub rule: RuleKind,
    /// Seed for the initial field and tree layer. `None` = drawn from OS
    /// entropy.
    pub seed: Option<u64>,
    /// Maximum simultaneous connections; the hub refuses beyond it. Default: 10.
    pub max_connections: usize,
    /// Chat lines kept for newly registered connections. Default: 40.
    pub chat_backlog: usize,
    /// Time between simulation steps. Default: 1 s.
    pub step_interval: Duration,
    /// Whether each scheduler firing also grows the tree layer one life
    /// generation. Default: false (trees change only when toggled).
    pub step_trees: bool,
    /// Frames a connection may have queued before it is evicted. Default: 256.
    pub outbound_queue: usize,
    /// Largest inbound frame in bytes; longer frames end the connection.
    /// Default: 1024.
    pub max_message_size: usize,
    /// Time allowed to write one batch of frames to the peer. Default: 10 s.
    pub write_wait: Duration,
    /// Time allowed between inbound frames before the peer is considered
    /// dead. Default: 60 s.
    pub pong_wait: Duration,
    /// Interval between liveness pings. Must be shorter than `pong_wait`.
    /// Default: 9/10 of `pong_wait`.
    pub ping_period: Duration,
    /// Capacity of the world actor's event queue. Default: 1024.
    pub world_queue: usize,
    /// Capacity of the hub's command queue. Default: 256.
    pub hub_queue: usize,
    /// Entity table limit; logins beyond it are refused. `None` = unbounded.
    pub max_entities: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let pong_wait = Duration::from_secs(60);
        Self {
            width: 48,
            height: 48,
            rule: RuleKind::War,
            seed: None,
            max_connections: 10,
            chat_backlog: 40,
            step_interval: Duration::from_secs(1),
            step_trees: false,
            outbound_queue: 256,
            max_message_size: 1024,
            write_wait: Duration::from_secs(10),
            pong_wait,
            ping_period: pong_wait * 9 / 10,
            world_queue: 1024,
            hub_queue: 256,
            max_entities: None,
        }
    }
}

impl ServerConfig {
    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("width", self.width), ("height", self.height)] {
            if value == 0 {
                return Err(ConfigError::ZeroDimension { name });
            }
        }
        for (name, value) in [
            ("max_connections", self.max_connections),
            ("outbound_queue", self.outbound_queue),
            ("max_message_size", self.max_message_size),
            ("world_queue", self.world_queue),
            ("hub_queue", self.hub_queue),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroCapacity { name });
            }
        }
        for (name, value) in [
            ("step_interval", self.step_interval),
            ("write_wait", self.write_wait),
            ("pong_wait", self.pong_wait),
            ("ping_period", self.ping_period),
        ] {
            if value.is_zero() {
                return Err(ConfigError::ZeroInterval { name });
            }
        }
        if self.ping_period >= self.pong_wait {
            return Err(ConfigError::PingNotBeforePong {
                ping_period: self.ping_period,
                pong_wait: self.pong_wait,
            });
        }
        Ok(())
    }

    /// The configured seed, or a fresh one from OS entropy.
    pub fn resolved_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`ServerConfig::validate()`] or while starting
/// the server's threads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A field dimension is zero.
    ZeroDimension {
        /// Which dimension.
        name: &'static str,
    },
    /// A queue or limit is zero.
    ZeroCapacity {
        /// Which setting.
        name: &'static str,
    },
    /// A timer interval is zero.
    ZeroInterval {
        /// Which setting.
        name: &'static str,
    },
    /// The liveness ping would not arrive before the peer's read deadline.
    PingNotBeforePong {
        /// Configured ping interval.
        ping_period: Duration,
        /// Configured read deadline.
        pong_wait: Duration,
    },
    /// The field could not be built.
    Space(SpaceError),
    /// A background thread could not be spawned.
    ThreadSpawnFailed {
        /// Description of which thread failed.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroDimension { name } => write!(f, "{name} must be at least 1"),
            Self::ZeroCapacity { name } => write!(f, "{name} must be at least 1"),
            Self::ZeroInterval { name } => write!(f, "{name} must be non-zero"),
            Self::PingNotBeforePong {
                ping_period,
                pong_wait,
            } => write!(
                f,
                "ping_period {ping_period:?} must be shorter than pong_wait {pong_wait:?}"
            ),
            Self::Space(e) => write!(f, "field: {e}"),
            Self::ThreadSpawnFailed { reason } => write!(f, "thread spawn failed: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Space(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SpaceError> for ConfigError {
    fn from(e: SpaceError) -> Self {
        Self::Space(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let c = ServerConfig::default();
        assert!(c.validate().is_ok());
        assert_eq!(c.ping_period, Duration::from_secs(54));
        assert_eq!((c.width, c.height), (48, 48));
        assert_eq!(c.max_connections, 10);
        assert_eq!(c.chat_backlog, 40);
        assert!(!c.step_trees);
    }

    #[test]
    fn zero_dimension_rejected() {
        let c = ServerConfig {
            height: 0,
            ..ServerConfig::default()
        };
        assert_eq!(c.validate(), Err(ConfigError::ZeroDimension { name: "height" }));
    }

    #[test]
    fn zero_capacity_rejected() {
        let c = ServerConfig {
            outbound_queue: 0,
            ..ServerConfig::default()
        };
        assert_eq!(
            c.validate(),
            Err(ConfigError::ZeroCapacity {
                name: "outbound_queue"
            })
        );
    }

    #[test]
    fn zero_step_interval_rejected() {
        let c = ServerConfig {
            step_interval: Duration::ZERO,
            ..ServerConfig::default()
        };
        assert_eq!(
            c.validate(),
            Err(ConfigError::ZeroInterval {
                name: "step_interval"
            })
        );
    }

    #[test]
    fn ping_must_precede_pong_deadline() {
        let c = ServerConfig {
            ping_period: Duration::from_secs(60),
            ..ServerConfig::default()
        };
        assert!(matches!(
            c.validate(),
            Err(ConfigError::PingNotBeforePong { .. })
        ));
    }

    #[test]
    fn zero_chat_backlog_is_allowed() {
        let c = ServerConfig {
            chat_backlog: 0,
            ..ServerConfig::default()
        };
        assert!(c.validate().is_ok());
    }

    #[test]
    fn fixed_seed_is_used() {
        let c = ServerConfig {
            seed: Some(99),
            ..ServerConfig::default()
        };
        assert_eq!(c.resolved_seed(), 99);
    }
}
