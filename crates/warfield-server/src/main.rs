//! `warfield-server`: one shared warfield world served over TCP.
//!
//! Every accepted stream is a client speaking newline-delimited JSON as
//! described in `warfield-wire`. Logging goes through `env_logger`;
//! `RUST_LOG` overrides the default `info` level.

#![deny(missing_docs)]
#![forbid(unsafe_code)]

use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use warfield_automaton::RuleKind;
use warfield_engine::{RandomNames, Server, ServerConfig};
use warfield_wire::JsonCodec;

/// Command-line options.
#[derive(Debug, Parser)]
#[command(name = "warfield-server", version, about = "Shared-world cellular automaton server")]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:8080")]
    addr: String,
    /// Field width in cells.
    #[arg(long, default_value_t = 48)]
    width: u32,
    /// Field height in cells.
    #[arg(long, default_value_t = 48)]
    height: u32,
    /// Transition rule: war, wave or tricolor.
    #[arg(long, default_value_t = RuleKind::War)]
    rule: RuleKind,
    /// Connections beyond this are refused.
    #[arg(long, default_value_t = 10)]
    max_connections: usize,
    /// Chat lines replayed to newcomers.
    #[arg(long, default_value_t = 40)]
    chat_backlog: usize,
    /// Milliseconds between simulation steps.
    #[arg(long, default_value_t = 1000)]
    step_ms: u64,
    /// Advance the tree layer once per simulation step.
    #[arg(long)]
    step_trees: bool,
    /// Seed for the initial field and player names. Random when absent.
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    fn config(&self) -> ServerConfig {
        ServerConfig {
            width: self.width,
            height: self.height,
            rule: self.rule,
            seed: self.seed,
            max_connections: self.max_connections,
            chat_backlog: self.chat_backlog,
            step_interval: Duration::from_millis(self.step_ms),
            step_trees: self.step_trees,
            ..ServerConfig::default()
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = args.config();
    let seed = config.resolved_seed();
    config.seed = Some(seed);
    let server = Server::start(config, Arc::new(JsonCodec), RandomNames::seeded(seed))
        .context("starting server")?;

    let listener =
        TcpListener::bind(&args.addr).with_context(|| format!("binding {}", args.addr))?;
    info!(
        "listening on {} (rule {}, seed {seed})",
        listener.local_addr()?,
        args.rule
    );

    for stream in listener.incoming() {
        let stream = match stream {
            Ok(stream) => stream,
            Err(e) => {
                warn!("accept failed: {e}");
                continue;
            }
        };
        let peer = stream
            .peer_addr()
            .map_or_else(|_| "unknown peer".to_string(), |a| a.to_string());
        match server.accept(stream) {
            Ok(conn) => info!("{peer} is {} ({})", conn.id(), conn.name()),
            Err(e) => warn!("{peer} not admitted: {e}"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults_match_server_config() {
        let args = Args::try_parse_from(["warfield-server"]).unwrap();
        let config = args.config();
        let defaults = ServerConfig::default();
        assert_eq!((config.width, config.height), (defaults.width, defaults.height));
        assert_eq!(config.max_connections, defaults.max_connections);
        assert_eq!(config.chat_backlog, defaults.chat_backlog);
        assert_eq!(config.step_interval, defaults.step_interval);
        assert_eq!(config.rule, RuleKind::War);
        assert_eq!(config.step_trees, defaults.step_trees);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::try_parse_from([
            "warfield-server",
            "--rule",
            "Wave",
            "--width",
            "16",
            "--step-ms",
            "250",
            "--seed",
            "9",
            "--step-trees",
        ])
        .unwrap();
        let config = args.config();
        assert_eq!(config.rule, RuleKind::Wave);
        assert_eq!(config.width, 16);
        assert_eq!(config.step_interval, Duration::from_millis(250));
        assert_eq!(config.seed, Some(9));
        assert!(config.step_trees);
    }

    #[test]
    fn unknown_rule_is_rejected() {
        assert!(Args::try_parse_from(["warfield-server", "--rule", "chess"]).is_err());
    }
}
