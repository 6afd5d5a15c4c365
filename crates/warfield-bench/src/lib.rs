//! Benchmark profiles for warfield.
//!
//! - [`reference_profile`]: the default 48x48 field
//! - [`stress_profile`]: 512x512 (~262K cells)
//! - [`populated_world`]: a world with logged-in players, for snapshot costs

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use warfield_automaton::{Automaton, RuleKind};
use warfield_core::{CellCoord, Position};
use warfield_engine::{ServerConfig, World};

/// A 48x48 automaton running `rule`, seeded deterministically.
pub fn reference_profile(rule: RuleKind, seed: u64) -> Automaton {
    profile(48, 48, rule, seed)
}

/// A 512x512 automaton for stress runs.
pub fn stress_profile(rule: RuleKind, seed: u64) -> Automaton {
    profile(512, 512, rule, seed)
}

fn profile(width: u32, height: u32, rule: RuleKind, seed: u64) -> Automaton {
    match Automaton::new(width, height, rule.build(), seed) {
        Ok(a) => a,
        Err(e) => panic!("benchmark profile {width}x{height} rejected: {e}"),
    }
}

/// A default-sized world with `players` entities spread along the diagonal.
pub fn populated_world(players: usize, seed: u64) -> World {
    let config = ServerConfig {
        seed: Some(seed),
        ..ServerConfig::default()
    };
    let mut world = match World::new(&config) {
        Ok(w) => w,
        Err(e) => panic!("default config rejected: {e}"),
    };
    for i in 0..players {
        if let Some(id) = world.login(format!("player{i}")) {
            let at = (i % config.width as usize) as f64;
            world.move_entity(id, Position::new(at, at));
        }
    }
    world
}

/// `n` deterministic bomb targets inside a `width × height` field.
pub fn bomb_targets(n: usize, width: u32, height: u32) -> Vec<CellCoord> {
    (0..n as u64)
        .map(|i| {
            let x = (i.wrapping_mul(6364136223846793007) % u64::from(width)) as i32;
            let y = (i.wrapping_mul(1442695040888963407) % u64::from(height)) as i32;
            CellCoord::new(x, y)
        })
        .collect()
}
