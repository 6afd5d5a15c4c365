//! World state: the entity table, the automaton and the tree layer.
//!
//! [`World`] is a plain single-threaded value. Concurrency lives entirely
//! in [`WorldActor`](crate::WorldActor), which moves the world onto its own
//! thread and feeds it one [`Event`] at a time through [`World::handle`].

use indexmap::IndexMap;
use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use warfield_automaton::Automaton;
use warfield_core::{CellCoord, Entity, EntityId, Event, Position, WorldSnapshot};
use warfield_space::{SpaceError, Trees};

use crate::config::{ConfigError, ServerConfig};
use crate::metrics::WorldMetrics;

/// ChaCha stream for the tree layer, so it never shares draws with the
/// field seeded from the same seed.
const TREE_STREAM: u64 = 1;

/// A random tree layer, thinned by one life generation.
fn seeded_trees(width: u32, height: u32, seed: u64) -> Result<Trees, SpaceError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(TREE_STREAM);
    let mut trees = Trees::from_fn(width, height, |_| rng.gen_bool(0.5))?;
    trees.step();
    Ok(trees)
}

/// Entities, automaton and trees.
#[derive(Debug)]
pub struct World {
    automaton: Automaton,
    trees: Trees,
    entities: IndexMap<EntityId, Entity>,
    next_id: u64,
    max_entities: Option<usize>,
    metrics: WorldMetrics,
}

impl World {
    /// Build the world described by `config`, seeding the field.
    pub fn new(config: &ServerConfig) -> Result<Self, ConfigError> {
        let seed = config.resolved_seed();
        let automaton = Automaton::new(config.width, config.height, config.rule.build(), seed)?;
        let trees = seeded_trees(config.width, config.height, seed)?;
        info!(
            "world created: {}x{} rule={} seed={seed} trees={}",
            config.width,
            config.height,
            config.rule,
            trees.count()
        );
        let mut world = Self::with_automaton(automaton, config.max_entities);
        world.trees = trees;
        Ok(world)
    }

    /// Wrap an existing automaton. The tree layer starts bare.
    pub fn with_automaton(automaton: Automaton, max_entities: Option<usize>) -> Self {
        Self {
            trees: Trees::bare(automaton.field().grid()),
            automaton,
            entities: IndexMap::new(),
            next_id: EntityId::FIRST.0,
            max_entities,
            metrics: WorldMetrics::default(),
        }
    }

    /// Process one event to completion, writing its reply if it has one.
    pub fn handle(&mut self, event: Event) {
        self.metrics.events_processed += 1;
        debug!("world: {}", event.kind());
        match event {
            Event::Login { name, reply } => {
                let id = self.login(name);
                reply.send(id);
            }
            Event::Logout { id } => {
                self.logout(id);
            }
            Event::Move { id, to } => {
                self.move_entity(id, to);
            }
            Event::DirectEdit { at, value } => {
                self.edit(at, value);
            }
            Event::Bomb { at } => {
                self.bomb(at);
            }
            Event::AdvanceStep => self.advance(),
            Event::ToggleTree { at } => {
                self.toggle_tree(at);
            }
            Event::AdvanceTrees => self.advance_trees(),
            Event::Snapshot { reply } => {
                reply.send(self.snapshot());
            }
        }
    }

    /// Create an entity. `None` when the table is full.
    pub fn login(&mut self, name: String) -> Option<EntityId> {
        if self.max_entities.is_some_and(|max| self.entities.len() >= max) {
            self.metrics.login_refusals += 1;
            info!("login refused for '{name}': entity table full");
            return None;
        }
        let id = EntityId(self.next_id);
        self.next_id += 1;
        info!("entity {id} logged in as '{name}'");
        self.entities.insert(id, Entity::player(id, name));
        self.metrics.logins += 1;
        Some(id)
    }

    /// Remove an entity. Returns whether it existed.
    pub fn logout(&mut self, id: EntityId) -> bool {
        match self.entities.shift_remove(&id) {
            Some(e) => {
                self.metrics.logouts += 1;
                info!("entity {id} ('{}') logged out", e.name);
                true
            }
            None => {
                self.metrics.stale_drops += 1;
                debug!("logout of unknown entity {id} ignored");
                false
            }
        }
    }

    /// Update an entity's position. Returns whether it existed.
    pub fn move_entity(&mut self, id: EntityId, to: Position) -> bool {
        match self.entities.get_mut(&id) {
            Some(e) => {
                e.position = to;
                true
            }
            None => {
                self.metrics.stale_drops += 1;
                debug!("move of unknown entity {id} ignored");
                false
            }
        }
    }

    /// Write one cell. Returns whether it was written.
    pub fn edit(&mut self, at: CellCoord, value: u8) -> bool {
        let written = self.automaton.alter_at(at, value);
        if !written {
            self.metrics.edits_ignored += 1;
            debug!("edit {at} = {value} ignored");
        }
        written
    }

    /// Stamp the bomb footprint. Returns cells written.
    pub fn bomb(&mut self, at: CellCoord) -> usize {
        self.metrics.bombs += 1;
        self.automaton.bomb(at)
    }

    /// Step the automaton one generation.
    pub fn advance(&mut self) {
        self.automaton.step();
        self.metrics.steps += 1;
    }

    /// Plant or clear the tree at `at`. Returns whether the cell exists.
    pub fn toggle_tree(&mut self, at: CellCoord) -> bool {
        let flipped = self.trees.flip(at);
        if flipped {
            self.metrics.tree_toggles += 1;
        } else {
            self.metrics.edits_ignored += 1;
            debug!("tree toggle at {at} ignored");
        }
        flipped
    }

    /// Step the tree layer one life generation.
    pub fn advance_trees(&mut self) {
        self.trees.step();
        self.metrics.tree_steps += 1;
    }

    /// Copy out the current state. Does not mutate the world beyond
    /// counting the request.
    pub fn snapshot(&mut self) -> WorldSnapshot {
        self.metrics.snapshots += 1;
        self.peek()
    }

    /// Copy out the current state without touching any counter.
    pub fn peek(&self) -> WorldSnapshot {
        let field = self.automaton.field();
        WorldSnapshot {
            generation: self.automaton.generation(),
            width: field.width(),
            height: field.height(),
            cells: field.to_bytes(),
            trees: self.trees.cells().to_vec(),
            entities: self.entities.values().cloned().collect(),
        }
    }

    /// Look up an entity.
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Number of logged-in entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// The automaton.
    pub fn automaton(&self) -> &Automaton {
        &self.automaton
    }

    /// The tree layer.
    pub fn trees(&self) -> &Trees {
        &self.trees
    }

    /// Counters so far.
    pub fn metrics(&self) -> &WorldMetrics {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use warfield_automaton::War;
    use warfield_core::{reply_pair, CellValue, Generation};
    use warfield_test_utils::field_from_rows;

    fn empty_world(max: Option<usize>) -> World {
        let field = field_from_rows(&["00000", "00000", "00000", "00000", "00000"]);
        World::with_automaton(Automaton::with_field(field, Box::new(War)), max)
    }

    fn login(world: &mut World, name: &str) -> Option<EntityId> {
        let (reply, pending) = reply_pair();
        world.handle(Event::Login {
            name: name.into(),
            reply,
        });
        pending.wait().unwrap()
    }

    // ── Entity lifecycle ────────────────────────────────────────

    #[test]
    fn ids_start_at_one_and_increase() {
        let mut w = empty_world(None);
        assert_eq!(login(&mut w, "a"), Some(EntityId(1)));
        assert_eq!(login(&mut w, "b"), Some(EntityId(2)));
        w.handle(Event::Logout { id: EntityId(1) });
        // Ids are never reused.
        assert_eq!(login(&mut w, "c"), Some(EntityId(3)));
    }

    #[test]
    fn logout_then_move_is_noop() {
        let mut w = empty_world(None);
        let id = login(&mut w, "a").unwrap();
        w.handle(Event::Logout { id });
        w.handle(Event::Move {
            id,
            to: Position::new(3.0, 3.0),
        });
        w.handle(Event::Logout { id });
        assert!(w.entity(id).is_none());
        assert_eq!(w.entity_count(), 0);
        assert_eq!(w.metrics().logouts, 1);
        assert_eq!(w.metrics().stale_drops, 2);
    }

    #[test]
    fn full_table_refuses_login() {
        let mut w = empty_world(Some(1));
        assert!(login(&mut w, "a").is_some());
        assert_eq!(login(&mut w, "b"), None);
        assert_eq!(w.metrics().login_refusals, 1);
    }

    #[test]
    fn later_move_wins() {
        let mut w = empty_world(None);
        let id = login(&mut w, "a").unwrap();
        w.handle(Event::Move {
            id,
            to: Position::new(1.0, 1.0),
        });
        w.handle(Event::Move {
            id,
            to: Position::new(2.0, 4.0),
        });
        assert_eq!(w.entity(id).unwrap().position, Position::new(2.0, 4.0));
    }

    // ── Field events ────────────────────────────────────────────

    #[test]
    fn edit_bomb_and_advance() {
        let mut w = empty_world(None);
        w.handle(Event::DirectEdit {
            at: CellCoord::new(0, 0),
            value: 1,
        });
        w.handle(Event::DirectEdit {
            at: CellCoord::new(9, 9),
            value: 1,
        });
        assert_eq!(w.automaton().get(CellCoord::new(0, 0)), CellValue::TEAM_A);
        assert_eq!(w.metrics().edits_ignored, 1);

        w.handle(Event::Bomb {
            at: CellCoord::new(2, 2),
        });
        assert_eq!(w.automaton().get(CellCoord::new(2, 2)), CellValue::HAZARD_NEAR);

        w.handle(Event::AdvanceStep);
        assert_eq!(w.automaton().generation(), Generation(1));
        assert_eq!(w.metrics().steps, 1);
    }

    // ── Trees ───────────────────────────────────────────────────

    #[test]
    fn toggle_tree_flips_and_ignores_off_grid() {
        let mut w = empty_world(None);
        w.handle(Event::ToggleTree {
            at: CellCoord::new(1, 3),
        });
        assert!(w.trees().alive(CellCoord::new(1, 3)));
        assert_eq!(w.peek().tree(1, 3), Some(true));
        w.handle(Event::ToggleTree {
            at: CellCoord::new(1, 3),
        });
        w.handle(Event::ToggleTree {
            at: CellCoord::new(5, 0),
        });
        assert_eq!(w.trees().count(), 0);
        assert_eq!(w.metrics().tree_toggles, 2);
        assert_eq!(w.metrics().edits_ignored, 1);
    }

    #[test]
    fn advance_trees_leaves_the_field_alone() {
        let mut w = empty_world(None);
        for x in 1..4 {
            w.toggle_tree(CellCoord::new(x, 2));
        }
        w.handle(Event::AdvanceTrees);
        let snap = w.peek();
        assert_eq!(snap.generation, Generation(0));
        assert_eq!(snap.cells, vec![0; 25]);
        // The horizontal blinker turned vertical.
        let column: Vec<_> = (1..4).map(|y| snap.tree(2, y)).collect();
        assert_eq!(column, vec![Some(true); 3]);
        assert_eq!(snap.tree(1, 2), Some(false));
        assert_eq!(w.metrics().tree_steps, 1);
    }

    #[test]
    fn seeded_trees_are_reproducible() {
        let config = ServerConfig {
            width: 16,
            height: 12,
            seed: Some(21),
            ..ServerConfig::default()
        };
        let a = World::new(&config).unwrap();
        let b = World::new(&config).unwrap();
        assert_eq!(a.trees().cells(), b.trees().cells());
        assert_eq!(a.trees().cells().len(), 16 * 12);
        assert_ne!(
            a.trees().cells(),
            World::new(&ServerConfig {
                seed: Some(22),
                ..config.clone()
            })
            .unwrap()
            .trees()
            .cells()
        );
    }

    // ── Snapshots ───────────────────────────────────────────────

    #[test]
    fn snapshots_without_mutation_are_equal() {
        let mut w = empty_world(None);
        login(&mut w, "a");
        w.handle(Event::Bomb {
            at: CellCoord::new(1, 1),
        });
        let take = |w: &mut World| {
            let (reply, pending) = reply_pair();
            w.handle(Event::Snapshot { reply });
            pending.wait().unwrap()
        };
        let a = take(&mut w);
        let b = take(&mut w);
        assert_eq!(a, b);
        assert_eq!(a.entities.len(), 1);
        assert_eq!(a.cells.len(), 25);
        assert_eq!(a.trees.len(), 25);
    }

    #[test]
    fn snapshot_keeps_login_order() {
        let mut w = empty_world(None);
        for name in ["x", "y", "z"] {
            login(&mut w, name);
        }
        w.handle(Event::Logout { id: EntityId(2) });
        let names: Vec<_> = w.peek().entities.into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["x", "z"]);
    }
}
