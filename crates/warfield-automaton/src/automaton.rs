//! A rule running over a double-buffered field.

use std::fmt;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use warfield_core::{CellCoord, CellValue, Generation};
use warfield_space::{Field, SpaceError};

use crate::bomb::footprint_at;
use crate::rule::Rule;

/// The cellular automaton: a [`Field`], the [`Rule`] that steps it, and a
/// generation counter.
///
/// Owned by the world; nothing here is shared or synchronised.
pub struct Automaton {
    field: Field,
    rule: Box<dyn Rule>,
    generation: Generation,
}

impl Automaton {
    /// A `width × height` automaton whose cells are seeded by the rule
    /// from a `ChaCha8Rng` with the given seed.
    pub fn new(width: u32, height: u32, rule: Box<dyn Rule>, seed: u64) -> Result<Self, SpaceError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let field = Field::from_fn(width, height, |_| rule.seed(&mut rng))?;
        Ok(Self::with_field(field, rule))
    }

    /// Wrap an existing field, e.g. a hand-built test layout.
    pub fn with_field(field: Field, rule: Box<dyn Rule>) -> Self {
        Self {
            field,
            rule,
            generation: Generation::default(),
        }
    }

    /// The value `at` will take in the next generation. Does not mutate.
    pub fn next(&self, at: CellCoord) -> CellValue {
        self.rule
            .next(self.field.get(at), &self.field.neighbourhood(at))
    }

    /// Advance every cell one generation in lockstep.
    pub fn step(&mut self) {
        let rule = &self.rule;
        self.field.step_with(|own, n| rule.next(own, n));
        self.generation = self.generation.next();
    }

    /// Write `value` directly into the current buffer.
    ///
    /// Best effort: off-grid coordinates and values above the rule's
    /// maximum are ignored. Returns whether a cell was written.
    pub fn alter_at(&mut self, at: CellCoord, value: u8) -> bool {
        match CellValue::with_max(value, self.rule.max_value().get()) {
            Ok(v) => self.field.set(at, v),
            Err(_) => false,
        }
    }

    /// Stamp the bomb footprint centred on `at`, each stage translated by
    /// [`Rule::blast`]. Returns the number of cells written (fewer than the
    /// full footprint near the edges).
    pub fn bomb(&mut self, at: CellCoord) -> usize {
        footprint_at(at)
            .into_iter()
            .filter(|&(c, stage)| {
                let v = self.rule.blast(stage);
                self.alter_at(c, v.get())
            })
            .count()
    }

    /// Current value at `at`; off-grid reads are empty.
    pub fn get(&self, at: CellCoord) -> CellValue {
        self.field.get(at)
    }

    /// The underlying field.
    pub fn field(&self) -> &Field {
        &self.field
    }

    /// Generations stepped so far.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// The active rule.
    pub fn rule(&self) -> &dyn Rule {
        self.rule.as_ref()
    }

    /// Text picture of the current buffer: one line per row, one glyph
    /// per cell.
    pub fn render(&self) -> String {
        let w = self.field.width() as usize;
        let mut out = String::with_capacity((w + 1) * self.field.height() as usize);
        for row in self.field.cells().chunks(w) {
            out.extend(row.iter().map(|&v| self.rule.glyph(v)));
            out.push('\n');
        }
        out
    }
}

impl fmt::Debug for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Automaton")
            .field("rule", &self.rule.name())
            .field("width", &self.field.width())
            .field("height", &self.field.height())
            .field("generation", &self.generation)
            .finish()
    }
}
