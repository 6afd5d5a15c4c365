//! Display-name generation for newly registered connections.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Supplies a display name for each registration.
///
/// Any `FnMut() -> String` closure is a name source.
pub trait NameSource: Send + 'static {
    /// The next name. Names need not be unique.
    fn next_name(&mut self) -> String;
}

impl<F> NameSource for F
where
    F: FnMut() -> String + Send + 'static,
{
    fn next_name(&mut self) -> String {
        self()
    }
}

const ADJECTIVES: &[&str] = &[
    "Amber", "Brisk", "Crimson", "Dusty", "Eager", "Feral", "Gilded", "Hollow", "Ivory", "Jolly",
    "Keen", "Lunar", "Mossy", "Nimble", "Onyx", "Proud", "Quiet", "Rusty", "Silent", "Tidal",
];

const NOUNS: &[&str] = &[
    "Badger", "Comet", "Dingo", "Falcon", "Gecko", "Heron", "Ibis", "Jackal", "Kestrel", "Lynx",
    "Marten", "Newt", "Otter", "Puffin", "Quokka", "Raven", "Stoat", "Tapir", "Vole", "Wren",
];

/// `"<Adjective><Noun><NN>"` names from a seeded `ChaCha8Rng`.
#[derive(Clone, Debug)]
pub struct RandomNames {
    rng: ChaCha8Rng,
}

impl RandomNames {
    /// A name source with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl NameSource for RandomNames {
    fn next_name(&mut self) -> String {
        let adjective = ADJECTIVES.choose(&mut self.rng).copied().unwrap_or("Nameless");
        let noun = NOUNS.choose(&mut self.rng).copied().unwrap_or("Player");
        let n: u8 = self.rng.gen_range(0..100);
        format!("{adjective}{noun}{n:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_name_sources() {
        let mut n = 0;
        let mut source = move || {
            n += 1;
            format!("guest{n}")
        };
        assert_eq!(NameSource::next_name(&mut source), "guest1");
        assert_eq!(NameSource::next_name(&mut source), "guest2");
    }

    #[test]
    fn seeded_names_repeat() {
        let mut a = RandomNames::seeded(5);
        let mut b = RandomNames::seeded(5);
        for _ in 0..10 {
            let name = a.next_name();
            assert_eq!(name, b.next_name());
            assert!(name.chars().next().is_some_and(|c| c.is_ascii_uppercase()));
            assert!(name.ends_with(|c: char| c.is_ascii_digit()));
        }
    }
}
