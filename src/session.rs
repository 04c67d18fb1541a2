use crate::config::DEFAULT_SEED;
use crate::rng::Rng;

/// Largest seed handed out by "new pattern".
pub const MAX_RANDOM_SEED: u64 = 10_000;

/// Shell-side UI state carried between interactions: only the current seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Session {
    pub seed: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self { seed: DEFAULT_SEED }
    }
}

impl Session {
    /// Replace the seed with a fresh one in [0, MAX_RANDOM_SEED].
    pub fn new_pattern(&mut self, entropy: u64) -> u64 {
        self.seed = Rng::new(entropy).range_u64_inclusive(0, MAX_RANDOM_SEED);
        tracing::info!(seed = self.seed, "new pattern");
        self.seed
    }

    pub fn reset(&mut self) -> u64 {
        self.seed = DEFAULT_SEED;
        tracing::info!(seed = self.seed, "seed reset");
        self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_pattern_stays_in_range() {
        let mut s = Session::default();
        for e in 0..500 {
            assert!(s.new_pattern(e) <= MAX_RANDOM_SEED);
        }
    }

    #[test]
    fn reset_restores_default() {
        let mut s = Session { seed: 9 };
        assert_eq!(s.reset(), 42);
        assert_eq!(s, Session::default());
    }
}
