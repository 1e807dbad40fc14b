//! Seeded context implementing WalkContext for reproducible runs.

use randwalk_env::{Rank, WalkContext};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Context whose walker seeds all derive from one master seed.
///
/// - Deterministic: same master seed and rank always give the same seed
/// - Unique: each rank gets a different seed
/// - Isolated: changing the worker count doesn't change other ranks' seeds
#[derive(Debug, Clone)]
pub struct SeededContext {
    /// Master seed for this run
    seed: u64,

    /// Creation time, for elapsed-time reporting
    start: Instant,
}

impl SeededContext {
    /// Creates a new SeededContext with the given master seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            start: Instant::now(),
        }
    }

    /// Creates an Arc-wrapped context for sharing.
    pub fn shared(seed: u64) -> Arc<Self> {
        Arc::new(Self::new(seed))
    }
}

impl WalkContext for SeededContext {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    fn derive_seed(&self, rank: Rank) -> u64 {
        self.seed.wrapping_mul(0x517cc1b727220a95) ^ rank.get() as u64
    }

    fn seed(&self) -> u64 {
        self.seed
    }
}
