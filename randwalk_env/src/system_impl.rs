//! Production implementation of WalkContext using the system clock.

use crate::types::Rank;
use crate::WalkContext;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Production context: walker seeds come from wall-clock time plus rank.
///
/// Uniqueness across concurrently started walkers is best-effort only;
/// use a seeded context when a run has to be reproducible.
pub struct SystemContext {
    /// Start time for monotonic duration calculations
    start: Instant,

    /// Wall-clock nanoseconds captured at creation
    time_seed: u64,
}

impl SystemContext {
    /// Creates a new SystemContext.
    pub fn new() -> Self {
        let time_seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();

        Self {
            start: Instant::now(),
            time_seed,
        }
    }

    /// Creates an Arc-wrapped context for sharing across tasks.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl Default for SystemContext {
    fn default() -> Self {
        Self::new()
    }
}

impl WalkContext for SystemContext {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    fn derive_seed(&self, rank: Rank) -> u64 {
        self.time_seed.wrapping_add(rank.get() as u64)
    }

    fn seed(&self) -> u64 {
        // Production is not seeded
        0
    }
}
