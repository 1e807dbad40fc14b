//! Core environment context trait for randwalk ranks.

use crate::types::Rank;
use std::time::Duration;

/// The source of per-rank entropy and run-relative time.
///
/// # Implementations
///
/// - **Production**: `SystemContext` - seeds from the wall clock mixed with the rank
/// - **Simulation**: `SeededContext` - seeds derived from one master seed
///
/// # Determinism
///
/// Walkers never create their own seeds; they ask the context. A context
/// built from a fixed master seed therefore replays the same walks.
pub trait WalkContext: Send + Sync + 'static {
    /// Returns the time elapsed since the context was created.
    fn now(&self) -> Duration;

    /// Derives the PRNG seed for the walker at `rank`.
    ///
    /// Concurrently started walkers must not share a seed, so the rank is
    /// always folded into the result.
    fn derive_seed(&self, rank: Rank) -> u64;

    /// Returns the context's master seed (for logging/debugging).
    ///
    /// In production, returns 0 (not seeded).
    fn seed(&self) -> u64;
}
