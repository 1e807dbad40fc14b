//! Common types for the randwalk environment abstraction.

use serde::{Deserialize, Serialize};

/// Identifier of a participant in the run, `0..world_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rank(pub u32);

impl Rank {
    /// The aggregating participant.
    pub const COORDINATOR: Rank = Rank(0);

    /// Returns true for rank 0.
    pub fn is_coordinator(&self) -> bool {
        *self == Self::COORDINATOR
    }

    /// Returns the raw rank number.
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl From<u32> for Rank {
    fn from(rank: u32) -> Self {
        Self(rank)
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Payload a walker sends when its walk ends.
///
/// Carries only the step count; the sender's rank is supplied by the
/// transport on receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    /// Steps taken before the walk terminated
    pub steps_taken: i64,
}

impl StepReport {
    /// Creates a report for the given step count.
    pub fn new(steps_taken: i64) -> Self {
        Self { steps_taken }
    }
}
