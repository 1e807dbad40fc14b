//! Error types for the simulation.

use randwalk_env::{EnvError, Rank};
use thiserror::Error;

/// Errors that end a rank's run.
#[derive(Debug, Error)]
pub enum SimError {
    /// Transport or context failure
    #[error(transparent)]
    Env(#[from] EnvError),

    /// Rank or world size the run cannot be laid out with
    #[error("Invalid topology: {0}")]
    InvalidTopology(String),

    /// A rank's task panicked or was cancelled
    #[error("Task for rank {rank} failed: {reason}")]
    TaskFailed { rank: Rank, reason: String },

    /// More completion events arrived than there are walkers
    #[error("Aggregate already holds all {0} events")]
    AggregateFull(u32),
}
