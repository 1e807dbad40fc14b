//! Transport abstraction between randwalk ranks.

use async_trait::async_trait;
use crate::error::EnvError;
use crate::types::{Rank, StepReport};

/// Point-to-point messaging between ranks.
///
/// # Implementations
///
/// - **Local**: tokio channels, one inbox per rank, all ranks in one process
/// - **TCP**: newline-delimited JSON frames, one OS process per rank
///
/// # Message Flow
///
/// ```text
/// Walker r                  Transport                Coordinator
///   |                           |                          |
///   |-- send(0, report) ------->|                          |
///   |                           |------------------------->|
///   |                           |                          |-- recv_any() -> (r, report)
/// ```
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Sends a report to `target`.
    ///
    /// # Returns
    /// * `Ok(())` - Report handed to the transport for delivery
    /// * `Err(EnvError::RankUnreachable)` - `target` is not a valid destination
    /// * `Err(EnvError::NetworkError)` - The link is gone
    async fn send(&self, target: Rank, report: StepReport) -> Result<(), EnvError>;

    /// Receives the next report addressed to this rank, from any sender.
    ///
    /// # Blocking
    /// Waits until a report arrives. Among reports that arrived concurrently
    /// the first delivered is the first returned; there is no other ordering.
    async fn recv_any(&self) -> Result<(Rank, StepReport), EnvError>;

    /// Returns this participant's rank.
    fn rank(&self) -> Rank;

    /// Returns the number of ranks in the run, coordinator included.
    fn world_size(&self) -> u32;
}
