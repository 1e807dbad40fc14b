//! Coordinator - blocking fan-in over every walker's completion report.

use crate::error::SimError;
use crate::events::{AggregateResult, CollectState, CompletionEvent};
use crate::report::{self, Reporter};

use randwalk_env::{EnvError, Rank, StepReport, Transport};
use std::time::Duration;
use tracing::{debug, info};

/// Collects one completion event per walker, in arrival order.
#[derive(Debug, Clone)]
pub struct Coordinator {
    /// Number of events to wait for
    expected_count: u32,

    /// Upper bound on each receive (None = wait forever)
    receive_timeout: Option<Duration>,
}

impl Coordinator {
    /// Creates a coordinator waiting for `expected_count` events.
    pub fn new(expected_count: u32) -> Self {
        Self {
            expected_count,
            receive_timeout: None,
        }
    }

    /// Bounds every receive; an expired wait is returned as `EnvError::Timeout`.
    pub fn with_receive_timeout(mut self, timeout: Duration) -> Self {
        self.receive_timeout = Some(timeout);
        self
    }

    /// Receives from any rank until every walker has reported.
    ///
    /// Without a receive timeout this blocks forever if a walker never
    /// reports.
    pub async fn collect<T, R>(
        &self,
        transport: &T,
        reporter: &R,
    ) -> Result<AggregateResult, SimError>
    where
        T: Transport + ?Sized,
        R: Reporter + ?Sized,
    {
        let mut result = AggregateResult::new(self.expected_count);

        while let CollectState::Waiting(received) = result.state() {
            debug!(received, expected = self.expected_count, "waiting for walker");

            let (source, step_report) = self.receive(transport).await?;
            let event = CompletionEvent::new(source, step_report.steps_taken);

            reporter.line(report::coordinator_received(&event));
            result.record(event)?;
        }

        reporter.line(report::all_finished(self.expected_count));
        info!(walkers = self.expected_count, "all walkers reported");

        Ok(result)
    }

    async fn receive<T>(&self, transport: &T) -> Result<(Rank, StepReport), EnvError>
    where
        T: Transport + ?Sized,
    {
        match self.receive_timeout {
            None => transport.recv_any().await,
            Some(timeout) => tokio::time::timeout(timeout, transport.recv_any())
                .await
                .map_err(|_| EnvError::Timeout(timeout.as_millis() as u64))?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::LocalCluster;
    use crate::report::MemoryReporter;
    use std::collections::BTreeSet;

    #[tokio::test]
    async fn test_collects_every_walker_in_any_order() {
        let cluster = LocalCluster::build(5);

        for rank in [3usize, 1, 4, 2] {
            cluster[rank]
                .send(Rank::COORDINATOR, StepReport::new(rank as i64 * 10))
                .await
                .unwrap();
        }

        let reporter = MemoryReporter::new();
        let result = Coordinator::new(4).collect(&cluster[0], &reporter).await.unwrap();

        assert_eq!(result.received(), 4);
        assert_eq!(result.ranks(), vec![Rank(3), Rank(1), Rank(4), Rank(2)]);

        let lines = reporter.lines();
        assert_eq!(lines.len(), 5);
        let named: BTreeSet<&str> = lines[..4]
            .iter()
            .map(|l| {
                l.trim_start_matches("Coordinator: Received finished message from Rank ")
                    .split(' ')
                    .next()
                    .unwrap()
            })
            .collect();
        assert_eq!(named, BTreeSet::from(["1", "2", "3", "4"]));
        assert_eq!(lines[4], "Coordinator: All 4 walkers have finished.");
    }

    #[tokio::test]
    async fn test_no_walkers_finishes_immediately() {
        let cluster = LocalCluster::build(1);
        let reporter = MemoryReporter::new();

        let result = Coordinator::new(0).collect(&cluster[0], &reporter).await.unwrap();

        assert!(result.events().is_empty());
        assert_eq!(reporter.lines(), vec!["Coordinator: All 0 walkers have finished."]);
    }

    #[tokio::test]
    async fn test_missing_walker_times_out_when_bounded() {
        let cluster = LocalCluster::build(3);
        cluster[1].send(Rank::COORDINATOR, StepReport::new(5)).await.unwrap();

        let err = Coordinator::new(2)
            .with_receive_timeout(Duration::from_millis(50))
            .collect(&cluster[0], &MemoryReporter::new())
            .await
            .unwrap_err();

        assert!(matches!(err, SimError::Env(EnvError::Timeout(50))));
    }

    #[tokio::test]
    async fn test_missing_walker_blocks_when_unbounded() {
        let cluster = LocalCluster::build(3);
        cluster[2].send(Rank::COORDINATOR, StepReport::new(5)).await.unwrap();

        let reporter = MemoryReporter::new();
        let coordinator = Coordinator::new(2);
        let collect = coordinator.collect(&cluster[0], &reporter);
        let outcome = tokio::time::timeout(Duration::from_millis(100), collect).await;

        assert!(outcome.is_err(), "collect must still be waiting");
        assert_eq!(reporter.lines().len(), 1);
    }
}
