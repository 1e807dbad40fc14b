//! Rank runner - dispatches a rank to its role and runs local clusters.

use crate::config::SimulationConfig;
use crate::coordinator::Coordinator;
use crate::error::SimError;
use crate::events::{AggregateResult, CompletionEvent};
use crate::network::LocalCluster;
use crate::report::Reporter;
use crate::walker::WalkerAgent;

use randwalk_env::{Rank, Transport, WalkContext};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// What a single rank produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RankOutcome {
    /// Rank 0: every walker's event in arrival order
    Coordinator(AggregateResult),

    /// Any other rank: its own event
    Walker(CompletionEvent),
}

/// Results from an in-process run.
#[derive(Debug, Clone)]
pub struct LocalRunResult {
    /// Coordinator's aggregate
    pub aggregate: AggregateResult,

    /// Events as returned by each walker, ordered by rank
    pub walker_events: Vec<CompletionEvent>,

    /// Wall time of the run
    pub elapsed: Duration,
}

/// Runs ranks of a simulation.
#[derive(Debug, Clone)]
pub struct RankRunner {
    /// Shared run configuration
    config: SimulationConfig,

    /// Coordinator receive bound (None = wait forever)
    collect_timeout: Option<Duration>,
}

impl RankRunner {
    /// Creates a runner for the given configuration.
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            collect_timeout: None,
        }
    }

    /// Bounds each coordinator receive.
    pub fn with_collect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.collect_timeout = timeout;
        self
    }

    /// Returns the run configuration.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Runs whichever role `transport.rank()` assigns: coordinator for
    /// rank 0, walker otherwise.
    pub async fn run_rank<T, C, R>(
        &self,
        transport: &T,
        ctx: &C,
        reporter: &R,
    ) -> Result<RankOutcome, SimError>
    where
        T: Transport + ?Sized,
        C: WalkContext + ?Sized,
        R: Reporter + ?Sized,
    {
        let rank = transport.rank();

        if rank.is_coordinator() {
            let mut coordinator = Coordinator::new(self.config.worker_count);
            if let Some(timeout) = self.collect_timeout {
                coordinator = coordinator.with_receive_timeout(timeout);
            }

            info!(walkers = self.config.worker_count, "coordinator collecting");
            let result = coordinator.collect(transport, reporter).await?;
            Ok(RankOutcome::Coordinator(result))
        } else {
            let seed = ctx.derive_seed(rank);
            debug!(%rank, seed, "walker starting");

            let event = WalkerAgent::seeded(self.config, rank, seed)
                .run(transport, reporter)
                .await?;
            Ok(RankOutcome::Walker(event))
        }
    }

    /// Runs the whole topology in this process, one task per rank.
    pub async fn run_local<C, R>(
        &self,
        ctx: Arc<C>,
        reporter: Arc<R>,
    ) -> Result<LocalRunResult, SimError>
    where
        C: WalkContext + ?Sized,
        R: Reporter + ?Sized,
    {
        let world_size = self.config.world_size();
        info!(world_size, seed = ctx.seed(), "starting local run");

        let handles: Vec<_> = LocalCluster::build(world_size)
            .into_iter()
            .map(|transport| {
                let runner = self.clone();
                let ctx = Arc::clone(&ctx);
                let reporter = Arc::clone(&reporter);
                let rank = transport.rank();

                let handle = tokio::spawn(async move {
                    runner.run_rank(&transport, ctx.as_ref(), reporter.as_ref()).await
                });
                (rank, handle)
            })
            .collect();

        let mut aggregate = None;
        let mut walker_events = Vec::with_capacity(self.config.worker_count as usize);

        for (rank, handle) in handles {
            let outcome = handle.await.map_err(|e| SimError::TaskFailed {
                rank,
                reason: e.to_string(),
            })??;

            match outcome {
                RankOutcome::Coordinator(result) => aggregate = Some(result),
                RankOutcome::Walker(event) => walker_events.push(event),
            }
        }

        let aggregate = aggregate.ok_or_else(|| SimError::TaskFailed {
            rank: Rank::COORDINATOR,
            reason: "coordinator produced no aggregate".to_string(),
        })?;

        let elapsed = ctx.now();
        info!(?elapsed, "local run finished");

        Ok(LocalRunResult {
            aggregate,
            walker_events,
            elapsed,
        })
    }
}
