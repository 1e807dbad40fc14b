//! Walker agent - one bounded random walk per non-coordinator rank.
//!
//! The walk itself is a pure function of the configuration and a
//! [`StepSource`]; [`WalkerAgent`] adds the side effects: one report line
//! and one message to the coordinator.

use crate::config::SimulationConfig;
use crate::events::CompletionEvent;
use crate::report::{self, Reporter};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use randwalk_env::{EnvError, Rank, StepReport, Transport};
use tracing::debug;

/// A unit move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Left,
    Right,
}

impl Step {
    /// Returns the position change for this move.
    pub fn delta(self) -> i64 {
        match self {
            Step::Left => -1,
            Step::Right => 1,
        }
    }
}

/// Supplies the walk's moves.
pub trait StepSource {
    /// Draws the next move.
    fn next_step(&mut self) -> Step;
}

/// Fair coin over a PRNG.
#[derive(Debug, Clone)]
pub struct RngSteps<R> {
    rng: R,
}

impl<R: Rng> RngSteps<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSteps<ChaCha8Rng> {
    /// ChaCha8 stream for the given seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> StepSource for RngSteps<R> {
    fn next_step(&mut self) -> Step {
        if self.rng.gen_bool(0.5) {
            Step::Right
        } else {
            Step::Left
        }
    }
}

/// Replays a fixed move sequence, cycling when it runs out.
///
/// An empty sequence always moves right.
#[derive(Debug, Clone)]
pub struct ScriptedSteps {
    moves: Vec<Step>,
    drawn: usize,
}

impl ScriptedSteps {
    pub fn new(moves: Vec<Step>) -> Self {
        Self { moves, drawn: 0 }
    }

    /// Builds a script from `+1`/`-1` deltas; any positive value is a right move.
    pub fn from_deltas(deltas: &[i64]) -> Self {
        Self::new(
            deltas
                .iter()
                .map(|&d| if d > 0 { Step::Right } else { Step::Left })
                .collect(),
        )
    }

    /// Number of moves handed out so far.
    pub fn drawn(&self) -> usize {
        self.drawn
    }
}

impl StepSource for ScriptedSteps {
    fn next_step(&mut self) -> Step {
        let step = if self.moves.is_empty() {
            Step::Right
        } else {
            self.moves[self.drawn % self.moves.len()]
        };
        self.drawn += 1;
        step
    }
}

/// Mutable walk state, owned by a single walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkerState {
    pub rank: Rank,
    position: i64,
    steps_taken: i64,
}

impl WalkerState {
    pub fn new(rank: Rank) -> Self {
        Self {
            rank,
            position: 0,
            steps_taken: 0,
        }
    }

    /// Applies one unit move. The only way position changes.
    pub fn advance(&mut self, step: Step) {
        self.position += step.delta();
        self.steps_taken += 1;
    }

    pub fn position(&self) -> i64 {
        self.position
    }

    pub fn steps_taken(&self) -> i64 {
        self.steps_taken
    }
}

/// Runs one walk to termination.
///
/// Returns `{rank, step}` at the first step that leaves the domain, or
/// `{rank, max_steps}` if the budget runs out first. A non-positive budget
/// draws nothing from `source`.
pub fn walk<S: StepSource + ?Sized>(
    config: &SimulationConfig,
    rank: Rank,
    source: &mut S,
) -> CompletionEvent {
    let mut state = WalkerState::new(rank);

    for _ in 1..=config.max_steps {
        state.advance(source.next_step());

        if config.is_outside(state.position()) {
            debug!(%rank, position = state.position(), steps = state.steps_taken(), "left domain");
            return CompletionEvent::new(rank, state.steps_taken());
        }
    }

    debug!(%rank, position = state.position(), "step budget exhausted");
    CompletionEvent::new(rank, config.max_steps)
}

/// A walker rank: walks once, reports once.
pub struct WalkerAgent<S> {
    config: SimulationConfig,
    rank: Rank,
    source: S,
}

impl WalkerAgent<RngSteps<ChaCha8Rng>> {
    /// Creates a walker drawing from a ChaCha8 stream seeded with `seed`.
    pub fn seeded(config: SimulationConfig, rank: Rank, seed: u64) -> Self {
        Self::with_source(config, rank, RngSteps::seeded(seed))
    }
}

impl<S: StepSource + Send> WalkerAgent<S> {
    /// Creates a walker over an arbitrary step source.
    pub fn with_source(config: SimulationConfig, rank: Rank, source: S) -> Self {
        Self {
            config,
            rank,
            source,
        }
    }

    /// Returns the walker's rank.
    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// Walks, prints the completion line and sends the step count to the
    /// coordinator. Consumes the agent, so it reports at most once.
    pub async fn run<T, R>(
        mut self,
        transport: &T,
        reporter: &R,
    ) -> Result<CompletionEvent, EnvError>
    where
        T: Transport + ?Sized,
        R: Reporter + ?Sized,
    {
        let event = walk(&self.config, self.rank, &mut self.source);

        reporter.line(report::walker_finished(&event));
        transport
            .send(Rank::COORDINATOR, StepReport::new(event.steps_taken))
            .await?;

        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::LocalCluster;
    use crate::report::MemoryReporter;
    use proptest::prelude::*;

    fn config(domain_half_width: i64, max_steps: i64) -> SimulationConfig {
        SimulationConfig::new(domain_half_width, max_steps, 1)
    }

    #[test]
    fn test_exit_on_fourth_step() {
        let mut steps = ScriptedSteps::from_deltas(&[1, 1, 1, 1]);
        let event = walk(&config(3, 100), Rank(2), &mut steps);
        assert_eq!(event, CompletionEvent::new(Rank(2), 4));
        assert_eq!(steps.drawn(), 4);
    }

    #[test]
    fn test_budget_exhaustion_reports_max_steps() {
        let mut steps = ScriptedSteps::from_deltas(&[1, -1, 1]);
        let event = walk(&config(5, 3), Rank(1), &mut steps);
        assert_eq!(event, CompletionEvent::new(Rank(1), 3));
    }

    #[test]
    fn test_zero_width_domain_exits_on_first_step() {
        for first in [Step::Left, Step::Right] {
            let mut steps = ScriptedSteps::new(vec![first]);
            let event = walk(&config(0, 50), Rank(1), &mut steps);
            assert_eq!(event.steps_taken, 1);
        }
    }

    #[test]
    fn test_zero_budget_draws_nothing() {
        let mut steps = ScriptedSteps::from_deltas(&[1]);
        let event = walk(&config(5, 0), Rank(3), &mut steps);
        assert_eq!(event, CompletionEvent::new(Rank(3), 0));
        assert_eq!(steps.drawn(), 0);
    }

    #[test]
    fn test_negative_budget_reports_budget() {
        let mut steps = ScriptedSteps::from_deltas(&[1]);
        let event = walk(&config(5, -2), Rank(1), &mut steps);
        assert_eq!(event.steps_taken, -2);
        assert_eq!(steps.drawn(), 0);
    }

    #[test]
    fn test_most_negative_width_exits_on_first_step() {
        let event = walk(&config(i64::MIN, 5), Rank(1), &mut RngSteps::seeded(1));
        assert_eq!(event, CompletionEvent::new(Rank(1), 1));
    }

    #[test]
    fn test_same_seed_same_walk() {
        let cfg = config(4, 500);
        let a = walk(&cfg, Rank(1), &mut RngSteps::seeded(7));
        let b = walk(&cfg, Rank(1), &mut RngSteps::seeded(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_walker_state_unit_moves() {
        let mut state = WalkerState::new(Rank(1));
        state.advance(Step::Right);
        state.advance(Step::Right);
        state.advance(Step::Left);
        assert_eq!(state.position(), 1);
        assert_eq!(state.steps_taken(), 3);
    }

    #[tokio::test]
    async fn test_agent_sends_one_report_to_coordinator() {
        let mut cluster = LocalCluster::build(2);
        let walker_net = cluster.pop().unwrap();
        let coordinator_net = cluster.pop().unwrap();
        let reporter = MemoryReporter::new();

        let steps = ScriptedSteps::from_deltas(&[1]);
        let agent = WalkerAgent::with_source(config(3, 100), Rank(1), steps);
        let event = agent.run(&walker_net, &reporter).await.unwrap();

        let (source, report) = coordinator_net.recv_any().await.unwrap();
        assert_eq!(source, Rank(1));
        assert_eq!(report.steps_taken, event.steps_taken);
        assert_eq!(reporter.lines(), vec!["Rank 1: Walker finished in 4 steps."]);
    }

    proptest! {
        #[test]
        fn prop_steps_within_budget(
            domain in -3i64..30,
            max_steps in 1i64..400,
            seed in any::<u64>(),
        ) {
            let event = walk(&config(domain, max_steps), Rank(1), &mut RngSteps::seeded(seed));
            prop_assert!(event.steps_taken >= 1);
            prop_assert!(event.steps_taken <= max_steps);
        }
    }
}
