//! Completion events and their aggregation.

use crate::error::SimError;
use randwalk_env::Rank;
use serde::Serialize;

/// The single report a walker produces when its walk ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompletionEvent {
    /// Walker that produced the event
    pub source_rank: Rank,

    /// Steps taken before leaving the domain or exhausting the budget
    pub steps_taken: i64,
}

impl CompletionEvent {
    /// Creates a completion event.
    pub fn new(source_rank: Rank, steps_taken: i64) -> Self {
        Self {
            source_rank,
            steps_taken,
        }
    }
}

/// Where the coordinator is in its collection loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectState {
    /// `k` events received so far
    Waiting(u32),

    /// Every walker has reported
    Done,
}

/// Events received by the coordinator, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateResult {
    total_workers: u32,
    events_received: Vec<CompletionEvent>,
}

impl AggregateResult {
    /// Creates an empty aggregate expecting `total_workers` events.
    pub fn new(total_workers: u32) -> Self {
        Self {
            total_workers,
            events_received: Vec::with_capacity(total_workers as usize),
        }
    }

    /// Appends an event. Fails once all expected events are present.
    pub fn record(&mut self, event: CompletionEvent) -> Result<(), SimError> {
        if self.is_complete() {
            return Err(SimError::AggregateFull(self.total_workers));
        }
        self.events_received.push(event);
        Ok(())
    }

    /// Returns the collection state.
    pub fn state(&self) -> CollectState {
        if self.is_complete() {
            CollectState::Done
        } else {
            CollectState::Waiting(self.received())
        }
    }

    /// Returns true once every expected event has been recorded.
    pub fn is_complete(&self) -> bool {
        self.received() == self.total_workers
    }

    /// Returns the number of events recorded.
    pub fn received(&self) -> u32 {
        self.events_received.len() as u32
    }

    /// Returns the number of expected events.
    pub fn total_workers(&self) -> u32 {
        self.total_workers
    }

    /// Returns the events in arrival order.
    pub fn events(&self) -> &[CompletionEvent] {
        &self.events_received
    }

    /// Returns the reporting ranks in arrival order.
    pub fn ranks(&self) -> Vec<Rank> {
        self.events_received.iter().map(|e| e.source_rank).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_state_machine() {
        let mut agg = AggregateResult::new(2);
        assert_eq!(agg.state(), CollectState::Waiting(0));

        agg.record(CompletionEvent::new(Rank(2), 7)).unwrap();
        assert_eq!(agg.state(), CollectState::Waiting(1));

        agg.record(CompletionEvent::new(Rank(1), 3)).unwrap();
        assert_eq!(agg.state(), CollectState::Done);
        assert_eq!(agg.ranks(), vec![Rank(2), Rank(1)]);
    }

    #[test]
    fn test_aggregate_never_exceeds_total() {
        let mut agg = AggregateResult::new(1);
        agg.record(CompletionEvent::new(Rank(1), 1)).unwrap();

        let err = agg.record(CompletionEvent::new(Rank(1), 1)).unwrap_err();
        assert!(matches!(err, SimError::AggregateFull(1)));
        assert_eq!(agg.received(), 1);
    }

    #[test]
    fn test_zero_workers_is_immediately_done() {
        let agg = AggregateResult::new(0);
        assert_eq!(agg.state(), CollectState::Done);
    }
}
