//! Console report lines.
//!
//! These are the program's output, written to stdout one line at a time.
//! Diagnostics go through `tracing` instead.

use crate::events::CompletionEvent;
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

/// Sink for report lines.
pub trait Reporter: Send + Sync + 'static {
    /// Emits one complete line (without trailing newline).
    fn line(&self, line: String);
}

/// Writes report lines to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutReporter;

impl Reporter for StdoutReporter {
    fn line(&self, line: String) {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        // A closed stdout leaves nothing to report to.
        let _ = writeln!(out, "{}", line);
        let _ = out.flush();
    }
}

/// Keeps report lines in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryReporter {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemoryReporter {
    /// Creates an empty reporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every line emitted so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Reporter for MemoryReporter {
    fn line(&self, line: String) {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner).push(line);
    }
}

/// Line a walker prints at its own completion.
pub fn walker_finished(event: &CompletionEvent) -> String {
    format!(
        "Rank {}: Walker finished in {} steps.",
        event.source_rank, event.steps_taken
    )
}

/// Line the coordinator prints per received event.
pub fn coordinator_received(event: &CompletionEvent) -> String {
    format!(
        "Coordinator: Received finished message from Rank {} (completed in {} steps).",
        event.source_rank, event.steps_taken
    )
}

/// Final summary line.
pub fn all_finished(walkers: u32) -> String {
    format!("Coordinator: All {} walkers have finished.", walkers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use randwalk_env::Rank;

    #[test]
    fn test_line_formats() {
        let event = CompletionEvent::new(Rank(3), 17);
        assert_eq!(walker_finished(&event), "Rank 3: Walker finished in 17 steps.");
        assert_eq!(
            coordinator_received(&event),
            "Coordinator: Received finished message from Rank 3 (completed in 17 steps)."
        );
        assert_eq!(all_finished(4), "Coordinator: All 4 walkers have finished.");
    }

    #[test]
    fn test_memory_reporter_clones_share_lines() {
        let reporter = MemoryReporter::new();
        let clone = reporter.clone();
        clone.line("one".to_string());
        reporter.line("two".to_string());
        assert_eq!(reporter.lines(), vec!["one", "two"]);
    }
}
