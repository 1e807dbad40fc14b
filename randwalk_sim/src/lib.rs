//! randwalk - Distributed Random-Walk Simulation
//!
//! Many independent walker ranks each run one bounded random walk and
//! report their step count to a single coordinator rank, which blocks on
//! receive-from-any until every walker has reported.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Transport (any rank)                   │
//! │                                                             │
//! │  ┌─────────┐   ┌─────────┐          ┌─────────┐             │
//! │  │ Walker  │   │ Walker  │   ...    │ Walker  │             │
//! │  │ rank 1  │   │ rank 2  │          │ rank N  │             │
//! │  └────┬────┘   └────┬────┘          └────┬────┘             │
//! │       │ StepReport  │                    │                  │
//! │       └─────────────┼────────────────────┘                  │
//! │                     ▼                                       │
//! │            ┌─────────────────┐                              │
//! │            │  Coordinator    │  recv_any() x N              │
//! │            │  rank 0         │  -> AggregateResult          │
//! │            └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use randwalk_sim::{RankRunner, SeededContext, SimulationConfig, StdoutReporter};
//! use std::sync::Arc;
//!
//! let config = SimulationConfig::new(10, 1000, 4);
//! let result = RankRunner::new(config)
//!     .run_local(SeededContext::shared(42), Arc::new(StdoutReporter))
//!     .await?;
//! assert_eq!(result.aggregate.received(), 4);
//! ```

mod config;
mod context;
mod coordinator;
mod error;
mod events;
mod network;
mod runner;
mod tcp;
mod walker;
pub mod report;

pub use config::SimulationConfig;
pub use context::SeededContext;
pub use coordinator::Coordinator;
pub use error::SimError;
pub use events::{AggregateResult, CollectState, CompletionEvent};
pub use network::{LocalCluster, LocalTransport};
pub use report::{MemoryReporter, Reporter, StdoutReporter};
pub use runner::{LocalRunResult, RankOutcome, RankRunner};
pub use tcp::TcpTransport;
pub use walker::{walk, RngSteps, ScriptedSteps, Step, StepSource, WalkerAgent, WalkerState};
