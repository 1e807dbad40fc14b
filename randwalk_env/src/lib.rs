//! randwalk Environment Abstraction Layer
//!
//! This crate holds the seams between the random-walk simulation and the
//! world it runs in, so the same walker and coordinator code can run over
//! in-process channels or over real sockets between OS processes.
//!
//! # Core Concept: Ranks and a Star Topology
//!
//! Every participant has a [`Rank`] in `0..world_size`. Rank 0 is the
//! coordinator; every other rank is a walker that sends exactly one
//! [`StepReport`] to rank 0. What the environment intercepts:
//! - Messaging (`send()`, `recv_any()`)
//! - Topology (`rank()`, `world_size()`)
//! - Randomness (`derive_seed()`)
//!
//! Injecting a master seed through [`WalkContext`] makes every walk of a
//! run reproducible from a single number.
//!
//! # Example
//!
//! ```ignore
//! use randwalk_env::{Rank, StepReport, Transport};
//!
//! async fn report<T: Transport>(net: &T, steps: i64) -> Result<(), EnvError> {
//!     net.send(Rank::COORDINATOR, StepReport::new(steps)).await
//! }
//! ```

mod context;
mod network;
mod types;
mod error;
mod system_impl;

pub use context::WalkContext;
pub use network::Transport;
pub use types::{Rank, StepReport};
pub use error::EnvError;
pub use system_impl::SystemContext;
