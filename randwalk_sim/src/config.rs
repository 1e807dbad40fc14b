//! Run configuration shared read-only by every rank.

use crate::error::SimError;
use serde::Serialize;

/// Configuration for a simulation run.
///
/// Built once at startup and passed by value into the walker and
/// coordinator entry points; nothing mutates it afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SimulationConfig {
    /// Walk ends once `|position|` exceeds this value
    pub domain_half_width: i64,

    /// Step budget per walker
    pub max_steps: i64,

    /// Number of walker ranks (world size minus the coordinator)
    pub worker_count: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            domain_half_width: 10,
            max_steps: 1000,
            worker_count: 4,
        }
    }
}

impl SimulationConfig {
    /// Creates a configuration with an explicit worker count.
    pub fn new(domain_half_width: i64, max_steps: i64, worker_count: u32) -> Self {
        Self {
            domain_half_width,
            max_steps,
            worker_count,
        }
    }

    /// Creates a configuration from the transport's world size.
    ///
    /// The world must contain at least the coordinator.
    pub fn for_world(
        domain_half_width: i64,
        max_steps: i64,
        world_size: u32,
    ) -> Result<Self, SimError> {
        let worker_count = world_size.checked_sub(1).ok_or_else(|| {
            SimError::InvalidTopology("world size must be at least 1".to_string())
        })?;

        Ok(Self::new(domain_half_width, max_steps, worker_count))
    }

    /// Returns the number of ranks, coordinator included.
    pub fn world_size(&self) -> u32 {
        self.worker_count + 1
    }

    /// Returns true if `position` lies outside `[-domain_half_width, domain_half_width]`.
    ///
    /// A negative width is an empty domain: every position is outside.
    pub fn is_outside(&self, position: i64) -> bool {
        position < self.domain_half_width.saturating_neg() || position > self.domain_half_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_world_excludes_coordinator() {
        let config = SimulationConfig::for_world(3, 50, 5).unwrap();
        assert_eq!(config.worker_count, 4);
        assert_eq!(config.world_size(), 5);
    }

    #[test]
    fn test_for_world_rejects_empty_world() {
        assert!(matches!(
            SimulationConfig::for_world(3, 50, 0),
            Err(SimError::InvalidTopology(_))
        ));
    }

    #[test]
    fn test_domain_edges_are_inside() {
        let config = SimulationConfig::new(3, 10, 1);
        assert!(!config.is_outside(3));
        assert!(!config.is_outside(-3));
        assert!(config.is_outside(4));
        assert!(config.is_outside(-4));
    }

    #[test]
    fn test_zero_width_domain() {
        let config = SimulationConfig::new(0, 10, 1);
        assert!(!config.is_outside(0));
        assert!(config.is_outside(1));
        assert!(config.is_outside(-1));
    }

    #[test]
    fn test_extreme_widths_do_not_overflow() {
        let empty = SimulationConfig::new(i64::MIN, 10, 1);
        assert!(empty.is_outside(0));
        assert!(empty.is_outside(1));
        assert!(empty.is_outside(-1));

        let huge = SimulationConfig::new(i64::MAX, 10, 1);
        assert!(!huge.is_outside(i64::MAX));
        assert!(!huge.is_outside(-i64::MAX));
        assert!(huge.is_outside(i64::MIN));
    }
}
