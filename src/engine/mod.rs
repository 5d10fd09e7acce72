//! Optimization engine interface and the SAT-backed implementation.
//!
//! The planner treats the engine as a black box: it hands over a
//! [`PbModel`](crate::constraint::PbModel) and receives an
//! [`EngineSolution`]. The [`Engine`] trait allows plugging in other
//! MaxSAT / pseudo-Boolean backends.
//!
//! [`LinearSearchEngine`] drives the `batsat` SAT solver through `rustsat`,
//! tightening a pseudo-Boolean bound on the objective until the solver
//! proves no better plan exists.

mod sat;

pub use sat::LinearSearchEngine;

pub use crate::constraint::Assignment;
use crate::constraint::PbModel;
use crate::error::Result;
use std::time::Duration;

/// Status of the engine after execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    /// Proven optimal assignment found.
    Optimal,
    /// No feasible assignment exists.
    Infeasible,
    /// Time or call budget exhausted before optimality or infeasibility
    /// was proven.
    Timeout,
    /// Model is invalid or malformed.
    ModelInvalid,
}

/// Result of one engine call.
#[derive(Debug, Clone)]
pub struct EngineSolution {
    /// Engine status.
    pub status: EngineStatus,
    /// Optimal assignment, present iff `status == Optimal`.
    pub assignment: Option<Assignment>,
    /// Objective value of the assignment.
    pub objective_value: Option<i64>,
    /// Search effort: solver calls for [`LinearSearchEngine`].
    pub nodes: u64,
    /// Solve time in milliseconds.
    pub solve_time_ms: u64,
}

impl EngineSolution {
    /// Creates an empty solution with the given status.
    pub fn empty(status: EngineStatus) -> Self {
        Self {
            status,
            assignment: None,
            objective_value: None,
            nodes: 0,
            solve_time_ms: 0,
        }
    }

    /// Whether an optimal assignment was found.
    pub fn is_solution_found(&self) -> bool {
        self.status == EngineStatus::Optimal && self.assignment.is_some()
    }
}

/// Engine configuration.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_harvest::engine::EngineConfig;
///
/// let config = EngineConfig::default()
///     .with_time_limit(Duration::from_secs(5))
///     .with_node_limit(1_000_000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Wall-clock budget. `None` = unbounded.
    pub time_limit: Option<Duration>,
    /// Search budget (solver calls for [`LinearSearchEngine`]). `None` = unbounded.
    pub node_limit: Option<u64>,
}

impl EngineConfig {
    /// Sets the wall-clock budget.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Sets the search budget.
    pub fn with_node_limit(mut self, limit: u64) -> Self {
        self.node_limit = Some(limit);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.time_limit == Some(Duration::ZERO) {
            return Err("time_limit must be positive".into());
        }
        if self.node_limit == Some(0) {
            return Err("node_limit must be positive".into());
        }
        Ok(())
    }
}

/// Trait for optimization engine implementations.
///
/// Implementors maximize the model's objective subject to all hard
/// constraints. A missing objective means any feasible assignment is
/// optimal. Budget expiry and infeasibility are statuses; `Err` is kept
/// for failures of the backend itself.
pub trait Engine: Send + Sync {
    /// Returns a human-readable name for this engine.
    fn name(&self) -> &str;

    /// Solves the model and returns a solution.
    fn solve(&self, model: &PbModel, config: &EngineConfig) -> Result<EngineSolution>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_default() {
        let config = EngineConfig::default();
        assert!(config.time_limit.is_none());
        assert!(config.node_limit.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_engine_config_rejects_zero_budget() {
        assert!(EngineConfig::default()
            .with_time_limit(Duration::ZERO)
            .validate()
            .is_err());
        assert!(EngineConfig::default().with_node_limit(0).validate().is_err());
    }

    #[test]
    fn test_empty_solution() {
        let s = EngineSolution::empty(EngineStatus::Infeasible);
        assert!(!s.is_solution_found());
        assert_eq!(s.nodes, 0);
    }
}
