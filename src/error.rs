//! Error type shared by every stage of the planning pipeline.

use thiserror::Error;

/// Errors raised while loading, encoding, solving, or decoding an instance.
///
/// The pipeline is all-or-nothing: any of these aborts the run and no
/// partial plan is returned.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// The text input does not match the declared `n`/`k` layout.
    #[error("malformed input at line {line}: {reason}")]
    MalformedInput {
        /// 1-based line number where the mismatch was detected.
        line: usize,
        /// Human-readable description.
        reason: String,
    },

    /// The domain data violates a structural invariant (asymmetric
    /// adjacency, zero area, out-of-range neighbour, ...).
    #[error("invalid instance: {0}")]
    InvalidInstance(String),

    /// A planner or engine configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The variable encoder was asked for an identifier outside its
    /// configured domain. Always a programming error.
    #[error("invalid variable request: {0}")]
    InvalidVariableRequest(String),

    /// The engine proved that no feasible assignment exists.
    #[error("UNSAT")]
    Unsatisfiable,

    /// The engine ran out of its time or node budget before proving
    /// optimality or infeasibility.
    #[error("engine stopped before completion ({0})")]
    EngineTimeout(String),

    /// A unit in the engine's assignment has zero or several true statuses.
    #[error("malformed assignment: unit {unit} has {true_statuses} true statuses")]
    MalformedAssignment {
        /// 1-based unit identifier.
        unit: usize,
        /// Number of status variables found true for the unit.
        true_statuses: usize,
    },

    /// The SAT backend or a constraint encoding failed.
    #[error("engine failure: {0}")]
    Engine(String),

    /// I/O failure while reading input or writing an export.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, HarvestError>;

impl HarvestError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn engine(err: impl std::fmt::Display) -> Self {
        Self::Engine(err.to_string())
    }

    /// Whether this error means the run finished without a plan because
    /// the engine could not produce one (infeasible or out of budget).
    pub fn is_infeasible(&self) -> bool {
        matches!(self, Self::Unsatisfiable | Self::EngineTimeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_unsat() {
        assert_eq!(HarvestError::Unsatisfiable.to_string(), "UNSAT");
    }

    #[test]
    fn test_malformed_message() {
        let err = HarvestError::malformed(4, "expected 3 areas, found 2");
        assert_eq!(
            err.to_string(),
            "malformed input at line 4: expected 3 areas, found 2"
        );
        assert!(!err.is_infeasible());
    }

    #[test]
    fn test_infeasible_kinds() {
        assert!(HarvestError::Unsatisfiable.is_infeasible());
        assert!(HarvestError::EngineTimeout("time limit".into()).is_infeasible());
    }
}
