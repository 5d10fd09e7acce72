//! Engine-neutral constraint model.
//!
//! Provides the Boolean / pseudo-Boolean representation handed to an
//! optimization engine, plus a lowering to plain CNF for engines that only
//! accept clauses.
//!
//! # Key Components
//!
//! - **Constraints**: [`Constraint`]: clauses, cardinality and weighted bounds
//! - **Objective**: [`Objective`]: soft literals or an explicit linear sum
//! - **Model**: [`PbModel`]: container for constraints and objective
//! - **Assignments**: [`holds`] and builders over `rustsat` assignments
//! - **Lowering**: [`lower_to_cnf`], [`Wcnf`]
//!
//! # Design
//!
//! Like a CP model, this module describes the problem only. Solving is
//! delegated to an [`Engine`](crate::engine::Engine).

mod cnf;
mod model;

pub(crate) use cnf::to_weight;
pub use cnf::{lower_to_cnf, Wcnf};
pub use model::{
    assignment_from_bools, assignment_with_true_vars, holds, Constraint, Objective, PbModel,
};
pub use rustsat::types::Assignment;
