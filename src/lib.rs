//! Timber-harvest planning with a contiguous natural reserve.
//!
//! Encodes a multi-period harvest-scheduling problem over a land-unit
//! adjacency graph as a weighted Boolean optimization model:
//!
//! - **Model**: Units with areas, symmetric adjacency, per-period profits,
//!   and a minimum reserve area.
//! - **Encoding**: Bijective map between `(unit, status)` pairs and dense
//!   Boolean variable identifiers.
//! - **Generate**: Hard constraints. One status per unit, no adjacent units
//!   harvested in the same period, and a reserve that is connected and
//!   large enough.
//! - **Objective**: Profit maximization, either as weighted soft literals
//!   or as a linear sum.
//! - **Constraint**: Clause, cardinality, and weighted pseudo-Boolean
//!   constraints with CNF lowering and WCNF export.
//! - **Engine**: Pluggable optimization engines, with a linear-search
//!   engine on the `batsat` SAT solver via `rustsat`.
//! - **Decode**: Assignment back to a harvest plan.
//!
//! # Architecture
//!
//! [`planner::Planner`] runs the single-shot pipeline
//! `Instance → VarEncoder → constraints + objective → Engine → Decoder`.
//! Nothing is shared between runs, so independent instances can be
//! planned in parallel.

pub mod constraint;
pub mod decode;
pub mod encoding;
pub mod engine;
pub mod error;
pub mod generate;
pub mod generator;
pub mod io;
pub mod model;
pub mod objective;
pub mod planner;

pub use error::{HarvestError, Result};
