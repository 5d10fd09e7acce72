//! Hard-constraint generation.
//!
//! Builds the mandatory constraint set of an instance:
//!
//! 1. **Status exclusion**: each unit takes exactly one status out of
//!    unassigned, one harvest period, or reserve.
//! 2. **Adjacency exclusion**: adjacent units are never harvested in the
//!    same period.
//! 3. **Reserve contiguity and area**: the reserve forms one connected
//!    region of at least `amin` area, enforced by a pluggable
//!    [`ContiguityStrategy`].
//!
//! # Contiguity
//!
//! The default [`SpanningTree`] strategy introduces depth variables and
//! forces the reserve units to form a single rooted tree over the
//! adjacency graph: at most one root, and every node at depth `d > 1` has
//! exactly one neighbour at depth `d - 1`. Connectivity follows from tree
//! membership. [`LocalClosure`] is a weaker local rule kept for comparison.
//!
//! # References
//!
//! Carvajal, Constantino, Goycoolea, Vielma & Weintraub (2013),
//! "Imposing Connectivity Constraints in Forest Planning Models"

mod contiguity;
mod hard;

pub use contiguity::{ContiguityKind, ContiguityStrategy, LocalClosure, SpanningTree};
pub use hard::HardConstraintGenerator;
