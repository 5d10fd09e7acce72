//! Domain model for reserve-constrained harvest planning.
//!
//! An [`Instance`] is a set of land units with areas and a symmetric
//! adjacency relation, a dense profit table over `k` harvesting periods,
//! and the minimum area `amin` of the natural reserve.
//!
//! Units and periods are identified by 1-based indices throughout the
//! crate, matching the textual input format.

mod instance;

pub use instance::Instance;
