//! Variable encoding.
//!
//! Maps domain concepts onto the Boolean variables consumed by a SAT or
//! MaxSAT backend, and back.
//!
//! # Key Components
//!
//! - **Literals**: [`Var`], [`Lit`]: the `rustsat` variable and literal types
//! - **Requests**: [`VarRequest`]: which domain variable is wanted
//! - **Statuses**: [`Status`]: what a decoded identifier means
//! - **Encoder**: [`VarEncoder`]: instance-scoped bijection
//!
//! # Layout
//!
//! Every unit owns a contiguous block of `k + 2 + D_max` identifiers:
//! status 0 (unassigned), statuses `1..=k` (harvest periods), status
//! `k + 1` (reserve), then one identifier per spanning-tree depth.
//! Identifiers are 1-based as in DIMACS; identifier `id` is the `rustsat`
//! variable with index `id - 1`. Identifiers above `n * (k + 2 + D_max)`
//! are free for auxiliary variables allocated while lowering constraints.

mod encoder;

pub use encoder::{Status, VarEncoder, VarRequest, MAX_PROBLEM_VARS};
pub use rustsat::types::{Lit, Var};
