//! SAT-backed optimization by linear search on the objective.
//!
//! # Algorithm
//!
//! 1. Lower the hard constraints to CNF and load them into the solver
//! 2. Turn the objective into weighted cost literals, so that
//!    `value = max_value - cost`
//! 3. Solve; every model found fixes a new incumbent
//! 4. Tighten `cost <= incumbent_cost - 1` with a dynamic polynomial
//!    watchdog over the cost literals and solve again
//! 5. Stop when the solver answers UNSAT (the incumbent is optimal) or the
//!    incumbent has zero cost
//!
//! Budgets are checked between solver calls.

use super::{Engine, EngineConfig, EngineSolution, EngineStatus};
use crate::constraint::{lower_to_cnf, to_weight, Assignment, Objective, PbModel};
use crate::encoding::{Lit, Var};
use crate::error::{HarvestError, Result};
use rustsat::clause;
use rustsat::encodings::pb::{self, DynamicPolyWatchdog};
use rustsat::instances::{Cnf, ManageVars};
use rustsat::solvers::{Solve, SolverResult};
use rustsat_batsat::BasicSolver;
use std::time::Instant;
use tracing::debug;

/// Maximizes a [`PbModel`] with repeated calls to the `batsat` SAT solver.
///
/// The node budget of [`EngineConfig`] counts solver calls. A run that
/// stops on a budget reports [`EngineStatus::Timeout`] even when it holds
/// an incumbent, since that incumbent is not proven optimal.
pub struct LinearSearchEngine;

impl LinearSearchEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LinearSearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for LinearSearchEngine {
    fn name(&self) -> &str {
        "linear-search"
    }

    fn solve(&self, model: &PbModel, config: &EngineConfig) -> Result<EngineSolution> {
        if let Err(reason) = model.validate().and_then(|_| config.validate()) {
            debug!(%reason, "rejecting model");
            return Ok(EngineSolution::empty(EngineStatus::ModelInvalid));
        }

        let start = Instant::now();
        let mut var_manager = model.var_manager();
        let cnf = lower_to_cnf(model, &mut var_manager)?;
        let (cost_lits, max_value) = cost_terms(model.objective.as_ref(), model.num_vars)?;
        debug!(
            clauses = cnf.len(),
            vars = var_manager.n_used(),
            cost_lits = cost_lits.len(),
            "lowered model"
        );

        let mut solver = BasicSolver::default();
        solver.add_cnf(cnf).map_err(HarvestError::engine)?;
        let mut watchdog = DynamicPolyWatchdog::from_iter(cost_lits);

        let mut best: Option<(Assignment, i64)> = None;
        let mut calls = 0u64;
        let status = loop {
            let out_of_time = config.time_limit.is_some_and(|t| start.elapsed() >= t);
            let out_of_calls = config.node_limit.is_some_and(|n| calls >= n);
            if out_of_time || out_of_calls {
                break EngineStatus::Timeout;
            }
            calls += 1;

            match solver.solve().map_err(HarvestError::engine)? {
                SolverResult::Sat => {
                    let assignment = solver.full_solution().map_err(HarvestError::engine)?;
                    let value = model.objective.as_ref().map_or(0, |o| o.value(&assignment));
                    let cost = max_value
                        .checked_sub(value)
                        .and_then(|c| u64::try_from(c).ok())
                        .ok_or_else(|| {
                            HarvestError::engine(format!(
                                "objective value {value} outside its upper bound {max_value}"
                            ))
                        })?;
                    debug!(value, cost, calls, "new incumbent");
                    best = Some((assignment, value));
                    if cost == 0 {
                        break EngineStatus::Optimal;
                    }

                    let ub = to_weight(cost - 1)?;
                    let mut delta = Cnf::new();
                    pb::BoundUpperIncremental::encode_ub_change(
                        &mut watchdog,
                        ub..=ub,
                        &mut delta,
                        &mut var_manager,
                    )
                    .map_err(HarvestError::engine)?;
                    solver.add_cnf(delta).map_err(HarvestError::engine)?;
                    let units =
                        pb::BoundUpper::enforce_ub(&watchdog, ub).map_err(HarvestError::engine)?;
                    for unit in units {
                        solver.add_clause(clause![unit]).map_err(HarvestError::engine)?;
                    }
                }
                SolverResult::Unsat => {
                    break if best.is_some() {
                        EngineStatus::Optimal
                    } else {
                        EngineStatus::Infeasible
                    };
                }
                SolverResult::Interrupted => break EngineStatus::Timeout,
            }
        };

        let mut solution = EngineSolution::empty(status);
        solution.nodes = calls;
        solution.solve_time_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        if status == EngineStatus::Optimal {
            if let Some((assignment, value)) = best {
                solution.objective_value = Some(value);
                solution.assignment = Some(assignment);
            }
        }
        debug!(
            status = ?solution.status,
            calls,
            ms = solution.solve_time_ms,
            "linear search finished"
        );
        Ok(solution)
    }
}

/// Weighted cost literals of `objective` and the largest value it can take.
///
/// A positive coefficient `c` on `x` costs `c` when `x` is false, a negative
/// one costs `-c` when `x` is true, so `value = max_value - cost`.
fn cost_terms(objective: Option<&Objective>, num_vars: u32) -> Result<(Vec<(Lit, usize)>, i64)> {
    let Some(objective) = objective else {
        return Ok((Vec::new(), 0));
    };
    let (coef, constant) = objective.linear_form(num_vars as usize);
    let mut max_value = constant;
    let mut terms = Vec::new();
    for (idx, c) in coef.into_iter().enumerate() {
        if c == 0 {
            continue;
        }
        let var = u32::try_from(idx)
            .map(Var::new)
            .map_err(|_| HarvestError::engine(format!("variable index {idx} overflows u32")))?;
        let weight = to_weight(c.unsigned_abs())?;
        if c > 0 {
            max_value = max_value
                .checked_add(c)
                .ok_or_else(|| HarvestError::engine("objective bound overflows i64"))?;
            terms.push((var.neg_lit(), weight));
        } else {
            terms.push((var.pos_lit(), weight));
        }
    }
    Ok((terms, max_value))
}
