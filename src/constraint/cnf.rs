//! Lowering of cardinality and pseudo-Boolean constraints to CNF.
//!
//! Cardinality bounds go through the `rustsat` totalizer. Weighted bounds go
//! through the dynamic polynomial watchdog, whose size follows the number of
//! bits in the weights rather than their magnitude, so large unit areas stay
//! cheap.
//!
//! # References
//!
//! - Bailleux & Boufkhad (2003), "Efficient CNF Encoding of Boolean
//!   Cardinality Constraints"
//! - Paxian, Reimer & Becker (2018), "Dynamic Polynomial Watchdog Encoding
//!   for Solving Weighted MaxSAT"

use super::model::{Constraint, Objective, PbModel};
use crate::encoding::Lit;
use crate::error::{HarvestError, Result};
use rustsat::encodings::{card, pb};
use rustsat::instances::{Cnf, ManageVars};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Rewrites the hard constraints of `model` into clauses.
///
/// Auxiliary variables are drawn from `var_manager`, which must already sit
/// above the model's problem variables (see [`PbModel::var_manager`]).
/// Threading the same manager through several calls keeps their
/// auxiliaries apart. Every solution of the result, restricted to the
/// problem variables, satisfies `model`, and every solution of `model`
/// extends to one of the result.
pub fn lower_to_cnf(model: &PbModel, var_manager: &mut dyn ManageVars) -> Result<Cnf> {
    model
        .validate()
        .map_err(HarvestError::InvalidVariableRequest)?;
    if var_manager.n_used() < model.num_vars {
        return Err(HarvestError::InvalidVariableRequest(format!(
            "auxiliary variables would start at {} inside the {} problem variables",
            var_manager.n_used() + 1,
            model.num_vars
        )));
    }

    let mut cnf = Cnf::new();
    for constraint in &model.constraints {
        match constraint {
            Constraint::Clause(lits) => cnf.add_clause(lits.iter().copied().collect()),
            Constraint::AtMost { lits, bound } => {
                encode_at_most(lits, *bound, &mut cnf, var_manager)?;
            }
            Constraint::AtLeastWeighted { terms, bound } => {
                encode_at_least_weighted(terms, *bound, &mut cnf, var_manager)?;
            }
        }
    }
    Ok(cnf)
}

/// Totalizer for `sum(lits) <= bound`.
fn encode_at_most(
    lits: &[Lit],
    bound: usize,
    cnf: &mut Cnf,
    var_manager: &mut dyn ManageVars,
) -> Result<()> {
    if bound >= lits.len() {
        return Ok(());
    }
    if bound == 0 {
        for &l in lits {
            cnf.add_unit(!l);
        }
        return Ok(());
    }
    let mut totalizer = card::Totalizer::from_iter(lits.iter().copied());
    card::BoundUpper::encode_ub(&mut totalizer, bound..=bound, cnf, var_manager)
        .map_err(HarvestError::engine)?;
    for unit in card::BoundUpper::enforce_ub(&totalizer, bound).map_err(HarvestError::engine)? {
        cnf.add_unit(unit);
    }
    Ok(())
}

/// Dynamic polynomial watchdog for `sum(w * lit) >= bound`.
///
/// Rewritten as `sum(w * !lit) <= total - bound`. Repeated literals are
/// merged before encoding.
fn encode_at_least_weighted(
    terms: &[(Lit, u64)],
    bound: u64,
    cnf: &mut Cnf,
    var_manager: &mut dyn ManageVars,
) -> Result<()> {
    if bound == 0 {
        return Ok(());
    }
    let mut negated: BTreeMap<Lit, u64> = BTreeMap::new();
    let mut total = 0u64;
    for &(lit, w) in terms.iter().filter(|(_, w)| *w > 0) {
        total = total
            .checked_add(w)
            .ok_or_else(|| HarvestError::engine("total weight overflows u64"))?;
        *negated.entry(!lit).or_insert(0) += w;
    }

    if total < bound {
        // Unreachable threshold: assert a contradiction
        let v = var_manager.new_var();
        cnf.add_unit(v.pos_lit());
        cnf.add_unit(v.neg_lit());
        return Ok(());
    }
    let slack = total - bound;
    if slack == 0 {
        for &lit in negated.keys() {
            cnf.add_unit(!lit);
        }
        return Ok(());
    }

    let inputs = negated
        .into_iter()
        .map(|(lit, w)| to_weight(w).map(|w| (lit, w)))
        .collect::<Result<Vec<_>>>()?;
    let slack = to_weight(slack)?;
    let mut watchdog = pb::DynamicPolyWatchdog::from_iter(inputs);
    pb::BoundUpper::encode_ub(&mut watchdog, slack..=slack, cnf, var_manager)
        .map_err(HarvestError::engine)?;
    for unit in pb::BoundUpper::enforce_ub(&watchdog, slack).map_err(HarvestError::engine)? {
        cnf.add_unit(unit);
    }
    Ok(())
}

pub(crate) fn to_weight(w: u64) -> Result<usize> {
    usize::try_from(w).map_err(|_| HarvestError::engine(format!("weight {w} exceeds usize")))
}

/// A weighted CNF instance in the classic `p wcnf` layout.
#[derive(Debug, Clone)]
pub struct Wcnf {
    /// Instance name, written as a comment.
    pub name: String,
    /// Highest variable identifier.
    pub num_vars: u32,
    /// Hard clauses.
    pub hard: Cnf,
    /// Soft clauses with positive weights.
    pub soft: Vec<(u64, Vec<Lit>)>,
    /// Constant to add to the satisfied soft weight to obtain the objective.
    pub offset: i64,
}

impl Wcnf {
    /// Lowers `model` (hard part and objective) to weighted CNF.
    pub fn from_model(model: &PbModel, var_manager: &mut dyn ManageVars) -> Result<Self> {
        let hard = lower_to_cnf(model, var_manager)?;

        let mut soft = Vec::new();
        let mut offset = 0i64;
        match &model.objective {
            Some(Objective::SoftLiterals { soft: lits, offset: o }) => {
                offset = *o;
                soft.extend(lits.iter().filter(|(_, w)| *w > 0).map(|&(l, w)| (w, vec![l])));
            }
            Some(Objective::MaximizeSum { terms }) => {
                for &(var, c) in terms {
                    if c > 0 {
                        soft.push((c.unsigned_abs(), vec![var.pos_lit()]));
                    } else if c < 0 {
                        offset += c;
                        soft.push((c.unsigned_abs(), vec![var.neg_lit()]));
                    }
                }
            }
            None => {}
        }

        Ok(Self {
            name: model.name.clone(),
            num_vars: var_manager.n_used(),
            hard,
            soft,
            offset,
        })
    }

    /// Weight given to hard clauses: one more than all soft weight.
    pub fn top_weight(&self) -> u64 {
        self.soft
            .iter()
            .fold(1u64, |acc, (w, _)| acc.saturating_add(*w))
    }

    /// Renders the instance in DIMACS WCNF.
    pub fn to_dimacs(&self) -> String {
        let top = self.top_weight();
        let mut out = String::new();
        let _ = writeln!(out, "c {}", self.name);
        let _ = writeln!(out, "c objective offset {}", self.offset);
        let _ = writeln!(
            out,
            "p wcnf {} {} {}",
            self.num_vars,
            self.hard.len() + self.soft.len(),
            top
        );
        for clause in self.hard.iter() {
            write_clause(&mut out, top, clause.iter().copied());
        }
        for (w, clause) in &self.soft {
            write_clause(&mut out, *w, clause.iter().copied());
        }
        out
    }
}

fn write_clause(out: &mut String, weight: u64, lits: impl Iterator<Item = Lit>) {
    let _ = write!(out, "{weight}");
    for l in lits {
        let _ = write!(out, " {}", l.to_ipasir());
    }
    out.push_str(" 0\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::assignment_from_bools;
    use crate::encoding::Var;
    use rustsat::clause;
    use rustsat::solvers::{Solve, SolverResult};
    use rustsat_batsat::BasicSolver;

    fn vars(n: u32) -> Vec<Var> {
        (0..n).map(Var::new).collect()
    }

    /// Whether `cnf` has a model agreeing with `base` on the first variables.
    fn extends(cnf: &Cnf, base: &[bool]) -> bool {
        let mut solver = BasicSolver::default();
        solver.add_cnf(cnf.clone()).unwrap();
        for (idx, &value) in base.iter().enumerate() {
            let lit = Var::new(idx as u32).pos_lit();
            solver
                .add_clause(clause![if value { lit } else { !lit }])
                .unwrap();
        }
        solver.solve().unwrap() == SolverResult::Sat
    }

    fn check_equivalent(constraint: Constraint, n: u32) {
        let mut model = PbModel::new("t", n);
        model.add_constraint(constraint.clone());
        let cnf = lower_to_cnf(&model, &mut model.var_manager()).unwrap();
        for bits in 0..1u32 << n {
            let base: Vec<bool> = (0..n).map(|b| bits >> b & 1 == 1).collect();
            let expected = constraint.is_satisfied(&assignment_from_bools(base.iter().copied()));
            assert_eq!(
                extends(&cnf, &base),
                expected,
                "mismatch for {constraint:?} at {base:?}"
            );
        }
    }

    #[test]
    fn test_at_most_equivalence() {
        let x = vars(4);
        for bound in 0..=4 {
            check_equivalent(
                Constraint::AtMost {
                    lits: x.iter().map(|v| v.pos_lit()).collect(),
                    bound,
                },
                4,
            );
        }
    }

    #[test]
    fn test_at_least_weighted_equivalence() {
        let x = vars(3);
        for bound in 0..=8 {
            check_equivalent(
                Constraint::AtLeastWeighted {
                    terms: vec![(x[0].pos_lit(), 2), (x[1].pos_lit(), 3), (x[2].neg_lit(), 2)],
                    bound,
                },
                3,
            );
        }
    }

    #[test]
    fn test_repeated_literal_weights_add_up() {
        let x = vars(2);
        check_equivalent(
            Constraint::AtLeastWeighted {
                terms: vec![(x[0].pos_lit(), 2), (x[0].pos_lit(), 2), (x[1].pos_lit(), 3)],
                bound: 4,
            },
            2,
        );
    }

    #[test]
    fn test_var_manager_threaded() {
        let x = vars(3);
        let mut model = PbModel::new("t", 3);
        model.add_constraint(Constraint::AtMost {
            lits: x.iter().map(|v| v.pos_lit()).collect(),
            bound: 1,
        });
        let mut vm = model.var_manager();
        lower_to_cnf(&model, &mut vm).unwrap();
        let after_first = vm.n_used();
        assert!(after_first > 3);
        lower_to_cnf(&model, &mut vm).unwrap();
        assert!(vm.n_used() > after_first);
    }

    #[test]
    fn test_rejects_overlapping_var_manager() {
        let model = PbModel::new("t", 4);
        let mut vm = PbModel::new("small", 2).var_manager();
        assert!(matches!(
            lower_to_cnf(&model, &mut vm),
            Err(HarvestError::InvalidVariableRequest(_))
        ));
    }

    #[test]
    fn test_weighted_lowering_ignores_area_magnitude() {
        let x = vars(2);
        let mut model = PbModel::new("large-areas", 2);
        model.add_constraint(Constraint::AtLeastWeighted {
            terms: vec![(x[0].pos_lit(), 20_000), (x[1].pos_lit(), 20_000)],
            bound: 1,
        });
        let wcnf = Wcnf::from_model(&model, &mut model.var_manager()).unwrap();
        assert!(wcnf.num_vars < 1_000, "{} variables", wcnf.num_vars);
        assert!(wcnf.hard.len() < 5_000, "{} clauses", wcnf.hard.len());
        assert!(extends(&wcnf.hard, &[true, false]));
        assert!(!extends(&wcnf.hard, &[false, false]));
    }

    #[test]
    fn test_weighted_lowering_with_huge_areas() {
        let x = vars(3);
        let area = 2_000_000_000u64;
        for (bound, feasible, infeasible) in [
            (1, [false, true, false], [false, false, false]),
            (2 * area + 1, [true, true, true], [true, true, false]),
        ] {
            let mut model = PbModel::new("huge-areas", 3);
            model.add_constraint(Constraint::AtLeastWeighted {
                terms: x.iter().map(|v| (v.pos_lit(), area)).collect(),
                bound,
            });
            let cnf = lower_to_cnf(&model, &mut model.var_manager()).unwrap();
            assert!(cnf.len() < 10_000, "{} clauses", cnf.len());
            assert!(extends(&cnf, &feasible));
            assert!(!extends(&cnf, &infeasible));
        }
    }

    #[test]
    fn test_wcnf_dimacs() {
        let x = vars(2);
        let mut model = PbModel::new("pair", 2);
        model.add_clause(vec![x[0].neg_lit(), x[1].neg_lit()]);
        model.set_objective(Objective::MaximizeSum {
            terms: vec![(x[0], 5), (x[1], 6)],
        });
        let wcnf = Wcnf::from_model(&model, &mut model.var_manager()).unwrap();
        assert_eq!(wcnf.top_weight(), 12);
        let text = wcnf.to_dimacs();
        assert!(text.contains("p wcnf 2 3 12\n"));
        assert!(text.contains("12 -1 -2 0\n"));
        assert!(text.contains("5 1 0\n"));
        assert!(text.contains("6 2 0\n"));
    }

    #[test]
    fn test_wcnf_negative_coefficient() {
        let x = vars(1);
        let mut model = PbModel::new("neg", 1);
        model.set_objective(Objective::MaximizeSum {
            terms: vec![(x[0], -4)],
        });
        let wcnf = Wcnf::from_model(&model, &mut model.var_manager()).unwrap();
        assert_eq!(wcnf.offset, -4);
        assert_eq!(wcnf.soft, vec![(4, vec![x[0].neg_lit()])]);
    }
}
