//! Constraint model definition.

use crate::encoding::{Lit, Var, MAX_PROBLEM_VARS};
use rustsat::instances::BasicVarManager;
use rustsat::types::{Assignment, TernaryVal};

/// A hard constraint over Boolean literals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// At least one literal is true.
    Clause(Vec<Lit>),

    /// At most `bound` of the literals are true.
    AtMost {
        /// Literals being counted.
        lits: Vec<Lit>,
        /// Maximum number of true literals.
        bound: usize,
    },

    /// Pseudo-Boolean lower bound: `sum(weight * lit) >= bound`.
    AtLeastWeighted {
        /// `(literal, weight)` pairs.
        terms: Vec<(Lit, u64)>,
        /// Minimum weighted sum.
        bound: u64,
    },
}

impl Constraint {
    /// Variables mentioned by the constraint (may repeat).
    pub fn vars(&self) -> Vec<Var> {
        match self {
            Constraint::Clause(lits) | Constraint::AtMost { lits, .. } => {
                lits.iter().map(|l| l.var()).collect()
            }
            Constraint::AtLeastWeighted { terms, .. } => {
                terms.iter().map(|(l, _)| l.var()).collect()
            }
        }
    }

    /// Whether a complete assignment satisfies the constraint.
    pub fn is_satisfied(&self, assignment: &Assignment) -> bool {
        match self {
            Constraint::Clause(lits) => lits.iter().any(|&l| holds(assignment, l)),
            Constraint::AtMost { lits, bound } => {
                lits.iter().filter(|&&l| holds(assignment, l)).count() <= *bound
            }
            Constraint::AtLeastWeighted { terms, bound } => {
                let sum: u64 = terms
                    .iter()
                    .filter(|(l, _)| holds(assignment, *l))
                    .map(|(_, w)| *w)
                    .sum();
                sum >= *bound
            }
        }
    }
}

/// Objective of the model. Direction is always maximize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Objective {
    /// Weighted soft unit literals, for weighted-clause engines.
    ///
    /// Value is `offset + sum(weight of each true soft literal)`.
    SoftLiterals {
        /// `(literal, weight)` pairs with positive weights.
        soft: Vec<(Lit, u64)>,
        /// Constant added to the satisfied weight.
        offset: i64,
    },

    /// Explicit linear expression `sum(coef * var)`, for arithmetic optimizers.
    MaximizeSum {
        /// `(variable, coefficient)` pairs.
        terms: Vec<(Var, i64)>,
    },
}

impl Objective {
    /// Objective value of an assignment.
    pub fn value(&self, assignment: &Assignment) -> i64 {
        match self {
            Objective::SoftLiterals { soft, offset } => {
                offset
                    + soft
                        .iter()
                        .filter(|(l, _)| holds(assignment, *l))
                        .map(|(_, w)| *w as i64)
                        .sum::<i64>()
            }
            Objective::MaximizeSum { terms } => terms
                .iter()
                .filter(|(v, _)| holds(assignment, v.pos_lit()))
                .map(|(_, c)| c)
                .sum(),
        }
    }

    /// Linear form `(coef per variable index, constant)` over `num_vars` variables.
    pub fn linear_form(&self, num_vars: usize) -> (Vec<i64>, i64) {
        let mut coef = vec![0i64; num_vars];
        match self {
            Objective::SoftLiterals { soft, offset } => {
                let mut constant = *offset;
                for &(lit, w) in soft {
                    let w = w as i64;
                    if lit.is_neg() {
                        // w * (1 - x)
                        constant += w;
                        coef[lit.var().idx()] -= w;
                    } else {
                        coef[lit.var().idx()] += w;
                    }
                }
                (coef, constant)
            }
            Objective::MaximizeSum { terms } => {
                for &(var, c) in terms {
                    coef[var.idx()] += c;
                }
                (coef, 0)
            }
        }
    }

    fn vars(&self) -> Vec<Var> {
        match self {
            Objective::SoftLiterals { soft, .. } => soft.iter().map(|(l, _)| l.var()).collect(),
            Objective::MaximizeSum { terms } => terms.iter().map(|(v, _)| *v).collect(),
        }
    }
}

/// Whether `lit` is true under `assignment`.
///
/// Variables the assignment does not cover read as unassigned, so neither
/// polarity holds.
pub fn holds(assignment: &Assignment, lit: Lit) -> bool {
    assignment.lit_value(lit) == TernaryVal::True
}

/// Builds an assignment from one truth value per variable index.
pub fn assignment_from_bools(values: impl IntoIterator<Item = bool>) -> Assignment {
    let values: Vec<TernaryVal> = values
        .into_iter()
        .map(|b| if b { TernaryVal::True } else { TernaryVal::False })
        .collect();
    Assignment::from(values)
}

/// Builds an assignment of `num_vars` variables where exactly `true_vars` hold.
pub fn assignment_with_true_vars(
    num_vars: u32,
    true_vars: impl IntoIterator<Item = Var>,
) -> Assignment {
    let mut values = vec![false; num_vars as usize];
    for v in true_vars {
        if let Some(slot) = values.get_mut(v.idx()) {
            *slot = true;
        }
    }
    assignment_from_bools(values)
}

/// A Boolean optimization model.
///
/// # Examples
///
/// ```
/// use u_harvest::constraint::{Constraint, Objective, PbModel};
/// use u_harvest::encoding::VarEncoder;
///
/// let enc = VarEncoder::new(1, 1, 0).unwrap();
/// let vars = enc.status_vars(1).unwrap();
/// let mut model = PbModel::new("single", enc.num_vars());
/// model.add_constraint(Constraint::Clause(vars.iter().map(|v| v.pos_lit()).collect()));
/// model.set_objective(Objective::MaximizeSum { terms: vec![(vars[1], 10)] });
/// assert!(model.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct PbModel {
    /// Model name.
    pub name: String,
    /// Problem variables are the indices `0..num_vars` (identifiers
    /// `1..=num_vars`).
    pub num_vars: u32,
    /// Hard constraints.
    pub constraints: Vec<Constraint>,
    /// Objective function.
    pub objective: Option<Objective>,
}

impl PbModel {
    /// Creates an empty model over `num_vars` variables.
    pub fn new(name: impl Into<String>, num_vars: u32) -> Self {
        Self {
            name: name.into(),
            num_vars,
            constraints: Vec::new(),
            objective: None,
        }
    }

    /// Adds a constraint.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Adds several constraints.
    pub fn extend(&mut self, constraints: impl IntoIterator<Item = Constraint>) {
        self.constraints.extend(constraints);
    }

    /// Convenience: add a clause.
    pub fn add_clause(&mut self, lits: Vec<Lit>) {
        self.constraints.push(Constraint::Clause(lits));
    }

    /// Sets the objective function.
    pub fn set_objective(&mut self, objective: Objective) {
        self.objective = Some(objective);
    }

    /// Validates the model for consistency.
    ///
    /// Checks that the variable count fits the backend and that every
    /// referenced variable lies in `1..=num_vars`.
    pub fn validate(&self) -> Result<(), String> {
        if self.num_vars > MAX_PROBLEM_VARS {
            return Err(format!(
                "{} variables exceed the limit of {MAX_PROBLEM_VARS}",
                self.num_vars
            ));
        }
        let check = |v: Var| {
            if v.idx() >= self.num_vars as usize {
                Err(format!("undefined variable: {}", v.idx() + 1))
            } else {
                Ok(())
            }
        };
        for constraint in &self.constraints {
            for v in constraint.vars() {
                check(v)?;
            }
        }
        if let Some(objective) = &self.objective {
            for v in objective.vars() {
                check(v)?;
            }
        }
        Ok(())
    }

    /// Whether every hard constraint holds.
    pub fn is_satisfied_by(&self, assignment: &Assignment) -> bool {
        self.constraints.iter().all(|c| c.is_satisfied(assignment))
    }

    /// A variable manager whose next free variable follows the problem
    /// variables. Auxiliary variables of one lowering are drawn from it.
    pub fn var_manager(&self) -> BasicVarManager {
        BasicVarManager::from_next_free(Var::new(self.num_vars))
    }

    /// Returns the number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }
}
