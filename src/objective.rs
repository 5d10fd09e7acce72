//! Profit objective.
//!
//! The objective only ranks feasible assignments; it implies no constraint.

use crate::constraint::Objective;
use crate::encoding::{VarEncoder, VarRequest};
use crate::error::Result;
use crate::model::Instance;

/// Which objective representation to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectiveForm {
    /// Weighted soft literals `Assign(i, j)` with weight `profit(j, i)`.
    #[default]
    SoftLiterals,
    /// Linear expression `sum(profit(j, i) * Assign(i, j))`.
    LinearSum,
}

/// Builds the profit-maximization objective.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectiveBuilder {
    form: ObjectiveForm,
}

impl ObjectiveBuilder {
    /// Creates a builder for the given representation.
    pub fn new(form: ObjectiveForm) -> Self {
        Self { form }
    }

    /// The objective of `instance`. Zero profits are omitted.
    ///
    /// In the soft-literal form a negative profit `p` on `Assign(i, j)`
    /// becomes the soft literal `!Assign(i, j)` with weight `-p` and
    /// contributes `p` to the offset, so both forms value every assignment
    /// identically.
    pub fn build(&self, instance: &Instance, encoder: &VarEncoder) -> Result<Objective> {
        let mut terms = Vec::new();
        for i in instance.units() {
            for j in instance.periods() {
                let profit = instance.profit(j, i);
                if profit != 0 {
                    terms.push((encoder.encode(VarRequest::ByPeriod(i, j))?, profit));
                }
            }
        }

        Ok(match self.form {
            ObjectiveForm::LinearSum => Objective::MaximizeSum { terms },
            ObjectiveForm::SoftLiterals => {
                let mut offset = 0i64;
                let soft = terms
                    .into_iter()
                    .map(|(var, profit)| {
                        if profit > 0 {
                            (var.pos_lit(), profit as u64)
                        } else {
                            offset += profit;
                            (var.neg_lit(), profit.unsigned_abs())
                        }
                    })
                    .collect();
                Objective::SoftLiterals { soft, offset }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::assignment_with_true_vars;

    fn instance() -> Instance {
        Instance::new(
            vec![1, 1],
            vec![vec![], vec![]],
            vec![vec![5, 0], vec![-2, 7]],
            0,
        )
        .unwrap()
    }

    #[test]
    fn test_soft_literals() {
        let inst = instance();
        let enc = VarEncoder::new(2, 2, 0).unwrap();
        let obj = ObjectiveBuilder::default().build(&inst, &enc).unwrap();
        match &obj {
            Objective::SoftLiterals { soft, offset } => {
                assert_eq!(soft.len(), 3);
                assert_eq!(*offset, -2);
                let neg = enc.encode(VarRequest::ByPeriod(1, 2)).unwrap();
                assert!(soft.contains(&(neg.neg_lit(), 2)));
            }
            other => panic!("unexpected objective {other:?}"),
        }
    }

    #[test]
    fn test_forms_value_equally() {
        let inst = instance();
        let enc = VarEncoder::new(2, 2, 0).unwrap();
        let soft = ObjectiveBuilder::new(ObjectiveForm::SoftLiterals)
            .build(&inst, &enc)
            .unwrap();
        let linear = ObjectiveBuilder::new(ObjectiveForm::LinearSum)
            .build(&inst, &enc)
            .unwrap();
        let h = |u, p| enc.encode(VarRequest::ByPeriod(u, p)).unwrap();
        let n = enc.num_vars();
        for picks in [vec![h(1, 1), h(2, 2)], vec![h(1, 2), h(2, 1)], vec![]] {
            let a = assignment_with_true_vars(n, picks);
            assert_eq!(soft.value(&a), linear.value(&a));
        }
        let best = assignment_with_true_vars(n, [h(1, 1), h(2, 2)]);
        assert_eq!(linear.value(&best), 12);
    }
}
