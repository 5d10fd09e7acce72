//! The hard-constraint generator.

use super::contiguity::{ContiguityKind, ContiguityStrategy};
use crate::constraint::Constraint;
use crate::encoding::{VarEncoder, VarRequest};
use crate::error::Result;
use crate::model::Instance;
use tracing::debug;

/// Generates the mandatory constraints of an instance.
///
/// Holds no state across calls: every call to [`build`](Self::build)
/// depends only on its arguments.
///
/// # Examples
///
/// ```
/// use u_harvest::generate::HardConstraintGenerator;
/// use u_harvest::model::Instance;
///
/// let instance = Instance::new(vec![5], vec![vec![]], vec![vec![10]], 0).unwrap();
/// let generator = HardConstraintGenerator::default();
/// let encoder = generator.encoder_for(&instance).unwrap();
/// let constraints = generator.build(&instance, &encoder).unwrap();
/// assert!(!constraints.is_empty());
/// ```
pub struct HardConstraintGenerator {
    strategy: Box<dyn ContiguityStrategy>,
}

impl Default for HardConstraintGenerator {
    fn default() -> Self {
        Self::new(ContiguityKind::default())
    }
}

impl HardConstraintGenerator {
    /// Creates a generator using a built-in contiguity strategy.
    pub fn new(kind: ContiguityKind) -> Self {
        Self {
            strategy: kind.strategy(),
        }
    }

    /// Creates a generator with a custom contiguity strategy.
    pub fn with_strategy(strategy: Box<dyn ContiguityStrategy>) -> Self {
        Self { strategy }
    }

    /// The active contiguity strategy.
    pub fn strategy(&self) -> &dyn ContiguityStrategy {
        self.strategy.as_ref()
    }

    /// A fresh encoder sized for `instance` under the active strategy.
    ///
    /// Fails when the instance needs more variables than the backend can
    /// address.
    pub fn encoder_for(&self, instance: &Instance) -> Result<VarEncoder> {
        let levels = if instance.min_reserve_area() > 0 {
            self.strategy.depth_levels(instance)
        } else {
            0
        };
        VarEncoder::new(instance.unit_count(), instance.period_count(), levels)
    }

    /// Builds every hard constraint of `instance`.
    pub fn build(&self, instance: &Instance, encoder: &VarEncoder) -> Result<Vec<Constraint>> {
        let mut out = Vec::new();
        self.status_exclusion(instance, encoder, &mut out)?;
        let after_status = out.len();
        self.adjacency_exclusion(instance, encoder, &mut out)?;
        let after_adjacency = out.len();
        self.reserve(instance, encoder, &mut out)?;

        debug!(
            status = after_status,
            adjacency = after_adjacency - after_status,
            reserve = out.len() - after_adjacency,
            strategy = self.strategy.name(),
            "generated hard constraints"
        );
        Ok(out)
    }

    /// Pairwise exclusion of statuses plus totality, per unit.
    fn status_exclusion(
        &self,
        instance: &Instance,
        encoder: &VarEncoder,
        out: &mut Vec<Constraint>,
    ) -> Result<()> {
        for i in instance.units() {
            let statuses = encoder.status_vars(i)?;
            for (a, &sa) in statuses.iter().enumerate() {
                for &sb in &statuses[a + 1..] {
                    out.push(Constraint::Clause(vec![sa.neg_lit(), sb.neg_lit()]));
                }
            }
            out.push(Constraint::Clause(
                statuses.iter().map(|v| v.pos_lit()).collect(),
            ));
        }
        Ok(())
    }

    /// Adjacent units are never harvested in the same period.
    fn adjacency_exclusion(
        &self,
        instance: &Instance,
        encoder: &VarEncoder,
        out: &mut Vec<Constraint>,
    ) -> Result<()> {
        for (a, b) in instance.edges() {
            for j in instance.periods() {
                let va = encoder.encode(VarRequest::ByPeriod(a, j))?;
                let vb = encoder.encode(VarRequest::ByPeriod(b, j))?;
                out.push(Constraint::Clause(vec![va.neg_lit(), vb.neg_lit()]));
            }
        }
        Ok(())
    }

    /// Contiguity and area threshold, or an empty reserve when `amin = 0`.
    fn reserve(
        &self,
        instance: &Instance,
        encoder: &VarEncoder,
        out: &mut Vec<Constraint>,
    ) -> Result<()> {
        let amin = instance.min_reserve_area();
        if amin == 0 {
            for i in instance.units() {
                let r = encoder.encode(VarRequest::Reserve(i))?;
                out.push(Constraint::Clause(vec![r.neg_lit()]));
            }
            return Ok(());
        }

        if instance.total_area() < amin {
            debug!(
                total_area = instance.total_area(),
                amin, "reserve threshold exceeds total area"
            );
        }

        self.strategy.emit(instance, encoder, out)?;

        let terms = instance
            .units()
            .map(|i| {
                encoder
                    .encode(VarRequest::Reserve(i))
                    .map(|v| (v.pos_lit(), instance.area(i)))
            })
            .collect::<Result<Vec<_>>>()?;
        out.push(Constraint::AtLeastWeighted { terms, bound: amin });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::assignment_with_true_vars;
    use crate::encoding::Var;

    fn pair(amin: u64) -> Instance {
        Instance::new(vec![3, 4], vec![vec![2], vec![1]], vec![vec![5, 6]], amin).unwrap()
    }

    fn satisfied(constraints: &[Constraint], encoder: &VarEncoder, true_vars: &[Var]) -> bool {
        let a = assignment_with_true_vars(encoder.num_vars(), true_vars.iter().copied());
        constraints.iter().all(|c| c.is_satisfied(&a))
    }

    #[test]
    fn test_status_counts() {
        let inst = pair(0);
        let gen = HardConstraintGenerator::default();
        let enc = gen.encoder_for(&inst).unwrap();
        assert_eq!(enc.depth_levels(), 0);
        let mut out = Vec::new();
        gen.status_exclusion(&inst, &enc, &mut out).unwrap();
        // 3 statuses per unit: 3 pairs + 1 totality clause
        assert_eq!(out.len(), 2 * 4);
    }

    #[test]
    fn test_adjacency_emitted_once() {
        let inst = pair(0);
        let gen = HardConstraintGenerator::default();
        let enc = gen.encoder_for(&inst).unwrap();
        let mut out = Vec::new();
        gen.adjacency_exclusion(&inst, &enc, &mut out).unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_both_harvested_is_rejected() {
        let inst = pair(0);
        let gen = HardConstraintGenerator::default();
        let enc = gen.encoder_for(&inst).unwrap();
        let constraints = gen.build(&inst, &enc).unwrap();
        let h = |u| enc.encode(VarRequest::ByPeriod(u, 1)).unwrap();
        let idle = |u| enc.encode(VarRequest::ByPeriod(u, 0)).unwrap();
        assert!(!satisfied(&constraints, &enc, &[h(1), h(2)]));
        assert!(satisfied(&constraints, &enc, &[idle(1), h(2)]));
        // totality: a unit with no status is rejected
        assert!(!satisfied(&constraints, &enc, &[h(2)]));
    }

    #[test]
    fn test_no_reserve_when_amin_zero() {
        let inst = pair(0);
        let gen = HardConstraintGenerator::default();
        let enc = gen.encoder_for(&inst).unwrap();
        let constraints = gen.build(&inst, &enc).unwrap();
        let r1 = enc.encode(VarRequest::Reserve(1)).unwrap();
        let idle2 = enc.encode(VarRequest::ByPeriod(2, 0)).unwrap();
        assert!(!satisfied(&constraints, &enc, &[r1, idle2]));
    }

    #[test]
    fn test_reserve_tree_assignment() {
        let inst = pair(7);
        let gen = HardConstraintGenerator::default();
        let enc = gen.encoder_for(&inst).unwrap();
        assert_eq!(enc.depth_levels(), 2);
        let constraints = gen.build(&inst, &enc).unwrap();
        let r = |u| enc.encode(VarRequest::Reserve(u)).unwrap();
        let d = |u, l| enc.encode(VarRequest::ByDepth(u, l)).unwrap();

        // Root at 2, child 1 at depth 2: connected, area 7
        assert!(satisfied(&constraints, &enc, &[r(1), r(2), d(2, 1), d(1, 2)]));
        // Two roots are forbidden
        assert!(!satisfied(&constraints, &enc, &[r(1), r(2), d(1, 1), d(2, 1)]));
        // Reserve without depth is forbidden
        assert!(!satisfied(&constraints, &enc, &[r(1), r(2), d(2, 1)]));
        // Area below threshold
        assert!(!satisfied(
            &constraints,
            &enc,
            &[r(2), d(2, 1), enc.encode(VarRequest::ByPeriod(1, 0)).unwrap()]
        ));
    }

    #[test]
    fn test_local_closure_uses_no_depth() {
        let inst = pair(7);
        let gen = HardConstraintGenerator::new(ContiguityKind::LocalClosure);
        let enc = gen.encoder_for(&inst).unwrap();
        assert_eq!(enc.depth_levels(), 0);
        let constraints = gen.build(&inst, &enc).unwrap();
        assert!(constraints
            .iter()
            .any(|c| matches!(c, Constraint::AtLeastWeighted { bound: 7, .. })));
    }
}
