//! Reserve contiguity strategies.

use crate::constraint::Constraint;
use crate::encoding::{VarEncoder, VarRequest};
use crate::error::Result;
use crate::model::Instance;

/// Encodes "the reserve is one connected region".
///
/// Only invoked when the instance requires a reserve (`amin > 0`). The
/// area threshold itself is emitted by the generator, not the strategy.
pub trait ContiguityStrategy: Send + Sync {
    /// Returns a human-readable name for this strategy.
    fn name(&self) -> &str;

    /// Number of depth variables per unit the strategy needs (`D_max`).
    fn depth_levels(&self, instance: &Instance) -> usize;

    /// Appends the strategy's constraints to `out`.
    fn emit(
        &self,
        instance: &Instance,
        encoder: &VarEncoder,
        out: &mut Vec<Constraint>,
    ) -> Result<()>;
}

/// Selects a built-in strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContiguityKind {
    /// Rooted spanning tree with depth variables. Guarantees contiguity.
    #[default]
    SpanningTree,
    /// Distance-2 closure rule. Does not guarantee contiguity.
    LocalClosure,
}

impl ContiguityKind {
    /// The strategy object for this kind.
    pub fn strategy(self) -> Box<dyn ContiguityStrategy> {
        match self {
            ContiguityKind::SpanningTree => Box::new(SpanningTree),
            ContiguityKind::LocalClosure => Box::new(LocalClosure),
        }
    }
}

/// Spanning-tree encoding of reserve connectivity.
///
/// With `Depth(i, d)` meaning "unit `i` sits on level `d` of the tree":
///
/// - at most one unit has depth 1 (the root)
/// - `Depth(i, d)` with `d >= 2` implies exactly one neighbour of `i` has
///   depth `d - 1`
/// - each unit has at most one depth
/// - `Reserve(i) <=> Depth(i, 1) | ... | Depth(i, D_max)`
#[derive(Debug, Clone, Copy, Default)]
pub struct SpanningTree;

impl ContiguityStrategy for SpanningTree {
    fn name(&self) -> &str {
        "spanning-tree"
    }

    fn depth_levels(&self, instance: &Instance) -> usize {
        instance.reserve_depth_bound()
    }

    fn emit(
        &self,
        instance: &Instance,
        encoder: &VarEncoder,
        out: &mut Vec<Constraint>,
    ) -> Result<()> {
        let levels = encoder.depth_levels();

        let roots = instance
            .units()
            .map(|i| encoder.encode(VarRequest::ByDepth(i, 1)).map(|v| v.pos_lit()))
            .collect::<Result<Vec<_>>>()?;
        out.push(Constraint::AtMost {
            lits: roots,
            bound: 1,
        });

        for i in instance.units() {
            let depth = encoder.depth_vars(i)?;

            for d in 2..=levels {
                let node = depth[d - 1];
                let parents = instance
                    .neighbours(i)
                    .iter()
                    .map(|&p| encoder.encode(VarRequest::ByDepth(p, d - 1)))
                    .collect::<Result<Vec<_>>>()?;

                let mut some_parent = vec![node.neg_lit()];
                some_parent.extend(parents.iter().map(|p| p.pos_lit()));
                out.push(Constraint::Clause(some_parent));

                for (a, &pa) in parents.iter().enumerate() {
                    for &pb in &parents[a + 1..] {
                        out.push(Constraint::Clause(vec![node.neg_lit(), pa.neg_lit(), pb.neg_lit()]));
                    }
                }
            }

            for (a, &da) in depth.iter().enumerate() {
                for &db in &depth[a + 1..] {
                    out.push(Constraint::Clause(vec![da.neg_lit(), db.neg_lit()]));
                }
            }

            let reserve = encoder.encode(VarRequest::Reserve(i))?;
            let mut has_depth = vec![reserve.neg_lit()];
            has_depth.extend(depth.iter().map(|v| v.pos_lit()));
            out.push(Constraint::Clause(has_depth));
            for &dv in &depth {
                out.push(Constraint::Clause(vec![dv.neg_lit(), reserve.pos_lit()]));
            }
        }
        Ok(())
    }
}

/// Local closure rule over 2-hop neighbourhoods.
///
/// For every pair of non-adjacent units with at least one common
/// neighbour, both may be reserve only if one of their common neighbours
/// is reserve too. Pairs further apart are unconstrained, so disconnected
/// reserves remain possible. Prefer [`SpanningTree`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClosure;

impl ContiguityStrategy for LocalClosure {
    fn name(&self) -> &str {
        "local-closure"
    }

    fn depth_levels(&self, _instance: &Instance) -> usize {
        0
    }

    fn emit(
        &self,
        instance: &Instance,
        encoder: &VarEncoder,
        out: &mut Vec<Constraint>,
    ) -> Result<()> {
        for a in instance.units() {
            for b in a + 1..=instance.unit_count() {
                if instance.are_adjacent(a, b) {
                    continue;
                }
                let common: Vec<usize> = instance
                    .neighbours(a)
                    .iter()
                    .copied()
                    .filter(|&c| instance.are_adjacent(b, c))
                    .collect();
                if common.is_empty() {
                    continue;
                }
                let mut clause = vec![
                    encoder.encode(VarRequest::Reserve(a))?.neg_lit(),
                    encoder.encode(VarRequest::Reserve(b))?.neg_lit(),
                ];
                for c in common {
                    clause.push(encoder.encode(VarRequest::Reserve(c))?.pos_lit());
                }
                out.push(Constraint::Clause(clause));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn star() -> Instance {
        // 1 is the hub, 2..=4 are leaves
        Instance::new(
            vec![1, 1, 1, 1],
            vec![vec![2, 3, 4], vec![1], vec![1], vec![1]],
            vec![vec![0; 4]],
            3,
        )
        .unwrap()
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ContiguityKind::default(), ContiguityKind::SpanningTree);
        assert_eq!(ContiguityKind::SpanningTree.strategy().name(), "spanning-tree");
        assert_eq!(ContiguityKind::LocalClosure.strategy().name(), "local-closure");
    }

    #[test]
    fn test_spanning_tree_constraint_shape() {
        let inst = star();
        let strategy = SpanningTree;
        assert_eq!(strategy.depth_levels(&inst), 3);
        let enc = VarEncoder::new(4, 1, 3).unwrap();
        let mut out = Vec::new();
        strategy.emit(&inst, &enc, &mut out).unwrap();

        let root_bounds = out
            .iter()
            .filter(|c| matches!(c, Constraint::AtMost { bound: 1, lits } if lits.len() == 4))
            .count();
        assert_eq!(root_bounds, 1);

        // Leaf 2 at depth 2 must point to hub 1 at depth 1
        let leaf = enc.encode(VarRequest::ByDepth(2, 2)).unwrap();
        let hub = enc.encode(VarRequest::ByDepth(1, 1)).unwrap();
        assert!(out.contains(&Constraint::Clause(vec![leaf.neg_lit(), hub.pos_lit()])));
    }

    #[test]
    fn test_isolated_unit_cannot_be_deep() {
        let inst = Instance::new(vec![1, 1], vec![vec![], vec![]], vec![], 2).unwrap();
        let enc = VarEncoder::new(2, 0, 2).unwrap();
        let mut out = Vec::new();
        SpanningTree.emit(&inst, &enc, &mut out).unwrap();
        let deep = enc.encode(VarRequest::ByDepth(1, 2)).unwrap();
        assert!(out.contains(&Constraint::Clause(vec![deep.neg_lit()])));
    }

    #[test]
    fn test_local_closure_pairs() {
        let inst = star();
        let enc = VarEncoder::new(4, 1, 0).unwrap();
        let mut out = Vec::new();
        LocalClosure.emit(&inst, &enc, &mut out).unwrap();
        // Leaves pairwise: (2,3), (2,4), (3,4), each through the hub
        assert_eq!(out.len(), 3);
        let r = |u| enc.encode(VarRequest::Reserve(u)).unwrap();
        assert!(out.contains(&Constraint::Clause(vec![r(2).neg_lit(), r(3).neg_lit(), r(1).pos_lit()])));
    }
}
