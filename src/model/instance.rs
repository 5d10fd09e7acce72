//! The loaded problem instance.

use crate::error::{HarvestError, Result};
use std::ops::RangeInclusive;

/// A harvest planning instance.
///
/// Immutable once constructed. All accessors take 1-based unit and period
/// identifiers.
///
/// # Examples
///
/// ```
/// use u_harvest::model::Instance;
///
/// // Two adjacent units, one period, no reserve required.
/// let instance = Instance::new(vec![3, 4], vec![vec![2], vec![1]], vec![vec![5, 6]], 0).unwrap();
/// assert_eq!(instance.unit_count(), 2);
/// assert_eq!(instance.period_count(), 1);
/// assert!(instance.are_adjacent(1, 2));
/// assert_eq!(instance.profit(1, 2), 6);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Instance {
    areas: Vec<u64>,
    neighbours: Vec<Vec<usize>>,
    profits: Vec<Vec<i64>>,
    min_reserve_area: u64,
}

impl Instance {
    /// Creates an instance after checking its structural invariants.
    ///
    /// # Arguments
    /// * `areas` - Area of each unit (all positive)
    /// * `neighbours` - Adjacency lists, one per unit, 1-based ids
    /// * `profits` - `profits[j - 1][i - 1]` is the profit of harvesting unit `i` in period `j`
    /// * `min_reserve_area` - Minimum total area of the natural reserve (`amin`)
    ///
    /// Neighbour lists are sorted and deduplicated. The relation must be
    /// symmetric and irreflexive.
    pub fn new(
        areas: Vec<u64>,
        neighbours: Vec<Vec<usize>>,
        profits: Vec<Vec<i64>>,
        min_reserve_area: u64,
    ) -> Result<Self> {
        let n = areas.len();
        if neighbours.len() != n {
            return Err(HarvestError::InvalidInstance(format!(
                "expected {n} adjacency lists, found {}",
                neighbours.len()
            )));
        }
        if let Some(pos) = areas.iter().position(|&a| a == 0) {
            return Err(HarvestError::InvalidInstance(format!(
                "unit {} has zero area",
                pos + 1
            )));
        }
        if areas.iter().try_fold(0u64, |acc, &a| acc.checked_add(a)).is_none() {
            return Err(HarvestError::InvalidInstance(
                "total area overflows u64".into(),
            ));
        }
        for (j, row) in profits.iter().enumerate() {
            if row.len() != n {
                return Err(HarvestError::InvalidInstance(format!(
                    "period {} has {} profits, expected {n}",
                    j + 1,
                    row.len()
                )));
            }
        }

        let mut neighbours = neighbours;
        for (idx, list) in neighbours.iter_mut().enumerate() {
            let unit = idx + 1;
            list.sort_unstable();
            list.dedup();
            for &other in list.iter() {
                if other == 0 || other > n {
                    return Err(HarvestError::InvalidInstance(format!(
                        "unit {unit} lists neighbour {other} outside 1..={n}"
                    )));
                }
                if other == unit {
                    return Err(HarvestError::InvalidInstance(format!(
                        "unit {unit} lists itself as a neighbour"
                    )));
                }
            }
        }
        for (idx, list) in neighbours.iter().enumerate() {
            let unit = idx + 1;
            for &other in list {
                if neighbours[other - 1].binary_search(&unit).is_err() {
                    return Err(HarvestError::InvalidInstance(format!(
                        "adjacency is not symmetric: {unit} -> {other} has no reverse edge"
                    )));
                }
            }
        }

        Ok(Self {
            areas,
            neighbours,
            profits,
            min_reserve_area,
        })
    }

    /// Number of units `n`.
    pub fn unit_count(&self) -> usize {
        self.areas.len()
    }

    /// Number of harvesting periods `k`.
    pub fn period_count(&self) -> usize {
        self.profits.len()
    }

    /// All unit identifiers, `1..=n`.
    pub fn units(&self) -> RangeInclusive<usize> {
        1..=self.unit_count()
    }

    /// All harvesting period identifiers, `1..=k`.
    pub fn periods(&self) -> RangeInclusive<usize> {
        1..=self.period_count()
    }

    /// Area of `unit`.
    pub fn area(&self, unit: usize) -> u64 {
        self.areas[unit - 1]
    }

    /// All areas in unit order.
    pub fn areas(&self) -> &[u64] {
        &self.areas
    }

    /// Sorted neighbours of `unit`.
    pub fn neighbours(&self, unit: usize) -> &[usize] {
        &self.neighbours[unit - 1]
    }

    /// Whether units `a` and `b` share an edge.
    pub fn are_adjacent(&self, a: usize, b: usize) -> bool {
        self.neighbours[a - 1].binary_search(&b).is_ok()
    }

    /// Each undirected edge once, as `(a, b)` with `a < b`.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.units().flat_map(move |a| {
            self.neighbours(a)
                .iter()
                .copied()
                .filter(move |&b| b > a)
                .map(move |b| (a, b))
        })
    }

    /// Profit of harvesting `unit` in `period`.
    pub fn profit(&self, period: usize, unit: usize) -> i64 {
        self.profits[period - 1][unit - 1]
    }

    /// Minimum reserve area `amin`.
    pub fn min_reserve_area(&self) -> u64 {
        self.min_reserve_area
    }

    /// Sum of all unit areas.
    pub fn total_area(&self) -> u64 {
        self.areas.iter().sum()
    }

    /// Depth bound `D_max` for the reserve spanning tree.
    ///
    /// The number of units needed to reach `amin` when taking the smallest
    /// areas first. Any connected reserve meeting the threshold contains a
    /// connected sub-reserve of at most this many units, so no tree needs
    /// more levels. Returns 0 when no reserve is required and `n` when the
    /// threshold cannot be reached at all.
    pub fn reserve_depth_bound(&self) -> usize {
        if self.min_reserve_area == 0 {
            return 0;
        }
        let mut sorted = self.areas.clone();
        sorted.sort_unstable();
        let mut acc = 0u64;
        for (count, area) in sorted.iter().enumerate() {
            acc += area;
            if acc >= self.min_reserve_area {
                return count + 1;
            }
        }
        self.unit_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(n: usize) -> Vec<Vec<usize>> {
        (1..=n)
            .map(|i| {
                let mut v = Vec::new();
                if i > 1 {
                    v.push(i - 1);
                }
                if i < n {
                    v.push(i + 1);
                }
                v
            })
            .collect()
    }

    #[test]
    fn test_instance_accessors() {
        let inst = Instance::new(vec![2, 3, 4], path(3), vec![vec![1, 2, 3], vec![4, 5, 6]], 5)
            .unwrap();
        assert_eq!(inst.unit_count(), 3);
        assert_eq!(inst.period_count(), 2);
        assert_eq!(inst.area(2), 3);
        assert_eq!(inst.profit(2, 3), 6);
        assert_eq!(inst.total_area(), 9);
        assert!(inst.are_adjacent(1, 2));
        assert!(!inst.are_adjacent(1, 3));
        assert_eq!(inst.edges().collect::<Vec<_>>(), vec![(1, 2), (2, 3)]);
    }

    #[test]
    fn test_neighbours_normalized() {
        let inst = Instance::new(vec![1, 1, 1], vec![vec![3, 2, 2], vec![1], vec![1]], vec![], 0)
            .unwrap();
        assert_eq!(inst.neighbours(1), &[2, 3]);
    }

    #[test]
    fn test_rejects_asymmetric() {
        let err = Instance::new(vec![1, 1], vec![vec![2], vec![]], vec![], 0).unwrap_err();
        assert!(matches!(err, HarvestError::InvalidInstance(_)));
    }

    #[test]
    fn test_rejects_self_loop_and_range() {
        assert!(Instance::new(vec![1], vec![vec![1]], vec![], 0).is_err());
        assert!(Instance::new(vec![1], vec![vec![2]], vec![], 0).is_err());
    }

    #[test]
    fn test_rejects_zero_area_and_ragged_profits() {
        assert!(Instance::new(vec![0], vec![vec![]], vec![], 0).is_err());
        assert!(Instance::new(vec![1, 1], path(2), vec![vec![1]], 0).is_err());
        assert!(Instance::new(vec![u64::MAX, 1], path(2), vec![], 1).is_err());
    }

    #[test]
    fn test_depth_bound() {
        let inst = |amin| Instance::new(vec![5, 1, 3, 2], path(4), vec![], amin).unwrap();
        assert_eq!(inst(0).reserve_depth_bound(), 0);
        assert_eq!(inst(1).reserve_depth_bound(), 1);
        // 1 + 2 = 3 < 4, 1 + 2 + 3 = 6 >= 4
        assert_eq!(inst(4).reserve_depth_bound(), 3);
        assert_eq!(inst(11).reserve_depth_bound(), 4);
        // unreachable threshold falls back to n
        assert_eq!(inst(100).reserve_depth_bound(), 4);
    }
}
