//! Decoding of engine assignments into harvest plans.

use crate::constraint::{holds, Assignment};
use crate::encoding::{Status, VarEncoder};
use crate::error::{HarvestError, Result};
use crate::model::Instance;
use std::collections::{HashSet, VecDeque};

/// A harvest schedule with its natural reserve.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HarvestPlan {
    /// Sum of the profits of every harvested `(period, unit)` pair.
    pub total_profit: i64,
    /// `harvest[j - 1]` lists the units harvested in period `j`, ascending.
    pub harvest: Vec<Vec<usize>>,
    /// Reserve units, ascending.
    pub reserve: Vec<usize>,
}

impl HarvestPlan {
    /// Status of `unit` in this plan.
    pub fn status_of(&self, unit: usize) -> Status {
        if self.reserve.binary_search(&unit).is_ok() {
            return Status::Reserve;
        }
        self.harvest
            .iter()
            .position(|units| units.binary_search(&unit).is_ok())
            .map_or(Status::Unassigned, |p| Status::Harvested(p + 1))
    }

    /// Total area of the reserve.
    pub fn reserve_area(&self, instance: &Instance) -> u64 {
        self.reserve.iter().map(|&u| instance.area(u)).sum()
    }

    /// Checks the plan against `instance`.
    ///
    /// Verifies that each unit is placed at most once, no adjacent units
    /// share a period, the reserve is connected and large enough, and the
    /// reported profit matches the harvest lists.
    pub fn check(&self, instance: &Instance) -> std::result::Result<(), String> {
        if self.harvest.len() != instance.period_count() {
            return Err(format!(
                "plan has {} periods, instance has {}",
                self.harvest.len(),
                instance.period_count()
            ));
        }

        let mut placed = HashSet::new();
        for &u in self.harvest.iter().flatten().chain(&self.reserve) {
            if u == 0 || u > instance.unit_count() {
                return Err(format!("unknown unit {u}"));
            }
            if !placed.insert(u) {
                return Err(format!("unit {u} placed twice"));
            }
        }

        let mut profit = 0i64;
        for (idx, units) in self.harvest.iter().enumerate() {
            let period = idx + 1;
            for (a, &ua) in units.iter().enumerate() {
                profit += instance.profit(period, ua);
                if let Some(&ub) = units[a + 1..].iter().find(|&&ub| instance.are_adjacent(ua, ub))
                {
                    return Err(format!(
                        "adjacent units {ua} and {ub} both harvested in period {period}"
                    ));
                }
            }
        }
        if profit != self.total_profit {
            return Err(format!(
                "reported profit {} but harvest yields {profit}",
                self.total_profit
            ));
        }

        if instance.min_reserve_area() > 0 {
            let area = self.reserve_area(instance);
            if area < instance.min_reserve_area() {
                return Err(format!(
                    "reserve area {area} below minimum {}",
                    instance.min_reserve_area()
                ));
            }
            if !is_connected(instance, &self.reserve) {
                return Err("reserve is not contiguous".into());
            }
        }
        Ok(())
    }
}

/// Whether `units` induce a connected subgraph.
fn is_connected(instance: &Instance, units: &[usize]) -> bool {
    let Some(&start) = units.first() else {
        return true;
    };
    let members: HashSet<usize> = units.iter().copied().collect();
    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(u) = queue.pop_front() {
        for &v in instance.neighbours(u) {
            if members.contains(&v) && seen.insert(v) {
                queue.push_back(v);
            }
        }
    }
    seen.len() == members.len()
}

/// Maps an assignment back to a [`HarvestPlan`].
///
/// # Examples
///
/// ```
/// use u_harvest::constraint::assignment_with_true_vars;
/// use u_harvest::decode::Decoder;
/// use u_harvest::encoding::{VarEncoder, VarRequest};
/// use u_harvest::model::Instance;
///
/// let instance = Instance::new(vec![5], vec![vec![]], vec![vec![10]], 0).unwrap();
/// let encoder = VarEncoder::new(1, 1, 0).unwrap();
/// let harvested = encoder.encode(VarRequest::ByPeriod(1, 1)).unwrap();
/// let assignment = assignment_with_true_vars(encoder.num_vars(), [harvested]);
///
/// let plan = Decoder::new(&instance, &encoder).decode(&assignment).unwrap();
/// assert_eq!(plan.total_profit, 10);
/// assert_eq!(plan.harvest, vec![vec![1]]);
/// ```
pub struct Decoder<'a> {
    instance: &'a Instance,
    encoder: &'a VarEncoder,
}

impl<'a> Decoder<'a> {
    pub fn new(instance: &'a Instance, encoder: &'a VarEncoder) -> Self {
        Self { instance, encoder }
    }

    /// Decodes `assignment`.
    ///
    /// Fails with [`HarvestError::MalformedAssignment`] if any unit has
    /// zero or several true status variables. Depth variables and
    /// auxiliary variables are ignored.
    pub fn decode(&self, assignment: &Assignment) -> Result<HarvestPlan> {
        let mut harvest = vec![Vec::new(); self.instance.period_count()];
        let mut reserve = Vec::new();
        let mut total_profit = 0i64;

        for unit in self.instance.units() {
            let mut chosen = None;
            let mut true_statuses = 0usize;
            for var in self.encoder.status_vars(unit)? {
                if holds(assignment, var.pos_lit()) {
                    true_statuses += 1;
                    chosen = Some(self.encoder.decode(var)?.1);
                }
            }
            let status = match (true_statuses, chosen) {
                (1, Some(status)) => status,
                _ => {
                    return Err(HarvestError::MalformedAssignment {
                        unit,
                        true_statuses,
                    })
                }
            };
            match status {
                Status::Harvested(period) => {
                    harvest[period - 1].push(unit);
                    total_profit += self.instance.profit(period, unit);
                }
                Status::Reserve => reserve.push(unit),
                Status::Unassigned | Status::Depth(_) => {}
            }
        }

        Ok(HarvestPlan {
            total_profit,
            harvest,
            reserve,
        })
    }
}
