//! Instance-scoped bijection between domain variables and identifiers.

use super::Var;
use crate::error::{HarvestError, Result};

/// Upper limit on `n * (k + 2 + D_max)`.
///
/// Keeps every problem identifier, and the auxiliaries allocated above
/// them, inside the literal range of the SAT backend.
pub const MAX_PROBLEM_VARS: u32 = 1 << 30;

/// A request for one domain variable.
///
/// Each variant names exactly one variable family, so an ambiguous
/// combination of period and depth cannot be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarRequest {
    /// `Assign(unit, period)`: period 0 means unassigned, `1..=k` harvested.
    ByPeriod(usize, usize),
    /// `Reserve(unit)`, i.e. `Assign(unit, k + 1)`.
    Reserve(usize),
    /// `Depth(unit, depth)` with `depth` in `1..=D_max`.
    ByDepth(usize, usize),
}

/// The meaning of a decoded identifier for its unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    /// Neither harvested nor part of the reserve.
    Unassigned,
    /// Harvested in the given period (`1..=k`).
    Harvested(usize),
    /// Part of the natural reserve.
    Reserve,
    /// On the given level (`1..=D_max`) of the reserve spanning tree.
    Depth(usize),
}

/// Encodes domain variables of one instance as identifiers `1..=num_vars()`.
///
/// # Examples
///
/// ```
/// use u_harvest::encoding::{Status, VarEncoder, VarRequest};
///
/// let enc = VarEncoder::new(3, 2, 1).unwrap();
/// let v = enc.encode(VarRequest::ByPeriod(2, 1)).unwrap();
/// assert_eq!(enc.decode(v).unwrap(), (2, Status::Harvested(1)));
/// assert!(enc.encode(VarRequest::ByDepth(1, 2)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarEncoder {
    units: usize,
    periods: usize,
    depth_levels: usize,
    num_vars: u32,
}

impl VarEncoder {
    /// Creates an encoder for `units` units, `periods` harvesting periods
    /// and `depth_levels` spanning-tree levels.
    ///
    /// Fails with [`HarvestError::InvalidVariableRequest`] when the layout
    /// needs more than [`MAX_PROBLEM_VARS`] identifiers.
    pub fn new(units: usize, periods: usize, depth_levels: usize) -> Result<Self> {
        let num_vars = periods
            .checked_add(2)
            .and_then(|w| w.checked_add(depth_levels))
            .and_then(|w| w.checked_mul(units))
            .and_then(|total| u32::try_from(total).ok())
            .filter(|&total| total <= MAX_PROBLEM_VARS)
            .ok_or_else(|| {
                HarvestError::InvalidVariableRequest(format!(
                    "{units} units x ({periods} periods + 2 + {depth_levels} depth levels) \
                     exceeds {MAX_PROBLEM_VARS} variables"
                ))
            })?;
        Ok(Self {
            units,
            periods,
            depth_levels,
            num_vars,
        })
    }

    /// Number of units `n`.
    pub fn units(&self) -> usize {
        self.units
    }

    /// Number of harvesting periods `k`.
    pub fn periods(&self) -> usize {
        self.periods
    }

    /// Number of depth levels `D_max`.
    pub fn depth_levels(&self) -> usize {
        self.depth_levels
    }

    /// Identifiers per unit: `k + 2 + D_max`.
    fn width(&self) -> usize {
        self.periods + 2 + self.depth_levels
    }

    /// Status index of the reserve flag, `k + 1`.
    pub fn reserve_status(&self) -> usize {
        self.periods + 1
    }

    /// Highest identifier used by problem variables.
    pub fn num_vars(&self) -> u32 {
        self.num_vars
    }

    /// Identifier of the requested variable.
    pub fn encode(&self, request: VarRequest) -> Result<Var> {
        let (unit, status) = match request {
            VarRequest::ByPeriod(unit, period) => {
                if period > self.periods {
                    return Err(HarvestError::InvalidVariableRequest(format!(
                        "period {period} outside 0..={}",
                        self.periods
                    )));
                }
                (unit, period)
            }
            VarRequest::Reserve(unit) => (unit, self.reserve_status()),
            VarRequest::ByDepth(unit, depth) => {
                if depth == 0 || depth > self.depth_levels {
                    return Err(HarvestError::InvalidVariableRequest(format!(
                        "depth {depth} outside 1..={}",
                        self.depth_levels
                    )));
                }
                (unit, self.reserve_status() + depth)
            }
        };
        if unit == 0 || unit > self.units {
            return Err(HarvestError::InvalidVariableRequest(format!(
                "unit {unit} outside 1..={}",
                self.units
            )));
        }
        // Bounded by `num_vars`, which `new` checked against the u32 range
        let id = (unit - 1) * self.width() + status;
        let index = u32::try_from(id).map_err(|_| {
            HarvestError::InvalidVariableRequest(format!("identifier {id} overflows u32"))
        })?;
        Ok(Var::new(index))
    }

    /// Identifier of `Assign(unit, status)` for a status index in `0..=k+1`.
    pub fn status_var(&self, unit: usize, status: usize) -> Result<Var> {
        if status == self.reserve_status() {
            self.encode(VarRequest::Reserve(unit))
        } else {
            self.encode(VarRequest::ByPeriod(unit, status))
        }
    }

    /// The `k + 2` status variables of `unit`, in status order.
    pub fn status_vars(&self, unit: usize) -> Result<Vec<Var>> {
        (0..=self.reserve_status())
            .map(|s| self.status_var(unit, s))
            .collect()
    }

    /// The `D_max` depth variables of `unit`, shallowest first.
    pub fn depth_vars(&self, unit: usize) -> Result<Vec<Var>> {
        (1..=self.depth_levels)
            .map(|d| self.encode(VarRequest::ByDepth(unit, d)))
            .collect()
    }

    /// Unit and status of a problem variable.
    ///
    /// Auxiliary identifiers above [`num_vars`](Self::num_vars) are rejected.
    pub fn decode(&self, var: Var) -> Result<(usize, Status)> {
        let id = var.idx() + 1;
        if id > self.num_vars as usize {
            return Err(HarvestError::InvalidVariableRequest(format!(
                "identifier {id} is not a problem variable"
            )));
        }
        let unit = (id - 1) / self.width() + 1;
        let status = (id - 1) % self.width();
        let status = match status {
            0 => Status::Unassigned,
            s if s <= self.periods => Status::Harvested(s),
            s if s == self.reserve_status() => Status::Reserve,
            s => Status::Depth(s - self.reserve_status()),
        };
        Ok((unit, status))
    }
}
