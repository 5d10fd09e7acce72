//! Seeded random instances on a rectangular grid.
//!
//! Used by benchmarks and property tests. Units are laid out row by row;
//! each unit is adjacent to its 4-neighbours.

use crate::error::{HarvestError, Result};
use crate::model::Instance;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Configuration for a random grid instance.
///
/// # Examples
///
/// ```
/// use u_harvest::generator::GridInstanceConfig;
///
/// let instance = GridInstanceConfig::default()
///     .with_shape(2, 3)
///     .with_periods(2)
///     .with_seed(7)
///     .generate()
///     .unwrap();
/// assert_eq!(instance.unit_count(), 6);
/// assert!(instance.are_adjacent(1, 4));
/// ```
#[derive(Debug, Clone)]
pub struct GridInstanceConfig {
    /// Grid rows.
    pub rows: usize,
    /// Grid columns.
    pub cols: usize,
    /// Harvesting periods `k`.
    pub periods: usize,
    /// Areas are drawn from `1..=max_area`.
    pub max_area: u64,
    /// Profits are drawn from `0..=max_profit`.
    pub max_profit: i64,
    /// `amin` as a fraction of the total area, in `[0, 1]`.
    pub reserve_fraction: f64,
    /// Random seed.
    pub seed: u64,
}

impl Default for GridInstanceConfig {
    fn default() -> Self {
        Self {
            rows: 3,
            cols: 3,
            periods: 2,
            max_area: 5,
            max_profit: 20,
            reserve_fraction: 0.2,
            seed: 42,
        }
    }
}

impl GridInstanceConfig {
    pub fn with_shape(mut self, rows: usize, cols: usize) -> Self {
        self.rows = rows;
        self.cols = cols;
        self
    }

    pub fn with_periods(mut self, periods: usize) -> Self {
        self.periods = periods;
        self
    }

    pub fn with_max_area(mut self, max_area: u64) -> Self {
        self.max_area = max_area;
        self
    }

    pub fn with_max_profit(mut self, max_profit: i64) -> Self {
        self.max_profit = max_profit;
        self
    }

    pub fn with_reserve_fraction(mut self, fraction: f64) -> Self {
        self.reserve_fraction = fraction;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.max_area == 0 {
            return Err("max_area must be positive".into());
        }
        if self.max_profit < 0 {
            return Err(format!("max_profit must be non-negative, got {}", self.max_profit));
        }
        if !(0.0..=1.0).contains(&self.reserve_fraction) {
            return Err(format!(
                "reserve_fraction must be in [0, 1], got {}",
                self.reserve_fraction
            ));
        }
        Ok(())
    }

    /// Generates the instance. The same configuration always yields the
    /// same instance.
    pub fn generate(&self) -> Result<Instance> {
        self.validate().map_err(HarvestError::InvalidConfig)?;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let n = self.rows * self.cols;

        let areas: Vec<u64> = (0..n).map(|_| rng.random_range(1..=self.max_area)).collect();

        let id = |r: usize, c: usize| r * self.cols + c + 1;
        let mut neighbours = vec![Vec::new(); n];
        for r in 0..self.rows {
            for c in 0..self.cols {
                let list = &mut neighbours[id(r, c) - 1];
                if r > 0 {
                    list.push(id(r - 1, c));
                }
                if c > 0 {
                    list.push(id(r, c - 1));
                }
                if c + 1 < self.cols {
                    list.push(id(r, c + 1));
                }
                if r + 1 < self.rows {
                    list.push(id(r + 1, c));
                }
            }
        }

        let profits: Vec<Vec<i64>> = (0..self.periods)
            .map(|_| (0..n).map(|_| rng.random_range(0..=self.max_profit)).collect())
            .collect();

        let total: u64 = areas.iter().sum();
        let amin = (total as f64 * self.reserve_fraction).ceil() as u64;

        Instance::new(areas, neighbours, profits, amin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let config = GridInstanceConfig::default().with_seed(3);
        assert_eq!(config.generate().unwrap(), config.generate().unwrap());
    }

    #[test]
    fn test_grid_adjacency() {
        let inst = GridInstanceConfig::default()
            .with_shape(2, 2)
            .generate()
            .unwrap();
        assert_eq!(inst.edges().count(), 4);
        assert!(!inst.are_adjacent(1, 4));
    }

    #[test]
    fn test_reserve_fraction_bounds() {
        let none = GridInstanceConfig::default()
            .with_reserve_fraction(0.0)
            .generate()
            .unwrap();
        assert_eq!(none.min_reserve_area(), 0);

        let all = GridInstanceConfig::default()
            .with_reserve_fraction(1.0)
            .generate()
            .unwrap();
        assert_eq!(all.min_reserve_area(), all.total_area());
    }

    #[test]
    fn test_invalid_config() {
        assert!(GridInstanceConfig::default().with_max_area(0).generate().is_err());
        assert!(GridInstanceConfig::default()
            .with_reserve_fraction(1.5)
            .validate()
            .is_err());
    }
}
