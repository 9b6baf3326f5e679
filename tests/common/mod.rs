//! Shared constraint/objective fixtures for the end-to-end scenarios:
//! all-different, knapsack capacity, and permutation-adjacency.

use resolute::constraint::Constraint;
use resolute::error::SearchError;
use resolute::objective::{Direction, Objective};

/// Number of pairwise-equal variables among those it reads.
#[derive(Clone)]
pub struct AllDifferent {
    pub ids: Vec<u64>,
}

impl Constraint for AllDifferent {
    fn variable_ids(&self) -> &[u64] {
        &self.ids
    }

    fn error(&self, values: &[i64]) -> Result<f64, SearchError> {
        let mut violations = 0;
        for i in 0..values.len() {
            for j in (i + 1)..values.len() {
                if values[i] == values[j] {
                    violations += 1;
                }
            }
        }
        Ok(violations as f64)
    }
}

/// `error = max(0, sum(weights[i] * values[i]) - capacity)`.
#[derive(Clone)]
pub struct Capacity {
    pub ids: Vec<u64>,
    pub weights: Vec<i64>,
    pub capacity: i64,
}

impl Constraint for Capacity {
    fn variable_ids(&self) -> &[u64] {
        &self.ids
    }

    fn error(&self, values: &[i64]) -> Result<f64, SearchError> {
        let total: i64 = values.iter().zip(&self.weights).map(|(&v, &w)| v * w).sum();
        Ok((total - self.capacity).max(0) as f64)
    }

    fn delta_error(&self, values: &[i64], indexes: &[usize], candidate_values: &[i64]) -> Result<f64, SearchError> {
        let before = self.error(values)?;
        let total_after: i64 = values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                if let Some(pos) = indexes.iter().position(|&idx| idx == i) { candidate_values[pos] } else { v }
            })
            .zip(&self.weights)
            .map(|(v, &w)| v * w)
            .sum();
        Ok((total_after - self.capacity).max(0) as f64 - before)
    }
}

/// Maximize `sum(values[i] * unit_values[i])`.
#[derive(Clone)]
pub struct TotalValue {
    pub ids: Vec<u64>,
    pub unit_values: Vec<i64>,
}

impl Objective for TotalValue {
    fn variable_ids(&self) -> &[u64] {
        &self.ids
    }

    fn direction(&self) -> Direction {
        Direction::Maximize
    }

    fn cost(&self, values: &[i64]) -> Result<f64, SearchError> {
        Ok(values.iter().zip(&self.unit_values).map(|(&v, &u)| (v * u) as f64).sum())
    }
}

/// Penalizes each position in its read-set whose current value differs
/// from the value it is assigned to hold at that position: `error = count
/// of i such that values[i] != home[i]`. Used for the permutation-mode
/// scenario — the driver must swap variables back into their home slots
/// to reach zero error.
#[derive(Clone)]
pub struct HomeSlot {
    pub ids: Vec<u64>,
    pub home: Vec<i64>,
}

impl Constraint for HomeSlot {
    fn variable_ids(&self) -> &[u64] {
        &self.ids
    }

    fn error(&self, values: &[i64]) -> Result<f64, SearchError> {
        Ok(values.iter().zip(&self.home).filter(|(&v, &h)| v != h).count() as f64)
    }

    fn delta_error(&self, values: &[i64], indexes: &[usize], candidate_values: &[i64]) -> Result<f64, SearchError> {
        let mut delta = 0.0;
        for (&i, &candidate) in indexes.iter().zip(candidate_values) {
            let was_home = values[i] == self.home[i];
            let will_be_home = candidate == self.home[i];
            if was_home && !will_be_home {
                delta += 1.0;
            } else if !was_home && will_be_home {
                delta -= 1.0;
            }
        }
        Ok(delta)
    }
}
