//! The objective contract: a scalar cost to optimize, plus tie-break hooks.

use dyn_clone::DynClone;
use rand::Rng;

use crate::error::SearchError;

const TIE_EPSILON: f64 = 1e-10;

/// Whether [`Objective::cost`] should be driven down or up. The driver
/// always works in a normalized minimizing form internally, negating the
/// reported cost when `direction() == Maximize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Minimize,
    Maximize,
}

/// Contract exposed to the core. `values` passed to every method here is
/// ordered to match [`Objective::variable_ids`], mirroring
/// [`crate::constraint::Constraint`]'s calling convention.
pub trait Objective: DynClone {
    fn name(&self) -> &str {
        "objective"
    }

    fn variable_ids(&self) -> &[u64];

    fn direction(&self) -> Direction {
        Direction::Minimize
    }

    fn cost(&self, values: &[i64]) -> Result<f64, SearchError>;

    /// Direction-normalized cost: negated when `direction() == Maximize`.
    fn normalized_cost(&self, values: &[i64]) -> Result<f64, SearchError> {
        let c = self.cost(values)?;
        if c.is_nan() {
            return Err(SearchError::Nan);
        }
        Ok(match self.direction() {
            Direction::Minimize => c,
            Direction::Maximize => -c,
        })
    }

    /// Tie-break among equal-satisfaction candidate values for the variable
    /// at `local_index` in `base_values`. Default: evaluate `cost()` for
    /// each candidate substituted in turn and return a uniform random pick
    /// among those tied for the lowest normalized cost. Must not mutate
    /// `base_values`.
    fn heuristic_value(
        &self,
        base_values: &[i64],
        local_index: usize,
        candidates: &[i64],
        rng: &mut impl Rng,
    ) -> Result<usize, SearchError> {
        let mut scratch = base_values.to_vec();
        let mut best_cost = f64::INFINITY;
        let mut best_indexes = Vec::new();
        for (i, &candidate) in candidates.iter().enumerate() {
            scratch[local_index] = candidate;
            let c = self.normalized_cost(&scratch)?;
            if c < best_cost - TIE_EPSILON {
                best_cost = c;
                best_indexes.clear();
                best_indexes.push(i);
            } else if (c - best_cost).abs() <= TIE_EPSILON {
                best_indexes.push(i);
            }
        }
        Ok(best_indexes[rng.random_range(0..best_indexes.len())])
    }

    /// Same as [`Objective::heuristic_value`] but for permutation problems:
    /// `candidate_partners` indexes into `base_values` name the other
    /// variables the chosen one could swap with. Default: uniform random.
    fn heuristic_value_permutation(
        &self,
        _base_values: &[i64],
        _local_index: usize,
        candidate_partners: &[usize],
        rng: &mut impl Rng,
    ) -> Result<usize, SearchError> {
        Ok(rng.random_range(0..candidate_partners.len()))
    }

    /// Run once per feasible checkpoint (satisfaction error reached zero).
    /// May improve `best_cost`/`best_solution` but must never regress them.
    fn postprocess_satisfaction(&mut self, best_cost: f64, best_solution: &[i64]) -> (f64, Vec<i64>) {
        (best_cost, best_solution.to_vec())
    }

    /// Run once at final termination. Same non-regression contract as
    /// [`Objective::postprocess_satisfaction`].
    fn postprocess_optimization(&mut self, best_cost: f64, best_solution: &[i64]) -> (f64, Vec<i64>) {
        (best_cost, best_solution.to_vec())
    }
}

dyn_clone::clone_trait_object!(Objective);

/// The objective used when the user supplies none: constant cost, so every
/// candidate value is equivalent and tie-breaks fall through to uniform
/// random selection.
#[derive(Debug, Clone, Default)]
pub struct NullObjective;

impl Objective for NullObjective {
    fn name(&self) -> &str {
        "null"
    }

    fn variable_ids(&self) -> &[u64] {
        &[]
    }

    fn cost(&self, _values: &[i64]) -> Result<f64, SearchError> {
        Ok(0.0)
    }
}
