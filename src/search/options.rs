//! Solver configuration.
//!
//! The option set is closed and fully enumerated, so this is a plain typed
//! builder rather than the dynamic options registry used elsewhere in this
//! codebase's solver families — that registry exists to let an open-ended
//! set of numeric knobs be discovered across many interior-point/LP solver
//! variants; here there is exactly one search engine and exactly these
//! fields.

use std::time::Duration;

use crate::heuristics::{VariableCandidatesHeuristic, VariableHeuristic, value::ValueHeuristic};
use crate::projection::ErrorProjection;

#[derive(Debug, Clone, PartialEq)]
pub struct SolverOptions {
    /// Per-round deadline for the inner satisfaction loop. Required; there
    /// is no sensible default for a real-time budget.
    pub satisfaction_timeout: Duration,
    /// Overall deadline for the outer optimization loop. Defaults to
    /// `10 * satisfaction_timeout`.
    pub optimization_timeout: Duration,
    /// If true, spawn independent cores and let an external aggregator
    /// pick the best result. The core loop itself is indifferent to this
    /// flag; it is read by the parallel-restart aggregator, not `solve`.
    pub parallel_runs: bool,
    /// If true, the first optimization round uses the variables' current
    /// values instead of a randomized starting configuration.
    pub no_random_starting_point: bool,
    /// Monte-Carlo samples per randomized restart.
    pub samplings: u32,
    pub tabu_time_local_min: Option<u32>,
    pub tabu_time_selected: Option<u32>,
    pub variable_candidates_heuristic: VariableCandidatesHeuristic,
    pub variable_heuristic: VariableHeuristic,
    pub value_heuristic: ValueHeuristic,
    pub error_projection: ErrorProjection,
    pub permutation_problem: bool,
    pub rng_seed: Option<u64>,
}

impl SolverOptions {
    pub fn new(satisfaction_timeout: Duration) -> Self {
        Self {
            satisfaction_timeout,
            optimization_timeout: satisfaction_timeout * 10,
            parallel_runs: false,
            no_random_starting_point: false,
            samplings: 10,
            tabu_time_local_min: None,
            tabu_time_selected: None,
            variable_candidates_heuristic: VariableCandidatesHeuristic::default(),
            variable_heuristic: VariableHeuristic::default(),
            value_heuristic: ValueHeuristic::default(),
            error_projection: ErrorProjection::default(),
            permutation_problem: false,
            rng_seed: None,
        }
    }

    pub fn with_optimization_timeout(mut self, timeout: Duration) -> Self {
        self.optimization_timeout = timeout;
        self
    }

    pub fn with_parallel_runs(mut self, parallel_runs: bool) -> Self {
        self.parallel_runs = parallel_runs;
        self
    }

    pub fn with_no_random_starting_point(mut self, no_random_starting_point: bool) -> Self {
        self.no_random_starting_point = no_random_starting_point;
        self
    }

    pub fn with_samplings(mut self, samplings: u32) -> Self {
        self.samplings = samplings;
        self
    }

    pub fn with_tabu_times(mut self, tabu_time_local_min: u32, tabu_time_selected: u32) -> Self {
        self.tabu_time_local_min = Some(tabu_time_local_min);
        self.tabu_time_selected = Some(tabu_time_selected);
        self
    }

    pub fn with_variable_candidates_heuristic(mut self, h: VariableCandidatesHeuristic) -> Self {
        self.variable_candidates_heuristic = h;
        self
    }

    pub fn with_variable_heuristic(mut self, h: VariableHeuristic) -> Self {
        self.variable_heuristic = h;
        self
    }

    pub fn with_value_heuristic(mut self, h: ValueHeuristic) -> Self {
        self.value_heuristic = h;
        self
    }

    pub fn with_error_projection(mut self, p: ErrorProjection) -> Self {
        self.error_projection = p;
        self
    }

    pub fn with_permutation_problem(mut self, permutation_problem: bool) -> Self {
        self.permutation_problem = permutation_problem;
        self
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// `tabu_time_local_min = max(1, N/2)`, `tabu_time_selected =
    /// max(1, tabu_time_local_min/2)`, unless overridden.
    pub fn resolved_tabu_times(&self, num_variables: usize) -> (u32, u32) {
        let local_min = self.tabu_time_local_min.unwrap_or_else(|| (num_variables as u32 / 2).max(1));
        let selected = self.tabu_time_selected.unwrap_or_else(|| (local_min / 2).max(1));
        (local_min, selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optimization_timeout_defaults_to_ten_times_satisfaction_timeout() {
        let options = SolverOptions::new(Duration::from_millis(10));
        assert_eq!(options.optimization_timeout, Duration::from_millis(100));
    }

    #[test]
    fn resolved_tabu_times_derive_from_variable_count() {
        let options = SolverOptions::new(Duration::from_millis(10));
        assert_eq!(options.resolved_tabu_times(10), (5, 2));
        assert_eq!(options.resolved_tabu_times(1), (1, 1));
    }

    #[test]
    fn explicit_tabu_times_override_the_formula() {
        let options = SolverOptions::new(Duration::from_millis(10)).with_tabu_times(7, 3);
        assert_eq!(options.resolved_tabu_times(10), (7, 3));
    }
}
