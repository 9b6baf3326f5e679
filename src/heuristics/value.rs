//! Value heuristic: decides what the chosen variable moves to (or, in
//! permutation mode, which partner it swaps with).

use rand::Rng;
use rand_distr::{Distribution, WeightedIndex};

use crate::error::SearchError;

use super::DeltaCandidate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueHeuristic {
    /// Sum each candidate's delta vector, keep those with the minimum sum,
    /// tie-break via the objective when optimizing, else uniformly.
    #[default]
    AdaptiveSearch,
    /// Transform summed deltas to non-negative weights (`max(0, -delta)`)
    /// and sample proportionally; uniform if every weight is zero.
    AntidoteSearch,
    /// Minimize the objective directly, tentatively applying each
    /// candidate; tie-break by smallest summed delta-error.
    OptimizationSpace,
}

/// The outcome of a value-heuristic call: which candidate won and the
/// `min_conflict` (summed constraint delta) the driver writes back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueChoice {
    pub candidate_index: usize,
    pub min_conflict: f64,
}

/// Extra fields [`ValueHeuristic::OptimizationSpace`] reports on top of
/// [`ValueChoice`]: the new (normalized) objective cost the chosen
/// candidate would yield, used by the driver to maintain a running
/// `min_opt_delta`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizationSpaceChoice {
    pub choice: ValueChoice,
    pub new_cost: f64,
}

impl ValueHeuristic {
    pub fn adaptive_search<TieBreak>(
        candidates: &[DeltaCandidate],
        is_optimization: bool,
        mut tie_break: TieBreak,
        rng: &mut impl Rng,
    ) -> Result<ValueChoice, SearchError>
    where
        TieBreak: FnMut(&[usize]) -> Result<usize, SearchError>,
    {
        let sums: Vec<f64> = candidates.iter().map(DeltaCandidate::summed).collect();
        let min_sum = sums.iter().cloned().fold(f64::INFINITY, f64::min);
        let tied: Vec<usize> = sums.iter().enumerate().filter(|&(_, &s)| s == min_sum).map(|(i, _)| i).collect();

        let chosen = if is_optimization && tied.len() > 1 {
            tie_break(&tied)?
        } else {
            tied[rng.random_range(0..tied.len())]
        };

        Ok(ValueChoice { candidate_index: chosen, min_conflict: sums[chosen] })
    }

    pub fn antidote_search(candidates: &[DeltaCandidate], rng: &mut impl Rng) -> ValueChoice {
        let sums: Vec<f64> = candidates.iter().map(DeltaCandidate::summed).collect();
        let weights: Vec<f64> = sums.iter().map(|&s| (-s).max(0.0)).collect();

        let chosen = if weights.iter().all(|&w| w == 0.0) {
            rng.random_range(0..candidates.len())
        } else {
            let dist = WeightedIndex::new(&weights).expect("at least one positive weight checked above");
            dist.sample(rng)
        };

        ValueChoice { candidate_index: chosen, min_conflict: sums[chosen] }
    }

    /// `cost_for_candidate` tentatively applies candidate `i`, returns its
    /// normalized objective cost, and must restore all state before
    /// returning (the driver, not this function, performs the apply /
    /// restore since only it can mutate the model).
    pub fn optimization_space<CostFn>(
        candidates: &[DeltaCandidate],
        mut cost_for_candidate: CostFn,
        rng: &mut impl Rng,
    ) -> Result<OptimizationSpaceChoice, SearchError>
    where
        CostFn: FnMut(usize) -> Result<f64, SearchError>,
    {
        let sums: Vec<f64> = candidates.iter().map(DeltaCandidate::summed).collect();
        let mut costs = Vec::with_capacity(candidates.len());
        for i in 0..candidates.len() {
            costs.push(cost_for_candidate(i)?);
        }

        let min_cost = costs.iter().cloned().fold(f64::INFINITY, f64::min);
        let tied: Vec<usize> = costs.iter().enumerate().filter(|&(_, &c)| c == min_cost).map(|(i, _)| i).collect();

        let min_delta_among_tied = tied.iter().map(|&i| sums[i]).fold(f64::INFINITY, f64::min);
        let best: Vec<usize> = tied.into_iter().filter(|&i| sums[i] == min_delta_among_tied).collect();

        let chosen = best[rng.random_range(0..best.len())];
        Ok(OptimizationSpaceChoice {
            choice: ValueChoice { candidate_index: chosen, min_conflict: sums[chosen] },
            new_cost: costs[chosen],
        })
    }
}
