//! Variable heuristic: picks one variable among the candidates the
//! variable-candidates heuristic returned.

use rand::Rng;
use rand_distr::{Distribution, WeightedIndex};

use super::variable_candidates::VariableCandidate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VariableHeuristic {
    /// Uniform random pick from the candidate list, ignoring weights. Pairs
    /// with `AdaptiveSearch` and `RandomWalk` candidates.
    #[default]
    Uniform,
    /// Sample from the discrete distribution the candidate weights define.
    /// Pairs with `AntidoteSearch` candidates.
    WeightedSample,
}

impl VariableHeuristic {
    /// Returns the chosen candidate's variable position, or `None` if
    /// `candidates` is empty (the driver's empty-candidate-list reset).
    pub fn pick(&self, candidates: &[VariableCandidate], rng: &mut impl Rng) -> Option<usize> {
        if candidates.is_empty() {
            return None;
        }
        match self {
            VariableHeuristic::Uniform => Some(candidates[rng.random_range(0..candidates.len())].position),
            VariableHeuristic::WeightedSample => {
                let weights: Vec<f64> = candidates.iter().map(|c| c.weight.max(0.0)).collect();
                if weights.iter().all(|&w| w == 0.0) {
                    return Some(candidates[rng.random_range(0..candidates.len())].position);
                }
                let dist = WeightedIndex::new(&weights).expect("at least one positive weight checked above");
                Some(candidates[dist.sample(rng)].position)
            }
        }
    }
}
