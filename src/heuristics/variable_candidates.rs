//! Variable-candidates heuristic: decides which variables are eligible for
//! the variable heuristic to pick among this iteration.

/// One eligible variable position with the weight the variable heuristic
/// should sample it with (ignored by [`super::VariableHeuristic::Uniform`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariableCandidate {
    pub position: usize,
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VariableCandidatesHeuristic {
    /// All variables tied at the maximum per-variable error, excluding
    /// tabu-frozen variables and (unless optimizing with zero satisfaction
    /// error) variables touching no currently-violated constraint.
    #[default]
    AdaptiveSearch,
    /// The full per-variable error vector, tabu-frozen entries zeroed, used
    /// as a discrete sampling distribution.
    AntidoteSearch,
    /// The full variable index list, uniformly.
    RandomWalk,
}

impl VariableCandidatesHeuristic {
    /// `error_variables`, `tabu`, and `incidence_has_violation` (whether
    /// variable `i` appears in at least one constraint with nonzero error)
    /// are all indexed by variable position, length `num_variables`.
    pub fn candidates(
        &self,
        error_variables: &[f64],
        tabu: &[u32],
        incidence_has_violation: &[bool],
        is_optimization: bool,
        current_sat_error: f64,
    ) -> Vec<VariableCandidate> {
        match self {
            VariableCandidatesHeuristic::AdaptiveSearch => {
                let relax_violation_requirement = is_optimization && current_sat_error == 0.0;
                let max_error = error_variables
                    .iter()
                    .enumerate()
                    .filter(|&(i, _)| tabu[i] == 0)
                    .map(|(_, &e)| e)
                    .fold(f64::NEG_INFINITY, f64::max);

                error_variables
                    .iter()
                    .enumerate()
                    .filter(|&(i, &e)| {
                        tabu[i] == 0
                            && e == max_error
                            && (relax_violation_requirement || incidence_has_violation[i])
                    })
                    .map(|(i, _)| VariableCandidate { position: i, weight: 1.0 })
                    .collect()
            }
            VariableCandidatesHeuristic::AntidoteSearch => error_variables
                .iter()
                .enumerate()
                .map(|(i, &e)| VariableCandidate { position: i, weight: if tabu[i] == 0 { e } else { 0.0 } })
                .collect(),
            VariableCandidatesHeuristic::RandomWalk => {
                (0..error_variables.len()).map(|i| VariableCandidate { position: i, weight: 1.0 }).collect()
            }
        }
    }
}
