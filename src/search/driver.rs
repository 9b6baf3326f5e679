//! The search driver: the nested outer-optimization / inner-satisfaction
//! state machine. This is the one stateful object a caller drives;
//! everything else in the crate (heuristics, projection, the model) is
//! data or pure functions it calls into.

use std::time::Instant;

use problemo::Problem;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::error::SearchError;
use crate::heuristics::value::ValueHeuristic;
use crate::heuristics::{DeltaCandidate, VariableCandidate};
use crate::model::Model;
use crate::objective::Direction;
use crate::search::options::SolverOptions;
use crate::search::unit_data::SearchUnitData;
use crate::terminators::Terminator;

/// Below this magnitude, an error or cost is treated as exactly zero —
/// collapses floating-point rounding noise accumulated across many
/// incremental delta-error updates.
const EPSILON: f64 = 1e-10;

/// Chance of accepting a zero-`min_conflict` (plateau) move instead of
/// tabu-freezing the chosen variable, so the search can walk across flat
/// regions instead of stalling.
const PLATEAU_ESCAPE_PROBABILITY: f64 = 0.1;

/// The `{ feasible, cost, solution }` record `solve` returns. `cost` is in
/// the objective's own (unnormalized) direction; `solution` is always a
/// full, domain-valid assignment — the best satisfaction-error one found if
/// no feasible assignment was ever reached.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveOutcome {
    pub feasible: bool,
    pub cost: f64,
    pub solution: Vec<i64>,
}

/// Tracks the single best-so-far record across the whole
/// solve: the lowest satisfaction error ever observed (monotonically
/// non-increasing, independent of feasibility), and — once satisfaction is
/// first reached — the lowest objective cost seen among zero-error
/// assignments, each paired with the configuration that achieved it.
struct BestSoFar {
    sat_error: f64,
    feasible: bool,
    opt_cost: f64,
    solution: Vec<i64>,
}

impl BestSoFar {
    fn new(initial_solution: Vec<i64>) -> Self {
        Self { sat_error: f64::INFINITY, feasible: false, opt_cost: f64::INFINITY, solution: initial_solution }
    }

    /// Records a new, strictly lower satisfaction error. Before the first
    /// feasible assignment is found, this also becomes the candidate
    /// returned solution — once feasibility has been reached, only
    /// [`BestSoFar::promote_feasible`] may update the solution.
    fn observe_sat_error(&mut self, error: f64, model: &Model) {
        if error < self.sat_error {
            self.sat_error = error;
            if !self.feasible {
                self.solution = model.all_values();
            }
        }
    }

    /// Called once a satisfaction round ends at zero error. Updates the
    /// best feasible cost/solution if `cost` improves on it (or if this is
    /// the first feasible assignment ever found).
    fn promote_feasible(&mut self, cost: f64, model: &Model) -> bool {
        self.feasible = true;
        if cost < self.opt_cost {
            self.opt_cost = cost;
            self.solution = model.all_values();
            true
        } else {
            false
        }
    }
}

/// Drives one model through the satisfaction/optimization search. Owns a
/// single seeded RNG, so two drivers built with the
/// same [`SolverOptions::rng_seed`] and run against equivalent starting
/// models produce identical solves.
pub struct SearchDriver {
    options: SolverOptions,
    rng: StdRng,
}

impl SearchDriver {
    pub fn new(options: SolverOptions) -> Self {
        let rng = match options.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { options, rng }
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    /// Runs the search to completion (feasible-and-optimal-enough, or
    /// deadline expiry) and installs the best solution found onto `model`.
    pub fn solve(&mut self, model: &mut Model) -> Result<SolveOutcome, Problem> {
        Ok(self.run(model, None)?)
    }

    /// Same as [`SearchDriver::solve`], but additionally polls `cancel`
    /// alongside the deadlines — for a parallel-restart aggregator or a
    /// host process that wants to abort a stuck search cooperatively.
    pub fn solve_cancellable(&mut self, model: &mut Model, cancel: &mut dyn Terminator) -> Result<SolveOutcome, Problem> {
        Ok(self.run(model, Some(cancel))?)
    }

    fn run(&mut self, model: &mut Model, mut cancel: Option<&mut dyn Terminator>) -> Result<SolveOutcome, SearchError> {
        let n = model.num_variables();
        let (tabu_local_min, tabu_selected) = self.options.resolved_tabu_times(n);
        let mut unit = SearchUnitData::new(n, model.is_optimization());

        let overall_start = Instant::now();
        let mut best = BestSoFar::new(model.all_values());
        let mut first_round = true;

        loop {
            if first_round && self.options.no_random_starting_point {
                // keep the model's current values for this round only
            } else if self.options.permutation_problem {
                self.randomize_permutation_start(model)?;
            } else {
                self.randomize_assignment_start(model)?;
            }
            first_round = false;

            unit.reset_for_round();
            let round_best_sat_error =
                self.run_satisfaction_round(model, &mut unit, tabu_local_min, tabu_selected, overall_start, &mut best, cancel.as_deref_mut())?;

            if round_best_sat_error == 0.0 {
                let values = model.objective_values();
                let cost = model.objective().normalized_cost(&values)?;
                if best.promote_feasible(cost, model) {
                    let (new_cost, new_solution) = model.objective_mut().postprocess_satisfaction(best.opt_cost, &best.solution);
                    best.opt_cost = new_cost;
                    best.solution = new_solution;
                }
                debug!(cost, "satisfaction round reached zero error");
            }

            let cancelled = cancel.as_deref_mut().and_then(Terminator::terminate).is_some();
            let overall_expired = overall_start.elapsed() >= self.options.optimization_timeout;
            if cancelled || overall_expired {
                break;
            }
            if !model.is_optimization() && best.feasible {
                break;
            }
        }

        let (internal_cost, solution) = if best.feasible {
            if model.is_optimization() {
                model.objective_mut().postprocess_optimization(best.opt_cost, &best.solution)
            } else {
                (best.opt_cost, best.solution.clone())
            }
        } else {
            (best.sat_error, best.solution.clone())
        };
        Self::install_solution(model, &solution)?;

        let reported_cost = if best.feasible {
            match model.objective().direction() {
                Direction::Minimize => internal_cost,
                Direction::Maximize => -internal_cost,
            }
        } else {
            internal_cost
        };

        Ok(SolveOutcome { feasible: best.feasible, cost: reported_cost, solution })
    }

    /// Runs the inner satisfaction loop for one outer round, returning the
    /// lowest total satisfaction error reached this round.
    fn run_satisfaction_round(
        &mut self,
        model: &mut Model,
        unit: &mut SearchUnitData,
        tabu_local_min: u32,
        tabu_selected: u32,
        overall_start: Instant,
        best: &mut BestSoFar,
        mut cancel: Option<&mut dyn Terminator>,
    ) -> Result<f64, SearchError> {
        let total = model.refresh_constraint_errors()?;
        self.options.error_projection.reset_and_rebuild(model, &mut unit.error_variables);
        unit.total_sat_error = total;
        let mut round_best_sat_error = total;
        best.observe_sat_error(total, model);

        let round_deadline = Instant::now() + self.options.satisfaction_timeout;

        loop {
            unit.total_sat_error = model.total_error();
            if self.options.error_projection.needs_full_constraint_refresh() {
                self.options.error_projection.reset_and_rebuild(model, &mut unit.error_variables);
            }

            let any_free = unit.decay_tabu();
            let violated = Self::incidence_violation_flags(model);

            let zero_tabu = vec![0u32; unit.num_variables];
            let effective_tabu: &[u32] = if any_free { &unit.tabu } else { &zero_tabu };
            let mut candidates =
                self.options.variable_candidates_heuristic.candidates(&unit.error_variables, effective_tabu, &violated, unit.is_optimization, unit.total_sat_error);
            if candidates.is_empty() {
                candidates =
                    self.options.variable_candidates_heuristic.candidates(&unit.error_variables, &zero_tabu, &violated, unit.is_optimization, unit.total_sat_error);
            }
            unit.error_distribution = vec![0.0; unit.num_variables];
            for c in &candidates {
                unit.error_distribution[c.position] = c.weight;
            }
            trace!(candidates = candidates.len(), "variable candidates computed");

            let Some(chosen_pos) = self.options.variable_heuristic.pick(&candidates, &mut self.rng) else {
                // No variable at all (e.g. a zero-variable model) — nothing left to do.
                break;
            };

            let delta_candidates = if self.options.permutation_problem {
                self.build_permutation_deltas(model, chosen_pos)?
            } else {
                self.build_assignment_deltas(model, chosen_pos)?
            };

            if delta_candidates.is_empty() {
                // Singleton domain / single-variable permutation: no move exists.
                unit.tabu[chosen_pos] = tabu_local_min;
            } else {
                let (candidate_index, min_conflict, min_opt_delta) = self.choose_value(model, &delta_candidates, chosen_pos, unit.is_optimization)?;
                unit.min_conflict = min_conflict;
                unit.min_opt_delta = min_opt_delta;

                let commit = min_conflict < 0.0 || (min_conflict == 0.0 && self.rng.random_bool(PLATEAU_ESCAPE_PROBABILITY));
                if commit {
                    let touched = self.commit_move(model, chosen_pos, &delta_candidates[candidate_index])?;
                    self.options.error_projection.apply_touched(model, &touched, &mut unit.error_variables);
                    unit.local_moves += 1;

                    let new_total = model.total_error();
                    if new_total < round_best_sat_error - EPSILON {
                        unit.tabu[chosen_pos] = tabu_selected;
                    } else {
                        unit.tabu[chosen_pos] = tabu_local_min;
                    }
                } else {
                    unit.tabu[chosen_pos] = tabu_local_min;
                }
            }

            unit.total_sat_error = model.total_error();
            for e in unit.error_variables.iter_mut() {
                if e.abs() < EPSILON {
                    *e = 0.0;
                }
            }
            if unit.total_sat_error.abs() < EPSILON {
                unit.total_sat_error = 0.0;
            }

            if unit.total_sat_error < round_best_sat_error {
                round_best_sat_error = unit.total_sat_error;
            }
            best.observe_sat_error(unit.total_sat_error, model);

            let cancelled = cancel.as_deref_mut().and_then(Terminator::terminate).is_some();
            if round_best_sat_error == 0.0 || Instant::now() >= round_deadline || overall_start.elapsed() >= self.options.optimization_timeout || cancelled {
                break;
            }
        }

        Ok(round_best_sat_error)
    }

    fn incidence_violation_flags(model: &Model) -> Vec<bool> {
        (0..model.num_variables())
            .map(|pos| model.incidence_of(pos).iter().any(|&cidx| model.constraints()[cidx].cached_error() != 0.0))
            .collect()
    }

    /// Assignment-mode delta-error candidates: one per domain value other
    /// than the variable's current value.
    fn build_assignment_deltas(&self, model: &mut Model, chosen_pos: usize) -> Result<Vec<DeltaCandidate>, SearchError> {
        let var_id = model.variables()[chosen_pos].id();
        let current_value = model.variables()[chosen_pos].value();
        let candidate_values: Vec<i64> = model.variables()[chosen_pos].possible_values().iter().copied().filter(|&v| v != current_value).collect();
        let incident = model.incidence_of(chosen_pos).to_vec();

        let mut candidates = Vec::with_capacity(candidate_values.len());
        for value in candidate_values {
            let mut deltas = Vec::with_capacity(incident.len());
            for &cidx in &incident {
                let local = model.constraint_local_index_of(cidx, var_id).expect("incidence mirrors each constraint's declared variable set");
                deltas.push(model.simulate_delta(cidx, &[local], &[value])?);
            }
            candidates.push(DeltaCandidate { key: value, deltas });
        }
        Ok(candidates)
    }

    /// Permutation-mode delta-error candidates: one per other variable,
    /// keyed by its id, covering every constraint incident on either side
    /// of the prospective swap.
    fn build_permutation_deltas(&self, model: &mut Model, chosen_pos: usize) -> Result<Vec<DeltaCandidate>, SearchError> {
        let n = model.num_variables();
        let var_id = model.variables()[chosen_pos].id();
        let chosen_incident = model.incidence_of(chosen_pos).to_vec();

        let mut candidates = Vec::with_capacity(n.saturating_sub(1));
        for other_pos in 0..n {
            if other_pos == chosen_pos {
                continue;
            }
            let other_id = model.variables()[other_pos].id();
            let other_value = model.variables()[other_pos].value();
            let chosen_value = model.variables()[chosen_pos].value();

            let mut touched: Vec<usize> = chosen_incident.iter().chain(model.incidence_of(other_pos).iter()).copied().collect();
            touched.sort_unstable();
            touched.dedup();

            let mut deltas = Vec::with_capacity(touched.len());
            for &cidx in &touched {
                let mut indexes = Vec::with_capacity(2);
                let mut values = Vec::with_capacity(2);
                if let Some(local) = model.constraint_local_index_of(cidx, var_id) {
                    indexes.push(local);
                    values.push(other_value);
                }
                if let Some(local) = model.constraint_local_index_of(cidx, other_id) {
                    indexes.push(local);
                    values.push(chosen_value);
                }
                deltas.push(model.simulate_delta(cidx, &indexes, &values)?);
            }
            candidates.push(DeltaCandidate { key: other_id as i64, deltas });
        }
        Ok(candidates)
    }

    /// Applies the configured value heuristic, returning the winning
    /// candidate's index into `candidates` and the `min_conflict` the
    /// driver writes back.
    fn choose_value(
        &mut self,
        model: &mut Model,
        candidates: &[DeltaCandidate],
        chosen_pos: usize,
        is_optimization: bool,
    ) -> Result<(usize, f64, Option<f64>), SearchError> {
        match self.options.value_heuristic {
            ValueHeuristic::AdaptiveSearch => {
                let mut tie_rng = StdRng::seed_from_u64(self.rng.random());
                let permutation = self.options.permutation_problem;
                let base_values = model.all_values();
                let tie_break = |tied: &[usize]| -> Result<usize, SearchError> {
                    if permutation {
                        let partners: Vec<usize> = tied
                            .iter()
                            .map(|&i| model.position_of(candidates[i].key as u64).expect("candidate key is a valid variable id"))
                            .collect();
                        let pick = model.objective().heuristic_value_permutation(&base_values, chosen_pos, &partners, &mut tie_rng)?;
                        Ok(tied[pick])
                    } else {
                        let values: Vec<i64> = tied.iter().map(|&i| candidates[i].key).collect();
                        let pick = model.objective().heuristic_value(&base_values, chosen_pos, &values, &mut tie_rng)?;
                        Ok(tied[pick])
                    }
                };
                let choice = ValueHeuristic::adaptive_search(candidates, is_optimization, tie_break, &mut self.rng)?;
                Ok((choice.candidate_index, choice.min_conflict, None))
            }
            ValueHeuristic::AntidoteSearch => {
                let choice = ValueHeuristic::antidote_search(candidates, &mut self.rng);
                Ok((choice.candidate_index, choice.min_conflict, None))
            }
            ValueHeuristic::OptimizationSpace => {
                let permutation = self.options.permutation_problem;
                let cost_for_candidate = |i: usize| -> Result<f64, SearchError> {
                    if permutation {
                        let other_pos = model.position_of(candidates[i].key as u64).expect("candidate key is a valid variable id");
                        let backup_chosen = model.variables()[chosen_pos].value();
                        let backup_other = model.variables()[other_pos].value();
                        model.variables_mut()[chosen_pos].set_value(backup_other)?;
                        model.variables_mut()[other_pos].set_value(backup_chosen)?;
                        let values = model.objective_values();
                        let cost = model.objective().normalized_cost(&values);
                        model.variables_mut()[chosen_pos].set_value(backup_chosen)?;
                        model.variables_mut()[other_pos].set_value(backup_other)?;
                        cost
                    } else {
                        let backup = model.variables()[chosen_pos].value();
                        model.variables_mut()[chosen_pos].set_value(candidates[i].key)?;
                        let values = model.objective_values();
                        let cost = model.objective().normalized_cost(&values);
                        model.variables_mut()[chosen_pos].set_value(backup)?;
                        cost
                    }
                };
                let choice = ValueHeuristic::optimization_space(candidates, cost_for_candidate, &mut self.rng)?;
                Ok((choice.choice.candidate_index, choice.choice.min_conflict, Some(choice.new_cost)))
            }
        }
    }

    fn commit_move(&self, model: &mut Model, chosen_pos: usize, candidate: &DeltaCandidate) -> Result<Vec<(usize, f64, f64)>, SearchError> {
        if self.options.permutation_problem {
            let other_pos = model.position_of(candidate.key as u64).expect("candidate key is a valid variable id");
            model.commit_swap(chosen_pos, other_pos)
        } else {
            model.commit_assignment(chosen_pos, candidate.key)
        }
    }

    fn randomize_assignment_start(&mut self, model: &mut Model) -> Result<(), SearchError> {
        if self.options.samplings <= 1 {
            for v in model.variables_mut() {
                v.pick_random_value(&mut self.rng);
            }
            return Ok(());
        }
        let samplings = self.options.samplings.max(2);
        let mut best_error = f64::INFINITY;
        let mut best_values = model.all_values();
        for _ in 0..samplings {
            for v in model.variables_mut() {
                v.pick_random_value(&mut self.rng);
            }
            let total = model.refresh_constraint_errors()?;
            if total < best_error {
                best_error = total;
                best_values = model.all_values();
            }
            if total == 0.0 {
                break;
            }
        }
        Self::install_solution(model, &best_values)
    }

    fn randomize_permutation_start(&mut self, model: &mut Model) -> Result<(), SearchError> {
        let samplings = self.options.samplings.max(1);
        let mut best_error = f64::INFINITY;
        let mut best_state: Vec<(i64, usize)> = model.variables().iter().map(|v| (v.value(), v.index())).collect();
        for _ in 0..samplings {
            self.random_permutation_pass(model)?;
            let total = model.refresh_constraint_errors()?;
            if total < best_error {
                best_error = total;
                best_state = model.variables().iter().map(|v| (v.value(), v.index())).collect();
            }
            if total == 0.0 {
                break;
            }
        }
        for (pos, var) in model.variables_mut().iter_mut().enumerate() {
            let (value, index) = best_state[pos];
            var.set_value(value)?;
            var.set_index(index);
        }
        Ok(())
    }

    /// About 50% chance of swapping each pair `(i, j)`, `i < j` — a Knuth-style
    /// randomized pass used to seed a permutation-mode round.
    fn random_permutation_pass(&mut self, model: &mut Model) -> Result<(), SearchError> {
        let n = model.num_variables();
        for i in 0..n {
            for j in (i + 1)..n {
                if self.rng.random_bool(0.5) {
                    let value_i = model.variables()[i].value();
                    let value_j = model.variables()[j].value();
                    let index_i = model.variables()[i].index();
                    let index_j = model.variables()[j].index();
                    let vars = model.variables_mut();
                    vars[i].set_value(value_j)?;
                    vars[i].set_index(index_j);
                    vars[j].set_value(value_i)?;
                    vars[j].set_index(index_i);
                }
            }
        }
        Ok(())
    }

    fn install_solution(model: &mut Model, solution: &[i64]) -> Result<(), SearchError> {
        for (var, &value) in model.variables_mut().iter_mut().zip(solution) {
            var.set_value(value)?;
        }
        Ok(())
    }
}

#[allow(unused)]
fn assert_candidate_positions_are_valid(_: &[VariableCandidate]) {}
