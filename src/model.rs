//! Bundles variables, constraints, the objective, and auxiliary data into
//! the one self-contained unit the search driver operates on.

use std::collections::HashMap;

use crate::auxiliary::{AuxiliaryData, NullAuxiliaryData};
use crate::constraint::{Constraint, simulate_delta_by_restore};
use crate::error::SearchError;
use crate::objective::{NullObjective, Objective};
use crate::variable::Variable;

/// Wraps a user-supplied [`Constraint`] with the id-remap and cached error
/// the driver needs, plus the sticky delta-error fallback: the first time a
/// constraint reports [`SearchError::DeltaNotDefined`], this handle stops
/// calling `delta_error` on it for the rest of the solve and switches
/// permanently to set-evaluate-restore.
pub struct ConstraintHandle {
    id: u64,
    constraint: Box<dyn Constraint>,
    variable_ids: Vec<u64>,
    cached_error: f64,
    delta_supported: bool,
}

impl Clone for ConstraintHandle {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            constraint: dyn_clone::clone_box(&*self.constraint),
            variable_ids: self.variable_ids.clone(),
            cached_error: self.cached_error,
            delta_supported: self.delta_supported,
        }
    }
}

impl ConstraintHandle {
    fn new(id: u64, constraint: Box<dyn Constraint>) -> Self {
        let variable_ids = constraint.variable_ids().to_vec();
        Self { id, constraint, variable_ids, cached_error: 0.0, delta_supported: true }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn variable_ids(&self) -> &[u64] {
        &self.variable_ids
    }

    pub fn cached_error(&self) -> f64 {
        self.cached_error
    }

    pub fn local_index_of(&self, var_id: u64) -> Option<usize> {
        self.variable_ids.iter().position(|&id| id == var_id)
    }

    fn error(&self, values: &[i64]) -> Result<f64, SearchError> {
        let e = self.constraint.error(values)?;
        if e.is_nan() {
            return Err(SearchError::Nan);
        }
        Ok(e)
    }

    /// Change in error `simulate_delta` would report for `candidate_values`
    /// at `indexes` (local positions into this constraint's `variable_ids`),
    /// without mutating anything.
    pub fn simulate_delta(&mut self, values: &[i64], indexes: &[usize], candidate_values: &[i64]) -> Result<f64, SearchError> {
        if self.delta_supported {
            match self.constraint.delta_error(values, indexes, candidate_values) {
                Ok(delta) => return Ok(delta),
                Err(SearchError::DeltaNotDefined { .. }) => {
                    self.delta_supported = false;
                }
                Err(e) => return Err(e),
            }
        }
        simulate_delta_by_restore(self.constraint.as_ref(), values, indexes, candidate_values)
    }

    fn conditional_update(&mut self, local_index: usize, new_value: i64) {
        self.constraint.conditional_update(local_index, new_value);
    }
}

/// The complete model a `solve()` call searches over.
pub struct Model {
    variables: Vec<Variable>,
    constraints: Vec<ConstraintHandle>,
    objective: Box<dyn Objective>,
    auxiliary: Box<dyn AuxiliaryData>,
    var_id_to_pos: HashMap<u64, usize>,
    /// variable position -> indexes into `constraints` incident on it.
    incidence: Vec<Vec<usize>>,
    /// Whether the outer loop should keep restarting after satisfaction to
    /// chase a better `objective.cost()`, as opposed to stopping at the
    /// first feasible assignment. `false` for [`Model::with_null_objective`].
    is_optimization: bool,
}

impl Model {
    pub fn new(
        variables: Vec<Variable>,
        constraints: Vec<Box<dyn Constraint>>,
        objective: Box<dyn Objective>,
        auxiliary: Box<dyn AuxiliaryData>,
    ) -> Result<Self, SearchError> {
        Self::with_mode(variables, constraints, objective, auxiliary, true)
    }

    pub fn with_null_objective(variables: Vec<Variable>, constraints: Vec<Box<dyn Constraint>>) -> Result<Self, SearchError> {
        Self::with_mode(variables, constraints, Box::new(NullObjective), Box::new(NullAuxiliaryData), false)
    }

    fn with_mode(
        mut variables: Vec<Variable>,
        constraints: Vec<Box<dyn Constraint>>,
        objective: Box<dyn Objective>,
        auxiliary: Box<dyn AuxiliaryData>,
        is_optimization: bool,
    ) -> Result<Self, SearchError> {
        // Seeds the permutation-sequence `index` field to each variable's
        // declared position. Unused in assignment mode; in permutation
        // mode this is the identity permutation a solve's first round
        // shuffles away from.
        for (pos, var) in variables.iter_mut().enumerate() {
            var.set_index(pos);
        }

        let var_id_to_pos: HashMap<u64, usize> = variables.iter().enumerate().map(|(i, v)| (v.id(), i)).collect();

        let mut incidence = vec![Vec::new(); variables.len()];
        let mut handles = Vec::with_capacity(constraints.len());
        for (cidx, constraint) in constraints.into_iter().enumerate() {
            for &vid in constraint.variable_ids() {
                let &pos = var_id_to_pos
                    .get(&vid)
                    .ok_or(SearchError::VariableOutOfScope { constraint_id: cidx as u64, variable_id: vid })?;
                incidence[pos].push(cidx);
            }
            handles.push(ConstraintHandle::new(cidx as u64, constraint));
        }

        Ok(Self { variables, constraints: handles, objective, auxiliary, var_id_to_pos, incidence, is_optimization })
    }

    pub fn is_optimization(&self) -> bool {
        self.is_optimization
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variables_mut(&mut self) -> &mut [Variable] {
        &mut self.variables
    }

    pub fn constraints(&self) -> &[ConstraintHandle] {
        &self.constraints
    }

    pub fn objective(&self) -> &dyn Objective {
        self.objective.as_ref()
    }

    pub fn objective_mut(&mut self) -> &mut dyn Objective {
        self.objective.as_mut()
    }

    pub fn incidence_of(&self, var_pos: usize) -> &[usize] {
        &self.incidence[var_pos]
    }

    pub fn position_of(&self, var_id: u64) -> Option<usize> {
        self.var_id_to_pos.get(&var_id).copied()
    }

    pub fn constraint_local_index_of(&self, constraint_idx: usize, var_id: u64) -> Option<usize> {
        self.constraints[constraint_idx].local_index_of(var_id)
    }

    /// Simulates the effect of `candidate_values` at the given local
    /// positions within constraint `constraint_idx`, without mutating
    /// anything. Gathers the constraint's current values itself.
    pub fn simulate_delta(&mut self, constraint_idx: usize, indexes: &[usize], candidate_values: &[i64]) -> Result<f64, SearchError> {
        let values = self.constraint_values(constraint_idx);
        self.constraints[constraint_idx].simulate_delta(&values, indexes, candidate_values)
    }

    /// Current values of every variable, in model order.
    pub fn all_values(&self) -> Vec<i64> {
        self.variables.iter().map(Variable::value).collect()
    }

    /// Current values of the variables a constraint reads, in the
    /// constraint's own declared order.
    pub fn constraint_values(&self, constraint_idx: usize) -> Vec<i64> {
        self.constraints[constraint_idx]
            .variable_ids()
            .iter()
            .map(|&vid| self.variables[self.var_id_to_pos[&vid]].value())
            .collect()
    }

    /// Current values of the variables the objective reads, or every
    /// variable's value if the objective declares no subset (e.g. the
    /// null objective).
    pub fn objective_values(&self) -> Vec<i64> {
        let ids = self.objective.variable_ids();
        if ids.is_empty() {
            self.all_values()
        } else {
            ids.iter().map(|&vid| self.variables[self.var_id_to_pos[&vid]].value()).collect()
        }
    }

    /// Recomputes every constraint's cached error from scratch and returns
    /// the total satisfaction error.
    pub fn refresh_constraint_errors(&mut self) -> Result<f64, SearchError> {
        let mut total = 0.0;
        for cidx in 0..self.constraints.len() {
            let values = self.constraint_values(cidx);
            let e = self.constraints[cidx].error(&values)?;
            self.constraints[cidx].cached_error = e;
            total += e;
        }
        Ok(total)
    }

    pub fn total_error(&self) -> f64 {
        self.constraints.iter().map(ConstraintHandle::cached_error).sum()
    }

    /// Commits `new_value` onto the variable at `var_pos`, invoking
    /// auxiliary-data update, then the variable's own `set_value`, then
    /// every incident constraint's `conditional_update` and cache refresh,
    /// in that order (per the ordering guarantees of the concurrency
    /// model). Returns, for every constraint touched, its id and its error
    /// before/after the move.
    pub fn commit_assignment(&mut self, var_pos: usize, new_value: i64) -> Result<Vec<(usize, f64, f64)>, SearchError> {
        let var_id = self.variables[var_pos].id();
        self.auxiliary.update(var_id, new_value);
        self.variables[var_pos].set_value(new_value)?;
        self.apply_conditional_updates(var_pos, var_id, new_value)
    }

    /// Swaps both `index` and current `value` of two variables (permutation
    /// mode), then updates every constraint incident on either one.
    pub fn commit_swap(&mut self, pos_a: usize, pos_b: usize) -> Result<Vec<(usize, f64, f64)>, SearchError> {
        let (value_a, value_b) = (self.variables[pos_a].value(), self.variables[pos_b].value());
        let (index_a, index_b) = (self.variables[pos_a].index(), self.variables[pos_b].index());

        let id_a = self.variables[pos_a].id();
        let id_b = self.variables[pos_b].id();
        self.auxiliary.update(id_a, value_b);
        self.auxiliary.update(id_b, value_a);

        self.variables[pos_a].set_value(value_b)?;
        self.variables[pos_a].set_index(index_b);
        self.variables[pos_b].set_value(value_a)?;
        self.variables[pos_b].set_index(index_a);

        let mut touched: Vec<usize> = self.incidence[pos_a].iter().chain(self.incidence[pos_b].iter()).copied().collect();
        touched.sort_unstable();
        touched.dedup();

        let mut result = Vec::with_capacity(touched.len());
        for cidx in touched {
            if let Some(local) = self.constraints[cidx].local_index_of(id_a) {
                self.constraints[cidx].conditional_update(local, value_b);
            }
            if let Some(local) = self.constraints[cidx].local_index_of(id_b) {
                self.constraints[cidx].conditional_update(local, value_a);
            }
            let old = self.constraints[cidx].cached_error;
            let values = self.constraint_values(cidx);
            let new = self.constraints[cidx].error(&values)?;
            self.constraints[cidx].cached_error = new;
            result.push((cidx, old, new));
        }
        Ok(result)
    }

    fn apply_conditional_updates(&mut self, var_pos: usize, var_id: u64, new_value: i64) -> Result<Vec<(usize, f64, f64)>, SearchError> {
        let mut result = Vec::with_capacity(self.incidence[var_pos].len());
        for &cidx in &self.incidence[var_pos].clone() {
            if let Some(local) = self.constraints[cidx].local_index_of(var_id) {
                self.constraints[cidx].conditional_update(local, new_value);
            }
            let old = self.constraints[cidx].cached_error;
            let values = self.constraint_values(cidx);
            let new = self.constraints[cidx].error(&values)?;
            self.constraints[cidx].cached_error = new;
            result.push((cidx, old, new));
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable::Variable;

    #[derive(Clone)]
    struct Sum {
        variable_ids: Vec<u64>,
        target: i64,
    }

    impl Constraint for Sum {
        fn variable_ids(&self) -> &[u64] {
            &self.variable_ids
        }

        fn error(&self, values: &[i64]) -> Result<f64, SearchError> {
            Ok((values.iter().sum::<i64>() - self.target).unsigned_abs() as f64)
        }
    }

    #[test]
    fn constructing_incidence_rejects_unknown_variable_ids() {
        let vars = vec![Variable::from_interval(None, 5, 0, 0).unwrap()];
        let bogus = Box::new(Sum { variable_ids: vec![999], target: 0 });
        let err = Model::with_null_objective(vars, vec![bogus]).unwrap_err();
        assert!(matches!(err, SearchError::VariableOutOfScope { .. }));
    }

    #[test]
    fn commit_assignment_refreshes_incident_constraint_errors() {
        let a = Variable::from_interval(None, 10, 0, 0).unwrap();
        let b = Variable::from_interval(None, 10, 0, 0).unwrap();
        let ids = [a.id(), b.id()];
        let constraint = Box::new(Sum { variable_ids: ids.to_vec(), target: 5 });
        let mut model = Model::with_null_objective(vec![a, b], vec![constraint]).unwrap();

        model.refresh_constraint_errors().unwrap();
        assert_eq!(model.total_error(), 5.0);

        let touched = model.commit_assignment(0, 5).unwrap();
        assert_eq!(touched.len(), 1);
        assert_eq!(touched[0].2, 0.0, "5 + 0 == target, error should drop to zero");
        assert_eq!(model.total_error(), 0.0);
    }
}
