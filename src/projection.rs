//! Attributes each constraint's current error to the variables it reads.

use crate::model::Model;

/// Strategy used to turn per-constraint errors into a per-variable error
/// vector that drives variable selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorProjection {
    /// Zero the per-variable vector, then add each constraint's current
    /// error to every variable it reads. Correct from a cold start; costs
    /// `O(total incidence)` every call.
    #[default]
    Full,
    /// Apply only the `(old_error, new_error)` delta of the constraints a
    /// single committed move touched. Requires the vector to already be in
    /// a consistent state (seeded by one `Full` pass at the start of a
    /// satisfaction round).
    Incremental,
    /// Leave the per-variable vector at zero. Used with heuristics that do
    /// not consume it (e.g. Random Walk).
    Null,
}

impl ErrorProjection {
    /// Whether this strategy needs every constraint's `error()` recomputed
    /// from scratch before projecting (`Full`/`Null`), as opposed to
    /// trusting the caches a prior `Model::commit_assignment` /
    /// `Model::commit_swap` call already maintained (`Incremental`).
    pub fn needs_full_constraint_refresh(&self) -> bool {
        !matches!(self, ErrorProjection::Incremental)
    }

    /// `Full`: rebuilds `error_variables` from the model's current
    /// per-constraint cached errors. `Null`: zeroes it. `Incremental`:
    /// zeroes it too — callers use this once, at the start of a
    /// satisfaction round, to seed the vector that subsequent
    /// `apply_touched` calls then maintain.
    pub fn reset_and_rebuild(&self, model: &Model, error_variables: &mut [f64]) {
        error_variables.iter_mut().for_each(|e| *e = 0.0);
        if matches!(self, ErrorProjection::Null) {
            return;
        }
        for constraint in model.constraints() {
            for &vid in constraint.variable_ids() {
                if let Some(pos) = model.position_of(vid) {
                    error_variables[pos] += constraint.cached_error();
                }
            }
        }
    }

    /// `Incremental`: adds each touched constraint's `new - old` error to
    /// every variable it reads. No-op for the other strategies.
    pub fn apply_touched(&self, model: &Model, touched: &[(usize, f64, f64)], error_variables: &mut [f64]) {
        if !matches!(self, ErrorProjection::Incremental) {
            return;
        }
        for &(cidx, old, new) in touched {
            let delta = new - old;
            for &vid in model.constraints()[cidx].variable_ids() {
                if let Some(pos) = model.position_of(vid) {
                    error_variables[pos] += delta;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::Constraint;
    use crate::error::SearchError;
    use crate::variable::Variable;

    #[derive(Clone)]
    struct Eq2 {
        ids: Vec<u64>,
    }

    impl Constraint for Eq2 {
        fn variable_ids(&self) -> &[u64] {
            &self.ids
        }

        fn error(&self, values: &[i64]) -> Result<f64, SearchError> {
            Ok(if values[0] == values[1] { 0.0 } else { 1.0 })
        }
    }

    #[test]
    fn full_projection_matches_incidence_weighted_sum_invariant() {
        let a = Variable::from_interval(None, 5, 0, 1).unwrap();
        let b = Variable::from_interval(None, 5, 0, 2).unwrap();
        let ids = [a.id(), b.id()];
        let mut model = Model::with_null_objective(vec![a, b], vec![Box::new(Eq2 { ids: ids.to_vec() })]).unwrap();
        model.refresh_constraint_errors().unwrap();

        let mut error_variables = vec![0.0; model.num_variables()];
        ErrorProjection::Full.reset_and_rebuild(&model, &mut error_variables);

        let total_incidence_weighted: f64 = model.constraints().iter().map(|c| c.variable_ids().len() as f64 * c.cached_error()).sum();
        assert_eq!(error_variables.iter().sum::<f64>(), total_incidence_weighted);
    }

    #[test]
    fn null_projection_stays_zero() {
        let a = Variable::from_interval(None, 5, 0, 1).unwrap();
        let b = Variable::from_interval(None, 5, 0, 2).unwrap();
        let ids = [a.id(), b.id()];
        let mut model = Model::with_null_objective(vec![a, b], vec![Box::new(Eq2 { ids: ids.to_vec() })]).unwrap();
        model.refresh_constraint_errors().unwrap();

        let mut error_variables = vec![0.0; model.num_variables()];
        ErrorProjection::Null.reset_and_rebuild(&model, &mut error_variables);
        assert_eq!(error_variables, vec![0.0, 0.0]);
    }
}
