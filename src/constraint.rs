//! The black-box constraint contract the search core consumes.

use dyn_clone::DynClone;

use crate::error::SearchError;

/// A constraint reads a fixed subset of the model's variables and scores how
/// badly it is violated.
///
/// Implementations see only the values of the variables they declared via
/// [`Constraint::variable_ids`], in that order; `indexes` passed to
/// [`Constraint::delta_error`] and [`Constraint::conditional_update`] are
/// positions into that same slice, not global variable ids.
pub trait Constraint: DynClone {
    /// The variable ids this constraint reads, in the order `values` slices
    /// are laid out for every other method on this trait.
    fn variable_ids(&self) -> &[u64];

    /// Current violation, `>= 0`, `0` iff satisfied.
    fn error(&self, values: &[i64]) -> Result<f64, SearchError>;

    /// Expected change in `error()` if the variables at `indexes` took
    /// `candidate_values` simultaneously, without actually changing them.
    ///
    /// The default implementation reports [`SearchError::DeltaNotDefined`];
    /// constraints that can compute this cheaply should override it.
    fn delta_error(&self, _values: &[i64], _indexes: &[usize], _candidate_values: &[i64]) -> Result<f64, SearchError> {
        Err(SearchError::DeltaNotDefined { constraint_id: 0 })
    }

    /// Incremental cache update, invoked after a move affecting this
    /// constraint has been committed. Most constraints need not override
    /// this; it exists for constraints that maintain derived state.
    fn conditional_update(&mut self, _local_index: usize, _new_value: i64) {}

    fn has_variable(&self, id: u64) -> bool {
        self.variable_ids().contains(&id)
    }
}

dyn_clone::clone_trait_object!(Constraint);

/// Computes `delta_error` by temporarily applying `candidate_values` to a
/// scratch copy of `values` and comparing `error()` before and after.
///
/// Used as the set-evaluate-restore fallback when a constraint does not
/// implement `delta_error`.
pub fn simulate_delta_by_restore(
    constraint: &dyn Constraint,
    values: &[i64],
    indexes: &[usize],
    candidate_values: &[i64],
) -> Result<f64, SearchError> {
    let before = constraint.error(values)?;
    let mut scratch = values.to_vec();
    for (&i, &v) in indexes.iter().zip(candidate_values) {
        scratch[i] = v;
    }
    let after = constraint.error(&scratch)?;
    Ok(after - before)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct AllDifferent {
        variable_ids: Vec<u64>,
    }

    impl Constraint for AllDifferent {
        fn variable_ids(&self) -> &[u64] {
            &self.variable_ids
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

    #[test]
    fn simulate_delta_leaves_values_unchanged_and_matches_before_after() {
        let c = AllDifferent { variable_ids: vec![0, 1, 2] };
        let values = [1, 2, 2];
        let delta = simulate_delta_by_restore(&c, &values, &[2], &[3]).unwrap();
        assert_eq!(values, [1, 2, 2], "simulate_delta must not mutate its input");
        assert_eq!(delta, -1.0);
    }

    #[test]
    fn default_delta_error_is_not_defined() {
        let c = AllDifferent { variable_ids: vec![0, 1] };
        assert!(matches!(
            c.delta_error(&[1, 2], &[0], &[2]),
            Err(SearchError::DeltaNotDefined { .. })
        ));
    }
}
