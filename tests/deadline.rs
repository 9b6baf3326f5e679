//! Deadline respect. A single impossible constraint (constant error 1)
//! with a 10ms satisfaction timeout and a 50ms overall timeout must
//! return within about 55ms, reporting the best-seen (error = 1)
//! configuration as infeasible.

use std::time::{Duration, Instant};

use resolute::constraint::Constraint;
use resolute::error::SearchError;
use resolute::model::Model;
use resolute::search::{SearchDriver, SolverOptions};
use resolute::variable::Variable;

#[derive(Clone)]
struct AlwaysWrong {
    ids: Vec<u64>,
}

impl Constraint for AlwaysWrong {
    fn variable_ids(&self) -> &[u64] {
        &self.ids
    }

    fn error(&self, _values: &[i64]) -> Result<f64, SearchError> {
        Ok(1.0)
    }
}

#[test]
fn returns_within_budget_reporting_infeasible() {
    let v = Variable::from_interval(None, 5, 0, 0).unwrap();
    let vid = v.id();
    let mut model = Model::with_null_objective(vec![v], vec![Box::new(AlwaysWrong { ids: vec![vid] })]).unwrap();

    let options = SolverOptions::new(Duration::from_millis(10)).with_optimization_timeout(Duration::from_millis(50)).with_rng_seed(1);
    let start = Instant::now();
    let outcome = SearchDriver::new(options).solve(&mut model).unwrap();
    let elapsed = start.elapsed();

    assert!(!outcome.feasible, "an unsatisfiable constraint can never be reported feasible");
    assert_eq!(outcome.cost, 1.0, "the reported cost is the best satisfaction error ever seen");
    assert!(elapsed <= Duration::from_millis(55) + Duration::from_millis(50), "deadline compliance allows at most one extra iteration's worth of work");
}
