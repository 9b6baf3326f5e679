//! Same model, same seed, `no_random_starting_point = true` — two
//! consecutive `solve` calls return identical solutions.

mod common;

use std::time::Duration;

use common::AllDifferent;
use resolute::model::Model;
use resolute::search::{SearchDriver, SolverOptions};
use resolute::variable::Variable;

fn build() -> Model {
    let domain = vec![1, 3, 5, 7, 9];
    let variables: Vec<Variable> = (0..5).map(|_| Variable::from_values(None, domain.clone(), domain[0]).unwrap()).collect();
    let ids: Vec<u64> = variables.iter().map(Variable::id).collect();
    Model::with_null_objective(variables, vec![Box::new(AllDifferent { ids })]).unwrap()
}

#[test]
fn same_seed_and_fixed_start_yields_identical_outcomes() {
    let options = SolverOptions::new(Duration::from_millis(30)).with_rng_seed(1234).with_no_random_starting_point(true);

    let mut model_a = build();
    let mut model_b = build();
    let outcome_a = SearchDriver::new(options.clone()).solve(&mut model_a).unwrap();
    let outcome_b = SearchDriver::new(options).solve(&mut model_b).unwrap();

    assert_eq!(outcome_a, outcome_b);
}
