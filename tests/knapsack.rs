//! A 5-variable knapsack-style EF-COP — AllDifferent plus a capacity
//! constraint, maximizing a weighted sum.

mod common;

use std::time::Duration;

use common::{AllDifferent, Capacity, TotalValue};
use resolute::model::Model;
use resolute::search::{SearchDriver, SolverOptions};
use resolute::variable::Variable;

fn build() -> Model {
    let variables: Vec<Variable> = (0..5).map(|_| Variable::from_interval(None, 17, 0, 0).unwrap()).collect();
    let ids: Vec<u64> = variables.iter().map(Variable::id).collect();

    let all_different = Box::new(AllDifferent { ids: ids.clone() });
    let capacity = Box::new(Capacity { ids: ids.clone(), weights: vec![12, 2, 1, 1, 4], capacity: 15 });
    let objective = Box::new(TotalValue { ids: ids.clone(), unit_values: vec![4, 2, 2, 1, 10] });

    Model::new(variables, vec![all_different, capacity], objective, Box::new(resolute::auxiliary::NullAuxiliaryData)).unwrap()
}

/// At least one run among many different seeds must return a feasible,
/// zero-error assignment within a 100 ms budget.
#[test]
fn at_least_one_seed_finds_a_feasible_assignment() {
    let mut found_feasible = false;
    for seed in 0..100u64 {
        let mut model = build();
        let options = SolverOptions::new(Duration::from_millis(20)).with_optimization_timeout(Duration::from_millis(100)).with_rng_seed(seed);
        let outcome = SearchDriver::new(options).solve(&mut model).unwrap();
        if outcome.feasible {
            found_feasible = true;
            assert_eq!(outcome.solution.len(), 5);
            let mut sorted = outcome.solution.clone();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(sorted.len(), 5, "a feasible solution must satisfy AllDifferent");
            let total_weight: i64 = outcome.solution.iter().zip([12, 2, 1, 1, 4]).map(|(&v, w)| v * w).sum();
            assert!(total_weight <= 15, "a feasible solution must satisfy the capacity constraint");
            break;
        }
    }
    assert!(found_feasible, "at least one of 100 seeds must find a feasible solution within budget");
}
